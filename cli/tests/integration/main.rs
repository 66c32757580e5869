//! Integration tests for plus-provision
//!
//! These tests spawn the actual binary and test end-to-end behavior that
//! does not require mutating the host.

mod cli_tests;
