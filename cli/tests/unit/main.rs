//! Unit tests for plus-provision
//!
//! These tests use a simulated host and run fast without touching the real
//! system.

mod architecture;
mod fakes;
