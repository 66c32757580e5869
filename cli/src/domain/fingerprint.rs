//! Signing-key fingerprint checks.
//!
//! Pure functions only — no I/O.

/// Accepted fingerprint lengths: v4 (SHA-1, 40 hex) and v5 (SHA-256, 64 hex).
pub const FINGERPRINT_LENGTHS: &[usize] = &[40, 64];

/// Expected fingerprint paired with the text produced by inspecting a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRecord {
    pub expected_fingerprint: String,
    pub observed_output: String,
}

impl VerificationRecord {
    pub fn new(expected_fingerprint: impl Into<String>, observed_output: impl Into<String>) -> Self {
        Self {
            expected_fingerprint: expected_fingerprint.into(),
            observed_output: observed_output.into(),
        }
    }

    /// `true` iff the expected fingerprint occurs verbatim in the output.
    #[must_use]
    pub fn matches(&self) -> bool {
        fingerprint_matches(&self.expected_fingerprint, &self.observed_output)
    }
}

/// Contiguous, case-sensitive containment of `expected` in `observed`.
///
/// Surrounding text (gpg prints `pub`/`uid` lines around the fingerprint) is
/// ignored. An empty expectation never matches.
#[must_use]
pub fn fingerprint_matches(expected: &str, observed: &str) -> bool {
    !expected.is_empty() && observed.contains(expected)
}

/// `true` when `value` is a fixed-length hexadecimal fingerprint.
#[must_use]
pub fn is_valid_fingerprint(value: &str) -> bool {
    FINGERPRINT_LENGTHS.contains(&value.len()) && value.chars().all(|c| c.is_ascii_hexdigit())
}
