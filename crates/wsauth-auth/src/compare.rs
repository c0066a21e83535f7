//! Constant-time comparison of secrets and signatures.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Compare a supplied secret or signature against the expected one.
///
/// Both sides are hashed to fixed-length SHA-256 digests first, so the
/// comparison time depends on neither the position of the first differing
/// byte nor the length of either input.
///
/// # Examples
///
/// ```
/// use wsauth_auth::compare::secrets_match;
///
/// assert!(secrets_match("s3cr3t", "s3cr3t"));
/// assert!(!secrets_match("s3cr3x", "s3cr3t"));
/// assert!(!secrets_match("", "s3cr3t"));
/// ```
#[must_use]
pub fn secrets_match(supplied: &str, expected: &str) -> bool {
    let supplied = Sha256::digest(supplied.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    #[cfg(test)]
    recorder::record(supplied.len(), expected.len());
    supplied.as_slice().ct_eq(expected.as_slice()).into()
}
