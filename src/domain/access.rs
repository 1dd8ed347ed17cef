//! Access Guard for password-protected mappings.
//!
//! A mapping whose password is non-empty is *protected*. Resolving it requires the
//! caller to present the same password. The decision is a pure function with no
//! side effects; the caller decides how each outcome is rendered.
//!
//! Credentials are raw bytes as received, so any encoding the client used for the
//! password at creation works as long as it sends the same bytes back.

use subtle::ConstantTimeEq;

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The caller may see the target URL.
    Granted,
    /// The mapping is protected and no credential was supplied.
    NeedCredential,
    /// A credential was supplied but does not match.
    Denied,
}

/// Decides whether a resolve request may proceed.
///
/// An empty `supplied` credential is treated the same as no credential.
///
/// # Examples
///
/// ```
/// use url_mapper::domain::access::{AccessDecision, decide};
///
/// assert_eq!(decide(false, "", None), AccessDecision::Granted);
/// assert_eq!(decide(true, "secret", None), AccessDecision::NeedCredential);
/// assert_eq!(decide(true, "secret", Some(b"wrong".as_slice())), AccessDecision::Denied);
/// assert_eq!(decide(true, "secret", Some(b"secret".as_slice())), AccessDecision::Granted);
/// ```
pub fn decide(protected: bool, record_password: &str, supplied: Option<&[u8]>) -> AccessDecision {
    if !protected {
        return AccessDecision::Granted;
    }

    match supplied.filter(|credential| !credential.is_empty()) {
        None => AccessDecision::NeedCredential,
        Some(credential) if credentials_match(record_password, credential) => {
            AccessDecision::Granted
        }
        Some(_) => AccessDecision::Denied,
    }
}

/// Constant-time byte equality.
fn credentials_match(expected: &str, supplied: &[u8]) -> bool {
    expected.as_bytes().ct_eq(supplied).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unprotected_always_granted() {
        assert_eq!(decide(false, "", None), AccessDecision::Granted);
        assert_eq!(decide(false, "", Some(b"anything".as_slice())), AccessDecision::Granted);
    }

    #[test]
    fn test_protected_without_credential() {
        assert_eq!(decide(true, "secret", None), AccessDecision::NeedCredential);
    }

    #[test]
    fn test_protected_with_empty_credential() {
        assert_eq!(
            decide(true, "secret", Some(b"".as_slice())),
            AccessDecision::NeedCredential
        );
    }

    #[test]
    fn test_protected_with_matching_credential() {
        assert_eq!(
            decide(true, "secret", Some(b"secret".as_slice())),
            AccessDecision::Granted
        );
    }

    #[test]
    fn test_protected_with_wrong_credential() {
        assert_eq!(decide(true, "secret", Some(b"wrong".as_slice())), AccessDecision::Denied);
        assert_eq!(decide(true, "secret", Some(b"secret ".as_slice())), AccessDecision::Denied);
        assert_eq!(decide(true, "secret", Some(b"SECRET".as_slice())), AccessDecision::Denied);
    }

    #[test]
    fn test_credentials_match_differing_lengths() {
        assert!(!credentials_match("abc", b"abcd"));
        assert!(credentials_match("abc", b"abc"));
    }

    #[test]
    fn test_non_ascii_password() {
        assert_eq!(
            decide(true, "pässwort", Some("pässwort".as_bytes())),
            AccessDecision::Granted
        );
        assert_eq!(
            decide(true, "pässwort", Some(b"passwort".as_slice())),
            AccessDecision::Denied
        );
        assert_eq!(
            decide(true, "secret", Some(&[0xff, 0xfe][..])),
            AccessDecision::Denied
        );
    }
}
