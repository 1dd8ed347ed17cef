//! Bot verification collaborator contract.

use crate::error::AppError;
use async_trait::async_trait;

/// Accept/reject check applied to create requests.
///
/// Implementations carry their own secret and expected hostname.
///
/// # Implementations
///
/// - [`crate::infrastructure::verification::RecaptchaVerifier`] - Google reCAPTCHA v3
/// - [`crate::infrastructure::verification::DisabledVerifier`] - accepts everything
#[async_trait]
pub trait BotVerifier: Send + Sync {
    /// Verifies a client-supplied token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::VerificationFailed`] if the token is rejected or the
    /// verification backend cannot be reached.
    async fn verify(&self, token: &str) -> Result<(), AppError>;

    /// Returns true if this verifier actually checks tokens.
    fn is_enabled(&self) -> bool;
}
