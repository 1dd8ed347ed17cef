use crate::domain::verification::BotVerifier;
use crate::error::AppError;
use async_trait::async_trait;

/// Verifier used when reCAPTCHA keys are not configured. Accepts every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledVerifier;

#[async_trait]
impl BotVerifier for DisabledVerifier {
    async fn verify(&self, _token: &str) -> Result<(), AppError> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
