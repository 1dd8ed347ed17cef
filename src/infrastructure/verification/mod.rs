//! Bot verification backends.

mod disabled;
mod recaptcha;

pub use disabled::DisabledVerifier;
pub use recaptcha::{RECAPTCHA_VERIFY_URL, RecaptchaVerifier, SiteVerifyResponse};
