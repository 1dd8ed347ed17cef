//! Random token generation.
//!
//! Tokens are human-shareable strings, not secrets: each position is drawn
//! independently and uniformly from the configured alphabet using the thread-local
//! RNG, which is seeded from the operating system at startup.

use rand::Rng;
use thiserror::Error;

/// Default alphabet: ASCII letters and digits.
pub const DEFAULT_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default token length.
pub const DEFAULT_LENGTH: usize = 7;

/// Tokens that would shadow fixed routes and can never be handed out.
pub const RESERVED_TOKENS: &[&str] = &["short", "health", "api"];

/// Invalid generator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenGeneratorError {
    #[error("token length must be at least 1")]
    ZeroLength,
    #[error("token alphabet must not be empty")]
    EmptyAlphabet,
}

/// Source of candidate tokens.
///
/// Implementations only produce candidates; uniqueness is checked by the caller.
#[cfg_attr(test, mockall::automock)]
pub trait TokenSource: Send + Sync {
    fn generate(&self) -> String;
}

/// Generates `length` characters drawn uniformly from `alphabet`.
///
/// # Errors
///
/// Returns [`TokenGeneratorError`] if `length` is zero or `alphabet` is empty.
///
/// # Examples
///
/// ```
/// use url_mapper::utils::token_generator::generate_token;
///
/// let token = generate_token(6, "abc").unwrap();
/// assert_eq!(token.chars().count(), 6);
/// assert!(token.chars().all(|c| "abc".contains(c)));
/// ```
pub fn generate_token(length: usize, alphabet: &str) -> Result<String, TokenGeneratorError> {
    let generator = RandomTokenGenerator::new(length, alphabet)?;
    Ok(generator.generate())
}

/// Returns true if `token` collides with a fixed route.
pub fn is_reserved(token: &str) -> bool {
    RESERVED_TOKENS.contains(&token)
}

/// Random generator with a validated length and alphabet.
#[derive(Debug, Clone)]
pub struct RandomTokenGenerator {
    length: usize,
    alphabet: Vec<char>,
}

impl RandomTokenGenerator {
    /// # Errors
    ///
    /// Returns [`TokenGeneratorError`] if `length` is zero or `alphabet` is empty.
    pub fn new(length: usize, alphabet: &str) -> Result<Self, TokenGeneratorError> {
        if length == 0 {
            return Err(TokenGeneratorError::ZeroLength);
        }

        let alphabet: Vec<char> = alphabet.chars().collect();
        if alphabet.is_empty() {
            return Err(TokenGeneratorError::EmptyAlphabet);
        }

        Ok(Self { length, alphabet })
    }
}

impl TokenSource for RandomTokenGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::rng();

        (0..self.length)
            .map(|_| self.alphabet[rng.random_range(0..self.alphabet.len())])
            .collect()
    }
}
