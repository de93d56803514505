//! Authentication ports: credential hashing and session tokens.

use uuid::Uuid;

/// Identity carried inside a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub email: String,
    pub exp: i64,
}

/// Token service trait for signed, time-bound session tokens.
pub trait TokenService: Send + Sync {
    /// Issue a token for a user.
    fn generate_token(&self, user_id: Uuid, email: &str) -> Result<String, AuthError>;

    /// Decode a token from an untrusted source.
    ///
    /// Total over arbitrary input: a malformed, tampered, foreign or expired
    /// token all come back as `None`.
    fn validate_token(&self, token: &str) -> Option<TokenClaims>;

    /// Token lifetime in seconds.
    fn expiration_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password with a fresh salt.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a stored digest. A digest that cannot be
    /// parsed verifies as `false`.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Authentication infrastructure errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Token issue failed: {0}")]
    TokenIssue(String),

    #[error("Invalid auth configuration: {0}")]
    Configuration(String),
}
