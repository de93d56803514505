use std::sync::Arc;

use crate::domain::User;
use crate::error::DomainError;
use crate::ports::{PasswordService, TokenClaims, TokenService, UserRepository};
use crate::validation::{Credentials, Registration};

/// A freshly authenticated user and the token to hand back as a cookie.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// Registration, login and identity lookup.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
        }
    }

    pub async fn register(&self, input: Registration) -> Result<Session, DomainError> {
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(DomainError::Duplicate("Email already registered".to_string()));
        }

        let password_hash = self
            .passwords
            .hash(&input.password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        // A concurrent registration can still win the race; the unique index
        // turns that into `Duplicate` as well.
        let user = self
            .users
            .create(User::new(input.email, password_hash, input.name))
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        self.open_session(user)
    }

    pub async fn login(&self, input: Credentials) -> Result<Session, DomainError> {
        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        if !self.passwords.verify(&input.password, &user.password_hash) {
            return Err(DomainError::InvalidCredentials);
        }

        self.open_session(user)
    }

    /// Resolve the session identity to the stored user.
    pub async fn current_user(&self, identity: Option<&TokenClaims>) -> Result<User, DomainError> {
        let identity = identity.ok_or(DomainError::Unauthorized)?;
        self.users
            .find_by_id(identity.user_id)
            .await?
            .ok_or(DomainError::Unauthorized)
    }

    fn open_session(&self, user: User) -> Result<Session, DomainError> {
        let token = self
            .tokens
            .generate_token(user.id, &user.email)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        Ok(Session { user, token })
    }
}
