//! Input validation.
//!
//! Each validator takes raw, possibly-missing fields and returns either the
//! validated value or the first violation found, checked in field order.

use thiserror::Error;
use uuid::Uuid;
use validator::ValidateEmail;

use crate::domain::PostChanges;
use crate::error::DomainError;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_TITLE_LEN: usize = 200;

/// First schema violation found in a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        DomainError::Validation(err.0)
    }
}

pub type Validated<T> = Result<T, ValidationError>;

/// Validated registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Validated login input.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Validated post creation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category_id: Option<Uuid>,
    pub published: bool,
}

pub fn validate_registration(
    email: Option<&str>,
    password: Option<&str>,
    name: Option<&str>,
) -> Validated<Registration> {
    let email = email_address(email)?;
    let password = password.unwrap_or_default();
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::new(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    let name = non_blank(name, "Name is required")?;

    Ok(Registration {
        email,
        password: password.to_string(),
        name,
    })
}

pub fn validate_credentials(email: Option<&str>, password: Option<&str>) -> Validated<Credentials> {
    let email = email_address(email)?;
    let password = match password {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => return Err(ValidationError::new("Password is required")),
    };

    Ok(Credentials { email, password })
}

pub fn validate_new_post(
    title: Option<&str>,
    content: Option<&str>,
    category_id: Option<&str>,
    published: Option<bool>,
) -> Validated<NewPost> {
    let title = title_text(title)?;
    let content = non_blank(content, "Content is required")?;
    let category_id = category_id.map(category).transpose()?;
    let published =
        published.ok_or_else(|| ValidationError::new("Published flag is required"))?;

    Ok(NewPost {
        title,
        content,
        category_id,
        published,
    })
}

/// Every field is optional; supplied fields follow the creation rules.
pub fn validate_post_changes(
    title: Option<&str>,
    content: Option<&str>,
    category_id: Option<&str>,
    published: Option<bool>,
) -> Validated<PostChanges> {
    Ok(PostChanges {
        title: title.map(|t| title_text(Some(t))).transpose()?,
        content: content
            .map(|c| non_blank(Some(c), "Content is required"))
            .transpose()?,
        category_id: category_id.map(category).transpose()?,
        published,
    })
}

pub fn validate_comment(content: Option<&str>) -> Validated<String> {
    non_blank(content, "Comment content is required")
}

fn email_address(email: Option<&str>) -> Validated<String> {
    let email = email.unwrap_or_default();
    if is_email(email) {
        Ok(email.to_string())
    } else {
        Err(ValidationError::new("Invalid email address"))
    }
}

fn is_email(value: &str) -> bool {
    // Addresses also need a dotted domain; `user@localhost` is rejected.
    value.validate_email()
        && value
            .rsplit_once('@')
            .is_some_and(|(_, domain)| domain.contains('.'))
}

fn title_text(title: Option<&str>) -> Validated<String> {
    let title = non_blank(title, "Title is required")?;
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::new(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title)
}

fn non_blank(value: Option<&str>, message: &str) -> Validated<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        _ => Err(ValidationError::new(message)),
    }
}

fn category(raw: &str) -> Validated<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ValidationError::new("Invalid category id"))
}
