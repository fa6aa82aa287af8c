use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use validator::{Validate, ValidationError};

use crate::index::{Record, Status};
use crate::policy::PasswordPolicy;

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    PasswordPolicy::DEFAULT.check(password).map_err(|violation| {
        ValidationError::new(violation.code()).with_message(violation.message().into())
    })
}

/// Roles carried in the directory and in token payloads
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Role {
    Admin,
    Agent,
    User,
    Merchant,
    Consumer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Name {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub first: String,
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub last: String,
}

impl Name {
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            last: last.into(),
        }
    }

    pub fn full(&self) -> String {
        format!("{} {}", self.first, self.last)
    }
}

/// User entity stored in the credential index, keyed by [`User::id`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Normalized email; the index key
    pub id: String,
    pub email: String,
    /// Password digest (never exposed in API responses)
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: Name,
    pub is_active: bool,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Canonical directory key for an email address
pub fn user_id(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    /// Create a new user (password must already be hashed)
    pub fn new(
        email: impl Into<String>,
        name: Name,
        password_hash: String,
        is_active: bool,
        roles: Vec<Role>,
    ) -> Self {
        let email = email.into().trim().to_string();
        let now = Utc::now();
        Self {
            id: user_id(&email),
            email,
            password_hash,
            name,
            is_active,
            roles,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the updatable fields. Id, email and digest are never touched.
    pub fn apply_update(&mut self, update: UpdateUser) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        if let Some(roles) = update.roles {
            self.roles = roles;
        }
        self.updated_at = Utc::now();
    }

    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.to_string()).collect()
    }
}

pub type UserRecord = Record<String, User>;

/// Public projection of a stored user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: Name,
    pub is_active: bool,
    pub roles: Vec<Role>,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&UserRecord> for UserResponse {
    fn from(record: &UserRecord) -> Self {
        let user = record.value();
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            is_active: user.is_active,
            roles: user.roles.clone(),
            status: record.status(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for adding a user
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(nested)]
    pub name: Name,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[validate(length(min = 1, message = "roles must not be empty"))]
    pub roles: Vec<Role>,
}

fn default_active() -> bool {
    true
}

/// DTO for updating an existing user
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[validate(nested)]
    pub name: Option<Name>,
    pub is_active: Option<bool>,
    #[validate(length(min = 1, message = "roles must not be empty"))]
    pub roles: Option<Vec<Role>>,
}

/// DTO for moving a record to another lifecycle status
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StatusUpdate {
    pub status: Status,
}

/// DTO for authentication
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[serde(alias = "password")]
    pub pw: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Query parameters for listing users
///
/// With `status` set, only records in that status are returned (ascending).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListQuery {
    #[serde(default)]
    pub order: SortOrder,
    pub status: Option<Status>,
}

/// Response after successful authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub token: String,
}
