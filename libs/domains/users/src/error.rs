use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::index::IndexError;
use crate::token::TokenError;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("User '{0}' already exists")]
    DuplicateUser(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    /// Map an index outcome for the record stored under `id`.
    pub(crate) fn from_index(err: IndexError, id: &str) -> Self {
        match err {
            IndexError::NotFound => UserError::NotFound(id.to_string()),
            IndexError::KeyExists => UserError::DuplicateUser(id.to_string()),
            IndexError::InvariantViolation(msg) => UserError::Internal(msg),
        }
    }
}

impl From<ValidationErrors> for UserError {
    /// Flatten every failed rule into `path: message` pairs, sorted by path.
    /// Nested structs and list items are addressed as `name.first` and `roles[0]`.
    fn from(errors: ValidationErrors) -> Self {
        let mut failures = Vec::new();
        flatten_validation(&errors, "", &mut failures);
        failures.sort();
        UserError::Validation(format!("Request validation failed ({})", failures.join("; ")))
    }
}

fn flatten_validation(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(failed) => {
                let reasons: Vec<&str> = failed
                    .iter()
                    .map(|err| err.message.as_deref().unwrap_or(err.code.as_ref()))
                    .collect();
                out.push(format!("{}: {}", path, reasons.join(", ")));
            }
            ValidationErrorsKind::Struct(inner) => flatten_validation(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten_validation(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            UserError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("User {} not found", id),
            ),
            UserError::DuplicateUser(id) => (
                StatusCode::CONFLICT,
                "duplicate",
                format!("User '{}' already exists", id),
            ),
            UserError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid email or password".to_string(),
            ),
            UserError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            UserError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
            }
            UserError::Token(TokenError::Encode(msg)) => {
                tracing::error!("Token encoding error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            UserError::Token(err) => {
                (StatusCode::UNAUTHORIZED, "invalid_token", err.to_string())
            }
            UserError::PasswordHash(msg) => {
                tracing::error!("Password hash error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            UserError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        (
            status,
            Json(json!({
                "error": {
                    "type": error_type,
                    "message": message
                }
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_errors_map_to_domain() {
        assert!(matches!(
            UserError::from_index(IndexError::NotFound, "a@b.com"),
            UserError::NotFound(id) if id == "a@b.com"
        ));
        assert!(matches!(
            UserError::from_index(IndexError::KeyExists, "a@b.com"),
            UserError::DuplicateUser(_)
        ));
        assert!(matches!(
            UserError::from_index(IndexError::InvariantViolation("x".into()), "a@b.com"),
            UserError::Internal(_)
        ));
    }

    #[test]
    fn test_validation_errors_name_nested_fields() {
        use crate::models::{CreateUser, Name, Role};
        use validator::Validate;

        let input = CreateUser {
            email: "not-an-email".to_string(),
            name: Name::new("Jolin", " "),
            password: "Testing.12345".to_string(),
            is_active: true,
            roles: vec![Role::Agent],
        };
        let UserError::Validation(msg) = UserError::from(input.validate().unwrap_err()) else {
            panic!("expected a validation error");
        };
        assert!(msg.contains("email: email"), "{msg}");
        assert!(msg.contains("name.last: must not be blank"), "{msg}");
        assert!(!msg.contains("password"), "{msg}");
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (UserError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (UserError::DuplicateUser("x".into()), StatusCode::CONFLICT),
            (UserError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (UserError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (UserError::Token(TokenError::Expired), StatusCode::UNAUTHORIZED),
            (
                UserError::Token(TokenError::Encode("x".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (UserError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
