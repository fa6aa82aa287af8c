use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use crate::error::UserError;
use crate::password::PasswordHasher;
use crate::service::UserService;

/// Extract the token from `Authorization: Bearer <token>`.
/// The scheme name is matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = auth.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|token| !token.is_empty())
}

/// Bearer token middleware.
///
/// Verifies the signature and expiry of the token and inserts the decoded
/// [`TokenClaims`](crate::token::TokenClaims) into request extensions.
///
/// ```ignore
/// let protected = Router::new()
///     .route("/users", get(list_users))
///     .layer(axum::middleware::from_fn_with_state(
///         service.clone(),
///         require_token::<Argon2Hasher>,
///     ));
/// ```
pub async fn require_token<H: PasswordHasher>(
    State(service): State<UserService<H>>,
    mut request: Request,
    next: Next,
) -> Result<Response, UserError> {
    let Some(token) = bearer_token(request.headers()) else {
        tracing::debug!("No bearer token in Authorization header");
        return Err(UserError::Unauthorized("No token provided".to_string()));
    };

    let claims = service.authorize(token).inspect_err(|e| {
        tracing::debug!(error = %e, "Token verification failed");
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
