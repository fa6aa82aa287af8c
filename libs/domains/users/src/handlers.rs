use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};

use crate::error::{UserError, UserResult};
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::middleware::require_token;
use crate::models::{CreateUser, ListQuery, LoginRequest, StatusUpdate, UpdateUser, UserResponse};
use crate::password::PasswordHasher;
use crate::service::UserService;
use crate::token::TokenClaims;

/// Response header carrying the freshly issued token
pub const TOKEN_HEADER: &str = "Token";

/// Create the router with the public auth endpoints and the
/// token-protected user directory
pub fn router<H: PasswordHasher + 'static>(service: UserService<H>) -> Router {
    let protected = Router::new()
        .route("/users", get(list_users::<H>).post(create_user::<H>))
        .route(
            "/users/{id}",
            get(get_user::<H>)
                .put(update_user::<H>)
                .delete(delete_user::<H>),
        )
        .route("/users/{id}/status", put(update_status::<H>))
        .route_layer(middleware::from_fn_with_state(
            service.clone(),
            require_token::<H>,
        ));

    Router::new()
        .route("/auth", post(auth::<H>))
        .route("/signup", post(signup::<H>))
        .merge(protected)
        .with_state(service)
}

/// Exchange credentials for a token
///
/// POST /auth
async fn auth<H: PasswordHasher>(
    State(service): State<UserService<H>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<impl IntoResponse> {
    let issued = service.authenticate(input).await?;
    let header = HeaderValue::from_str(&issued.token)
        .map_err(|e| UserError::Internal(format!("Token is not a valid header value: {e}")))?;

    Ok(([(TOKEN_HEADER, header)], Json(issued)))
}

/// Public registration
///
/// POST /signup
async fn signup<H: PasswordHasher>(
    State(service): State<UserService<H>>,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let user = service.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users?order=asc|desc&status=pending
async fn list_users<H: PasswordHasher>(
    State(service): State<UserService<H>>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> UserResult<Json<Vec<UserResponse>>> {
    Ok(Json(service.list_users(query).await?))
}

/// POST /users
async fn create_user<H: PasswordHasher>(
    State(service): State<UserService<H>>,
    Extension(claims): Extension<TokenClaims>,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let user = service.create_user(input).await?;
    tracing::debug!(user_id = %user.id, by = %claims.id, "User added");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users/{id}
async fn get_user<H: PasswordHasher>(
    State(service): State<UserService<H>>,
    Path(id): Path<String>,
) -> UserResult<Json<UserResponse>> {
    Ok(Json(service.get_user(&id).await?))
}

/// PUT /users/{id}
async fn update_user<H: PasswordHasher>(
    State(service): State<UserService<H>>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> UserResult<Json<UserResponse>> {
    Ok(Json(service.update_user(&id, input).await?))
}

/// DELETE /users/{id}
async fn delete_user<H: PasswordHasher>(
    State(service): State<UserService<H>>,
    Extension(claims): Extension<TokenClaims>,
    Path(id): Path<String>,
) -> UserResult<impl IntoResponse> {
    service.delete_user(&id).await?;
    tracing::debug!(user_id = %id, by = %claims.id, "User removed");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /users/{id}/status
async fn update_status<H: PasswordHasher>(
    State(service): State<UserService<H>>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<StatusUpdate>,
) -> UserResult<Json<UserResponse>> {
    Ok(Json(service.transition_status(&id, input.status).await?))
}
