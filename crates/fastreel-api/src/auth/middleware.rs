use crate::auth::jwt::JwtValidator;
use crate::auth::models::UserContext;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use fastreel_core::AppError;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthState {
    pub validator: JwtValidator,
}

impl AuthState {
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            validator: JwtValidator::new(jwt_secret),
        }
    }
}

fn unauthorized(message: &str) -> Response {
    HttpAppError(AppError::Unauthorized(message.to_string())).into_response()
}

/// Require `Authorization: Bearer <jwt>` and attach the caller's [`UserContext`].
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => return unauthorized("Missing authorization header"),
    };

    let token = match auth_header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => token.trim(),
        _ => return unauthorized("Invalid authorization header format"),
    };

    let claims = match auth_state.validator.validate_token(token) {
        Ok(claims) => claims,
        Err(e) => return HttpAppError(e).into_response(),
    };

    tracing::debug!(user_id = %claims.sub, "Request authenticated");
    request.extensions_mut().insert(UserContext {
        user_id: claims.sub,
    });

    next.run(request).await
}
