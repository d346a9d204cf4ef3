use std::sync::Arc;

use axum::{
    extract::State,
    http::{self, Request, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use sqlx::query_as;

use crate::{
    auth::{self, AuthError},
    model::{CurrentUser, User},
    AppState,
};

// Rejects the request before the handler runs unless it carries a valid
// bearer token whose subject resolves to a known user. The resolved
// identity is stashed in the request extensions for handlers to pick up.
pub async fn mw_require_auth<B>(
    State(data): State<Arc<AppState>>,
    mut request: Request<B>,
    next: Next<B>,
) -> Result<Response, (StatusCode, Json<serde_json::Value>)> {
    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    let token = match auth_header.and_then(|header| header.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return Err(unauthorized("Missing bearer token")),
    };

    let claims = match auth::decode_token(token, &data.config.jwt_secret) {
        Ok(claims) => claims,
        Err(AuthError::InvalidToken) => return Err(unauthorized("Invalid token")),
        Err(AuthError::InvalidSubject) => return Err(unauthorized("Invalid auth")),
    };

    let user_result = query_as::<_, User>(
        "SELECT id, username, hashed_password FROM users WHERE username = $1",
    )
    .bind(&claims.sub)
    .fetch_optional(&data.db)
    .await;

    match user_result {
        Ok(Some(user)) => {
            request.extensions_mut().insert(CurrentUser {
                id: user.id,
                username: user.username,
            });
        }
        // A well-signed token whose subject no longer exists is rejected
        // rather than treated as an anonymous caller.
        Ok(None) => return Err(unauthorized("Invalid auth")),
        Err(err) => {
            tracing::error!("user lookup failed during auth: {:?}", err);
            let error_response = serde_json::json!({
                "status": "error",
                "message": "Something bad happened while authenticating the request",
            });
            return Err((StatusCode::INTERNAL_SERVER_ERROR, Json(error_response)));
        }
    }

    Ok(next.run(request).await)
}

fn unauthorized(message: &str) -> (StatusCode, Json<serde_json::Value>) {
    let error_response = serde_json::json!({
        "status": "fail",
        "message": message,
    });
    (StatusCode::UNAUTHORIZED, Json(error_response))
}
