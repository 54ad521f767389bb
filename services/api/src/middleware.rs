//! Authentication middleware for JWT token validation

use axum::{
    extract::State,
    http::{HeaderMap, Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::ApiError, state::AppState};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer-side session id
    #[serde(default)]
    pub id: Option<String>,
    pub user_id: i64,
    pub role_id: i64,
    /// Expiration time
    pub exp: u64,
}

/// Authenticated user information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub role_id: i64,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            role_id: claims.role_id,
        }
    }
}

/// Verify an HS256 token and return its claims
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            debug!("Failed to validate token: {}", e);
            ApiError::Forbidden("Invalid or expired token".to_string())
        })
}

/// `Ok(None)` when no Authorization header is sent
fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    if !headers.contains_key(AUTHORIZATION) {
        return Ok(None);
    }

    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| Some(auth.token().to_string()))
        .ok_or(ApiError::Unauthorized)
}

/// Authentication middleware
///
/// Missing or non-bearer credentials give 401, a bad token 403.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?.ok_or(ApiError::Unauthorized)?;
    let claims = decode_token(&token, &state.config.auth.jwt_secret)?;
    debug!(user_id = claims.user_id, token_id = ?claims.id, "Authenticated request");

    req.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(req).await)
}

/// Like [`auth_middleware`], but lets anonymous requests through
///
/// A token that is present must still be valid.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())
        .map_err(|_| ApiError::Forbidden("Invalid or expired token".to_string()))?;

    if let Some(token) = token {
        let claims = decode_token(&token, &state.config.auth.jwt_secret)?;
        req.extensions_mut().insert(AuthUser::from(claims));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Claims;
    use jsonwebtoken::{EncodingKey, Header};

    pub const SECRET: &str = "test-secret";

    pub fn token_with(user_id: i64, role_id: i64, exp: u64, secret: &str) -> String {
        let claims = Claims {
            id: Some(format!("session-{}", user_id)),
            user_id,
            role_id,
            exp,
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    /// Valid for an hour
    pub fn token(user_id: i64, role_id: i64) -> String {
        let exp = chrono::Utc::now().timestamp() as u64 + 3600;
        token_with(user_id, role_id, exp, SECRET)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_decode_valid_token() {
        let claims = decode_token(&token(9, 2), SECRET).unwrap();
        assert_eq!(AuthUser::from(claims), AuthUser { user_id: 9, role_id: 2 });
    }

    #[test]
    fn test_rejects_wrong_secret_and_expired_tokens() {
        let forged = token_with(9, 1, chrono::Utc::now().timestamp() as u64 + 3600, "other");
        assert!(matches!(
            decode_token(&forged, SECRET),
            Err(ApiError::Forbidden(_))
        ));

        let expired = token_with(9, 2, 1_000_000, SECRET);
        assert!(matches!(
            decode_token(&expired, SECRET),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn test_bearer_extraction() {
        let mut headers = HeaderMap::new();
        assert!(matches!(bearer_token(&headers), Ok(None)));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert!(matches!(bearer_token(&headers), Err(ApiError::Unauthorized)));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).unwrap().as_deref(), Some("abc.def.ghi"));
    }
}
