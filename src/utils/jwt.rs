// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError};

/// Name of the cookie carrying the admin session token.
pub const SESSION_COOKIE: &str = "admin_session";

const ADMIN_ROLE: &str = "admin";

/// JWT Claims structure.
///
/// Inserted into the request extensions by `admin_middleware`; handlers that
/// need to know who is acting take it as `Extension<Claims>`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the admin ID (as string).
    pub sub: String,
    /// Admin login name, for audit logging.
    pub username: String,
    pub role: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Signs a new session token for an admin.
pub fn sign_jwt(
    id: i64,
    username: &str,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = Claims {
        sub: id.to_string(),
        username: username.to_owned(),
        role: ADMIN_ROLE.to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
///
/// Returns the `Claims` if valid, otherwise returns an `AppError`.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

/// Finds the session token in `Authorization: Bearer` or, failing that, in
/// the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token)
        .filter(|token| !token.is_empty())
}

/// `Set-Cookie` value that stores a session token.
pub fn session_cookie(token: &str, max_age: u64) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age
    )
}

/// `Set-Cookie` value that drops the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Axum Middleware: Admin session.
///
/// Validates the session token once at the router boundary and injects the
/// `Claims` into the request extensions. Anything short of a valid admin
/// token is rejected with 401 before the handler runs.
pub async fn admin_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let unauthorized = || AppError::AuthError("Unauthorized".to_string());

    let token = session_token(req.headers()).ok_or_else(unauthorized)?;
    let claims = verify_jwt(token, &config.jwt_secret).map_err(|_| unauthorized())?;

    if claims.role != ADMIN_ROLE {
        return Err(unauthorized());
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn signed_token_verifies_with_same_secret() {
        let token = sign_jwt(7, "admin", "secret", 60).unwrap();
        let claims = verify_jwt(&token, "secret").unwrap();

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn token_with_other_secret_is_rejected() {
        let token = sign_jwt(7, "admin", "secret", 60).unwrap();
        assert!(matches!(verify_jwt(&token, "other"), Err(AppError::AuthError(_))));
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("admin_session=def"));

        assert_eq!(session_token(&headers), Some("abc"));
    }

    #[test]
    fn token_is_read_from_cookie_jar() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; admin_session=def; lang=en"),
        );

        assert_eq!(session_token(&headers), Some("def"));
    }

    #[test]
    fn cleared_cookie_is_not_a_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("admin_session="));

        assert_eq!(session_token(&headers), None);
    }
}
