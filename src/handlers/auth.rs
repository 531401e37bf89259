// src/handlers/auth.rs

use axum::{
    Json,
    extract::State,
    http::header,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::admin::{LoginRequest, SessionDelivery},
    store::DynStore,
    utils::{
        hash::verify_password,
        jwt::{clear_session_cookie, session_cookie, sign_jwt},
    },
};

/// Authenticates an administrator.
///
/// Verifies the password against the stored Argon2 hash and, on success,
/// issues a session token either as an `HttpOnly` cookie (the default) or,
/// when `session` is `"bearer"`, in the JSON body. Never both.
pub async fn login(
    State(store): State<DynStore>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let invalid = || AppError::AuthError("Invalid credentials".to_string());

    let Some(admin) = store.find_admin(&payload.username).await? else {
        tracing::warn!("Login failed for unknown admin '{}'", payload.username);
        return Err(invalid());
    };

    if !verify_password(&payload.password, &admin.password_hash)? {
        tracing::warn!("Login failed for admin '{}'", admin.username);
        return Err(invalid());
    }

    let token = sign_jwt(
        admin.id,
        &admin.username,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    tracing::info!(
        "Admin login successful: {} ({:?} session)",
        admin.username,
        payload.session
    );

    let response = match payload.session {
        SessionDelivery::Cookie => (
            AppendHeaders([(
                header::SET_COOKIE,
                session_cookie(&token, config.jwt_expiration),
            )]),
            Json(json!({
                "success": true,
                "type": "Cookie"
            })),
        )
            .into_response(),
        SessionDelivery::Bearer => Json(json!({
            "success": true,
            "token": token,
            "type": "Bearer"
        }))
        .into_response(),
    };

    Ok(response)
}

/// Ends the browser session by expiring the cookie.
///
/// Bearer tokens are stateless and stay valid until `JWT_EXPIRATION`;
/// clients drop them on their side.
pub async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([(header::SET_COOKIE, clear_session_cookie())]),
        Json(json!({ "success": true })),
    )
}
