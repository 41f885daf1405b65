use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use thiserror::Error;

use crate::{dto::auth::Claims, error::AppError, state::AppState};

pub const SESSION_COOKIE: &str = "token";

/// Identity resolved from a verified session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub account_id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Why a session was refused. Only ever logged; callers see `AppError::Unauthorized`.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no session token")]
    Missing,
    #[error("session token expired")]
    Expired,
    #[error("session token rejected: {0}")]
    Invalid(String),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        tracing::debug!(reason = %err, "session rejected");
        AppError::Unauthorized
    }
}

pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, "admin")
}

/// Look up one cookie across every `Cookie` header.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
}

/// Session cookie first, `Authorization: Bearer` as a fallback for API clients.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(token) = cookie_value(headers, SESSION_COOKIE).filter(|t| !t.is_empty()) {
        return Some(token);
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub fn verify_session_token(secret: &str, token: &str) -> Result<AuthUser, SessionError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|err| match err.kind() {
        ErrorKind::ExpiredSignature => SessionError::Expired,
        _ => SessionError::Invalid(err.to_string()),
    })?;

    let claims = decoded.claims;
    let account_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| SessionError::Invalid("subject is not an account id".into()))?;

    Ok(AuthUser {
        account_id,
        name: claims.name,
        email: claims.email,
        role: claims.role,
    })
}

pub fn resolve_session(secret: &str, headers: &HeaderMap) -> Result<AuthUser, SessionError> {
    let token = session_token(headers).ok_or(SessionError::Missing)?;
    verify_session_token(secret, token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(resolve_session(&state.config.jwt_secret, &parts.headers)?)
    }
}
