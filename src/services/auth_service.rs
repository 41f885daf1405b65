use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;

use crate::{
    config::AppConfig,
    db::DbPool,
    dto::auth::{Claims, LoginRequest, SessionUser, SignupRequest, SignupResponse},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, SESSION_COOKIE},
    models::{Account, AccountProfile},
    response::{ApiResponse, Meta},
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(password_hash)
}

pub async fn signup(pool: &DbPool, payload: SignupRequest) -> AppResult<ApiResponse<SignupResponse>> {
    let name = payload.name.trim();
    let email = payload.email.trim();
    if name.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest(
            "name, email and password are required".to_string(),
        ));
    }

    let exist: Option<(i64,)> = sqlx::query_as("SELECT id FROM accounts WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::Conflict("Email is already registered".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;

    let inserted: Result<(i64,), sqlx::Error> = sqlx::query_as(
        "INSERT INTO accounts (name, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await;

    let (user_id,) = match inserted {
        Ok(row) => row,
        // Lost a race with a concurrent signup for the same address.
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(account_id = user_id, "account registered");
    Ok(ApiResponse::success(
        "Registration successful",
        SignupResponse { user_id },
        None,
    ))
}

/// Verify credentials and mint a session token. Unknown email and wrong password
/// are reported identically.
pub async fn login(
    pool: &DbPool,
    config: &AppConfig,
    payload: LoginRequest,
) -> AppResult<(String, ApiResponse<SessionUser>)> {
    let email = payload.email.trim();
    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest(
            "email and password are required".to_string(),
        ));
    }

    let account: Option<Account> = sqlx::query_as::<_, Account>(
        "SELECT id, name, email, password_hash, role, created_at FROM accounts WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    let account = match account {
        Some(a) => a,
        None => return Err(AppError::InvalidCredentials),
    };

    let parsed_hash = PasswordHash::new(&account.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::InvalidCredentials);
    }

    let token = issue_session_token(config, &account)?;
    tracing::info!(account_id = account.id, "account logged in");

    let resp = ApiResponse::success(
        "Login successful",
        SessionUser {
            user: AccountProfile::from(&account),
        },
        Some(Meta::empty()),
    );
    Ok((token, resp))
}

pub fn issue_session_token(config: &AppConfig, account: &Account) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::seconds(config.session_ttl_secs()))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: account.id.to_string(),
        name: account.name.clone(),
        email: account.email.clone(),
        role: account.role.clone(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie =
        format!("{SESSION_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn cleared_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}

pub fn current_user(user: &AuthUser) -> ApiResponse<SessionUser> {
    ApiResponse::success(
        "OK",
        SessionUser {
            user: AccountProfile {
                id: user.account_id,
                name: user.name.clone(),
                email: user.email.clone(),
            },
        },
        Some(Meta::empty()),
    )
}
