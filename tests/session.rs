use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use mukena_storefront::{
    config::AppConfig,
    dto::auth::Claims,
    error::AppError,
    middleware::auth::{
        AuthUser, SessionError, cookie_value, ensure_admin, resolve_session, session_token,
        verify_session_token,
    },
    models::Account,
    services::auth_service::{cleared_session_cookie, issue_session_token, session_cookie},
};

const SECRET: &str = "test-secret";

fn config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        host: "127.0.0.1".into(),
        port: 3000,
        jwt_secret: SECRET.into(),
        session_ttl_hours: 24,
        cookie_secure: false,
        upload_dir: "public/uploads".into(),
        whatsapp_number: "6285794345930".into(),
        max_upload_bytes: 1024,
        db_max_connections: 1,
    }
}

fn account(role: &str) -> Account {
    Account {
        id: 42,
        name: "Siti".into(),
        email: "siti@example.com".into(),
        password_hash: String::new(),
        role: role.into(),
        created_at: Utc::now(),
    }
}

fn headers_with(name: header::HeaderName, value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(name, HeaderValue::from_str(value).expect("header value"));
    headers
}

#[test]
fn issued_token_resolves_to_the_account() {
    let token = issue_session_token(&config(), &account("customer")).expect("token");
    let user = verify_session_token(SECRET, &token).expect("valid session");
    assert_eq!(user.account_id, 42);
    assert_eq!(user.name, "Siti");
    assert_eq!(user.email, "siti@example.com");
    assert_eq!(user.role, "customer");
}

#[test]
fn token_signed_with_another_secret_is_rejected() {
    let token = issue_session_token(&config(), &account("customer")).expect("token");
    let err = verify_session_token("other-secret", &token).unwrap_err();
    assert!(matches!(err, SessionError::Invalid(_)));
}

#[test]
fn garbage_token_is_rejected() {
    let err = verify_session_token(SECRET, "not-a-jwt").unwrap_err();
    assert!(matches!(err, SessionError::Invalid(_)));
}

#[test]
fn expired_token_is_rejected() {
    let claims = Claims {
        sub: "42".into(),
        name: "Siti".into(),
        email: "siti@example.com".into(),
        role: "customer".into(),
        exp: (Utc::now().timestamp() - 3600) as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("encode");
    let err = verify_session_token(SECRET, &token).unwrap_err();
    assert!(matches!(err, SessionError::Expired));
}

#[test]
fn every_session_failure_collapses_to_unauthorized() {
    for err in [
        SessionError::Missing,
        SessionError::Expired,
        SessionError::Invalid("bad signature".into()),
    ] {
        let app_err = AppError::from(err);
        assert!(matches!(app_err, AppError::Unauthorized));
        assert_eq!(app_err.status_code(), StatusCode::UNAUTHORIZED);
    }
}

#[test]
fn token_is_read_from_cookie_then_bearer_header() {
    let cookie = headers_with(header::COOKIE, "theme=dark; token=abc.def.ghi; lang=id");
    assert_eq!(cookie_value(&cookie, "token"), Some("abc.def.ghi"));
    assert_eq!(cookie_value(&cookie, "lang"), Some("id"));
    assert_eq!(session_token(&cookie), Some("abc.def.ghi"));

    let bearer = headers_with(header::AUTHORIZATION, "Bearer xyz");
    assert_eq!(session_token(&bearer), Some("xyz"));

    let cleared = headers_with(header::COOKIE, "token=");
    assert_eq!(session_token(&cleared), None);
}

#[test]
fn missing_token_resolves_to_missing() {
    let err = resolve_session(SECRET, &HeaderMap::new()).unwrap_err();
    assert!(matches!(err, SessionError::Missing));
}

#[test]
fn session_cookie_attributes() {
    assert_eq!(
        session_cookie("abc", 86_400, false),
        "token=abc; HttpOnly; Path=/; SameSite=Lax; Max-Age=86400"
    );
    assert!(session_cookie("abc", 86_400, true).ends_with("; Secure"));
    assert_eq!(
        cleared_session_cookie(),
        "token=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0"
    );
}

#[test]
fn only_admins_pass_the_admin_guard() {
    let admin = AuthUser {
        account_id: 1,
        name: "Admin".into(),
        email: "admin@example.com".into(),
        role: "admin".into(),
    };
    let customer = AuthUser {
        role: "customer".into(),
        ..admin.clone()
    };
    assert!(ensure_admin(&admin).is_ok());
    assert!(matches!(ensure_admin(&customer), Err(AppError::Forbidden)));
}

#[test]
fn error_status_mapping() {
    assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        AppError::BadRequest("x".into()).status_code(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        AppError::InvalidCredentials.status_code(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        AppError::Conflict("x".into()).status_code(),
        StatusCode::CONFLICT
    );
    assert_eq!(
        AppError::Internal(anyhow::anyhow!("boom")).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
