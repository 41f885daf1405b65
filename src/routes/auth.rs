use axum::{
    Json, Router,
    extract::State,
    http::{HeaderName, StatusCode, header},
    routing::{get, post},
};

use crate::{
    dto::auth::{LoginRequest, SessionUser, SignupRequest, SignupResponse},
    error::AppResult,
    extract::AppJson,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::auth_service::{self, cleared_session_cookie, session_cookie},
    state::AppState,
};

type WithCookie<T> = ([(HeaderName, String); 1], Json<ApiResponse<T>>);

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<SignupResponse>),
        (status = 400, description = "Missing name, email or password"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Auth"
)]
pub async fn signup(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SignupResponse>>)> {
    let resp = auth_service::signup(&state.pool, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; session cookie set", body = ApiResponse<SessionUser>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<WithCookie<SessionUser>> {
    let (token, resp) = auth_service::login(&state.pool, &state.config, payload).await?;
    let cookie = session_cookie(
        &token,
        state.config.session_ttl_secs(),
        state.config.cookie_secure,
    );
    Ok(([(header::SET_COOKIE, cookie)], Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = ApiResponse<serde_json::Value>)
    ),
    tag = "Auth"
)]
pub async fn logout() -> WithCookie<serde_json::Value> {
    (
        [(header::SET_COOKIE, cleared_session_cookie())],
        Json(ApiResponse::ack("Logged out successfully")),
    )
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current session user", body = ApiResponse<SessionUser>),
        (status = 401, description = "Not authenticated")
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(user: AuthUser) -> Json<ApiResponse<SessionUser>> {
    Json(auth_service::current_user(&user))
}
