use axum::{
    body::Body,
    extract::{FromRequest, Multipart, State},
    http::{Request, StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
};
use mukena_storefront::{
    config::AppConfig,
    dto::cart::AddToCartRequest,
    error::AppError,
    extract::AppJson,
    middleware::auth::AuthUser,
    routes::admin,
    state::AppState,
};

fn json_request(body: &'static str) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri("/api/cart")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body))?)
}

#[tokio::test]
async fn well_formed_cart_body_is_accepted() -> anyhow::Result<()> {
    let req = json_request(r#"{"produk_id": 7, "jumlah": 2}"#)?;
    let AppJson(payload) = AppJson::<AddToCartRequest>::from_request(req, &())
        .await
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    assert_eq!(payload.product_id, 7);
    assert_eq!(payload.quantity, 2);
    Ok(())
}

#[tokio::test]
async fn mistyped_cart_body_is_a_bad_request_in_the_envelope() -> anyhow::Result<()> {
    let req = json_request(r#"{"produk_id": 7, "jumlah": "2"}"#)?;
    let Err(err) = AppJson::<AddToCartRequest>::from_request(req, &()).await else {
        panic!("string quantity must be rejected");
    };
    assert!(matches!(err, AppError::BadRequest(_)));

    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body: serde_json::Value = serde_json::from_slice(&bytes)?;
    assert!(body["message"].as_str().unwrap_or_default().starts_with("Bad Request"));
    assert!(body["data"]["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn out_of_range_quantity_and_missing_content_type_are_bad_requests() -> anyhow::Result<()> {
    let req = json_request(r#"{"produk_id": 7, "jumlah": 99999999999}"#)?;
    let result = AppJson::<AddToCartRequest>::from_request(req, &()).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let req = Request::builder()
        .method("POST")
        .uri("/api/cart")
        .body(Body::from(r#"{"produk_id": 7, "jumlah": 2}"#))?;
    let result = AppJson::<AddToCartRequest>::from_request(req, &()).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
    Ok(())
}

// The pool is never touched: both outcomes are decided before any query.
fn offline_state() -> anyhow::Result<AppState> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy("postgres://localhost/unused")?;
    let config = AppConfig {
        database_url: "postgres://localhost/unused".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        session_ttl_hours: 1,
        cookie_secure: false,
        upload_dir: std::env::temp_dir().join("mukena-unused-uploads"),
        whatsapp_number: "6285794345930".into(),
        max_upload_bytes: 1024,
        db_max_connections: 1,
    };
    Ok(AppState::new(pool, config))
}

fn user(role: &str) -> AuthUser {
    AuthUser {
        account_id: 1,
        name: "Siti".into(),
        email: "siti@example.com".into(),
        role: role.into(),
    }
}

async fn unreadable_multipart() -> anyhow::Result<Multipart> {
    let req = Request::builder()
        .method("POST")
        .uri("/api/admin/products")
        .header(CONTENT_TYPE, "multipart/form-data; boundary=XYZ")
        .body(Body::from("this is not a multipart body"))?;
    Multipart::from_request(req, &())
        .await
        .map_err(|rejection| anyhow::anyhow!(rejection.body_text()))
}

#[tokio::test]
async fn non_admin_product_upload_is_refused_before_the_body_is_read() -> anyhow::Result<()> {
    let state = offline_state()?;

    let created =
        admin::create_product(State(state.clone()), user("customer"), unreadable_multipart().await?)
            .await;
    assert!(matches!(created, Err(AppError::Forbidden)));

    let updated = admin::update_product(
        State(state.clone()),
        user("customer"),
        axum::extract::Path(1),
        unreadable_multipart().await?,
    )
    .await;
    assert!(matches!(updated, Err(AppError::Forbidden)));

    // Admins get past the guard and hit the malformed body.
    let admin_attempt =
        admin::create_product(State(state), user("admin"), unreadable_multipart().await?).await;
    assert!(matches!(admin_attempt, Err(AppError::BadRequest(_))));
    Ok(())
}
