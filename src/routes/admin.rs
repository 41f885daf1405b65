use axum::{
    Json, Router,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::products::{
        AdminProductList, CreatedProduct, ImageSlot, ProductForm, ProductFormSchema,
        UploadedImage,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::AdminProduct,
    response::ApiResponse,
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

fn bad_multipart(err: MultipartError) -> AppError {
    AppError::BadRequest(format!("invalid form data: {err}"))
}

/// Collect text fields and image parts. Callers check the role first so that
/// non-admin uploads are never buffered. Empty file parts (no file chosen in the
/// browser) are skipped.
pub async fn read_product_form(mut multipart: Multipart) -> AppResult<ProductForm> {
    let mut form = ProductForm::default();
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if let Some(slot) = ImageSlot::from_field_name(&name) {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await.map_err(bad_multipart)?;
            if let Some(file_name) = file_name.filter(|_| !bytes.is_empty()) {
                form.set_image(
                    slot,
                    UploadedImage {
                        file_name,
                        bytes: bytes.to_vec(),
                    },
                );
            }
            continue;
        }

        let value = field.text().await.map_err(bad_multipart)?;
        form.set_text(&name, value);
    }
    Ok(form)
}

#[utoipa::path(
    get,
    path = "/api/admin/products",
    responses(
        (status = 200, description = "Products merged with details", body = ApiResponse<AdminProductList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AdminProductList>>> {
    let resp = admin_service::list_products(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/products/{id}",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product merged with details", body = ApiResponse<AdminProduct>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<AdminProduct>>> {
    let resp = admin_service::get_product(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body(content = ProductFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Product created", body = ApiResponse<CreatedProduct>),
        (status = 400, description = "Invalid name or price"),
        (status = 403, description = "Forbidden"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<CreatedProduct>>)> {
    ensure_admin(&user)?;
    let form = read_product_form(multipart).await?;
    let resp = admin_service::create_product(&state, &user, form).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    request_body(content = ProductFormSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<AdminProduct>),
        (status = 400, description = "Invalid name or price"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<AdminProduct>>> {
    ensure_admin(&user)?;
    let form = read_product_form(multipart).await?;
    let resp = admin_service::update_product(&state, &user, id, form).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product, details, cart lines and images removed", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = admin_service::delete_product(&state, &user, id).await?;
    Ok(Json(resp))
}
