use crate::{
    db::DbPool,
    dto::products::CatalogList,
    error::{AppError, AppResult},
    models::{CatalogEntry, ProductView},
    response::{ApiResponse, Meta},
    uploads::public_path_opt,
};

/// Newest first, as the storefront listing shows them.
pub async fn list_catalog(pool: &DbPool) -> AppResult<ApiResponse<CatalogList>> {
    let items: Vec<CatalogEntry> = sqlx::query_as::<_, CatalogEntry>(
        "SELECT id, name, price, NULLIF(photo, '') AS photo FROM products ORDER BY id DESC",
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|entry| CatalogEntry {
        photo: public_path_opt(entry.photo.as_deref()),
        ..entry
    })
    .collect();

    let meta = Meta::count(items.len());
    Ok(ApiResponse::success("Products", CatalogList { items }, Some(meta)))
}

pub async fn get_product(pool: &DbPool, id: i64) -> AppResult<ApiResponse<ProductView>> {
    let product = sqlx::query_as::<_, ProductView>(
        r#"
        SELECT p.id, p.name, p.price, p.category, p.photo,
               d.description, d.extra_photo_1, d.extra_photo_2, d.extra_photo_3
        FROM products p
        LEFT JOIN product_details d ON d.product_id = p.id
        WHERE p.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    Ok(ApiResponse::success(
        "Product",
        with_public_paths(product),
        None,
    ))
}

fn with_public_paths(product: ProductView) -> ProductView {
    ProductView {
        photo: public_path_opt(product.photo.as_deref()),
        extra_photo_1: public_path_opt(product.extra_photo_1.as_deref()),
        extra_photo_2: public_path_opt(product.extra_photo_2.as_deref()),
        extra_photo_3: public_path_opt(product.extra_photo_3.as_deref()),
        ..product
    }
}
