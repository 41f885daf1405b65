use std::{collections::HashSet, path::Path};

use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, DbErr, EntityTrait, QueryOrder, Set, TransactionTrait,
};

use crate::{
    db::{DbPool, OrmConn},
    dto::products::{AdminProductList, CreatedProduct, ImageSlot, ProductForm},
    entity::{
        product_details::{ActiveModel as DetailActive, Model as DetailModel},
        products::{ActiveModel as ProductActive, Column as ProdCol, Model as ProductModel},
        ProductDetails, Products,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::AdminProduct,
    response::{ApiResponse, Meta},
    state::AppState,
    uploads,
};

type StoredImages = [Option<String>; 4];

pub async fn list_products(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AdminProductList>> {
    ensure_admin(user)?;
    let items: Vec<AdminProduct> = Products::find()
        .find_also_related(ProductDetails)
        .order_by_asc(ProdCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(product, detail)| admin_product(product, detail))
        .collect();

    let meta = Meta::count(items.len());
    Ok(ApiResponse::success(
        "Products",
        AdminProductList { items },
        Some(meta),
    ))
}

pub async fn get_product(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<AdminProduct>> {
    ensure_admin(user)?;
    let (product, detail) = find_with_detail(&state.orm, id).await?;
    Ok(ApiResponse::success(
        "Product",
        admin_product(product, detail),
        Some(Meta::empty()),
    ))
}

/// Catalog row and detail row are written in one transaction; images written
/// for a failed insert are removed again.
pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    form: ProductForm,
) -> AppResult<ApiResponse<CreatedProduct>> {
    ensure_admin(user)?;

    let name = required_name(form.name.as_deref())?;
    let price = form
        .parsed_price()?
        .ok_or_else(|| AppError::BadRequest("invalid product price".to_string()))?;
    let category = form.category.as_deref().unwrap_or_default().trim().to_string();
    let description = form.description.clone().unwrap_or_default();

    let upload_dir = state.config.upload_dir.as_path();
    let saved = store_images(upload_dir, &form).await?;
    let [photo, extra_1, extra_2, extra_3] = saved.clone().map(Option::unwrap_or_default);

    let inserted = async {
        let txn = state.orm.begin().await?;
        let product = ProductActive {
            id: NotSet,
            name: Set(name),
            price: Set(price),
            category: Set(category),
            photo: Set(photo),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;

        DetailActive {
            product_id: Set(product.id),
            description: Set(description),
            extra_photo_1: Set(extra_1),
            extra_photo_2: Set(extra_2),
            extra_photo_3: Set(extra_3),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok::<_, DbErr>(product)
    }
    .await;

    let product = match inserted {
        Ok(p) => p,
        Err(err) => {
            discard_images(upload_dir, &saved).await;
            return Err(err.into());
        }
    };

    tracing::info!(
        account_id = user.account_id,
        product_id = product.id,
        "product created"
    );
    Ok(ApiResponse::success(
        "Product created",
        CreatedProduct {
            id: product.id,
            name: product.name,
            price: product.price,
            category: product.category,
            photo: product.photo,
        },
        Some(Meta::empty()),
    ))
}

/// Omitted text fields keep their stored value. Each image resolves as a new
/// upload, then the `existing_*` field, then the stored path.
pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: i64,
    form: ProductForm,
) -> AppResult<ApiResponse<AdminProduct>> {
    ensure_admin(user)?;

    let price = form.parsed_price()?;
    let name = match form.name.as_deref() {
        Some(raw) => Some(required_name(Some(raw))?),
        None => None,
    };

    let (product, detail) = find_with_detail(&state.orm, id).await?;

    let upload_dir = state.config.upload_dir.as_path();
    let saved = store_images(upload_dir, &form).await?;

    let current = [
        Some(product.photo.as_str()),
        detail.as_ref().map(|d| d.extra_photo_1.as_str()),
        detail.as_ref().map(|d| d.extra_photo_2.as_str()),
        detail.as_ref().map(|d| d.extra_photo_3.as_str()),
    ];
    let [photo, extra_1, extra_2, extra_3] = ImageSlot::ALL.map(|slot| {
        saved[slot.index()]
            .clone()
            .or_else(|| form.existing(slot).map(str::to_string))
            .or_else(|| current[slot.index()].map(str::to_string))
            .unwrap_or_default()
    });

    let description = form
        .description
        .clone()
        .or_else(|| detail.as_ref().map(|d| d.description.clone()))
        .unwrap_or_default();

    let updated = async {
        let txn = state.orm.begin().await?;

        let mut active: ProductActive = product.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(price) = price {
            active.price = Set(price);
        }
        if let Some(category) = form.category.as_deref() {
            active.category = Set(category.trim().to_string());
        }
        active.photo = Set(photo);
        let product = active.update(&txn).await?;

        let detail = match detail {
            Some(existing) => {
                let mut active: DetailActive = existing.into();
                active.description = Set(description);
                active.extra_photo_1 = Set(extra_1);
                active.extra_photo_2 = Set(extra_2);
                active.extra_photo_3 = Set(extra_3);
                active.update(&txn).await?
            }
            None => {
                DetailActive {
                    product_id: Set(product.id),
                    description: Set(description),
                    extra_photo_1: Set(extra_1),
                    extra_photo_2: Set(extra_2),
                    extra_photo_3: Set(extra_3),
                }
                .insert(&txn)
                .await?
            }
        };

        txn.commit().await?;
        Ok::<_, DbErr>((product, detail))
    }
    .await;

    let (product, detail) = match updated {
        Ok(pair) => pair,
        Err(err) => {
            discard_images(upload_dir, &saved).await;
            return Err(err.into());
        }
    };

    tracing::info!(
        account_id = user.account_id,
        product_id = product.id,
        "product updated"
    );
    Ok(ApiResponse::success(
        "Product updated",
        admin_product(product, Some(detail)),
        Some(Meta::empty()),
    ))
}

/// Removes the product, its detail row and every cart line pointing at it in one
/// transaction, then deletes its image files unless another product still
/// references them.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: i64,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let (product, detail) = find_with_detail(&state.orm, id).await?;

    let txn = state.orm.begin().await?;
    ProductDetails::delete_by_id(id).exec(&txn).await?;
    let result = Products::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    txn.commit().await?;

    let mut stored = vec![product.photo];
    if let Some(detail) = detail {
        stored.extend([detail.extra_photo_1, detail.extra_photo_2, detail.extra_photo_3]);
    }
    let files: Vec<String> = stored.iter().filter_map(|s| uploads::public_path(s)).collect();
    match referenced_images(&state.pool, &files).await {
        Ok(shared) => {
            let orphaned = files.iter().filter(|f| !shared.contains(*f)).map(String::as_str).collect::<Vec<&str>>();
            uploads::remove_images(&state.config.upload_dir, orphaned).await;
        }
        Err(err) => tracing::warn!(
            product_id = id,
            error = %err,
            "could not check image references, keeping files"
        ),
    }

    tracing::info!(account_id = user.account_id, product_id = id, "product deleted");
    Ok(ApiResponse::ack("Product deleted"))
}

async fn find_with_detail(
    orm: &OrmConn,
    id: i64,
) -> AppResult<(ProductModel, Option<DetailModel>)> {
    let found = Products::find_by_id(id)
        .find_also_related(ProductDetails)
        .one(orm)
        .await?;
    match found {
        Some(pair) => Ok(pair),
        None => Err(AppError::NotFound),
    }
}

/// Public paths among `files` that some remaining product or detail row points at.
async fn referenced_images(pool: &DbPool, files: &[String]) -> AppResult<HashSet<String>> {
    let names: Vec<&str> = files
        .iter()
        .filter_map(|f| f.strip_prefix(uploads::PUBLIC_PREFIX))
        .collect();
    if names.is_empty() {
        return Ok(HashSet::new());
    }

    let refs: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT stored_ref FROM (
            SELECT photo AS stored_ref FROM products
            UNION ALL SELECT extra_photo_1 FROM product_details
            UNION ALL SELECT extra_photo_2 FROM product_details
            UNION ALL SELECT extra_photo_3 FROM product_details
        ) refs
        WHERE regexp_replace(stored_ref, '^/?uploads/', '') = ANY($1)
        "#,
    )
    .bind(&names)
    .fetch_all(pool)
    .await?;

    Ok(refs
        .into_iter()
        .filter_map(|(stored,)| uploads::public_path(&stored))
        .collect())
}

fn required_name(raw: Option<&str>) -> AppResult<String> {
    match raw.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(AppError::BadRequest("product name is required".to_string())),
    }
}

async fn store_images(upload_dir: &Path, form: &ProductForm) -> AppResult<StoredImages> {
    let mut saved: StoredImages = Default::default();
    for slot in ImageSlot::ALL {
        let Some(image) = form.image(slot) else {
            continue;
        };
        match uploads::save_image(upload_dir, &image.file_name, &image.bytes).await {
            Ok(path) => saved[slot.index()] = Some(path),
            Err(err) => {
                discard_images(upload_dir, &saved).await;
                return Err(AppError::Internal(err));
            }
        }
    }
    Ok(saved)
}

async fn discard_images(upload_dir: &Path, saved: &StoredImages) {
    uploads::remove_images(upload_dir, saved.iter().flatten().map(String::as_str)).await;
}

fn admin_product(model: ProductModel, detail: Option<DetailModel>) -> AdminProduct {
    let normalized = |stored: &str| uploads::public_path(stored).unwrap_or_default();
    let detail = detail.unwrap_or(DetailModel {
        product_id: model.id,
        description: String::new(),
        extra_photo_1: String::new(),
        extra_photo_2: String::new(),
        extra_photo_3: String::new(),
    });
    AdminProduct {
        id: model.id,
        name: model.name,
        price: model.price,
        category: model.category,
        photo: normalized(&model.photo),
        description: detail.description,
        extra_photo_1: normalized(&detail.extra_photo_1),
        extra_photo_2: normalized(&detail.extra_photo_2),
        extra_photo_3: normalized(&detail.extra_photo_3),
    }
}
