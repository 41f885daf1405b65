//! Cart aggregation: every mutation runs in its own transaction on one pooled
//! connection. There is no version column, so two concurrent quantity updates to
//! the same line resolve as last-write-wins.

use sqlx::FromRow;

use crate::{
    db::DbPool,
    dto::cart::{
        AddToCartRequest, CartLine, CartSummary, MAX_LINE_QUANTITY, QuantityUpdate,
        RemoveFromCartRequest, UpdateCartItemRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CartItem, ProductView},
    response::{ApiResponse, Meta},
    uploads::{public_path, public_path_opt},
};

#[derive(FromRow)]
struct CartWithProductRow {
    id: i64,
    account_id: i64,
    product_id: i64,
    quantity: i32,
    name: String,
    price: i64,
    category: String,
    photo: String,
    description: Option<String>,
    extra_photo_1: Option<String>,
    extra_photo_2: Option<String>,
    extra_photo_3: Option<String>,
}

impl TryFrom<CartWithProductRow> for CartLine {
    type Error = AppError;

    fn try_from(row: CartWithProductRow) -> AppResult<Self> {
        Ok(CartLine {
            id: row.id,
            account_id: row.account_id,
            product_id: row.product_id,
            quantity: row.quantity,
            line_total: line_total(row.quantity, row.price)?,
            product: ProductView {
                id: row.product_id,
                name: row.name,
                price: row.price,
                category: row.category,
                photo: public_path(&row.photo),
                description: row.description,
                extra_photo_1: public_path_opt(row.extra_photo_1.as_deref()),
                extra_photo_2: public_path_opt(row.extra_photo_2.as_deref()),
                extra_photo_3: public_path_opt(row.extra_photo_3.as_deref()),
            },
        })
    }
}

fn total_out_of_range() -> AppError {
    AppError::BadRequest("cart total out of range".to_string())
}

pub fn line_total(quantity: i32, price: i64) -> AppResult<i64> {
    price
        .checked_mul(i64::from(quantity))
        .ok_or_else(total_out_of_range)
}

/// Fold lines into the cart view. Totals are always derived from the lines given,
/// never stored.
pub fn summarize(items: Vec<CartLine>) -> AppResult<CartSummary> {
    let mut total_items: i64 = 0;
    let mut total_price: i64 = 0;
    for item in &items {
        total_items = total_items
            .checked_add(i64::from(item.quantity))
            .ok_or_else(total_out_of_range)?;
        total_price = total_price
            .checked_add(item.line_total)
            .ok_or_else(total_out_of_range)?;
    }
    Ok(CartSummary {
        items,
        total_items,
        total_price,
    })
}

/// Current cart for one account, lines in insertion order.
pub async fn load_cart(pool: &DbPool, account_id: i64) -> AppResult<CartSummary> {
    let rows = sqlx::query_as::<_, CartWithProductRow>(
        r#"
        SELECT ci.id, ci.account_id, ci.product_id, ci.quantity,
               p.name, p.price, p.category, p.photo,
               d.description, d.extra_photo_1, d.extra_photo_2, d.extra_photo_3
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        LEFT JOIN product_details d ON d.product_id = p.id
        WHERE ci.account_id = $1
        ORDER BY ci.id
        "#,
    )
    .bind(account_id)
    .fetch_all(pool)
    .await?;

    let lines = rows
        .into_iter()
        .map(CartLine::try_from)
        .collect::<AppResult<Vec<_>>>()?;
    summarize(lines)
}

pub async fn list_cart(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<CartSummary>> {
    let summary = load_cart(pool, user.account_id).await?;
    tracing::debug!(
        account_id = user.account_id,
        lines = summary.items.len(),
        "cart loaded"
    );
    let meta = Meta::count(summary.items.len());
    Ok(ApiResponse::success("OK", summary, Some(meta)))
}

/// Add `quantity` of a product; a repeat add accumulates onto the existing line
/// as long as the sum stays within `MAX_LINE_QUANTITY`.
pub async fn add_to_cart(
    pool: &DbPool,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if payload.product_id <= 0 || !(1..=MAX_LINE_QUANTITY).contains(&payload.quantity) {
        return Err(AppError::BadRequest("Invalid product data".to_string()));
    }

    let mut tx = pool.begin().await?;

    let product_exist: Option<(i64,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(payload.product_id)
        .fetch_optional(&mut *tx)
        .await?;
    if product_exist.is_none() {
        return Err(AppError::NotFound);
    }

    let upserted = sqlx::query_as::<_, CartItem>(
        r#"
        INSERT INTO cart_items (account_id, product_id, quantity)
        VALUES ($1, $2, $3)
        ON CONFLICT (account_id, product_id)
        DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
        WHERE cart_items.quantity::BIGINT + EXCLUDED.quantity <= $4
        RETURNING id, account_id, product_id, quantity, created_at
        "#,
    )
    .bind(user.account_id)
    .bind(payload.product_id)
    .bind(payload.quantity)
    .bind(i64::from(MAX_LINE_QUANTITY))
    .fetch_optional(&mut *tx)
    .await?;

    // No row back means the conflict branch was filtered out by the cap.
    let Some(cart_item) = upserted else {
        return Err(AppError::BadRequest(format!(
            "Quantity per product cannot exceed {MAX_LINE_QUANTITY}"
        )));
    };

    tx.commit().await?;

    tracing::info!(
        account_id = user.account_id,
        product_id = payload.product_id,
        quantity = cart_item.quantity,
        "cart line upserted"
    );
    Ok(ApiResponse::success(
        "Item added to cart successfully",
        cart_item,
        None,
    ))
}

/// Set the quantity of one of the caller's lines. Lines owned by someone else
/// are reported exactly like missing ones.
pub async fn update_cart_item(
    pool: &DbPool,
    user: &AuthUser,
    item_id: i64,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<QuantityUpdate>> {
    if !(1..=MAX_LINE_QUANTITY).contains(&payload.quantity) {
        return Err(AppError::BadRequest("Invalid quantity".to_string()));
    }

    let mut tx = pool.begin().await?;

    let owned: Option<(i64,)> = sqlx::query_as(
        r#"
        SELECT p.price
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.id = $1 AND ci.account_id = $2
        "#,
    )
    .bind(item_id)
    .bind(user.account_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((price,)) = owned else {
        return Err(AppError::NotFound);
    };
    let new_total = line_total(payload.quantity, price)?;

    sqlx::query("UPDATE cart_items SET quantity = $1 WHERE id = $2 AND account_id = $3")
        .bind(payload.quantity)
        .bind(item_id)
        .bind(user.account_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        account_id = user.account_id,
        cart_item_id = item_id,
        quantity = payload.quantity,
        "cart line quantity set"
    );
    Ok(ApiResponse::success(
        "Quantity updated successfully",
        QuantityUpdate {
            quantity: payload.quantity,
            line_total: new_total,
        },
        Some(Meta::empty()),
    ))
}

pub async fn remove_product_from_cart(
    pool: &DbPool,
    user: &AuthUser,
    payload: RemoveFromCartRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if payload.product_id <= 0 {
        return Err(AppError::BadRequest("Invalid product ID".to_string()));
    }

    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM cart_items WHERE account_id = $1 AND product_id = $2")
        .bind(user.account_id)
        .bind(payload.product_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    tx.commit().await?;

    tracing::info!(
        account_id = user.account_id,
        product_id = payload.product_id,
        "cart line removed"
    );
    Ok(ApiResponse::ack("Item removed from cart successfully"))
}

pub async fn remove_cart_item(
    pool: &DbPool,
    user: &AuthUser,
    item_id: i64,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND account_id = $2")
        .bind(item_id)
        .bind(user.account_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    tx.commit().await?;

    tracing::info!(
        account_id = user.account_id,
        cart_item_id = item_id,
        "cart line removed"
    );
    Ok(ApiResponse::ack("Item removed from cart successfully"))
}
