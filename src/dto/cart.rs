use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::ProductView;

/// Upper bound for `jumlah` on a single cart line, accumulated adds included.
pub const MAX_LINE_QUANTITY: i32 = 999;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    #[serde(rename = "produk_id", default)]
    pub product_id: i64,
    #[serde(rename = "jumlah", default)]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveFromCartRequest {
    #[serde(rename = "produk_id", default)]
    pub product_id: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    #[serde(rename = "jumlah", default)]
    pub quantity: i32,
}

/// One cart row enriched with the product it points at.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartLine {
    pub id: i64,
    #[serde(rename = "akun_id")]
    pub account_id: i64,
    #[serde(rename = "produk_id")]
    pub product_id: i64,
    #[serde(rename = "jumlah")]
    pub quantity: i32,
    pub product: ProductView,
    #[serde(rename = "total_harga")]
    pub line_total: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartSummary {
    pub items: Vec<CartLine>,
    pub total_items: i64,
    #[serde(rename = "total_harga")]
    pub total_price: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuantityUpdate {
    #[serde(rename = "jumlah")]
    pub quantity: i32,
    #[serde(rename = "total_harga")]
    pub line_total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutLink {
    pub message: String,
    pub whatsapp_url: String,
    pub total_items: i64,
    #[serde(rename = "total_harga")]
    pub total_price: i64,
}
