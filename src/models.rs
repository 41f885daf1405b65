use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A stored account row. Never serialized: it carries the password hash.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<&Account> for AccountProfile {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
        }
    }
}

/// Catalog card as shown on the listing page.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CatalogEntry {
    pub id: i64,
    #[serde(rename = "nama_produk")]
    pub name: String,
    #[serde(rename = "harga")]
    pub price: i64,
    #[serde(rename = "foto")]
    pub photo: Option<String>,
}

/// Product joined with its detail row, image paths already public.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ProductView {
    pub id: i64,
    #[serde(rename = "nama_produk")]
    pub name: String,
    #[serde(rename = "harga")]
    pub price: i64,
    #[serde(rename = "kategori")]
    pub category: String,
    #[serde(rename = "foto")]
    pub photo: Option<String>,
    #[serde(rename = "deskripsi_produk")]
    pub description: Option<String>,
    #[serde(rename = "foto_tambahan_1")]
    pub extra_photo_1: Option<String>,
    #[serde(rename = "foto_tambahan_2")]
    pub extra_photo_2: Option<String>,
    #[serde(rename = "foto_tambahan_3")]
    pub extra_photo_3: Option<String>,
}

/// Admin view of a product: catalog and detail merged, missing detail fields empty.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminProduct {
    pub id: i64,
    #[serde(rename = "nama_produk")]
    pub name: String,
    #[serde(rename = "harga")]
    pub price: i64,
    #[serde(rename = "kategori")]
    pub category: String,
    #[serde(rename = "foto")]
    pub photo: String,
    #[serde(rename = "deskripsi_produk")]
    pub description: String,
    #[serde(rename = "foto_tambahan_1")]
    pub extra_photo_1: String,
    #[serde(rename = "foto_tambahan_2")]
    pub extra_photo_2: String,
    #[serde(rename = "foto_tambahan_3")]
    pub extra_photo_3: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CartItem {
    pub id: i64,
    #[serde(rename = "akun_id")]
    pub account_id: i64,
    #[serde(rename = "produk_id")]
    pub product_id: i64,
    #[serde(rename = "jumlah")]
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}
