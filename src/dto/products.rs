use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{AdminProduct, CatalogEntry},
};

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CatalogList {
    #[schema(value_type = Vec<CatalogEntry>)]
    pub items: Vec<CatalogEntry>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct AdminProductList {
    #[schema(value_type = Vec<AdminProduct>)]
    pub items: Vec<AdminProduct>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedProduct {
    pub id: i64,
    #[serde(rename = "nama_produk")]
    pub name: String,
    #[serde(rename = "harga")]
    pub price: i64,
    #[serde(rename = "kategori")]
    pub category: String,
    #[serde(rename = "foto")]
    pub photo: String,
}

/// The four image positions a product form can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Main,
    Extra1,
    Extra2,
    Extra3,
}

impl ImageSlot {
    pub const ALL: [ImageSlot; 4] = [
        ImageSlot::Main,
        ImageSlot::Extra1,
        ImageSlot::Extra2,
        ImageSlot::Extra3,
    ];

    pub fn index(self) -> usize {
        match self {
            ImageSlot::Main => 0,
            ImageSlot::Extra1 => 1,
            ImageSlot::Extra2 => 2,
            ImageSlot::Extra3 => 3,
        }
    }

    pub fn field_name(self) -> &'static str {
        match self {
            ImageSlot::Main => "foto",
            ImageSlot::Extra1 => "foto_tambahan_1",
            ImageSlot::Extra2 => "foto_tambahan_2",
            ImageSlot::Extra3 => "foto_tambahan_3",
        }
    }

    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.field_name() == name)
    }

    /// Text field used to carry the stored path forward unchanged on update.
    pub fn from_existing_field_name(name: &str) -> Option<Self> {
        name.strip_prefix("existing_").and_then(Self::from_field_name)
    }
}

#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A parsed multipart product submission, shared by create and update.
#[derive(Debug, Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub price: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub images: [Option<UploadedImage>; 4],
    pub existing: [Option<String>; 4],
}

impl ProductForm {
    pub fn set_text(&mut self, field: &str, value: String) {
        match field {
            "nama_produk" => self.name = Some(value),
            "harga" => self.price = Some(value),
            "kategori" => self.category = Some(value),
            "deskripsi_produk" => self.description = Some(value),
            other => match ImageSlot::from_existing_field_name(other) {
                Some(slot) if !value.trim().is_empty() => self.existing[slot.index()] = Some(value),
                Some(_) => {}
                None => tracing::debug!(field = %other, "ignoring unknown form field"),
            },
        }
    }

    pub fn set_image(&mut self, slot: ImageSlot, image: UploadedImage) {
        self.images[slot.index()] = Some(image);
    }

    pub fn image(&self, slot: ImageSlot) -> Option<&UploadedImage> {
        self.images[slot.index()].as_ref()
    }

    pub fn existing(&self, slot: ImageSlot) -> Option<&str> {
        self.existing[slot.index()].as_deref()
    }

    /// `harga` must be a positive whole number when present.
    pub fn parsed_price(&self) -> AppResult<Option<i64>> {
        match self.price.as_deref() {
            None => Ok(None),
            Some(raw) => parse_price(raw).map(Some),
        }
    }
}

/// Highest accepted `harga`, in rupiah.
pub const MAX_PRODUCT_PRICE: i64 = 1_000_000_000;

pub fn parse_price(raw: &str) -> AppResult<i64> {
    match raw.trim().parse::<i64>() {
        Ok(price) if (1..=MAX_PRODUCT_PRICE).contains(&price) => Ok(price),
        _ => Err(AppError::BadRequest("invalid product price".to_string())),
    }
}

/// Documentation shape of the multipart product form.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductFormSchema {
    pub nama_produk: Option<String>,
    pub harga: Option<String>,
    pub kategori: Option<String>,
    pub deskripsi_produk: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub foto: Option<Vec<u8>>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub foto_tambahan_1: Option<Vec<u8>>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub foto_tambahan_2: Option<Vec<u8>>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub foto_tambahan_3: Option<Vec<u8>>,
    pub existing_foto: Option<String>,
    pub existing_foto_tambahan_1: Option<String>,
    pub existing_foto_tambahan_2: Option<String>,
    pub existing_foto_tambahan_3: Option<String>,
}
