pub mod product_details;
pub mod products;

pub use product_details::Entity as ProductDetails;
pub use products::Entity as Products;
