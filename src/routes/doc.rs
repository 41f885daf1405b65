use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, SessionUser, SignupRequest, SignupResponse},
        cart::{
            AddToCartRequest, CartLine, CartSummary, CheckoutLink, QuantityUpdate,
            RemoveFromCartRequest, UpdateCartItemRequest,
        },
        products::{AdminProductList, CatalogList, CreatedProduct, ProductFormSchema},
    },
    middleware::auth::SESSION_COOKIE,
    models::{AccountProfile, AdminProduct, CartItem, CatalogEntry, ProductView},
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, health, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "cookie_auth",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
        );
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness,
        auth::signup,
        auth::login,
        auth::logout,
        auth::me,
        products::list_products,
        products::get_product,
        cart::cart_list,
        cart::add_to_cart,
        cart::remove_from_cart,
        cart::update_cart_item,
        cart::remove_cart_item,
        cart::checkout,
        admin::list_products,
        admin::get_product,
        admin::create_product,
        admin::update_product,
        admin::delete_product
    ),
    components(
        schemas(
            AccountProfile,
            CatalogEntry,
            ProductView,
            AdminProduct,
            CartItem,
            SignupRequest,
            SignupResponse,
            LoginRequest,
            SessionUser,
            AddToCartRequest,
            RemoveFromCartRequest,
            UpdateCartItemRequest,
            CartLine,
            CartSummary,
            QuantityUpdate,
            CheckoutLink,
            CatalogList,
            AdminProductList,
            CreatedProduct,
            ProductFormSchema,
            Meta,
            ApiResponse<CartSummary>,
            ApiResponse<CatalogList>,
            ApiResponse<AdminProductList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Signup, login and session endpoints"),
        (name = "Products", description = "Public catalog endpoints"),
        (name = "Cart", description = "Cart and checkout endpoints"),
        (name = "Admin", description = "Product administration endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
