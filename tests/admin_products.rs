use mukena_storefront::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::{
        cart::AddToCartRequest,
        products::{ImageSlot, ProductForm, UploadedImage},
    },
    error::AppError,
    middleware::auth::AuthUser,
    services::{admin_service, cart_service, catalog_service},
    state::AppState,
    uploads::disk_path,
};

// Admin lifecycle: create with images, pass-through update, delete cleaning up rows, cart lines and files.
#[tokio::test]
async fn admin_product_lifecycle() -> anyhow::Result<()> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run admin product tests."
            );
            return Ok(());
        }
    };
    let uploads = tempfile::tempdir()?;
    let state = setup_state(&database_url, uploads.path().to_path_buf()).await?;

    let admin = account(&state, "Admin", "admin@example.com", "admin").await?;
    let customer = account(&state, "Siti", "siti@example.com", "customer").await?;

    // Non-admins are turned away.
    let forbidden = admin_service::list_products(&state, &customer).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    // Bad price is rejected before anything is written.
    let mut bad = form("Mukena Silk", "-1");
    bad.set_image(ImageSlot::Main, image("depan.jpg"));
    let rejected = admin_service::create_product(&state, &admin, bad).await;
    assert!(matches!(rejected, Err(AppError::BadRequest(_))));
    assert!(std::fs::read_dir(uploads.path())?.next().is_none());

    // Create with a main and one extra image.
    let mut create = form("Mukena Silk", "275000");
    create.set_text("deskripsi_produk", "Silk lembut".into());
    create.set_image(ImageSlot::Main, image("foto depan.jpg"));
    create.set_image(ImageSlot::Extra1, image("detail.jpg"));
    let created = admin_service::create_product(&state, &admin, create)
        .await?
        .data
        .expect("created product");
    assert_eq!(created.price, 275_000);
    assert!(created.photo.ends_with("-foto_depan.jpg"));
    let main_file = disk_path(uploads.path(), &created.photo).expect("main photo on disk");
    assert!(main_file.exists());

    let stored = admin_service::get_product(&state, &admin, created.id)
        .await?
        .data
        .expect("admin product");
    assert_eq!(stored.description, "Silk lembut");
    assert!(stored.extra_photo_1.ends_with("-detail.jpg"));
    assert_eq!(stored.extra_photo_2, "");

    // Update without new files: images carry forward, text changes apply.
    let mut update = ProductForm::default();
    update.set_text("harga", "300000".into());
    update.set_text("existing_foto", created.photo.clone());
    let updated = admin_service::update_product(&state, &admin, created.id, update)
        .await?
        .data
        .expect("updated product");
    assert_eq!(updated.price, 300_000);
    assert_eq!(updated.name, "Mukena Silk");
    assert_eq!(updated.photo, created.photo);
    assert_eq!(updated.extra_photo_1, stored.extra_photo_1);
    assert_eq!(updated.description, "Silk lembut");

    // Public detail shows the same paths.
    let public = catalog_service::get_product(&state.pool, created.id)
        .await?
        .data
        .expect("public product");
    assert_eq!(public.photo.as_deref(), Some(created.photo.as_str()));

    // Two parts with the same client file name land in separate files.
    let mut twin = form("Mukena Travel", "150000");
    twin.set_image(ImageSlot::Main, image("foto.jpg"));
    twin.set_image(ImageSlot::Extra1, image("foto.jpg"));
    let twin = admin_service::create_product(&state, &admin, twin)
        .await?
        .data
        .expect("twin product");
    let twin = admin_service::get_product(&state, &admin, twin.id)
        .await?
        .data
        .expect("twin detail");
    assert_ne!(twin.photo, twin.extra_photo_1);

    // A product borrowing another product's image does not take it along on delete.
    let mut borrow = ProductForm::default();
    borrow.set_text("existing_foto", created.photo.clone());
    admin_service::update_product(&state, &admin, twin.id, borrow).await?;
    let twin_extra = disk_path(uploads.path(), &twin.extra_photo_1).expect("extra on disk");
    admin_service::delete_product(&state, &admin, twin.id).await?;
    assert!(main_file.exists());
    assert!(!twin_extra.exists());

    // Delete cascades to cart lines and removes files.
    cart_service::add_to_cart(
        &state.pool,
        &customer,
        AddToCartRequest {
            product_id: created.id,
            quantity: 1,
        },
    )
    .await?;
    admin_service::delete_product(&state, &admin, created.id).await?;
    assert!(!main_file.exists());
    let cart = cart_service::load_cart(&state.pool, customer.account_id).await?;
    assert!(cart.items.is_empty());
    let gone = catalog_service::get_product(&state.pool, created.id).await;
    assert!(matches!(gone, Err(AppError::NotFound)));
    let again = admin_service::delete_product(&state, &admin, created.id).await;
    assert!(matches!(again, Err(AppError::NotFound)));

    state.pool.close().await;
    Ok(())
}

fn form(name: &str, price: &str) -> ProductForm {
    let mut form = ProductForm::default();
    form.set_text("nama_produk", name.into());
    form.set_text("harga", price.into());
    form.set_text("kategori", "Silk".into());
    form
}

fn image(file_name: &str) -> UploadedImage {
    UploadedImage {
        file_name: file_name.into(),
        bytes: b"jpeg-bytes".to_vec(),
    }
}

async fn setup_state(
    database_url: &str,
    upload_dir: std::path::PathBuf,
) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url, 2).await?;
    run_migrations(&pool).await?;
    // Clean tables between runs
    sqlx::query(
        "TRUNCATE TABLE cart_items, product_details, products, accounts RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        session_ttl_hours: 1,
        cookie_secure: false,
        upload_dir,
        whatsapp_number: "6285794345930".into(),
        max_upload_bytes: 1024 * 1024,
        db_max_connections: 2,
    };
    Ok(AppState::new(pool, config))
}

async fn account(
    state: &AppState,
    name: &str,
    email: &str,
    role: &str,
) -> anyhow::Result<AuthUser> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO accounts (name, email, password_hash, role) VALUES ($1, $2, 'x', $3) RETURNING id",
    )
    .bind(name)
    .bind(email)
    .bind(role)
    .fetch_one(&state.pool)
    .await?;
    Ok(AuthUser {
        account_id: id,
        name: name.into(),
        email: email.into(),
        role: role.into(),
    })
}
