use mukena_storefront::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
    services::auth_service::hash_password,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, 2).await?;
    // Ensure migrations are applied.
    run_migrations(&pool).await?;

    let admin_id = ensure_account(&pool, "Admin", "admin@example.com", "admin123", "admin").await?;
    let customer_id =
        ensure_account(&pool, "Customer", "customer@example.com", "customer123", "customer").await?;
    seed_products(&pool).await?;

    pool.close().await;
    println!("Seed completed. Admin ID: {admin_id}, Customer ID: {customer_id}");
    Ok(())
}

async fn ensure_account(
    pool: &DbPool,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<i64> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO accounts (name, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured account {email} (role={role})");
    Ok(id)
}

async fn seed_products(pool: &DbPool) -> anyhow::Result<()> {
    let products = [
        ("Mukena Katun Jepang", 185000_i64, "Katun", "Mukena katun Jepang yang adem dan ringan, cocok untuk dipakai sehari-hari."),
        ("Mukena Silk Premium", 275000, "Silk", "Bahan silk lembut dengan jatuh yang anggun dan bordir halus di tepi."),
        ("Mukena Travel Parasut", 150000, "Travel", "Ringkas dilipat ke dalam pouch, ideal untuk bepergian."),
        ("Mukena Anak Rayon", 95000, "Anak", "Ukuran anak dengan motif ceria dan bahan rayon yang nyaman."),
    ];

    let mut tx = pool.begin().await?;
    for (name, price, category, description) in products {
        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM products WHERE name = $1")
            .bind(name)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_some() {
            continue;
        }

        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO products (name, price, category) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(name)
        .bind(price)
        .bind(category)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO product_details (product_id, description) VALUES ($1, $2)")
            .bind(id)
            .bind(description)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    println!("Seeded products");
    Ok(())
}
