//! Demo data seeding command.
//!
//! Inserts a small catalog, two users (one admin), and a couple of promo
//! codes so a fresh database is immediately browsable. Idempotent: re-running
//! skips rows that already exist via `ON CONFLICT DO NOTHING`.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::CommandError;

/// Seed the database with demo data.
///
/// # Errors
///
/// Returns an error if any insert fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = super::database_url()?;
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Seeding categories...");
    let categories = [
        ("Jackets", "jackets", "Shells, parkas, and insulation"),
        ("Footwear", "footwear", "Trail runners and boots"),
        ("Accessories", "accessories", "Hats, gloves, and packs"),
    ];
    for (name, slug, description) in categories {
        sqlx::query(
            "INSERT INTO category (name, slug, description)
             VALUES ($1, $2, $3)
             ON CONFLICT (slug) DO NOTHING",
        )
        .bind(name)
        .bind(slug)
        .bind(description)
        .execute(&pool)
        .await?;
    }

    tracing::info!("Seeding products...");
    let products = [
        (
            "Trail Jacket",
            "Orchard",
            "Lightweight waterproof shell",
            Decimal::new(12_000, 2),
            "jackets",
            25,
        ),
        (
            "Ridge Runner",
            "Orchard",
            "Cushioned trail running shoe",
            Decimal::new(9_500, 2),
            "footwear",
            40,
        ),
        (
            "Summit Beanie",
            "Orchard",
            "Merino wool beanie",
            Decimal::new(2_800, 2),
            "accessories",
            100,
        ),
    ];
    for (title, brand, description, price, category_slug, stock) in products {
        sqlx::query(
            "INSERT INTO product (title, brand, description, price, sizes, colors, stock,
                                  category_id, images)
             SELECT $1, $2, $3, $4, $5, $6, $7, c.id, $8
             FROM category c
             WHERE c.slug = $9
               AND NOT EXISTS (SELECT 1 FROM product WHERE title = $1)",
        )
        .bind(title)
        .bind(brand)
        .bind(description)
        .bind(price)
        .bind(vec!["S".to_string(), "M".to_string(), "L".to_string()])
        .bind(vec!["Black".to_string(), "Forest Green".to_string()])
        .bind(stock)
        .bind(vec![format!(
            "https://cdn.orchardshop.io/demo/{}.jpg",
            title.to_lowercase().replace(' ', "-")
        )])
        .bind(category_slug)
        .execute(&pool)
        .await?;
    }

    tracing::info!("Seeding users...");
    sqlx::query(
        "INSERT INTO app_user (email, name, is_admin)
         VALUES ('admin@orchardshop.io', 'Demo Admin', TRUE),
                ('customer@orchardshop.io', 'Demo Customer', FALSE)
         ON CONFLICT (email) DO NOTHING",
    )
    .execute(&pool)
    .await?;

    tracing::info!("Seeding promo codes...");
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO promo_code (code, discount_type, discount_value, min_purchase_amount,
                                 max_discount_amount, valid_from, valid_until, usage_limit)
         VALUES ('WELCOME10', 'percentage', 10, 0, 50, $1, $2, NULL),
                ('FLAT25', 'fixed', 25, 100, NULL, $1, $2, 200)
         ON CONFLICT (code) DO NOTHING",
    )
    .bind(now)
    .bind(now + Duration::days(90))
    .execute(&pool)
    .await?;

    tracing::info!("Seed complete");
    Ok(())
}
