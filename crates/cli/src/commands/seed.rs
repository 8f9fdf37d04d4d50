//! Seed the database with demo users and products.
//!
//! Wipes the shop tables, then creates an admin, a customer (both with the
//! password `password123`), and a small catalog.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::PgPool;

use super::{CommandError, database_url};

const SEED_PASSWORD: &str = "password123";

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: Decimal,
    sale_price: Decimal,
    image: &'static str,
    category: &'static str,
    quantity: i32,
    is_featured: bool,
}

fn seed_products() -> Vec<SeedProduct> {
    vec![
        SeedProduct {
            name: "Ceiling Fan",
            description: "Energy-efficient ceiling fan with silent operation.",
            price: Decimal::new(19999, 2),
            sale_price: Decimal::new(14999, 2),
            image: "https://images.unsplash.com/photo-1524230572899-a752b3835840?w=800&q=80",
            category: "fans",
            quantity: 50,
            is_featured: true,
        },
        SeedProduct {
            name: "Modular Switch Set",
            description: "Premium switches and sockets with a clean matte finish.",
            price: Decimal::new(5999, 2),
            sale_price: Decimal::new(4999, 2),
            image: "https://images.unsplash.com/photo-1581090700227-1e37b190418e?w=800&q=80",
            category: "switches-and-sockets",
            quantity: 80,
            is_featured: true,
        },
        SeedProduct {
            name: "LED Bulb Pack",
            description: "Bright, long-lasting LED bulbs for every room.",
            price: Decimal::new(2999, 2),
            sale_price: Decimal::new(1999, 2),
            image: "https://images.unsplash.com/photo-1505751172876-fa1923c5c528?w=800&q=80",
            category: "ledlights",
            quantity: 120,
            is_featured: false,
        },
        SeedProduct {
            name: "Copper Wire Roll",
            description: "High-quality copper wiring for reliable installations.",
            price: Decimal::new(8999, 2),
            sale_price: Decimal::new(6999, 2),
            image: "https://images.unsplash.com/photo-1519710164239-da123dc03ef4?w=800&q=80",
            category: "wires",
            quantity: 40,
            is_featured: false,
        },
    ]
}

/// Seed the database.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(url.expose_secret()).await?;

    tracing::info!("Seeding database...");

    // Clear existing data (order matters for FKs)
    sqlx::query("DELETE FROM shop.order_item").execute(&pool).await?;
    sqlx::query("DELETE FROM shop.order").execute(&pool).await?;
    sqlx::query("DELETE FROM shop.cart_item").execute(&pool).await?;
    sqlx::query("DELETE FROM shop.coupon").execute(&pool).await?;
    sqlx::query("DELETE FROM shop.warranty_claim").execute(&pool).await?;
    sqlx::query("DELETE FROM shop.product").execute(&pool).await?;
    sqlx::query("DELETE FROM shop.user_password").execute(&pool).await?;
    sqlx::query("DELETE FROM shop.user").execute(&pool).await?;

    let password_hash = hash_seed_password()?;

    create_user(&pool, "Admin User", "admin@example.com", "admin", &password_hash).await?;
    tracing::info!("Created admin: admin@example.com");

    create_user(&pool, "John Doe", "john@example.com", "customer", &password_hash).await?;
    tracing::info!("Created customer: john@example.com");

    for product in seed_products() {
        sqlx::query(
            "INSERT INTO shop.product \
                 (name, description, price, sale_price, image, category, quantity, is_featured) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(product.name)
        .bind(product.description)
        .bind(product.price)
        .bind(product.sale_price)
        .bind(product.image)
        .bind(product.category)
        .bind(product.quantity)
        .bind(product.is_featured)
        .execute(&pool)
        .await?;
        tracing::info!("Created product: {}", product.name);
    }

    tracing::info!("Seeding complete!");
    Ok(())
}

async fn create_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    role: &str,
    password_hash: &str,
) -> Result<(), CommandError> {
    let user_id: i32 = sqlx::query_scalar(
        "INSERT INTO shop.user (name, email, role) VALUES ($1, $2, $3::shop.user_role) \
         RETURNING id",
    )
    .bind(name)
    .bind(email)
    .bind(role)
    .fetch_one(pool)
    .await?;

    sqlx::query("INSERT INTO shop.user_password (user_id, password_hash) VALUES ($1, $2)")
        .bind(user_id)
        .bind(password_hash)
        .execute(pool)
        .await?;

    Ok(())
}

fn hash_seed_password() -> Result<String, CommandError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(SEED_PASSWORD.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| CommandError::PasswordHash)
}
