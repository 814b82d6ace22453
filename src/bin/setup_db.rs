//! One-shot database bootstrap: applies the schema and seeds the default
//! admin account if it does not exist yet.
//!
//! Usage: DATABASE_URL=... [ADMIN_PASSWORD=...] cargo run --bin setup_db

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher};
use sqlx::postgres::PgPoolOptions;

const INIT_SQL: &str = include_str!("../../migrations/001_init.sql");

const ROLE_ADMIN: i16 = 1;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")?;
    let admin_password =
        std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await?;

    sqlx::raw_sql(INIT_SQL).execute(&pool).await?;
    println!("Schema applied.");

    let existing: Option<uuid::Uuid> =
        sqlx::query_scalar(r#"SELECT user_id FROM "cabs_user" WHERE username = 'admin'"#)
            .fetch_optional(&pool)
            .await?;

    if existing.is_some() {
        println!("Admin account already exists.");
        return Ok(());
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(admin_password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("argon2 hash error: {e}"))?
        .to_string();

    sqlx::query(
        r#"
        INSERT INTO "cabs_user" (username, password_hash, role)
        VALUES ('admin', $1, $2)
        "#,
    )
    .bind(&password_hash)
    .bind(ROLE_ADMIN)
    .execute(&pool)
    .await?;

    println!("Default admin account created (username 'admin').");
    Ok(())
}
