//! Seeds one user per role for local development.
//!
//! Usage: cargo run --bin seeder
//!
//! Reads `DATABASE_URL`; the shared password comes from `SEED_PASSWORD`
//! (default `changeme`). Existing usernames are left untouched.

use anyhow::Context;
use bap_core::auth::{Role, hash_password};
use bap_db::UserRepository;

const SEED_USERS: [(&str, &str, Role); 3] = [
    ("planner", "Demo Planner", Role::Planner),
    ("manager", "Demo Manager", Role::Manager),
    ("admin", "Demo Admin", Role::Admin),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;
    let password = std::env::var("SEED_PASSWORD").unwrap_or_else(|_| "changeme".to_string());

    println!("Connecting to database...");
    let db = bap_db::connect(&database_url)
        .await
        .context("failed to connect to database")?;
    let users = UserRepository::new(db);

    let password_hash =
        hash_password(&password).map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;

    for (username, full_name, role) in SEED_USERS {
        if users.username_exists(username).await? {
            println!("  {username} already exists, skipping...");
            continue;
        }
        users
            .create(username, &password_hash, full_name, role)
            .await
            .with_context(|| format!("failed to create {username}"))?;
        println!("  created {username} ({role})");
    }

    println!("Seeding complete!");
    Ok(())
}
