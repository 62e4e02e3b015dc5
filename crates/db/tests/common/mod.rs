//! Shared fixtures: an in-memory SQLite database migrated by the real
//! migrator, seeded users and a temporary document store.

#![allow(dead_code)]

use bap_core::auth::{Actor, Role};
use bap_core::document::{DocumentStore, DocumentStoreConfig};
use bap_core::import::{Channel, NormalizedSheet, normalize};
use bap_db::migration::{Migrator, MigratorTrait};
use bap_db::repositories::{BudgetFileRepository, FileWithItems, NewBudgetFile, UserRepository};
use bap_shared::config::ImportSettings;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tempfile::TempDir;
use uuid::Uuid;

pub const TV_SHEET: &str = "\
TV budget March,,,,
Budget Code,Campaign Name,Vendor,Amount,Specialist
TV-001,Spring launch,MNB,\"1,500,000\",bat
TV-002,Summer promo,Eagle,250000.50,dorj
TV-003,Autumn teaser,,100000,
";

pub struct TestEnv {
    pub db: DatabaseConnection,
    pub documents: DocumentStore,
    pub planner: Actor,
    pub manager: Actor,
    pub admin: Actor,
    _dir: TempDir,
}

pub async fn setup() -> TestEnv {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let users = UserRepository::new(db.clone());
    let mut actors = Vec::new();
    for (name, role) in [
        ("bat", Role::Planner),
        ("sarnai", Role::Manager),
        ("root", Role::Admin),
    ] {
        let user = users.create(name, "not-a-real-hash", name, role).await.unwrap();
        actors.push(Actor::new(user.id, name, role));
    }
    let admin = actors.pop().unwrap();
    let manager = actors.pop().unwrap();
    let planner = actors.pop().unwrap();

    let dir = TempDir::new().unwrap();
    let documents = DocumentStore::from_config(DocumentStoreConfig::new(dir.path())).unwrap();

    TestEnv {
        db,
        documents,
        planner,
        manager,
        admin,
        _dir: dir,
    }
}

pub fn parse(csv: &str, channel: Channel, uploader: &str) -> NormalizedSheet {
    normalize(
        csv.as_bytes(),
        "budget.csv",
        channel,
        uploader,
        &ImportSettings::default(),
    )
    .unwrap()
}

pub async fn upload(env: &TestEnv, csv: &str, channel: Channel) -> FileWithItems {
    let sheet = parse(csv, channel, &env.planner.username);
    BudgetFileRepository::new(env.db.clone())
        .create_with_items(NewBudgetFile {
            id: Uuid::new_v4(),
            filename: "budget.csv",
            channel,
            uploader_id: env.planner.id,
            sheet: &sheet,
            source_path: None,
        })
        .await
        .unwrap()
}
