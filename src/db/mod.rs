//! SQLite storage: pool construction, schema creation and seeding.
//!
//! Data access lives in [`orgs`] and [`events`]. Handlers reach the store
//! through a per-request [`DbScope`].

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::models::NewOrg;

pub mod events;
pub mod orgs;
pub mod scope;

pub use scope::{DbScope, DbScopeLayer};

const CREATE_ORGS: &str = "CREATE TABLE IF NOT EXISTS orgs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    tagline TEXT,
    contact TEXT,
    email TEXT,
    description TEXT,
    logo TEXT
)";

// date is nullable: a full-replace update that omits it writes NULL.
const CREATE_EVENTS: &str = "CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    date TEXT,
    venue TEXT,
    description TEXT,
    org_id INTEGER,
    FOREIGN KEY(org_id) REFERENCES orgs(id)
)";

pub const SEED_ORG: NewOrg<'static> = NewOrg {
    name: "Example Org",
    tagline: Some("We run cool events"),
    contact: Some("+91-99999-99999"),
    email: Some("hello@example.org"),
    description: Some("Community-first events"),
    logo: Some("https://via.placeholder.com/128"),
};

/// Opens the pool. The database file is created when missing.
///
/// Foreign keys are declared but not enforced, so an event may point at an
/// organization that does not exist.
pub async fn connect(config: &Config) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(false);

    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
}

/// Creates missing tables and seeds one organization into an empty store.
/// Safe to run on every start; existing tables are left untouched.
pub async fn initialize(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut conn = pool.acquire().await?;

    sqlx::query(CREATE_ORGS).execute(&mut *conn).await?;
    sqlx::query(CREATE_EVENTS).execute(&mut *conn).await?;
    tracing::info!("Schema initialized");

    if orgs::count_orgs(&mut conn).await? == 0 {
        let id = orgs::insert_org(&mut conn, &SEED_ORG).await?;
        tracing::info!(org_id = id, name = SEED_ORG.name, "Seeded example organization");
    }

    Ok(())
}

/// In-memory store with a single connection that is never recycled, so the
/// database survives for the whole test.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid in-memory url")
        .foreign_keys(false);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("in-memory pool");

    initialize(&pool).await.expect("schema");
    pool
}
