//! Database configuration module for `TourDesk`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables and their indexes are generated from the entity definitions with
//! `Schema::create_table_from_entity` / `Schema::create_index_from_entity`, so the schema
//! always matches the Rust structs without hand-written SQL.

use crate::entities::{Booking, BookingBackup, ContactSubmission, Review, Tour};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/tourdesk.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable or returns the
/// default local `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Local file path of a `sqlite://` URL, `None` for in-memory or non-SQLite URLs.
fn sqlite_file_path(database_url: &str) -> Option<&Path> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    (!path.is_empty() && !path.contains(":memory:")).then(|| Path::new(path))
}

/// Establishes a connection to the database at `database_url`.
///
/// For a `SQLite` file the parent directory is created first.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(parent) = sqlite_file_path(database_url).and_then(Path::parent) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    info!("Connecting to database");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables and indexes if they do not exist yet.
///
/// Tours are created first so the foreign keys of bookings, backups and reviews resolve.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    create_table_for(db, Tour).await?;
    create_table_for(db, Booking).await?;
    create_table_for(db, BookingBackup).await?;
    create_table_for(db, Review).await?;
    create_table_for(db, ContactSubmission).await?;
    info!("Database tables ensured");
    Ok(())
}

async fn create_table_for<E>(db: &DatabaseConnection, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(builder.build(&table)).await?;

    for mut index in schema.create_index_from_entity(entity) {
        index.if_not_exists();
        db.execute(builder.build(&index)).await?;
    }
    debug!(table = entity.table_name(), "Table and indexes created");
    Ok(())
}
