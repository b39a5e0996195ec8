//! Database connection module for the settings store.
//!
//! Connects through `SeaORM` and creates the `settings` table from the entity
//! definition, so the schema always matches the Rust model without hand-written SQL.

use crate::entities::Setting;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Default `SQLite` URL: a database file under the working file root.
#[must_use]
pub fn default_database_url(file_dir: &Path) -> String {
    format!("sqlite://{}/eindjeboss.sqlite?mode=rwc", file_dir.display())
}

/// Opens a connection to `database_url` and ensures the tables exist.
#[instrument]
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to settings database");
    let db = Database::connect(database_url).await?;
    create_tables(&db).await?;
    info!("Settings database ready");
    Ok(db)
}

/// Creates the `settings` table if it does not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut settings_table = schema.create_table_from_entity(Setting);
    settings_table.if_not_exists();

    db.execute(builder.build(&settings_table)).await?;

    Ok(())
}
