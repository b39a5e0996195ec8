//! Setting entity - Persisted, named values exposed as live state on the bot host.
//!
//! The `id` doubles as the lookup key cogs use, so it is the primary key and
//! never changes after creation. The value is stored as JSON and is opaque to
//! the database.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Setting database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    /// Unique setting key (e.g., `"welcome_channel"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Human-readable explanation of what the setting controls
    pub description: String,
    /// Current value, any JSON shape
    pub value: Json,
}

/// `Setting` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
