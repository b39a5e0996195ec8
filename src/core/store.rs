//! Settings store - persistence for setting records.
//!
//! A thin layer over the `settings` table. It does no validation of its own;
//! the bot host checks documents and existence before calling in here.

use crate::{
    core::setting::{Setting, SettingValue},
    entities::{Setting as SettingEntity, setting},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::{debug, instrument};

/// Read/insert/update access to the persisted settings.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    db: DatabaseConnection,
}

impl SettingsStore {
    /// Wraps an open database connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns every stored setting, ordered by id.
    pub async fn find_all(&self) -> Result<Vec<Setting>> {
        let models = SettingEntity::find()
            .order_by_asc(setting::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Setting::from).collect())
    }

    /// Looks up one setting by id.
    pub async fn find_one(&self, id: &str) -> Result<Option<Setting>> {
        let model = SettingEntity::find_by_id(id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(Setting::from))
    }

    /// Inserts a new setting. The primary key rejects a second row with the same id.
    #[instrument(skip(self, setting), fields(id = %setting.id))]
    pub async fn insert_one(&self, setting: &Setting) -> Result<()> {
        let active = setting::ActiveModel {
            id: Set(setting.id.clone()),
            description: Set(setting.description.clone()),
            value: Set(setting.value.clone()),
        };
        SettingEntity::insert(active).exec(&self.db).await?;
        debug!("Inserted setting row");
        Ok(())
    }

    /// Replaces the value of the setting with `id`.
    ///
    /// Returns the number of rows changed; zero when no such setting exists.
    #[instrument(skip(self, value))]
    pub async fn update_one(&self, id: &str, value: &SettingValue) -> Result<u64> {
        let result = SettingEntity::update_many()
            .col_expr(setting::Column::Value, Expr::val(value.clone()).into())
            .filter(setting::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        debug!(rows = result.rows_affected, "Updated setting value");
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_store;
    use serde_json::json;

    #[tokio::test]
    async fn test_empty_store_lists_nothing() -> Result<()> {
        let store = setup_test_store().await?;
        assert!(store.find_all().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_insert_then_find() -> Result<()> {
        let store = setup_test_store().await?;
        let setting = Setting::new("prefix", "Command prefix", json!("!"));

        store.insert_one(&setting).await?;

        assert_eq!(store.find_all().await?, vec![setting.clone()]);
        assert_eq!(store.find_one("prefix").await?, Some(setting));
        assert_eq!(store.find_one("missing").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_find_all_is_ordered_by_id() -> Result<()> {
        let store = setup_test_store().await?;
        for id in ["zeta", "alpha", "mu"] {
            store.insert_one(&Setting::new(id, "d", json!(0))).await?;
        }

        let ids: Vec<String> = store.find_all().await?.into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["alpha", "mu", "zeta"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_rejected_by_store() -> Result<()> {
        let store = setup_test_store().await?;
        let setting = Setting::new("prefix", "Command prefix", json!("!"));
        store.insert_one(&setting).await?;

        assert!(store.insert_one(&setting).await.is_err());
        assert_eq!(store.find_all().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_replaces_only_value() -> Result<()> {
        let store = setup_test_store().await?;
        store
            .insert_one(&Setting::new("volume", "Playback volume", json!(5)))
            .await?;

        let changed = store.update_one("volume", &json!({"level": 11})).await?;

        assert_eq!(changed, 1);
        let stored = store.find_one("volume").await?;
        assert_eq!(
            stored,
            Some(Setting::new("volume", "Playback volume", json!({"level": 11})))
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_update_of_missing_id_changes_nothing() -> Result<()> {
        let store = setup_test_store().await?;
        store.insert_one(&Setting::new("a", "d", json!(1))).await?;

        let changed = store.update_one("b", &json!(2)).await?;

        assert_eq!(changed, 0);
        assert_eq!(store.find_all().await?, vec![Setting::new("a", "d", json!(1))]);
        Ok(())
    }
}
