//! The bot host - live settings and the extension dispatch table.
//!
//! One `BotHost` exists per process. It is built during startup, then handed
//! to poise as the framework data, so every command reaches it through
//! `ctx.data()`.

use crate::{
    bot::{
        Command,
        extensions::{CogCatalog, ExtensionId},
    },
    core::{Setting, SettingUpdate, SettingValue, SettingsStore},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// Shared state available to all bot commands.
///
/// Live settings are kept in memory and written through to the store. All
/// mutations hold the same lock across their persistence calls, so concurrent
/// updates of one setting are applied one after the other.
pub struct BotHost {
    store: SettingsStore,
    settings: Mutex<HashMap<String, SettingValue>>,
    timezone: Tz,
    loaded: Vec<ExtensionId>,
    commands: Vec<Command>,
}

impl std::fmt::Debug for BotHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotHost")
            .field("timezone", &self.timezone)
            .field("loaded", &self.loaded)
            .field("pending_commands", &self.commands.len())
            .finish_non_exhaustive()
    }
}

impl BotHost {
    /// Creates a host with no settings and no extensions.
    #[must_use]
    pub fn new(store: SettingsStore, timezone: Tz) -> Self {
        Self {
            store,
            settings: Mutex::new(HashMap::new()),
            timezone,
            loaded: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Timezone the bot was configured with.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Current time in the configured timezone.
    #[must_use]
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }

    // ----- extensions -----

    /// Registers one extension: runs the cog's setup, then queues its commands.
    #[instrument(skip(self, catalog), fields(extension = %id))]
    pub async fn load_extension(&mut self, id: &ExtensionId, catalog: &CogCatalog) -> Result<()> {
        if self.loaded.contains(id) {
            return Err(Error::ExtensionAlreadyLoaded {
                name: id.to_string(),
            });
        }
        let cog = catalog.get(&id.name).ok_or_else(|| Error::UnknownExtension {
            name: id.to_string(),
        })?;

        cog.setup(self).await?;

        let commands = cog.commands();
        debug!(
            "Extension {} ({}) provides {} commands",
            id,
            cog.description(),
            commands.len()
        );
        self.commands.extend(commands);
        self.loaded.push(id.clone());
        Ok(())
    }

    /// Extensions loaded so far, in load order.
    #[must_use]
    pub fn extensions(&self) -> &[ExtensionId] {
        &self.loaded
    }

    /// Hands the collected commands over to the framework.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    // ----- settings -----

    /// Loads every persisted setting into the live map.
    pub async fn load_settings(&self) -> Result<usize> {
        let stored = self.store.find_all().await?;
        let mut live = self.settings.lock().await;
        let count = stored.len();
        for setting in stored {
            live.insert(setting.id, setting.value);
        }
        info!("Finished loading {} settings", count);
        Ok(count)
    }

    /// Creates a new setting from a document with exactly `id`, `description` and `value`.
    ///
    /// Nothing is written when the document is invalid or the id is taken.
    pub async fn add_setting(&self, document: Value) -> Result<Setting> {
        let setting = Setting::from_document(document)?;

        let mut live = self.settings.lock().await;
        if live.contains_key(&setting.id) || self.store.find_one(&setting.id).await?.is_some() {
            return Err(Error::DuplicateSetting { id: setting.id });
        }

        self.store.insert_one(&setting).await?;
        live.insert(setting.id.clone(), setting.value.clone());
        info!("Added setting {} with value {}", setting.id, setting.value);
        Ok(setting)
    }

    /// Changes the value of an existing setting and returns the previous value.
    ///
    /// `document` needs at least `id` and `value`.
    pub async fn update_setting(&self, document: &Value) -> Result<SettingValue> {
        let update = SettingUpdate::from_document(document)?;

        let mut live = self.settings.lock().await;
        let Some(stored) = self.store.find_one(&update.id).await? else {
            return Err(Error::SettingNotFound { id: update.id });
        };

        let old_value = live.get(&update.id).cloned().unwrap_or(stored.value);
        if self.store.update_one(&update.id, &update.value).await? == 0 {
            return Err(Error::SettingNotFound { id: update.id });
        }
        live.insert(update.id.clone(), update.value.clone());
        info!(
            "Updated setting {} with value {} (was {})",
            update.id, update.value, old_value
        );
        Ok(old_value)
    }

    /// Every persisted setting, ordered by id.
    pub async fn get_settings(&self) -> Result<Vec<Setting>> {
        self.store.find_all().await
    }

    /// Live value of a setting.
    pub async fn setting(&self, id: &str) -> Option<SettingValue> {
        self.settings.lock().await.get(id).cloned()
    }

    /// Live value of a setting, deserialized into `T`.
    ///
    /// `Ok(None)` when the setting does not exist, an error when it has the wrong shape.
    pub async fn setting_as<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>> {
        self.setting(id)
            .await
            .map(serde_json::from_value)
            .transpose()
            .map_err(Error::from)
    }

    /// Live value of a string setting.
    pub async fn setting_str(&self, id: &str) -> Option<String> {
        match self.setting(id).await? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Live value of a boolean setting.
    pub async fn setting_bool(&self, id: &str) -> Option<bool> {
        self.setting(id).await?.as_bool()
    }

    /// Live value of an integer setting.
    pub async fn setting_i64(&self, id: &str) -> Option<i64> {
        self.setting(id).await?.as_i64()
    }

    /// Ids of all live settings, sorted.
    pub async fn setting_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.settings.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{init_test_tracing, setup_test_host, setup_test_store};
    use serde_json::json;
    use std::sync::Arc;

    fn volume_document(value: Value) -> Value {
        json!({"id": "volume", "description": "Playback volume", "value": value})
    }

    #[tokio::test]
    async fn test_add_setting_exposes_value_and_persists() -> Result<()> {
        init_test_tracing();
        let host = setup_test_host().await?;

        let added = host.add_setting(volume_document(json!(7))).await?;

        assert_eq!(added, Setting::new("volume", "Playback volume", json!(7)));
        assert_eq!(host.setting("volume").await, Some(json!(7)));
        assert_eq!(host.setting_i64("volume").await, Some(7));
        assert_eq!(host.get_settings().await?, vec![added]);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_setting_rejects_wrong_fields_without_writing() -> Result<()> {
        let host = setup_test_host().await?;

        let missing = host.add_setting(json!({"id": "volume", "value": 1})).await;
        let extra = host
            .add_setting(json!({"id": "volume", "description": "d", "value": 1, "x": 2}))
            .await;

        assert!(matches!(missing, Err(Error::InvalidSetting { .. })));
        assert!(matches!(extra, Err(Error::InvalidSetting { .. })));
        assert!(host.get_settings().await?.is_empty());
        assert_eq!(host.setting("volume").await, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_setting_rejects_duplicate_id() -> Result<()> {
        let host = setup_test_host().await?;
        host.add_setting(volume_document(json!(1))).await?;

        let result = host.add_setting(volume_document(json!(2))).await;

        assert!(matches!(result, Err(Error::DuplicateSetting { ref id }) if id == "volume"));
        assert_eq!(host.get_settings().await?.len(), 1);
        assert_eq!(host.setting("volume").await, Some(json!(1)));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_unknown_setting_fails_and_changes_nothing() -> Result<()> {
        let host = setup_test_host().await?;
        host.add_setting(volume_document(json!(1))).await?;
        let before = host.get_settings().await?;

        let result = host
            .update_setting(&json!({"id": "brightness", "value": 3}))
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, Error::SettingNotFound { .. }));
        assert!(err.to_string().contains("/createsetting"));
        assert_eq!(host.get_settings().await?, before);
        assert_eq!(host.setting("brightness").await, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_returns_old_value_and_writes_through() -> Result<()> {
        let host = setup_test_host().await?;
        host.add_setting(volume_document(json!(1))).await?;

        let old = host
            .update_setting(&json!({"id": "volume", "value": "loud"}))
            .await?;

        assert_eq!(old, json!(1));
        assert_eq!(host.setting_str("volume").await, Some("loud".to_string()));
        assert_eq!(
            host.get_settings().await?,
            vec![Setting::new("volume", "Playback volume", json!("loud"))]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_get_settings_is_stable_without_mutation() -> Result<()> {
        let host = setup_test_host().await?;
        host.add_setting(volume_document(json!(3))).await?;
        host.add_setting(json!({"id": "greeting", "description": "Hello text", "value": "hoi"}))
            .await?;

        let first = host.get_settings().await?;
        let second = host.get_settings().await?;

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_settings_populates_live_map() -> Result<()> {
        let store = setup_test_store().await?;
        store
            .insert_one(&Setting::new("enabled", "Feature flag", json!(true)))
            .await?;
        store
            .insert_one(&Setting::new("limits", "Rate limits", json!({"per_minute": 5})))
            .await?;

        let host = BotHost::new(store, Tz::UTC);
        assert!(host.setting_ids().await.is_empty());

        assert_eq!(host.load_settings().await?, 2);

        assert_eq!(host.setting_ids().await, vec!["enabled", "limits"]);
        assert_eq!(host.setting_bool("enabled").await, Some(true));
        Ok(())
    }

    #[tokio::test]
    async fn test_now_uses_configured_timezone() -> Result<()> {
        let host = BotHost::new(setup_test_store().await?, Tz::Asia__Tokyo);
        assert_eq!(host.timezone(), Tz::Asia__Tokyo);
        assert_eq!(host.now().timezone(), Tz::Asia__Tokyo);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_settings_on_empty_store_exposes_nothing() -> Result<()> {
        let host = setup_test_host().await?;
        assert_eq!(host.load_settings().await?, 0);
        assert!(host.setting_ids().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_setting_as_deserializes_structured_value() -> Result<()> {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Limits {
            per_minute: u32,
        }

        let host = setup_test_host().await?;
        host.add_setting(json!({
            "id": "limits",
            "description": "Rate limits",
            "value": {"per_minute": 5},
        }))
        .await?;

        assert_eq!(
            host.setting_as::<Limits>("limits").await?,
            Some(Limits { per_minute: 5 })
        );
        assert_eq!(host.setting_as::<Limits>("missing").await?, None);
        assert!(host.setting_as::<String>("limits").await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_serialized() -> Result<()> {
        let host = Arc::new(setup_test_host().await?);
        host.add_setting(volume_document(json!(0))).await?;

        let mut tasks = Vec::new();
        for n in 1..=8 {
            let host = Arc::clone(&host);
            tasks.push(tokio::spawn(async move {
                host.update_setting(&json!({"id": "volume", "value": n}))
                    .await
            }));
        }

        let mut old_values = Vec::new();
        for task in tasks {
            old_values.push(task.await.unwrap()?);
        }

        // Each update saw exactly one predecessor: the initial value plus all
        // but the last writer's value show up once.
        let final_value = host.setting("volume").await.unwrap();
        old_values.push(final_value.clone());
        old_values.sort_by_key(|v| v.as_i64());
        let expected: Vec<Value> = (0..=8).map(|n| json!(n)).collect();
        assert_eq!(old_values, expected);
        assert_eq!(host.get_settings().await?[0].value, final_value);
        Ok(())
    }
}
