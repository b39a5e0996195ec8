//! Core logic - framework-agnostic settings and workspace operations.

/// Setting records, validation and value parsing
pub mod setting;
/// Persistence for setting records
pub mod store;
/// Timezone, scratch directory and default-file preparation
pub mod workspace;

pub use setting::{Setting, SettingUpdate, SettingValue};
pub use store::SettingsStore;
