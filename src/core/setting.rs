//! Setting records and their validation.
//!
//! Cogs and commands hand settings to the host as loose JSON documents. A new
//! setting document must carry exactly `id`, `description` and `value`; an
//! update only needs `id` and `value`.

use crate::{
    entities::setting,
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Value of a setting. Any JSON shape is allowed; cogs pick the typed accessor they need.
pub type SettingValue = Value;

/// Fields a new setting document must have, and nothing else.
pub const SETTING_FIELDS: [&str; 3] = ["id", "description", "value"];

/// A validated setting record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    /// Unique key the value is looked up by
    pub id: String,
    /// Human-readable description
    pub description: String,
    /// Current value
    pub value: SettingValue,
}

impl Setting {
    /// Creates a setting from its parts.
    pub fn new(id: impl Into<String>, description: impl Into<String>, value: SettingValue) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            value,
        }
    }

    /// Validates a candidate document and turns it into a `Setting`.
    ///
    /// Fails with [`Error::InvalidSetting`] when the document is not an object
    /// whose key set is exactly [`SETTING_FIELDS`], or when `id` or
    /// `description` is not a string.
    pub fn from_document(document: Value) -> Result<Self> {
        let invalid = |doc: &Value| Error::InvalidSetting {
            record: doc.to_string(),
        };

        let Value::Object(map) = &document else {
            return Err(invalid(&document));
        };
        if !has_exact_fields(map) {
            return Err(invalid(&document));
        }

        let (Some(Value::String(id)), Some(Value::String(description)), Some(value)) =
            (map.get("id"), map.get("description"), map.get("value"))
        else {
            return Err(invalid(&document));
        };
        if id.trim().is_empty() {
            return Err(invalid(&document));
        }

        Ok(Self::new(id.clone(), description.clone(), value.clone()))
    }

    /// The document form of this setting.
    #[must_use]
    pub fn to_document(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "description": self.description,
            "value": self.value,
        })
    }
}

impl From<setting::Model> for Setting {
    fn from(model: setting::Model) -> Self {
        Self {
            id: model.id,
            description: model.description,
            value: model.value,
        }
    }
}

fn has_exact_fields(map: &Map<String, Value>) -> bool {
    map.len() == SETTING_FIELDS.len() && SETTING_FIELDS.iter().all(|f| map.contains_key(*f))
}

/// A request to change the value of an existing setting.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingUpdate {
    /// Id of the setting to change
    pub id: String,
    /// Replacement value
    pub value: SettingValue,
}

impl SettingUpdate {
    /// Creates an update from its parts.
    pub fn new(id: impl Into<String>, value: SettingValue) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }

    /// Reads an update from a document containing at least `id` and `value`.
    ///
    /// Extra fields such as `description` are ignored.
    pub fn from_document(document: &Value) -> Result<Self> {
        match (document.get("id"), document.get("value")) {
            (Some(Value::String(id)), Some(value)) => Ok(Self::new(id.clone(), value.clone())),
            _ => Err(Error::InvalidSetting {
                record: document.to_string(),
            }),
        }
    }
}

/// Parses user-typed text into a setting value.
///
/// Valid JSON (`42`, `true`, `["a", "b"]`, `"quoted"`) keeps its type; anything
/// else is taken as a plain string.
#[must_use]
pub fn parse_value(raw: &str) -> SettingValue {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
