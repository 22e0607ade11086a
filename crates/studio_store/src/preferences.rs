//! Single-value units: interface language, theme and raw settings.

use std::fmt;

use generation_provider::Language;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;
use crate::units::{UnitKey, UnitStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored language, falling back to the default when absent or unrecognized.
pub fn load_language(units: &dyn UnitStore) -> Language {
    read_value(units, UnitKey::Language, Language::parse).unwrap_or_default()
}

pub fn save_language(units: &dyn UnitStore, language: Language) -> Result<(), StoreError> {
    write_json(units, UnitKey::Language, &language)
}

pub fn load_theme(units: &dyn UnitStore) -> Theme {
    read_value(units, UnitKey::Theme, Theme::parse).unwrap_or_default()
}

pub fn save_theme(units: &dyn UnitStore, theme: Theme) -> Result<(), StoreError> {
    write_json(units, UnitKey::Theme, &theme)
}

/// Stored settings as untyped JSON. Absent, unreadable or malformed units
/// read as `None`; reconciliation against defaults happens in the caller.
pub fn load_settings_value(units: &dyn UnitStore) -> Option<Value> {
    let contents = read_unit(units, UnitKey::Settings)?;
    match serde_json::from_str::<Value>(&contents) {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!(%error, "ignoring malformed settings unit");
            None
        }
    }
}

pub fn save_settings<T: Serialize>(units: &dyn UnitStore, settings: &T) -> Result<(), StoreError> {
    write_json(units, UnitKey::Settings, settings)
}

fn read_unit(units: &dyn UnitStore, key: UnitKey) -> Option<String> {
    match units.read(key) {
        Ok(contents) => contents,
        Err(error) => {
            tracing::warn!(%error, unit = key.as_str(), "ignoring unreadable unit");
            None
        }
    }
}

/// Accepts both a JSON string and a bare token such as `en`.
fn read_value<T: DeserializeOwned>(
    units: &dyn UnitStore,
    key: UnitKey,
    parse_bare: fn(&str) -> Option<T>,
) -> Option<T> {
    let contents = read_unit(units, key)?;
    let parsed = serde_json::from_str::<T>(&contents)
        .ok()
        .or_else(|| parse_bare(&contents));
    if parsed.is_none() {
        tracing::warn!(unit = key.as_str(), "ignoring unrecognized unit value");
    }
    parsed
}

fn write_json<T: Serialize + ?Sized>(
    units: &dyn UnitStore,
    key: UnitKey,
    value: &T,
) -> Result<(), StoreError> {
    let contents = serde_json::to_string(value)
        .map_err(|source| StoreError::json_serialize(key.as_str(), source))?;
    units.write(key, &contents)
}
