//! Connection settings and their reconciliation against built-in defaults.
//!
//! Persisted settings are user-editable JSON that may predate the current
//! schema. [`reconcile`] is total: whatever shape the stored value has, the
//! result satisfies the settings invariants (non-empty unique catalog, no
//! trailing slash on the endpoint).

use std::fmt;

use generation_provider::{ConnectionSettings, TransportMode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com";
pub const DEFAULT_MODEL_CATALOG: [&str; 3] = ["gpt-4o-mini", "gpt-4o", "gpt-4.1-mini"];

const CREDENTIAL_KEYS: [&str; 2] = ["credential", "apiKey"];
const ENDPOINT_KEYS: [&str; 2] = ["endpoint", "apiUrl"];
const CATALOG_KEYS: [&str; 2] = ["modelCatalog", "selectedModels"];

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub credential: String,
    pub endpoint: String,
    pub transport_mode: TransportMode,
    pub model_catalog: Vec<String>,
}

impl Settings {
    #[must_use]
    pub fn builtin_defaults() -> Self {
        Self {
            credential: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            transport_mode: TransportMode::Client,
            model_catalog: DEFAULT_MODEL_CATALOG
                .iter()
                .map(|model| (*model).to_owned())
                .collect(),
        }
    }

    #[must_use]
    pub fn connection(&self) -> ConnectionSettings {
        ConnectionSettings {
            credential: self.credential.clone(),
            endpoint: self.endpoint.clone(),
            transport_mode: self.transport_mode,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let credential = if self.credential.is_empty() {
            "<empty>"
        } else {
            "<redacted>"
        };
        f.debug_struct("Settings")
            .field("credential", &credential)
            .field("endpoint", &self.endpoint)
            .field("transport_mode", &self.transport_mode)
            .field("model_catalog", &self.model_catalog)
            .finish()
    }
}

/// Merge a possibly absent, partial or legacy stored value with `defaults`.
///
/// Pure and idempotent: reconciling the serialized output again yields the
/// same settings.
#[must_use]
pub fn reconcile(stored: Option<&Value>, defaults: &Settings) -> Settings {
    let Some(stored) = stored.and_then(Value::as_object) else {
        return defaults.clone();
    };

    let credential = string_field(stored, &CREDENTIAL_KEYS)
        .map(|credential| credential.trim().to_owned())
        .unwrap_or_else(|| defaults.credential.clone());

    let endpoint = string_field(stored, &ENDPOINT_KEYS)
        .map(normalize_endpoint)
        .filter(|endpoint| !endpoint.is_empty())
        .unwrap_or_else(|| normalize_endpoint(&defaults.endpoint));

    let transport_mode = transport_mode_field(stored).unwrap_or(defaults.transport_mode);

    let model_catalog = CATALOG_KEYS
        .iter()
        .find_map(|key| stored.get(*key).and_then(Value::as_array))
        .map(|entries| normalize_catalog(entries.iter().filter_map(Value::as_str)))
        .filter(|catalog| !catalog.is_empty())
        .unwrap_or_else(|| normalize_catalog(defaults.model_catalog.iter().map(String::as_str)));

    Settings {
        credential,
        endpoint,
        transport_mode,
        model_catalog,
    }
}

/// `current` when it is in the catalog, else the catalog's first entry.
#[must_use]
pub fn resolve_selected_model<'a>(catalog: &'a [String], current: &str) -> Option<&'a str> {
    catalog
        .iter()
        .find(|model| model.as_str() == current)
        .or_else(|| catalog.first())
        .map(String::as_str)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsEditError {
    #[error("model name is empty")]
    EmptyModel,
    #[error("model '{0}' already exists")]
    ModelExists(String),
}

pub fn add_model(catalog: &mut Vec<String>, model: &str) -> Result<(), SettingsEditError> {
    let model = model.trim();
    if model.is_empty() {
        return Err(SettingsEditError::EmptyModel);
    }
    if catalog.iter().any(|existing| existing == model) {
        return Err(SettingsEditError::ModelExists(model.to_owned()));
    }

    catalog.push(model.to_owned());
    Ok(())
}

/// Removing the last entry is allowed; reconciliation restores the defaults.
pub fn remove_model(catalog: &mut Vec<String>, model: &str) -> bool {
    let before = catalog.len();
    catalog.retain(|existing| existing != model);
    catalog.len() != before
}

fn string_field<'a>(stored: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| stored.get(*key).and_then(Value::as_str))
}

fn transport_mode_field(stored: &Map<String, Value>) -> Option<TransportMode> {
    if let Some(mode) = stored
        .get("transportMode")
        .and_then(Value::as_str)
        .and_then(TransportMode::parse)
    {
        return Some(mode);
    }

    stored
        .get("useServer")
        .and_then(Value::as_bool)
        .map(|use_server| {
            if use_server {
                TransportMode::Server
            } else {
                TransportMode::Client
            }
        })
}

fn normalize_endpoint(endpoint: &str) -> String {
    endpoint
        .trim_start()
        .trim_end_matches(|c: char| c == '/' || c.is_whitespace())
        .to_owned()
}

fn normalize_catalog<'a>(entries: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut catalog: Vec<String> = Vec::new();
    for entry in entries.map(str::trim).filter(|entry| !entry.is_empty()) {
        if !catalog.iter().any(|existing| existing == entry) {
            catalog.push(entry.to_owned());
        }
    }
    catalog
}
