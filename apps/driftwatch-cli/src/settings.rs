//! Settings file handling.
//!
//! Credentials live in a `settings.json` next to the binary (or wherever
//! `--settings` points). A missing file gets a blank template written out
//! so the user has something to fill in. Two legacy key spellings are
//! migrated in place and persisted back so old files keep working.

use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{info, warn};

/// Default settings file location.
pub const DEFAULT_SETTINGS_PATH: &str = "settings.json";

/// Loaded, validated settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "SyncroAPIKey", default)]
    pub syncro_api_key: String,

    #[serde(rename = "SyncroSubDomain", default)]
    pub syncro_subdomain: String,

    #[serde(rename = "HuntressAPIKey", default)]
    pub huntress_api_key: String,

    #[serde(rename = "HuntressSecretKey", default)]
    pub huntress_secret_key: String,

    #[serde(rename = "Debug", default)]
    pub debug: bool,
}

/// Load settings from `path`.
///
/// When the file does not exist, a blank template is written there and the
/// call fails with guidance pointing at it. Legacy keys are migrated and
/// the migrated form is saved back to disk. All required keys must be
/// non-empty; the error lists every missing one at once.
pub fn load_settings(path: &Path) -> CliResult<Settings> {
    if !path.exists() {
        let template = serde_json::to_string_pretty(&Settings::default())?;
        std::fs::write(path, template).map_err(|e| {
            CliError::Config(format!(
                "failed to create settings template at {}: {e}",
                path.display()
            ))
        })?;
        return Err(CliError::Config(format!(
            "no settings file found; a blank template was created at {}. \
             Populate it with your API credentials and run again.",
            path.display()
        )));
    }

    let raw = std::fs::read_to_string(path).map_err(|e| {
        CliError::Config(format!("failed to read {}: {e}", path.display()))
    })?;
    let mut value: Value = serde_json::from_str(&raw).map_err(|e| {
        CliError::Config(format!("failed to parse {}: {e}", path.display()))
    })?;

    let object = value.as_object_mut().ok_or_else(|| {
        CliError::Config(format!("{} must contain a JSON object", path.display()))
    })?;

    if migrate_legacy_keys(object) {
        info!(path = %path.display(), "migrated legacy settings keys");
        match serde_json::to_string_pretty(object) {
            Ok(migrated) => {
                if let Err(e) = std::fs::write(path, migrated) {
                    warn!(path = %path.display(), error = %e, "failed to save migrated settings");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize migrated settings"),
        }
    }

    let settings: Settings = serde_json::from_value(value)?;
    validate(&settings, path)?;
    Ok(settings)
}

/// Rewrite legacy key spellings in place. Returns true if anything changed.
///
/// - `huntressApiSecretKey` becomes `HuntressSecretKey`, unless the new key
///   already holds a value, in which case the old one is just dropped.
/// - `debug` becomes `Debug`, unless `Debug` already exists.
fn migrate_legacy_keys(object: &mut Map<String, Value>) -> bool {
    let mut migrated = false;

    if let Some(old) = object.remove("huntressApiSecretKey") {
        let new_is_set = object
            .get("HuntressSecretKey")
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty());
        if !new_is_set {
            object.insert("HuntressSecretKey".to_string(), old);
        }
        migrated = true;
    }

    if let Some(old) = object.remove("debug") {
        if !object.contains_key("Debug") {
            object.insert("Debug".to_string(), old);
        }
        migrated = true;
    }

    migrated
}

fn validate(settings: &Settings, path: &Path) -> CliResult<()> {
    let required = [
        ("SyncroAPIKey", &settings.syncro_api_key),
        ("SyncroSubDomain", &settings.syncro_subdomain),
        ("HuntressAPIKey", &settings.huntress_api_key),
        ("HuntressSecretKey", &settings.huntress_secret_key),
    ];

    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| *key)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CliError::Config(format!(
            "missing required settings: {}. Please populate {}",
            missing.join(", "),
            path.display()
        )))
    }
}
