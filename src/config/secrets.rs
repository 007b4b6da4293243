// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device credential resolution.
//!
//! Credentials can be written inline in the configuration, read from
//! environment variables, or looked up in a JSON file in the host's
//! storage directory:
//!
//! ```json
//! { "devices": { "bedroom": { "id": "...", "key": "..." } } }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SecretError;

use super::DeviceConfig;

/// Secrets file name used when the configuration does not name one.
pub const DEFAULT_SECRETS_FILE: &str = "create-fan-secrets.json";

/// Where device credentials are read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretsMode {
    /// `id` and `key` fields of the device entry.
    #[default]
    Inline,
    /// Environment variables named by `idEnv` and `keyEnv`.
    Env,
    /// A JSON file in the storage directory.
    Storage,
}

/// Secrets section of the platform configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretsConfig {
    /// Resolution mode.
    #[serde(default)]
    pub mode: SecretsMode,
    /// Secrets file name inside the storage directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_file: Option<String>,
}

impl SecretsConfig {
    /// File name to read in storage mode.
    #[must_use]
    pub fn storage_file_name(&self) -> &str {
        self.storage_file.as_deref().unwrap_or(DEFAULT_SECRETS_FILE)
    }
}

/// Credentials needed to reach one device.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSecret {
    /// Device id.
    pub id: String,
    /// Local encryption key.
    pub key: String,
}

impl DeviceSecret {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
        }
    }
}

impl fmt::Debug for DeviceSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSecret")
            .field("id", &self.id)
            .field("key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct StorageSecretsFile {
    #[serde(default)]
    devices: HashMap<String, DeviceSecret>,
}

/// Resolves credentials for `device`, reading the process environment in
/// env mode.
///
/// # Errors
///
/// Returns a `SecretError` describing which credential is missing.
pub fn resolve_secret(
    device: &DeviceConfig,
    config: &SecretsConfig,
    storage_dir: &Path,
) -> Result<DeviceSecret, SecretError> {
    resolve_secret_with(device, config, storage_dir, |name| std::env::var(name).ok())
}

/// Resolves credentials for `device` with a custom environment lookup.
///
/// # Errors
///
/// Returns a `SecretError` describing which credential is missing.
pub fn resolve_secret_with<F>(
    device: &DeviceConfig,
    config: &SecretsConfig,
    storage_dir: &Path,
    env: F,
) -> Result<DeviceSecret, SecretError>
where
    F: Fn(&str) -> Option<String>,
{
    match config.mode {
        SecretsMode::Inline => resolve_inline(device),
        SecretsMode::Env => resolve_env(device, env),
        SecretsMode::Storage => resolve_storage(device, &storage_dir.join(config.storage_file_name())),
    }
}

fn resolve_inline(device: &DeviceConfig) -> Result<DeviceSecret, SecretError> {
    let id = non_empty(device.id.as_deref()).ok_or_else(|| SecretError::MissingInline {
        device: device.name.clone(),
        field: "id",
    })?;
    let key = non_empty(device.key.as_deref()).ok_or_else(|| SecretError::MissingInline {
        device: device.name.clone(),
        field: "key",
    })?;
    Ok(DeviceSecret::new(id, key))
}

fn resolve_env<F>(device: &DeviceConfig, env: F) -> Result<DeviceSecret, SecretError>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: Option<&str>, field: &'static str| {
        let name = non_empty(name).ok_or_else(|| SecretError::MissingEnvName {
            device: device.name.clone(),
            field,
        })?;
        env(name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| SecretError::EnvUnset(name.to_string()))
    };

    let id = lookup(device.id_env.as_deref(), "idEnv")?;
    let key = lookup(device.key_env.as_deref(), "keyEnv")?;
    Ok(DeviceSecret { id, key })
}

fn resolve_storage(device: &DeviceConfig, path: &Path) -> Result<DeviceSecret, SecretError> {
    let unreadable = |message: String| SecretError::StorageUnreadable {
        path: path.display().to_string(),
        message,
    };

    let contents = std::fs::read_to_string(path).map_err(|e| unreadable(e.to_string()))?;
    let file: StorageSecretsFile =
        serde_json::from_str(&contents).map_err(|e| unreadable(e.to_string()))?;

    let entry = device.device_key.as_deref().unwrap_or(&device.name);
    file.devices
        .get(entry)
        .filter(|s| !s.id.is_empty() && !s.key.is_empty())
        .cloned()
        .ok_or_else(|| SecretError::StorageEntryMissing {
            device: device.name.clone(),
            entry: entry.to_string(),
        })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ceilfan-secrets-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn inline_secret() {
        let device = DeviceConfig::new("Bedroom").with_inline_secret("id-1", "key-1");
        let secret =
            resolve_secret_with(&device, &SecretsConfig::default(), Path::new("."), no_env)
                .unwrap();

        assert_eq!(secret, DeviceSecret::new("id-1", "key-1"));
    }

    #[test]
    fn inline_secret_requires_key() {
        let device = DeviceConfig {
            id: Some("id-1".to_string()),
            ..DeviceConfig::new("Bedroom")
        };
        let err = resolve_secret_with(&device, &SecretsConfig::default(), Path::new("."), no_env)
            .unwrap_err();

        assert_eq!(
            err,
            SecretError::MissingInline {
                device: "Bedroom".to_string(),
                field: "key",
            }
        );
    }

    #[test]
    fn env_secret() {
        let device = DeviceConfig {
            id_env: Some("FAN_ID".to_string()),
            key_env: Some("FAN_KEY".to_string()),
            ..DeviceConfig::new("Office")
        };
        let config = SecretsConfig {
            mode: SecretsMode::Env,
            storage_file: None,
        };
        let env = |name: &str| match name {
            "FAN_ID" => Some("env-id".to_string()),
            "FAN_KEY" => Some("env-key".to_string()),
            _ => None,
        };

        let secret = resolve_secret_with(&device, &config, Path::new("."), env).unwrap();
        assert_eq!(secret, DeviceSecret::new("env-id", "env-key"));
    }

    #[test]
    fn env_secret_reports_unset_variable() {
        let device = DeviceConfig {
            id_env: Some("FAN_ID".to_string()),
            key_env: Some("FAN_KEY".to_string()),
            ..DeviceConfig::new("Office")
        };
        let config = SecretsConfig {
            mode: SecretsMode::Env,
            storage_file: None,
        };
        let env = |name: &str| (name == "FAN_ID").then(|| "env-id".to_string());

        let err = resolve_secret_with(&device, &config, Path::new("."), env).unwrap_err();
        assert_eq!(err, SecretError::EnvUnset("FAN_KEY".to_string()));
    }

    #[test]
    fn env_secret_requires_variable_names() {
        let config = SecretsConfig {
            mode: SecretsMode::Env,
            storage_file: None,
        };
        let err = resolve_secret_with(&DeviceConfig::new("Den"), &config, Path::new("."), no_env)
            .unwrap_err();

        assert!(matches!(err, SecretError::MissingEnvName { field: "idEnv", .. }));
    }

    #[test]
    fn storage_secret_by_device_key_and_name() {
        let dir = scratch_dir("lookup");
        std::fs::write(
            dir.join(DEFAULT_SECRETS_FILE),
            r#"{"devices": {
                "office-fan": {"id": "stored-id", "key": "stored-key"},
                "Bedroom": {"id": "bed-id", "key": "bed-key"}
            }}"#,
        )
        .unwrap();
        let config = SecretsConfig {
            mode: SecretsMode::Storage,
            storage_file: None,
        };

        let office = DeviceConfig {
            device_key: Some("office-fan".to_string()),
            ..DeviceConfig::new("Office")
        };
        let secret = resolve_secret_with(&office, &config, &dir, no_env).unwrap();
        assert_eq!(secret, DeviceSecret::new("stored-id", "stored-key"));

        let bedroom = DeviceConfig::new("Bedroom");
        let secret = resolve_secret_with(&bedroom, &config, &dir, no_env).unwrap();
        assert_eq!(secret, DeviceSecret::new("bed-id", "bed-key"));

        let missing = DeviceConfig::new("Garage");
        let err = resolve_secret_with(&missing, &config, &dir, no_env).unwrap_err();
        assert!(matches!(err, SecretError::StorageEntryMissing { .. }));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn storage_secret_with_missing_file() {
        let dir = scratch_dir("missing");
        let config = SecretsConfig {
            mode: SecretsMode::Storage,
            storage_file: Some("absent.json".to_string()),
        };

        let err =
            resolve_secret_with(&DeviceConfig::new("Den"), &config, &dir, no_env).unwrap_err();
        assert!(matches!(err, SecretError::StorageUnreadable { .. }));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn debug_redacts_key() {
        let debug = format!("{:?}", DeviceSecret::new("id", "super-secret"));
        assert!(!debug.contains("super-secret"));
    }
}
