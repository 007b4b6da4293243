// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Platform configuration.
//!
//! The host hands the bridge a JSON document listing the fans to expose.
//! [`PlatformConfig`] mirrors that document; [`ResolvedDevice`] is what a
//! single entry becomes once credentials, mapping and feature flags have
//! been resolved.
//!
//! # Examples
//!
//! ```
//! use ceilfan_bridge::config::PlatformConfig;
//!
//! let config = PlatformConfig::from_json_str(r#"{
//!     "name": "Fans",
//!     "pollingIntervalSeconds": 30,
//!     "devices": [
//!         { "name": "Bedroom", "id": "abc123", "key": "0123456789abcdef" }
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(config.devices.len(), 1);
//! assert_eq!(config.polling_interval().as_secs(), 30);
//! ```

mod secrets;

pub use secrets::{
    DEFAULT_SECRETS_FILE, DeviceSecret, SecretsConfig, SecretsMode, resolve_secret,
    resolve_secret_with,
};

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::mapping::{DpsMapping, DpsMappingOverrides, FeatureFlags, FeatureOverrides};

/// Default polling interval in seconds.
pub const DEFAULT_POLLING_INTERVAL_SECS: u64 = 15;

/// Model string reported when a device entry does not name one.
pub const DEFAULT_MODEL: &str = "CREATE Ceiling Fan";

/// Top-level platform configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    /// Display name of the platform instance.
    #[serde(default)]
    pub name: String,
    /// Configured fans.
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
    /// Seconds between full state refreshes; `0` disables polling.
    #[serde(default = "default_polling_interval")]
    pub polling_interval_seconds: u64,
    /// Where device credentials come from.
    #[serde(default)]
    pub secrets: SecretsConfig,
}

fn default_polling_interval() -> u64 {
    DEFAULT_POLLING_INTERVAL_SECS
}

impl PlatformConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Json` if the document is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, or
    /// `ConfigError::Json` if it is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Polling interval as a duration.
    #[must_use]
    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.polling_interval_seconds)
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            devices: Vec::new(),
            polling_interval_seconds: DEFAULT_POLLING_INTERVAL_SECS,
            secrets: SecretsConfig::default(),
        }
    }
}

/// One fan entry as written in the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfig {
    /// Display name.
    pub name: String,
    /// Device id (inline secrets mode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Local key (inline secrets mode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Environment variable holding the device id (env secrets mode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_env: Option<String>,
    /// Environment variable holding the local key (env secrets mode).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_env: Option<String>,
    /// Entry name in the secrets file (storage mode); defaults to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_key: Option<String>,
    /// Model string shown by the host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Data-point overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<DpsMappingOverrides>,
    /// Feature flag overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureOverrides>,
}

impl DeviceConfig {
    /// Creates an entry with just a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets inline credentials.
    #[must_use]
    pub fn with_inline_secret(mut self, id: impl Into<String>, key: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self.key = Some(key.into());
        self
    }

    /// Sets data-point overrides.
    #[must_use]
    pub fn with_mapping(mut self, mapping: DpsMappingOverrides) -> Self {
        self.mapping = Some(mapping);
        self
    }

    /// Sets feature flag overrides.
    #[must_use]
    pub fn with_features(mut self, features: FeatureOverrides) -> Self {
        self.features = Some(features);
        self
    }
}

/// A fan entry with credentials, mapping and features resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDevice {
    /// Display name.
    pub name: String,
    /// Device id.
    pub id: String,
    /// Local key.
    pub key: String,
    /// Model string.
    pub model: String,
    /// Data-point mapping.
    pub mapping: DpsMapping,
    /// Exposed controls.
    pub features: FeatureFlags,
}

impl ResolvedDevice {
    /// Combines a configuration entry with its resolved credentials.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidMapping` if the mapping overrides do
    /// not form a valid mapping.
    pub fn resolve(device: &DeviceConfig, secret: DeviceSecret) -> Result<Self, ConfigError> {
        let mapping = DpsMapping::resolve(device.mapping.as_ref()).map_err(|source| {
            ConfigError::InvalidMapping {
                device: device.name.clone(),
                source,
            }
        })?;
        let features = FeatureFlags::resolve(&mapping, device.features.as_ref());

        Ok(Self {
            name: device.name.clone(),
            id: secret.id,
            key: secret.key,
            model: device
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            mapping,
            features,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DpsId;

    #[test]
    fn defaults_are_applied() {
        let config = PlatformConfig::from_json_str("{}").unwrap();

        assert_eq!(config.polling_interval_seconds, 15);
        assert_eq!(config.secrets.mode, SecretsMode::Inline);
        assert!(config.devices.is_empty());
    }

    #[test]
    fn parses_full_device_entry() {
        let config = PlatformConfig::from_json_str(
            r#"{
                "name": "Fans",
                "secrets": { "mode": "storage", "storageFile": "fans.json" },
                "devices": [{
                    "name": "Office",
                    "deviceKey": "office-fan",
                    "model": "Windcalm",
                    "mapping": { "fanSpeedMax": 3, "timerDps": null },
                    "features": { "enableLight": false }
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(config.secrets.mode, SecretsMode::Storage);
        assert_eq!(config.secrets.storage_file.as_deref(), Some("fans.json"));

        let device = &config.devices[0];
        assert_eq!(device.device_key.as_deref(), Some("office-fan"));
        assert_eq!(
            device.mapping.as_ref().and_then(|m| m.fan_speed_max),
            Some(3)
        );
        assert_eq!(device.mapping.as_ref().and_then(|m| m.timer_dps), Some(None));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let result = PlatformConfig::from_json_str(r#"{"devices": 5}"#);
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn load_reports_missing_file() {
        let result = PlatformConfig::load("/nonexistent/ceilfan/config.json");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn resolve_device_applies_defaults() {
        let device = DeviceConfig::new("Bedroom");
        let secret = DeviceSecret::new("dev-id", "dev-key");
        let resolved = ResolvedDevice::resolve(&device, secret).unwrap();

        assert_eq!(resolved.model, DEFAULT_MODEL);
        assert_eq!(resolved.id, "dev-id");
        assert_eq!(resolved.mapping.fan_power, DpsId::new(60));
        assert!(resolved.features.enable_light);
    }

    #[test]
    fn resolve_device_rejects_bad_speed_range() {
        let device = DeviceConfig::new("Broken").with_mapping(DpsMappingOverrides {
            fan_speed_min: Some(5),
            fan_speed_max: Some(2),
            ..DpsMappingOverrides::default()
        });
        let result = ResolvedDevice::resolve(&device, DeviceSecret::new("a", "b"));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidMapping { ref device, .. }) if device == "Broken"
        ));
    }
}
