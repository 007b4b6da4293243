// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the fan bridge.
//!
//! Runtime failures inside the synchronization core (connection loss,
//! refresh failures, dropped commands) are logged rather than returned.
//! The types here cover the places where a caller can still act on an
//! error: configuration loading, secret resolution, value validation and
//! the transport trait boundary.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Device credentials could not be resolved.
    #[error("secret error: {0}")]
    Secret(#[from] SecretError),

    /// Error reported by the device transport.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The accessory task has already shut down.
    #[error("accessory is not running")]
    AccessoryStopped,
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A speed range whose lower bound exceeds its upper bound.
    #[error("invalid speed range [{min}, {max}]")]
    InvalidSpeedRange {
        /// Lowest speed step.
        min: u8,
        /// Highest speed step.
        max: u8,
    },
}

/// Errors raised while loading platform configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a configuration file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The data-point mapping is unusable.
    #[error("invalid mapping for device {device}: {source}")]
    InvalidMapping {
        /// The configured device name.
        device: String,
        /// What is wrong with the mapping.
        source: ValueError,
    },
}

/// Errors raised while resolving device credentials.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SecretError {
    /// An inline credential field is absent.
    #[error("missing inline {field} for device {device}")]
    MissingInline {
        /// The device name.
        device: String,
        /// Either `id` or `key`.
        field: &'static str,
    },

    /// The config does not name the environment variable to read.
    #[error("no {field} environment variable configured for device {device}")]
    MissingEnvName {
        /// The device name.
        device: String,
        /// Either `idEnv` or `keyEnv`.
        field: &'static str,
    },

    /// A named environment variable is unset or empty.
    #[error("environment variable {0} is not set")]
    EnvUnset(String),

    /// The secrets file could not be read or parsed.
    #[error("failed to load secrets file {path}: {message}")]
    StorageUnreadable {
        /// Path of the secrets file.
        path: String,
        /// Description of the failure.
        message: String,
    },

    /// The secrets file has no entry for this device.
    #[error("no entry {entry} in secrets file for device {device}")]
    StorageEntryMissing {
        /// The device name.
        device: String,
        /// The lookup key used in the secrets file.
        entry: String,
    },
}

/// Errors reported at the transport boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The device could not be located on the network.
    #[error("device not found: {0}")]
    NotFound(String),

    /// Connection to the device failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Writing a data point failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// A state refresh request failed.
    #[error("refresh failed: {0}")]
    RefreshFailed(String),

    /// The operation requires an open link.
    #[error("device is not connected")]
    NotConnected,

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::InvalidSpeedRange { min: 6, max: 1 };
        assert_eq!(err.to_string(), "invalid speed range [6, 1]");
    }

    #[test]
    fn error_from_transport_error() {
        let err: Error = TransportError::NotConnected.into();
        assert!(matches!(err, Error::Transport(TransportError::NotConnected)));
    }

    #[test]
    fn secret_error_display() {
        let err = SecretError::MissingInline {
            device: "Bedroom".to_string(),
            field: "key",
        };
        assert_eq!(err.to_string(), "missing inline key for device Bedroom");
    }

    #[test]
    fn config_error_wraps_mapping_problem() {
        let err = ConfigError::InvalidMapping {
            device: "Office".to_string(),
            source: ValueError::InvalidSpeedRange { min: 4, max: 2 },
        };
        assert_eq!(
            err.to_string(),
            "invalid mapping for device Office: invalid speed range [4, 2]"
        );
    }
}
