// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025-2026 Matter Labs

//! Configuration handling
//!
//! Layered: built-in defaults, then an optional config file, then
//! `BOOTPOT_*` environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port to listen on
    pub port: u16,
    /// Path to the YAML inventory file
    pub inventory: PathBuf,
    /// Path to the ownership certificate, PEM encoded
    pub ownership_cert: PathBuf,
    /// Path to the RSA private key of the ownership certificate, PEM encoded
    pub signing_key: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8008,
            inventory: "config/inventory.yaml".into(),
            ownership_cert: "config/oc.pem".into(),
            signing_key: "config/oc_key.pem".into(),
        }
    }
}

/// Load the server configuration.
///
/// With no explicit `file`, `config/default.*` is used if present.
pub fn load_config(file: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);
    let builder = match file {
        Some(path) => builder.add_source(File::from(path.to_path_buf())),
        None => builder.add_source(File::with_name("config/default").required(false)),
    };
    builder
        .add_source(Environment::with_prefix("BOOTPOT").try_parsing(true))
        .build()?
        .try_deserialize()
}
