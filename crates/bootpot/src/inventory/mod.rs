// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025-2026 Matter Labs

//! In-memory implementation of the inventory an organization provisions its
//! devices from.
//!
//! The inventory is a map from chassis and control-card serial numbers to the
//! owning [`ChassisEntity`]. It is read concurrently by every in-flight
//! bootstrap request; runtime updates swap the whole index so no reader ever
//! observes a partially updated entity.

use crate::proto::{
    BootstrapDataResponse, ChassisDescriptor, ControlCardDescriptor, ControlCardStatus,
    ReportStatusRequest, SoftwareImage,
};
use crate::service::{EntityManager, ServiceError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::info;

/// Boot policy of a chassis
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BootMode {
    /// No policy, unauthenticated bootstrap is allowed
    #[default]
    Unspecified,
    /// Only authenticated (nonce and signature) bootstrap is allowed
    SecureOnly,
}

/// The artifacts handed to a chassis and its cards during bootstrap
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapArtifacts {
    /// The software image to boot
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub software_image: Option<SoftwareImage>,
    /// Opaque boot configuration
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub boot_config: Option<Value>,
}

/// A provisioned chassis as recorded in the inventory.
///
/// Immutable once resolved for the duration of a request; requests hold an
/// `Arc` reference, never a copy.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChassisEntity {
    /// Inventory name of the chassis
    pub name: String,
    /// Manufacturer name
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub manufacturer: Option<String>,
    /// Chassis serial number of a fixed-form chassis
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub serial_number: Option<String>,
    /// Serial numbers of the control cards of a modular chassis
    #[serde(default)]
    pub control_cards: Vec<String>,
    /// Boot policy
    #[serde(default)]
    pub boot_mode: BootMode,
    /// Bootstrap artifacts, absent when no provider backs this chassis yet
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bootstrap: Option<BootstrapArtifacts>,
}

/// The on-disk inventory file
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InventoryFile {
    /// All provisioned chassis
    pub chassis: Vec<ChassisEntity>,
}

/// Inventory loading errors
#[derive(Error, Debug)]
pub enum InventoryError {
    /// Reading the inventory file failed
    #[error("reading inventory file `{path}`")]
    Io {
        /// The file that failed to read
        path: String,
        /// The underlying I/O error
        source: std::io::Error,
    },
    /// Parsing the inventory file failed
    #[error("parsing inventory file")]
    Parse(#[from] serde_yaml::Error),
    /// The same serial number is claimed by more than one entity
    #[error("serial number `{0}` is claimed by more than one chassis")]
    DuplicateSerial(String),
    /// An entity carries neither a serial number nor control cards
    #[error("chassis `{0}` has neither a serial number nor control cards")]
    NoIdentity(String),
}

/// In-memory entity manager, indexed by serial number.
#[derive(Debug, Default)]
pub struct InMemoryEntityManager {
    inventory: RwLock<HashMap<String, Arc<ChassisEntity>>>,
    status: RwLock<HashMap<String, ControlCardStatus>>,
}

fn index(
    entities: impl IntoIterator<Item = ChassisEntity>,
) -> Result<HashMap<String, Arc<ChassisEntity>>, InventoryError> {
    let mut inventory = HashMap::new();
    for entity in entities {
        let entity = Arc::new(entity);
        if entity.serial_number.is_none() && entity.control_cards.is_empty() {
            return Err(InventoryError::NoIdentity(entity.name.clone()));
        }
        for serial in entity
            .serial_number
            .iter()
            .chain(entity.control_cards.iter())
        {
            if inventory
                .insert(serial.clone(), entity.clone())
                .is_some()
            {
                return Err(InventoryError::DuplicateSerial(serial.clone()));
            }
        }
    }
    Ok(inventory)
}

impl InMemoryEntityManager {
    /// Create an entity manager from a list of provisioned chassis.
    pub fn new(
        entities: impl IntoIterator<Item = ChassisEntity>,
    ) -> Result<Self, InventoryError> {
        Ok(Self {
            inventory: RwLock::new(index(entities)?),
            status: RwLock::new(HashMap::new()),
        })
    }

    /// Parse an inventory from its YAML representation.
    pub fn from_yaml(yaml: &str) -> Result<Self, InventoryError> {
        let file: InventoryFile = serde_yaml::from_str(yaml)?;
        Self::new(file.chassis)
    }

    /// Load an inventory from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, InventoryError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| InventoryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    /// Replace the whole inventory.
    ///
    /// The new index is built before the lock is taken, so concurrent readers
    /// see either the old or the new inventory, never a mix.
    pub fn replace(
        &self,
        entities: impl IntoIterator<Item = ChassisEntity>,
    ) -> Result<(), InventoryError> {
        let new = index(entities)?;
        *self
            .inventory
            .write()
            .unwrap_or_else(|e| e.into_inner()) = new;
        Ok(())
    }

    /// Number of serial numbers in the index
    pub fn len(&self) -> usize {
        self.inventory
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Whether the inventory is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The last status a device reported for a control card serial.
    pub fn last_status(&self, serial: &str) -> Option<ControlCardStatus> {
        self.status
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(serial)
            .copied()
    }
}

#[async_trait]
impl EntityManager for InMemoryEntityManager {
    fn resolve_chassis(
        &self,
        descriptor: &ChassisDescriptor,
    ) -> Result<Arc<ChassisEntity>, ServiceError> {
        let inventory = self.inventory.read().unwrap_or_else(|e| e.into_inner());

        // A fixed form factor chassis is resolved by its own serial number
        // and never falls through to control card resolution.
        if let Some(serial) = descriptor.serial() {
            return inventory.get(serial).cloned().ok_or_else(|| {
                ServiceError::not_found(format!(
                    "fixed form factor chassis {serial} not in inventory"
                ))
            });
        }

        // A modular chassis is resolved by the first of its control cards
        // found in inventory. Cards not found are skipped.
        for card in &descriptor.control_cards {
            if let Some(chassis) = inventory.get(card.serial_number.as_str()) {
                return Ok(chassis.clone());
            }
        }

        Err(ServiceError::not_found(format!(
            "chassis descriptor {descriptor} not in inventory"
        )))
    }

    async fn fetch_bootstrap_data(
        &self,
        chassis: &ChassisEntity,
        card: Option<&ControlCardDescriptor>,
    ) -> Result<BootstrapDataResponse, ServiceError> {
        let serial = match card {
            Some(card) => card.serial_number.clone(),
            None => chassis
                .serial_number
                .clone()
                .unwrap_or_else(|| chassis.name.clone()),
        };

        let artifacts = chassis.bootstrap.as_ref().ok_or_else(|| {
            ServiceError::unimplemented(format!(
                "no bootstrap data provider backs chassis {}",
                chassis.name
            ))
        })?;

        Ok(BootstrapDataResponse {
            serial_number: serial,
            software_image: artifacts.software_image.clone(),
            boot_config: artifacts.boot_config.clone(),
        })
    }

    fn set_status(&self, request: &ReportStatusRequest) -> Result<(), ServiceError> {
        info!(
            status = ?request.status,
            message = %request.status_message,
            cards = request.states.len(),
            "status report"
        );
        let mut status = self.status.write().unwrap_or_else(|e| e.into_inner());
        for state in &request.states {
            status.insert(state.serial_number.clone(), state.status);
        }
        Ok(())
    }
}
