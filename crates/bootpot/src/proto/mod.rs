// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025-2026 Matter Labs

//! Wire types for the bootstrap HTTP JSON API.
//!
//! [`BootstrapDataSigned`] is the exact signing target. Its canonical
//! encoding is pinned in the [`crate::signing`] module and must not change
//! without versioning the API, since device-side verifiers reproduce the
//! bytes from this structure.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{base64::Base64, serde_as};
use std::fmt::Display;

/// Identifies one pluggable control card of a modular chassis.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlCardDescriptor {
    /// Serial number, unique within the inventory
    pub serial_number: String,
    /// Vendor part number
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub part_number: Option<String>,
    /// Slot the card is seated in
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub slot: Option<i32>,
}

/// Identifies the chassis making a bootstrap request.
///
/// A fixed-form chassis carries its own serial number. A modular chassis
/// carries no chassis serial and is identified through its control cards.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChassisDescriptor {
    /// Manufacturer name
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub manufacturer: Option<String>,
    /// Chassis serial number of a fixed-form chassis
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub serial_number: Option<String>,
    /// Control cards of a modular chassis, in slot order
    #[serde(default)]
    pub control_cards: Vec<ControlCardDescriptor>,
}

impl ChassisDescriptor {
    /// The chassis serial number, if present and non-empty.
    pub fn serial(&self) -> Option<&str> {
        self.serial_number.as_deref().filter(|s| !s.is_empty())
    }
}

impl Display for ChassisDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(serde_json::to_string(self).unwrap_or("{}".into()).as_str())
    }
}

/// The bootstrap data request
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct GetBootstrapDataRequest {
    /// The requesting chassis
    pub chassis_descriptor: ChassisDescriptor,
    /// Freshness token supplied by the device.
    ///
    /// A non-empty nonce makes the responder sign the response.
    #[serde(default)]
    pub nonce: String,
}

impl GetBootstrapDataRequest {
    /// The bootstrap request URL
    pub const URL: &'static str = "/v1/bootstrap";
}

/// A software image artifact reference
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareImage {
    /// Image name
    pub name: String,
    /// Image version
    pub version: String,
    /// Where the device downloads the image from
    pub url: String,
    /// Image hash, hex encoded
    pub os_image_hash: String,
    /// Hash algorithm of `os_image_hash`
    pub hash_algorithm: String,
}

/// The bootstrap artifact bundle for one control card, or for a fixed-form
/// chassis as a whole.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapDataResponse {
    /// Serial number this bundle is for
    pub serial_number: String,
    /// The software image to boot
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub software_image: Option<SoftwareImage>,
    /// Opaque boot configuration
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub boot_config: Option<Value>,
}

/// The signing target: every per-card response plus the request nonce.
///
/// The signature covers this structure and nothing else. Field order is part
/// of the canonical encoding.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapDataSigned {
    /// Per-card responses, in request order
    pub responses: Vec<BootstrapDataResponse>,
    /// The nonce from the originating request
    #[serde(default)]
    pub nonce: String,
}

/// The bootstrap data response envelope
#[serde_as]
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetBootstrapDataResponse {
    /// The signed payload
    pub signed_response: BootstrapDataSigned,
    /// The ownership certificate, PEM encoded
    pub ownership_certificate: String,
    /// Signature over the canonical `signed_response` bytes, base64 encoded.
    ///
    /// Present if and only if the originating request carried a non-empty
    /// nonce.
    #[serde_as(as = "Option<Base64>")]
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub response_signature: Option<Vec<u8>>,
}

/// Progress of a device's bootstrap attempt
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BootstrapStatus {
    /// No status reported
    #[default]
    Unspecified,
    /// Bootstrap has started
    Initiated,
    /// Bootstrap completed successfully
    Success,
    /// Bootstrap failed
    Failure,
}

/// State of one control card as reported by the device
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlCardStatus {
    /// No state reported
    #[default]
    Unspecified,
    /// The card is not seated
    NotPresent,
    /// The card booted its image
    Initialized,
    /// The card converged with the active configuration
    Synced,
}

/// Per-card state within a status report
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlCardState {
    /// Serial number of the card
    pub serial_number: String,
    /// Reported state
    #[serde(default)]
    pub status: ControlCardStatus,
}

/// Device-reported bootstrap status, forwarded verbatim to the inventory.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStatusRequest {
    /// Overall status
    #[serde(default)]
    pub status: BootstrapStatus,
    /// Free-form status message
    #[serde(default)]
    pub status_message: String,
    /// Per-card states
    #[serde(default)]
    pub states: Vec<ControlCardState>,
}

impl ReportStatusRequest {
    /// The status report URL
    pub const URL: &'static str = "/v1/status";
}

/// The status report acknowledgment
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyResponse {}
