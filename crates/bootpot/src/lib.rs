// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025-2026 Matter Labs

//! Secure zero-touch bootstrap responder for network devices.
//!
//! A device (fixed-form chassis or modular chassis with control cards)
//! requests its initial software image and boot configuration. The responder
//! resolves the device against an inventory, enforces the secure-only boot
//! policy and returns the aggregated per-card artifacts, signed when the
//! device supplied a freshness nonce.

#![deny(missing_docs)]
#![deny(clippy::all)]

pub mod config;
pub mod inventory;
pub mod log;
pub mod pki;
pub mod proto;
pub mod server;
pub mod service;
pub mod signing;
