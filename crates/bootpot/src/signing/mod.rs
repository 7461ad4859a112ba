// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025-2026 Matter Labs

//! Response signing.
//!
//! Device-side verifiers reproduce the signed bytes, so all three choices are
//! pinned and versioned with the API:
//!
//! * encoding: compact JSON of [`BootstrapDataSigned`] in struct field order
//!   (`responses`, then `nonce`), no whitespace
//! * digest: SHA2-256
//! * scheme: RSASSA-PKCS1-v1_5

use crate::proto::BootstrapDataSigned;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Signing and verification errors
#[derive(Error, Debug)]
pub enum SigningError {
    /// The payload carries no responses, there is nothing to attest to
    #[error("refusing to sign an empty response payload")]
    EmptyPayload,
    /// Serializing the canonical payload failed
    #[error("serializing response payload")]
    Serialize(#[from] serde_json::Error),
    /// The RSA signing operation failed
    #[error("signing response payload")]
    Sign(#[source] rsa::errors::Error),
    /// The signature does not match the payload
    #[error("signature does not match response payload")]
    Verify(#[source] rsa::errors::Error),
}

/// The canonical byte serialization of a response payload.
pub fn canonical_bytes(payload: &BootstrapDataSigned) -> Result<Vec<u8>, SigningError> {
    Ok(serde_json::to_vec(payload)?)
}

/// SHA2-256 digest of the canonical payload bytes.
pub fn payload_digest(payload: &BootstrapDataSigned) -> Result<[u8; 32], SigningError> {
    Ok(Sha256::digest(canonical_bytes(payload)?).into())
}

/// Sign a response payload with the ownership certificate private key.
///
/// Fails without producing any signature bytes when the payload is empty.
pub fn sign_payload(
    payload: &BootstrapDataSigned,
    key: &RsaPrivateKey,
) -> Result<Vec<u8>, SigningError> {
    if payload.responses.is_empty() {
        return Err(SigningError::EmptyPayload);
    }
    let digest = payload_digest(payload)?;
    key.sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
        .map_err(SigningError::Sign)
}

/// Verify a response signature the way a device does.
pub fn verify_payload(
    payload: &BootstrapDataSigned,
    signature: &[u8],
    key: &RsaPublicKey,
) -> Result<(), SigningError> {
    if payload.responses.is_empty() {
        return Err(SigningError::EmptyPayload);
    }
    let digest = payload_digest(payload)?;
    key.verify(Pkcs1v15Sign::new::<Sha256>(), &digest, signature)
        .map_err(SigningError::Verify)
}
