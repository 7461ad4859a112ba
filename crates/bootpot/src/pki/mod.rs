// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025-2026 Matter Labs

//! Ownership certificate and signing key handling.
//!
//! The ownership certificate and its private key are provisioned by the PKI
//! subsystem. The responder only consumes them: the certificate is presented
//! to the device in the response envelope, the key signs response payloads.

use anyhow::{Context, Result};
use rsa::{
    pkcs1::DecodeRsaPrivateKey, pkcs8::DecodePrivateKey, RsaPrivateKey,
};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;
use x509_cert::{
    der::{DecodePem, Encode},
    Certificate,
};
use zeroize::Zeroizing;

/// The security artifacts the responder presents and signs with.
#[derive(Debug)]
pub struct SecurityArtifacts {
    /// The ownership certificate, PEM encoded as presented to devices
    pub ownership_cert_pem: String,
    /// The private key of the ownership certificate
    pub signing_key: RsaPrivateKey,
}

impl SecurityArtifacts {
    /// Load the artifacts from PEM files.
    ///
    /// The certificate is parsed so a malformed artifact fails at startup,
    /// not in the middle of a device's bootstrap.
    pub fn load(cert_path: impl AsRef<Path>, key_path: impl AsRef<Path>) -> Result<Self> {
        let cert_path = cert_path.as_ref();
        let key_path = key_path.as_ref();

        let ownership_cert_pem = std::fs::read_to_string(cert_path)
            .with_context(|| format!("reading ownership certificate {}", cert_path.display()))?;
        let cert = Certificate::from_pem(ownership_cert_pem.as_bytes())
            .with_context(|| format!("parsing ownership certificate {}", cert_path.display()))?;
        let fingerprint = hex::encode(Sha256::digest(
            cert.to_der().context("re-encoding ownership certificate")?,
        ));
        info!(%fingerprint, "loaded ownership certificate");

        let key_pem = Zeroizing::new(
            std::fs::read_to_string(key_path)
                .with_context(|| format!("reading signing key {}", key_path.display()))?,
        );
        let signing_key = RsaPrivateKey::from_pkcs8_pem(&key_pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(&key_pem))
            .with_context(|| format!("parsing RSA signing key {}", key_path.display()))?;

        Ok(Self {
            ownership_cert_pem,
            signing_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs8::{EncodePrivateKey, LineEnding};

    #[test]
    fn test_load_rejects_garbage_cert() {
        let dir = std::env::temp_dir().join("bootpot-pki-test");
        std::fs::create_dir_all(&dir).unwrap();
        let cert = dir.join("oc.pem");
        let key = dir.join("oc_key.pem");
        std::fs::write(&cert, "not a certificate").unwrap();

        let pem = RsaPrivateKey::new(&mut rand::thread_rng(), 2048)
            .unwrap()
            .to_pkcs8_pem(LineEnding::LF)
            .unwrap();
        std::fs::write(&key, pem.as_bytes()).unwrap();

        let err = SecurityArtifacts::load(&cert, &key).unwrap_err();
        assert!(
            err.to_string().contains("parsing ownership certificate"),
            "got {err:#}"
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = SecurityArtifacts::load("/nonexistent/oc.pem", "/nonexistent/key.pem")
            .unwrap_err();
        assert!(
            err.to_string().contains("reading ownership certificate"),
            "got {err:#}"
        );
    }
}
