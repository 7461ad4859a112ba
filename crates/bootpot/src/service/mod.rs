// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025-2026 Matter Labs

//! The bootstrap protocol core.
//!
//! A request runs through a short linear state machine:
//! validate, resolve, policy check, aggregate, conditional sign, respond.
//! Any step short-circuits to an error, except aggregation, which attempts
//! every control card's fetch before deciding.

pub mod error;

pub use error::{ErrorList, Result, ServiceError};

use crate::inventory::{BootMode, ChassisEntity};
use crate::pki::SecurityArtifacts;
use crate::proto::{
    BootstrapDataResponse, BootstrapDataSigned, ChassisDescriptor, ControlCardDescriptor,
    GetBootstrapDataRequest, GetBootstrapDataResponse, ReportStatusRequest,
};
use crate::signing;
use async_trait::async_trait;
use futures::future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// The inventory contract the orchestrator consumes.
///
/// Implementations must support concurrent read access; many chassis
/// provision at the same time.
#[async_trait]
pub trait EntityManager: Send + Sync {
    /// Resolve a chassis descriptor to a provisioned chassis.
    fn resolve_chassis(&self, descriptor: &ChassisDescriptor)
        -> Result<Arc<ChassisEntity>>;

    /// Fetch the bootstrap artifact bundle for one control card, or for the
    /// chassis itself when `card` is `None`.
    async fn fetch_bootstrap_data(
        &self,
        chassis: &ChassisEntity,
        card: Option<&ControlCardDescriptor>,
    ) -> Result<BootstrapDataResponse>;

    /// Record device-reported status.
    fn set_status(&self, request: &ReportStatusRequest) -> Result<()>;
}

/// The bootstrap responder.
pub struct BootstrapService {
    em: Arc<dyn EntityManager>,
    artifacts: SecurityArtifacts,
}

impl BootstrapService {
    /// Create a new responder over an entity manager and the provisioned
    /// security artifacts.
    pub fn new(em: Arc<dyn EntityManager>, artifacts: SecurityArtifacts) -> Self {
        Self { em, artifacts }
    }

    /// Handle one bootstrap data request.
    ///
    /// `cancel` is the transport's deadline: when it fires, in-flight
    /// per-card fetches are abandoned and the request fails with
    /// [`ServiceError::Cancelled`]. A single card's fetch failure does not
    /// cancel its siblings; all fetches run to completion and every failure
    /// ends up in the aggregate error.
    pub async fn get_bootstrap_data(
        &self,
        request: &GetBootstrapDataRequest,
        cancel: &CancellationToken,
    ) -> Result<GetBootstrapDataResponse> {
        let descriptor = &request.chassis_descriptor;

        if descriptor.serial().is_none() && descriptor.control_cards.is_empty() {
            return Err(ServiceError::invalid_argument(
                "chassis descriptor carries neither a serial number nor control cards",
            ));
        }

        // Resolution failure is an unknown or malformed request, not an
        // internal error.
        let chassis = self.em.resolve_chassis(descriptor).map_err(|err| match err {
            ServiceError::NotFound(msg) => ServiceError::invalid_argument(format!(
                "failed to resolve chassis {descriptor}: {msg}"
            )),
            other => other,
        })?;
        info!(chassis = %chassis.name, "resolved chassis");

        if chassis.boot_mode == BootMode::SecureOnly && request.nonce.is_empty() {
            return Err(ServiceError::invalid_argument(format!(
                "chassis {} requires secure boot only, request carries no nonce",
                chassis.name
            )));
        }

        // One fetch per control card; a fixed-form chassis with no cards
        // gets exactly one fetch for the chassis itself.
        let (serials, fetches): (Vec<_>, Vec<_>) = if descriptor.control_cards.is_empty() {
            let serial = chassis
                .serial_number
                .clone()
                .unwrap_or_else(|| chassis.name.clone());
            (vec![serial], vec![self.em.fetch_bootstrap_data(&chassis, None)])
        } else {
            descriptor
                .control_cards
                .iter()
                .map(|card| {
                    (
                        card.serial_number.clone(),
                        self.em.fetch_bootstrap_data(&chassis, Some(card)),
                    )
                })
                .unzip()
        };

        let results = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(ServiceError::cancelled(
                    "bootstrap request abandoned by the caller",
                ));
            }
            results = future::join_all(fetches) => results,
        };

        let mut errs = ErrorList::default();
        let mut responses = Vec::with_capacity(results.len());
        for (serial, result) in serials.iter().zip(results) {
            match result {
                Ok(data) => responses.push(data),
                Err(err) => {
                    warn!(serial = %serial, error = %err, "failed to fetch bootstrap data");
                    errs.add(err.for_serial(serial));
                }
            }
        }
        // Partial success is never returned.
        if let Some(err) = errs.into_error() {
            return Err(err);
        }
        info!(responses = responses.len(), "fetched data for every control card");

        let signed_response = BootstrapDataSigned {
            responses,
            nonce: request.nonce.clone(),
        };

        // Sign if and only if the device supplied a nonce. Signing fails
        // closed; an envelope never claims a signature that was not produced.
        let response_signature = if request.nonce.is_empty() {
            None
        } else {
            let signature = signing::sign_payload(&signed_response, &self.artifacts.signing_key)
                .map_err(|err| {
                    ServiceError::internal(format!("failed to sign bootstrap response: {err}"))
                })?;
            info!("signed response with nonce");
            Some(signature)
        };

        Ok(GetBootstrapDataResponse {
            signed_response,
            ownership_certificate: self.artifacts.ownership_cert_pem.clone(),
            response_signature,
        })
    }

    /// Handle one status report. Forwarded to the inventory; store failures
    /// propagate unchanged.
    pub fn report_status(&self, request: &ReportStatusRequest) -> Result<()> {
        if request.states.is_empty() {
            return Err(ServiceError::invalid_argument(
                "status report carries no control card states",
            ));
        }
        self.em.set_status(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{BootstrapArtifacts, InMemoryEntityManager};
    use crate::proto::{BootstrapStatus, ControlCardState, ControlCardStatus, SoftwareImage};
    use rsa::{RsaPrivateKey, RsaPublicKey};
    use std::sync::OnceLock;

    fn test_key() -> RsaPrivateKey {
        static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
        KEY.get_or_init(|| RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap())
            .clone()
    }

    fn test_artifacts() -> SecurityArtifacts {
        SecurityArtifacts {
            ownership_cert_pem: "-----BEGIN CERTIFICATE-----\n...\n-----END CERTIFICATE-----\n"
                .to_string(),
            signing_key: test_key(),
        }
    }

    fn artifacts_bundle() -> BootstrapArtifacts {
        BootstrapArtifacts {
            software_image: Some(SoftwareImage {
                name: "os".to_string(),
                version: "24.4.1".to_string(),
                url: "https://images.example.com/os-24.4.1.img".to_string(),
                os_image_hash: "d2a84f4b8b650937ec8f73cd8be2c74add5a911ba64df27458ed8229da804a26"
                    .to_string(),
                hash_algorithm: "SHA256".to_string(),
            }),
            boot_config: None,
        }
    }

    fn demo_inventory() -> Vec<ChassisEntity> {
        vec![
            ChassisEntity {
                name: "modular".to_string(),
                control_cards: vec!["123A".to_string(), "123B".to_string()],
                boot_mode: BootMode::SecureOnly,
                bootstrap: Some(artifacts_bundle()),
                ..Default::default()
            },
            ChassisEntity {
                name: "fixed".to_string(),
                manufacturer: Some("Cisco".to_string()),
                serial_number: Some("456".to_string()),
                boot_mode: BootMode::SecureOnly,
                bootstrap: Some(artifacts_bundle()),
                ..Default::default()
            },
            ChassisEntity {
                name: "open".to_string(),
                serial_number: Some("789".to_string()),
                boot_mode: BootMode::Unspecified,
                bootstrap: Some(artifacts_bundle()),
                ..Default::default()
            },
        ]
    }

    fn demo_service() -> BootstrapService {
        let em = Arc::new(InMemoryEntityManager::new(demo_inventory()).unwrap());
        BootstrapService::new(em, test_artifacts())
    }

    fn request(serial: Option<&str>, cards: &[&str], nonce: &str) -> GetBootstrapDataRequest {
        GetBootstrapDataRequest {
            chassis_descriptor: ChassisDescriptor {
                manufacturer: Some("Cisco".to_string()),
                serial_number: serial.map(ToString::to_string),
                control_cards: cards
                    .iter()
                    .map(|s| ControlCardDescriptor {
                        serial_number: s.to_string(),
                        ..Default::default()
                    })
                    .collect(),
            },
            nonce: nonce.to_string(),
        }
    }

    /// Injects per-serial fetch failures around the in-memory inventory.
    struct FlakyEntityManager {
        inner: InMemoryEntityManager,
        fail_cards: Vec<String>,
        fail_status: bool,
    }

    #[async_trait]
    impl EntityManager for FlakyEntityManager {
        fn resolve_chassis(
            &self,
            descriptor: &ChassisDescriptor,
        ) -> Result<Arc<ChassisEntity>> {
            self.inner.resolve_chassis(descriptor)
        }

        async fn fetch_bootstrap_data(
            &self,
            chassis: &ChassisEntity,
            card: Option<&ControlCardDescriptor>,
        ) -> Result<BootstrapDataResponse> {
            if let Some(card) = card {
                if self.fail_cards.contains(&card.serial_number) {
                    return Err(ServiceError::internal("artifact store unreachable"));
                }
            }
            self.inner.fetch_bootstrap_data(chassis, card).await
        }

        fn set_status(&self, request: &ReportStatusRequest) -> Result<()> {
            if self.fail_status {
                return Err(ServiceError::internal("status store unreachable"));
            }
            self.inner.set_status(request)
        }
    }

    fn flaky_service(fail_cards: &[&str], fail_status: bool) -> BootstrapService {
        let em = Arc::new(FlakyEntityManager {
            inner: InMemoryEntityManager::new(demo_inventory()).unwrap(),
            fail_cards: fail_cards.iter().map(ToString::to_string).collect(),
            fail_status,
        });
        BootstrapService::new(em, test_artifacts())
    }

    #[tokio::test]
    async fn test_descriptor_without_identity_rejected() {
        let service = demo_service();
        let err = service
            .get_bootstrap_data(&request(None, &[], "abc123"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)), "got {err}");
    }

    #[tokio::test]
    async fn test_unknown_chassis_surfaces_invalid_argument() {
        let service = demo_service();
        let err = service
            .get_bootstrap_data(&request(Some("999"), &[], "abc123"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)), "got {err}");
        assert!(err.to_string().contains("999"), "got {err}");
    }

    #[tokio::test]
    async fn test_secure_only_chassis_rejects_empty_nonce() {
        let service = demo_service();
        let err = service
            .get_bootstrap_data(&request(Some("456"), &[], ""), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)), "got {err}");
        assert!(err.to_string().contains("secure boot"), "got {err}");
    }

    #[tokio::test]
    async fn test_nonce_produces_verifiable_signature() {
        let service = demo_service();
        let response = service
            .get_bootstrap_data(&request(Some("456"), &[], "abc123"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.signed_response.responses.len(), 1);
        assert_eq!(response.signed_response.responses[0].serial_number, "456");
        assert_eq!(response.signed_response.nonce, "abc123");
        assert!(response.ownership_certificate.contains("CERTIFICATE"));

        let signature = response.response_signature.as_deref().unwrap();
        let public = RsaPublicKey::from(&test_key());
        signing::verify_payload(&response.signed_response, signature, &public).unwrap();
    }

    #[tokio::test]
    async fn test_empty_nonce_returns_unsigned_envelope() {
        let service = demo_service();
        let response = service
            .get_bootstrap_data(&request(Some("789"), &[], ""), &CancellationToken::new())
            .await
            .unwrap();
        assert!(response.response_signature.is_none());
        assert!(response.signed_response.nonce.is_empty());
    }

    #[tokio::test]
    async fn test_modular_chassis_responses_in_request_order() {
        let service = demo_service();
        let response = service
            .get_bootstrap_data(
                &request(None, &["123A", "123B"], "x"),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let serials: Vec<_> = response
            .signed_response
            .responses
            .iter()
            .map(|r| r.serial_number.as_str())
            .collect();
        assert_eq!(serials, ["123A", "123B"]);
        assert!(response.response_signature.is_some());
    }

    #[tokio::test]
    async fn test_single_card_failure_fails_the_request() {
        let service = flaky_service(&["123B"], false);
        let err = service
            .get_bootstrap_data(
                &request(None, &["123A", "123B"], "x"),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)), "got {err}");
        assert!(err.to_string().contains("123B"), "got {err}");
    }

    #[tokio::test]
    async fn test_every_failing_card_appears_in_the_error() {
        let service = flaky_service(&["123A", "123B"], false);
        let err = service
            .get_bootstrap_data(
                &request(None, &["123A", "123B"], "x"),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("123A"), "got {msg}");
        assert!(msg.contains("123B"), "got {msg}");
    }

    #[tokio::test]
    async fn test_missing_provider_surfaces_unimplemented() {
        let em = Arc::new(
            InMemoryEntityManager::new([ChassisEntity {
                name: "bare".to_string(),
                serial_number: Some("111".to_string()),
                bootstrap: None,
                ..Default::default()
            }])
            .unwrap(),
        );
        let service = BootstrapService::new(em, test_artifacts());
        let err = service
            .get_bootstrap_data(&request(Some("111"), &[], "x"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unimplemented(_)), "got {err}");
    }

    #[tokio::test]
    async fn test_cancelled_caller_abandons_the_request() {
        let service = demo_service();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = service
            .get_bootstrap_data(&request(Some("456"), &[], "x"), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Cancelled(_)), "got {err}");
    }

    #[tokio::test]
    async fn test_status_report_forwarded_to_inventory() {
        let em = Arc::new(InMemoryEntityManager::new(demo_inventory()).unwrap());
        let service = BootstrapService::new(em.clone(), test_artifacts());

        service
            .report_status(&ReportStatusRequest {
                status: BootstrapStatus::Success,
                status_message: "ok".to_string(),
                states: vec![ControlCardState {
                    serial_number: "123A".to_string(),
                    status: ControlCardStatus::Synced,
                }],
            })
            .unwrap();
        assert_eq!(em.last_status("123A"), Some(ControlCardStatus::Synced));
    }

    #[tokio::test]
    async fn test_status_report_requires_states() {
        let service = demo_service();
        let err = service
            .report_status(&ReportStatusRequest::default())
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)), "got {err}");
    }

    #[tokio::test]
    async fn test_status_store_failure_propagates() {
        let service = flaky_service(&[], true);
        let err = service
            .report_status(&ReportStatusRequest {
                states: vec![ControlCardState::default()],
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)), "got {err}");
    }
}
