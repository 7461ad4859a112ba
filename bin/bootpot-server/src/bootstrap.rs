// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025-2026 Matter Labs

//! post bootstrap data request

use crate::ServerState;
use actix_web::web;
use bootpot::proto::{GetBootstrapDataRequest, GetBootstrapDataResponse};
use bootpot::service::ServiceError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Bootstrap data command
#[instrument(level = "info", name = "/v1/bootstrap", skip_all)]
pub async fn post_bootstrap(
    state: web::Data<Arc<ServerState>>,
    item: web::Json<GetBootstrapDataRequest>,
) -> Result<web::Json<GetBootstrapDataResponse>, ServiceError> {
    // The HTTP layer carries no deadline of its own; a dropped connection
    // drops this future and the in-flight fetches with it.
    let cancel = CancellationToken::new();
    let response = state.service.get_bootstrap_data(&item, &cancel).await?;
    Ok(web::Json(response))
}
