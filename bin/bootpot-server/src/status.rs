// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025-2026 Matter Labs

//! post status report

use crate::ServerState;
use actix_web::web;
use bootpot::proto::{EmptyResponse, ReportStatusRequest};
use bootpot::service::ServiceError;
use std::sync::Arc;
use tracing::instrument;

/// Status report command
#[instrument(level = "info", name = "/v1/status", skip_all)]
pub async fn post_status(
    state: web::Data<Arc<ServerState>>,
    item: web::Json<ReportStatusRequest>,
) -> Result<web::Json<EmptyResponse>, ServiceError> {
    state.service.report_status(&item)?;
    Ok(web::Json(EmptyResponse {}))
}
