// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025-2026 Matter Labs

//! HTTP binding for the bootstrap service

#![deny(missing_docs)]
#![deny(clippy::all)]

use crate::service::ServiceError;
use actix_web::http::StatusCode;
use actix_web::{error, HttpRequest, HttpResponse, ResponseError};

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            // `NotFound` is translated by the orchestrator before it reaches
            // the transport; mapped anyway, no failure is silently swallowed.
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Unimplemented(_) => StatusCode::NOT_IMPLEMENTED,
            ServiceError::Cancelled(_) => StatusCode::REQUEST_TIMEOUT,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("application/json")
            .body(
                serde_json::json!({ "error": self.to_string() })
                    .to_string(),
            )
    }
}

/// Create a new json config
pub fn new_json_cfg() -> actix_web::web::JsonConfig {
    actix_web::web::JsonConfig::default()
        .limit(1024 * 1024)
        .error_handler(json_error_handler)
}

fn json_error_handler(err: error::JsonPayloadError, _: &HttpRequest) -> actix_web::Error {
    error::InternalError::from_response(
        "",
        HttpResponse::BadRequest()
            .content_type("application/json")
            .body(format!(r#"{{"error":"json error: {}"}}"#, err)),
    )
    .into()
}
