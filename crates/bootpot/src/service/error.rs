// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025-2026 Matter Labs

//! Error types of the bootstrap protocol core

use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Result type used throughout the protocol core
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Protocol-level error taxonomy.
///
/// `NotFound` is an internal resolver signal. The orchestrator translates it
/// to `InvalidArgument` before it reaches a caller.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Malformed request shape, unresolved chassis or policy violation
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Resolver miss, never surfaced raw at the protocol boundary
    #[error("not found: {0}")]
    NotFound(String),

    /// Failure not attributable to the request
    #[error("internal: {0}")]
    Internal(String),

    /// A capability not backed by a real provider
    #[error("unimplemented: {0}")]
    Unimplemented(String),

    /// The caller abandoned the request
    #[error("cancelled: {0}")]
    Cancelled(String),
}

impl ServiceError {
    /// Create a new invalid argument error
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }

    /// Create a new not found error
    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::NotFound(reason.into())
    }

    /// Create a new internal error
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal(reason.into())
    }

    /// Create a new unimplemented error
    pub fn unimplemented(reason: impl Into<String>) -> Self {
        Self::Unimplemented(reason.into())
    }

    /// Create a new cancelled error
    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::Cancelled(reason.into())
    }

    /// Prefix the error message with the serial number it is attributable to,
    /// keeping the error kind.
    pub fn for_serial(self, serial: &str) -> Self {
        let annotate = |msg: String| format!("{serial}: {msg}");
        match self {
            Self::InvalidArgument(msg) => Self::InvalidArgument(annotate(msg)),
            Self::NotFound(msg) => Self::NotFound(annotate(msg)),
            Self::Internal(msg) => Self::Internal(annotate(msg)),
            Self::Unimplemented(msg) => Self::Unimplemented(annotate(msg)),
            Self::Cancelled(msg) => Self::Cancelled(annotate(msg)),
        }
    }
}

/// Collects per-card fetch errors.
///
/// Every card's fetch is attempted before the request fails, so the caller
/// sees all failing cards, not the first one encountered.
#[derive(Debug, Default)]
pub struct ErrorList {
    errors: Vec<ServiceError>,
}

impl ErrorList {
    /// Add an error to the list
    pub fn add(&mut self, err: ServiceError) {
        self.errors.push(err);
    }

    /// Whether no error was collected
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of collected errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Collapse the list into a single error, or `None` if nothing failed.
    ///
    /// An aggregate consisting only of `Unimplemented` errors stays
    /// `Unimplemented`, so a missing provider is distinguishable from a
    /// genuine failure. Anything else is `Internal`.
    pub fn into_error(self) -> Option<ServiceError> {
        if self.errors.is_empty() {
            return None;
        }
        let all_unimplemented = self
            .errors
            .iter()
            .all(|e| matches!(e, ServiceError::Unimplemented(_)));
        let joined = self.to_string();
        Some(if all_unimplemented {
            ServiceError::Unimplemented(joined)
        } else {
            ServiceError::Internal(joined)
        })
    }
}

impl Display for ErrorList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for err in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
            first = false;
        }
        Ok(())
    }
}
