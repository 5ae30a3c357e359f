//! The module contains the error the engine can throw.
//!
//! Every precondition failure of a booking or property operation surfaces as
//! one of these variants:
//!
//! - [`KeyNotFound`] thrown when a property, booking or user is absent.
//! - [`InvalidArgument`] thrown for malformed dates, prices or text fields.
//! - [`InvalidState`] thrown when the target resource cannot accept the
//!   operation (an inactive property, a property with bookings).
//! - [`InvalidTransition`] thrown when a booking status edge does not exist.
//! - [`Conflict`] thrown when a confirmed booking overlaps the requested stay.
//! - [`Forbidden`] thrown when the caller is not allowed to act.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`InvalidArgument`]: EngineError::InvalidArgument
//!  [`InvalidState`]: EngineError::InvalidState
//!  [`InvalidTransition`]: EngineError::InvalidTransition
//!  [`Conflict`]: EngineError::Conflict
//!  [`Forbidden`]: EngineError::Forbidden
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Machine-readable kind reported to API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::KeyNotFound(_) => "not_found",
            Self::ExistingKey(_) | Self::Conflict(_) => "conflict",
            Self::InvalidArgument(_) | Self::InvalidId(_) => "invalid_argument",
            Self::InvalidState(_) => "invalid_state",
            Self::InvalidTransition(_) => "invalid_transition",
            Self::Forbidden(_) => "forbidden",
            Self::Unauthorized(_) => "unauthorized",
            Self::Database(_) if self.is_transient() => "unavailable",
            Self::Database(_) => "internal",
        }
    }

    /// Returns `true` for storage failures that a later retry may not hit
    /// (lost connection, pool exhaustion).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Database(DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidArgument(a), Self::InvalidArgument(b)) => a == b,
            (Self::InvalidState(a), Self::InvalidState(b)) => a == b,
            (Self::InvalidTransition(a), Self::InvalidTransition(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
