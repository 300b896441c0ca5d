//! The module contains the error the engine can throw.
//!
//! Every variant except [`Database`] carries the exact text shown to the
//! user; the handler replies with the `Display` string verbatim.
//!
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// No pattern matched, or more than one matched.
    #[error("{0}")]
    Routing(String),
    /// Field-level or business-rule violation, including the duplicate guard.
    #[error("{0}")]
    Validation(String),
    /// Referenced expense/loan/card does not exist for this user.
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Routing(a), Self::Routing(b)) => a == b,
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
