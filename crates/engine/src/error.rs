//! The module contains the errors the engine can throw.
//!
//! The errors are grouped as follows:
//!
//! - validation: [`InvalidAmount`], [`InvalidName`], [`InvalidId`],
//!   [`InvalidDate`], [`InvalidKind`]. Always raised before any write.
//! - [`InsufficientFunds`] thrown when a debit would drive a balance negative.
//! - [`CategoryTypeMismatch`] thrown when a category disagrees with the
//!   operation kind.
//! - [`NotFound`] thrown when an account, category or operation is missing.
//! - storage: [`Database`] and [`Timeout`]. The unit of work is rolled back.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidName`]: EngineError::InvalidName
//!  [`InvalidId`]: EngineError::InvalidId
//!  [`InvalidDate`]: EngineError::InvalidDate
//!  [`InvalidKind`]: EngineError::InvalidKind
//!  [`InsufficientFunds`]: EngineError::InsufficientFunds
//!  [`CategoryTypeMismatch`]: EngineError::CategoryTypeMismatch
//!  [`NotFound`]: EngineError::NotFound
//!  [`Database`]: EngineError::Database
//!  [`Timeout`]: EngineError::Timeout
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid kind: {0}")]
    InvalidKind(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Category type mismatch: {0}")]
    CategoryTypeMismatch(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("\"{0}\" is still in use")]
    InUse(String),
    #[error("Transaction timed out: {0}")]
    Timeout(String),
    #[error("Import failed: {0}")]
    Import(String),
    #[error("Export failed: {0}")]
    Export(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` for malformed or missing input, detected before any
    /// storage mutation.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_)
                | Self::InvalidName(_)
                | Self::InvalidId(_)
                | Self::InvalidDate(_)
                | Self::InvalidKind(_)
        )
    }

    /// Returns `true` for transport/transaction failures.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Timeout(_))
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidDate(a), Self::InvalidDate(b)) => a == b,
            (Self::InvalidKind(a), Self::InvalidKind(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::CategoryTypeMismatch(a), Self::CategoryTypeMismatch(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InUse(a), Self::InUse(b)) => a == b,
            (Self::Timeout(a), Self::Timeout(b)) => a == b,
            (Self::Import(a), Self::Import(b)) => a == b,
            (Self::Export(a), Self::Export(b)) => a == b,
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
