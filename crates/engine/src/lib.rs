//! Personal finance ledger.
//!
//! Accounts hold a balance, operations move it, categories label the
//! operations. Every balance change goes through [`Engine::apply_operation`],
//! [`Engine::reverse_operation`] or [`Engine::replace_operation`], each a
//! single database transaction holding the account row lock.

pub use accounts::Account;
pub use categories::Category;
pub use commands::{ApplyOperationCmd, CategoryRef, OperationPatch, ReplaceOperationCmd};
pub use error::EngineError;
pub use exchange::{DATE_FORMAT, Format, Row, read_rows, write_rows};
pub use kind::Kind;
pub use money::Money;
pub use operations::Operation;
pub use ops::{CategorySummary, Engine, EngineBuilder, ImportReport, Summary, UNKNOWN_CATEGORY};
pub use period::DateRange;
pub use repo::{CachedCategoryRepo, CategoryRepo, DbCategoryRepo};

mod accounts;
mod categories;
mod commands;
mod error;
mod exchange;
mod kind;
mod money;
mod operations;
mod ops;
mod period;
mod repo;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
