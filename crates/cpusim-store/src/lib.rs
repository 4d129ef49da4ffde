//! Store crate: persistence for simulator computers
//!
//! Keeps computers as JSON records keyed by a short id. The core never touches
//! storage; this crate converts between `Computer` and its persisted record and
//! owns the file handling.

pub use cpusim_core::{Computer, SimError};

pub mod record;
pub mod store;

pub use record::{ComputerRecord, ProgramStackRecord, MAX_CAPACITY};
pub use store::ComputerStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("computer {0} not found")]
    NotFound(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
