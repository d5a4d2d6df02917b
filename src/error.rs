use crate::domain::pool::PoolId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("This pool is closed.")]
    PoolClosed { pool: PoolId },
    #[error("Please enter a valid quantity.")]
    InvalidQuantity,
    #[error("Only {remaining} units remaining in this pool (requested {requested}).")]
    CapacityExceeded { remaining: u32, requested: f64 },
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Pool not found: {0}")]
    PoolNotFound(PoolId),
    #[error("Concurrent update on pool {pool}")]
    Conflict { pool: PoolId },
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, PoolError>;
