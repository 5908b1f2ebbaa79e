pub mod carriers;
pub mod normalize;
pub mod options;
pub mod rank;
pub mod search;
pub mod store;
pub mod supplier;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Storage error: {0}")]
    StorageError(#[from] store::StoreError),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
