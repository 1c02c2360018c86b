use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document already exists: {0}")]
    AlreadyExists(String),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
