use thiserror::Error;

use crate::account::StoreError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Config error in {0}: {1}")]
    Config(String, String),
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("Failed to bind {0}: {1}")]
    Bind(String, std::io::Error),
    #[error("Server failed: {0}")]
    Serve(std::io::Error),
}
