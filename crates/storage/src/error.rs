// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl From<StorageError> for devflow_core::error::EngineError {
    fn from(err: StorageError) -> Self {
        devflow_core::error::EngineError::StorageError(err.to_string())
    }
}
