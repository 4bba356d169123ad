#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("Failed to read `{key}`: {message}")]
    ReadFailed { key: String, message: String },
    #[error("Failed to write `{key}`: {message}")]
    WriteFailed { key: String, message: String },
    #[error("Failed to remove `{key}`: {message}")]
    DeleteFailed { key: String, message: String },
    #[error("Stored data under `{key}` is malformed")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to encode `{key}`")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub fn key(&self) -> &str {
        match self {
            StorageError::ReadFailed { key, .. }
            | StorageError::WriteFailed { key, .. }
            | StorageError::DeleteFailed { key, .. }
            | StorageError::Corrupt { key, .. }
            | StorageError::Encode { key, .. } => key,
        }
    }
}
