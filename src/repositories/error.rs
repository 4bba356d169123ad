use crate::models::ValidationError;
use crate::storage::StorageError;

#[derive(thiserror::Error, Debug)]
pub enum RepositoryError {
    #[error("Sign in required")]
    Unauthenticated,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
