//! Error types shared by the paste store and the service facade.

use crate::models::identifier::Identifier;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("value must not be empty")]
    EmptyValue,
    #[error("value is {len} bytes, must be less than {limit}")]
    ValueTooLarge { len: usize, limit: usize },
    #[error("expiry `{0}` is not an RFC 3339 timestamp")]
    MalformedExpiry(String),
    #[error("expiry must be in the future")]
    ExpiryNotInFuture,
}

#[derive(Debug, Error)]
pub enum PasteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("paste not found")]
    NotFound,
    #[error("paste id `{0}` already exists")]
    DuplicateId(Identifier),
    #[error("no unused paste id after {attempts} attempts")]
    IdAttemptsExhausted { attempts: usize },
    #[error("random source failed: {0}")]
    Entropy(#[from] rand::Error),
    #[error("could not write archive: {0}")]
    Archive(#[from] std::io::Error),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type PasteResult<T> = Result<T, PasteError>;
