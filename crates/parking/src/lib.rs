use std::error::Error;

use model::validation::ValidationError;
use thiserror::Error;

pub mod client;
pub mod database;
#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod search;

pub use client::Client;
use search::SearchError;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Other(Box<dyn Error + Send + Sync>),
}

impl RequestError {
    pub fn other<T: Error + Send + Sync + 'static>(why: T) -> Self {
        Self::Other(Box::new(why))
    }
}

impl From<database::DatabaseError> for RequestError {
    fn from(value: database::DatabaseError) -> Self {
        match value {
            database::DatabaseError::NotFound => Self::NotFound,
            database::DatabaseError::Other(why) => Self::Other(why),
        }
    }
}

pub type RequestResult<O> = Result<O, RequestError>;
