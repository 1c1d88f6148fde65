use thiserror::Error;
use utility::geo::ValidationError;

pub mod client;
pub mod geofence;
pub mod route;
pub mod settings;
pub mod simulator;
pub mod store;

use store::StoreError;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("the requested item does not exist")]
    NotFound,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RequestError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

pub type RequestResult<O> = Result<O, RequestError>;
