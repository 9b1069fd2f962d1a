use himera_chain::errors::ChainError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("no wallet or chain provider available")]
    ProviderUnavailable,
    #[error("chain query failed: {0}")]
    QueryFailure(ChainError),
    #[error("event could not be decoded: {0}")]
    DecodeFailure(String),
    #[error("result belongs to an account that is no longer active")]
    StaleResult,
    #[error("store error: {0}")]
    Store(String),
}

impl From<ChainError> for TrackerError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::ProviderUnavailable => TrackerError::ProviderUnavailable,
            ChainError::Decode(_)
            | ChainError::UnknownSource(_)
            | ChainError::MissingLogMetadata(_) => TrackerError::DecodeFailure(err.to_string()),
            other => TrackerError::QueryFailure(other),
        }
    }
}
