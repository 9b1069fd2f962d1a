use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("no wallet or chain provider available")]
    ProviderUnavailable,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out after {0} ms")]
    Timeout(u64),
    #[error("block {0} not found")]
    MissingBlock(u64),
    #[error("log is missing {0}")]
    MissingLogMetadata(&'static str),
    #[error("failed to decode event: {0}")]
    Decode(String),
    #[error("event emitted by untracked address {0}")]
    UnknownSource(String),
}
