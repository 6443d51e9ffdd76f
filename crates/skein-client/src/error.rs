use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("stream '{0}' does not exist")]
    StreamDoesNotExist(String),

    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error("metadata error: {0}")]
    MetadataError(String),

    #[error("connection error: {0}")]
    ConnectionError(String),
}

pub type Result<T> = std::result::Result<T, Error>;
