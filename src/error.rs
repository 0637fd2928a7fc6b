use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("cannot create chunks of size {0}, the size must be a positive integer")]
    InvalidChunkSize(String),

    #[error("cannot create chunks of unbounded size")]
    UnboundedChunkSize,

    #[error("cannot reverse a sequence that is not backed by an indexed collection")]
    NotReversible,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
