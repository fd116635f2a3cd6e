/// Errors produced by helper registration.
#[derive(Debug, thiserror::Error)]
pub enum HelperError {
    #[error("invalid helper name: {0:?}")]
    InvalidName(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, HelperError>;
