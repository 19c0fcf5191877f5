use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Construction errors
    #[error("Invalid codec configuration: {0}")]
    InvalidConfig(String),

    // Encode preconditions
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    // Framing violations
    #[error("Frame too large: {size} bytes exceeds limit of {max_size}")]
    FrameTooLarge { size: usize, max_size: usize },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
