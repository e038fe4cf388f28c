/// Everything the core can fail with.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed input: {0}")]
    Format(String),

    #[error("Invalid parameter: {0}")]
    Domain(String),

    #[error("Modular inverse does not exist")]
    NoInverse,
}

pub type Result<T> = std::result::Result<T, Error>;
