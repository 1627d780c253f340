pub mod aggregate;
pub mod compare;
pub mod report;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File error: '{0}'")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: '{0}'")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
