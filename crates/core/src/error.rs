use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Remote catalog unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Item not found")]
    NotFound,

    #[error("Favorites storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Response belongs to a superseded query; never surfaced to callers.
    #[error("Stale response discarded")]
    Stale,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl Error {
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NotFound => 404,
            Error::Validation(_) => 400,
            Error::RemoteUnavailable(_) | Error::Configuration(_) => 503,
            _ => 500,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::RemoteUnavailable(err.to_string())
    }
}
