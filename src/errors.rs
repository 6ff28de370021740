use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Content Understanding endpoint {endpoint_url} responded with status {status}: {body}")]
    Http {
        endpoint_url: String,
        status: u16,
        body: String,
    },

    #[error("Request to {endpoint_url} failed: {source}")]
    Transport {
        endpoint_url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Operation location not found in response headers")]
    MissingOperationLocation,

    #[error("Operation timed out after {:.2} seconds", elapsed.as_secs_f64())]
    Timeout { elapsed: Duration },

    #[error("Analysis operation failed: {body}")]
    OperationFailed { body: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
