use thiserror::Error;

pub type Result<T> = std::result::Result<T, VisionError>;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Annotation error: {0}")]
    Annotation(String),
}

impl From<reqwest::Error> for VisionError {
    fn from(err: reqwest::Error) -> Self {
        VisionError::Network(err.to_string())
    }
}
