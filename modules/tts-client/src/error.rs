use thiserror::Error;

pub type Result<T> = std::result::Result<T, TtsError>;

#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Empty audio content in response")]
    EmptyAudio,
}

impl From<reqwest::Error> for TtsError {
    fn from(err: reqwest::Error) -> Self {
        TtsError::Network(err.to_string())
    }
}
