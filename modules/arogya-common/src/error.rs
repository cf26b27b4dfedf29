use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArogyaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Image analysis error: {0}")]
    ImageAnalysis(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),
}
