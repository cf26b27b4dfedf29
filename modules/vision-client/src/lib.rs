pub mod error;

pub use error::{Result, VisionError};

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const BASE_URL: &str = "https://vision.googleapis.com/v1";

/// Transport-level retries for one annotate call. OCR uploads are flaky
/// enough that a couple of retries meaningfully improve success rates.
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Exponential backoff before the given (1-based) retry attempt.
fn backoff_for(attempt: u32) -> Duration {
    RETRY_BACKOFF * 2u32.saturating_pow(attempt.saturating_sub(1))
}

pub struct VisionClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    max_attempts: u32,
}

// --- Wire types ---

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateEntry>,
}

#[derive(Debug, Serialize)]
struct AnnotateEntry {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: String,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateResult {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    error: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    message: Option<String>,
}

impl VisionClient {
    pub fn new(api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key: api_key.to_string(),
            base_url: BASE_URL.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Run TEXT_DETECTION over base64-encoded image bytes and return the
    /// first (dominant) text annotation, trimmed. `None` means the image
    /// contained no detectable text.
    pub async fn detect_text(&self, base64_content: &str) -> Result<Option<String>> {
        let endpoint = format!("{}/images:annotate?key={}", self.base_url, self.api_key);

        let body = AnnotateRequest {
            requests: vec![AnnotateEntry {
                image: ImageContent {
                    content: base64_content.to_string(),
                },
                features: vec![Feature {
                    feature_type: "TEXT_DETECTION".to_string(),
                }],
            }],
        };

        debug!("Vision text detection request");

        let mut attempt = 0;
        let resp = loop {
            attempt += 1;
            match self.client.post(&endpoint).json(&body).send().await {
                Ok(resp) => break resp,
                Err(e) if attempt < self.max_attempts => {
                    warn!(error = %e, attempt, "Vision request failed, retrying");
                    tokio::time::sleep(backoff_for(attempt)).await;
                }
                Err(e) => return Err(e.into()),
            }
        };

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(VisionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: AnnotateResponse = resp.json().await?;
        let result = parsed
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| VisionError::Annotation("Empty annotate response".to_string()))?;

        if let Some(error) = result.error {
            return Err(VisionError::Annotation(
                error.message.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        let text = result
            .text_annotations
            .into_iter()
            .next()
            .and_then(|a| a.description)
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(text)
    }
}
