pub mod error;

pub use error::{Result, TtsError};

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const BASE_URL: &str = "https://texttospeech.googleapis.com/v1";

pub struct TtsClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

// --- Wire types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest {
    input: SynthesisInput,
    voice: VoiceSelection,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection {
    language_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: Option<String>,
}

impl TtsClient {
    pub fn new(api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key: api_key.to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Synthesize `text` with the given BCP-47 voice and return a data URI
    /// playable directly by an HTML audio element.
    pub async fn synthesize_data_uri(&self, text: &str, language_code: &str) -> Result<String> {
        let endpoint = format!("{}/text:synthesize?key={}", self.base_url, self.api_key);

        let body = SynthesizeRequest {
            input: SynthesisInput {
                text: text.to_string(),
            },
            voice: VoiceSelection {
                language_code: language_code.to_string(),
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3".to_string(),
            },
        };

        debug!(language = %language_code, "TTS synthesize request");

        let resp = self.client.post(&endpoint).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(TtsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SynthesizeResponse = resp.json().await?;
        let audio = parsed
            .audio_content
            .filter(|a| !a.is_empty())
            .ok_or(TtsError::EmptyAudio)?;

        // audioContent is already base64-encoded MP3 bytes
        Ok(format!("data:audio/mp3;base64,{audio}"))
    }
}
