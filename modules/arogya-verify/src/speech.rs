use anyhow::Result;
use tts_client::TtsClient;

use ai_client::truncate_to_char_boundary;
use arogya_common::{ArogyaError, Language, VerificationResult};

// text:synthesize caps input at 5000 bytes; leave headroom.
const MAX_SPEECH_BYTES: usize = 4500;

/// Renders a verification result as spoken audio. Strictly additive: the
/// handler treats any failure here as a warning, never as a failed request.
pub struct SpeechSynthesizer {
    tts: Option<TtsClient>,
}

impl SpeechSynthesizer {
    pub fn new(tts: Option<TtsClient>) -> Self {
        Self { tts }
    }

    /// Synthesize the spoken form of a result as an audio data URI.
    /// Returns `Ok(None)` when synthesis is unconfigured or the result has
    /// no speakable text.
    pub async fn narrate(
        &self,
        result: &VerificationResult,
        language: Language,
    ) -> Result<Option<String>> {
        let Some(tts) = self.tts.as_ref() else {
            return Ok(None);
        };

        let text = speech_text(result);
        if text.is_empty() {
            return Ok(None);
        }

        let uri = tts
            .synthesize_data_uri(
                truncate_to_char_boundary(&text, MAX_SPEECH_BYTES),
                language.voice_code(),
            )
            .await
            .map_err(|e| ArogyaError::Speech(e.to_string()))?;

        Ok(Some(uri))
    }
}

/// Assemble the spoken text from the result's narrative fields.
pub fn speech_text(result: &VerificationResult) -> String {
    [&result.truthfulness, &result.tips, &result.solution]
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use arogya_common::VerificationStatus;

    fn result(truthfulness: &str, tips: &str, solution: &str) -> VerificationResult {
        VerificationResult {
            status: VerificationStatus::VerifiedClaim,
            truthfulness: truthfulness.to_string(),
            tips: tips.to_string(),
            solution: solution.to_string(),
            sources: vec![],
        }
    }

    #[test]
    fn test_speech_text_joins_non_empty_fields() {
        let r = result("It is true.", "Drink in moderation.", "");
        assert_eq!(speech_text(&r), "It is true. Drink in moderation.");
    }

    #[test]
    fn test_speech_text_empty_result() {
        let r = result("", "  ", "");
        assert_eq!(speech_text(&r), "");
    }

    #[tokio::test]
    async fn test_unconfigured_synthesizer_returns_none() {
        let synth = SpeechSynthesizer::new(None);
        let r = result("It is true.", "", "");
        assert_eq!(synth.narrate(&r, Language::En).await.unwrap(), None);
    }
}
