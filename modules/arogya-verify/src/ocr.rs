use anyhow::{anyhow, bail, Result};
use arogya_common::ArogyaError;
use tracing::info;
use vision_client::VisionClient;

/// Returned instead of an error when OCR finds nothing, so the user can
/// still submit something for verification.
pub const NO_TEXT_FALLBACK: &str =
    "No text could be extracted from the image. Please try a clearer image.";

/// Extracts claim text from an uploaded image via Cloud Vision OCR.
pub struct ImageAnalyzer {
    vision: Option<VisionClient>,
}

impl ImageAnalyzer {
    pub fn new(vision: Option<VisionClient>) -> Self {
        Self { vision }
    }

    /// Extract the dominant text block from a base64 image data URI.
    pub async fn analyze(&self, image_data_uri: &str) -> Result<String> {
        let base64_image = data_uri_base64(image_data_uri)?;

        let vision = self.vision.as_ref().ok_or_else(|| {
            ArogyaError::Config("Cloud Vision credentials are not configured".to_string())
        })?;

        let text = vision.detect_text(base64_image).await.map_err(|e| {
            ArogyaError::ImageAnalysis(format!("Failed to analyze image with Cloud Vision: {e}"))
        })?;

        match text {
            Some(text) => {
                info!(chars = text.chars().count(), "Extracted text from image");
                Ok(text)
            }
            None => Ok(NO_TEXT_FALLBACK.to_string()),
        }
    }
}

/// Validate a `data:<mimetype>;base64,<data>` URI and return the encoded
/// payload. Rejects malformed input before any network call.
fn data_uri_base64(uri: &str) -> Result<&str> {
    if !uri.starts_with("data:") {
        bail!("Invalid image data URI format.");
    }

    uri.split_once(";base64,")
        .map(|(_, data)| data)
        .filter(|data| !data.is_empty())
        .ok_or_else(|| anyhow!("Invalid image data URI format."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_data_uri() {
        let base64 = data_uri_base64("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(base64, "aGVsbG8=");
    }

    #[test]
    fn test_missing_base64_separator_is_rejected() {
        assert!(data_uri_base64("data:image/png,aGVsbG8=").is_err());
    }

    #[test]
    fn test_missing_data_prefix_is_rejected() {
        assert!(data_uri_base64("image/png;base64,aGVsbG8=").is_err());
    }

    #[test]
    fn test_empty_payload_is_rejected() {
        assert!(data_uri_base64("data:image/png;base64,").is_err());
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_per_request() {
        let analyzer = ImageAnalyzer::new(None);
        let err = analyzer
            .analyze("data:image/png;base64,aGVsbG8=")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }

    #[tokio::test]
    async fn test_malformed_uri_fails_before_credentials() {
        // A malformed URI must be rejected even when OCR is unconfigured,
        // proving validation happens before any decode or network step.
        let analyzer = ImageAnalyzer::new(None);
        let err = analyzer.analyze("not-a-data-uri").await.unwrap_err();
        assert!(err.to_string().contains("Invalid image data URI"));
    }
}
