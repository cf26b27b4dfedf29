use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ai_client::Gemini;
use arogya_common::{Config, Language, VerificationResult};
use arogya_verify::{ClaimVerifier, GoogleCseSearcher, ImageAnalyzer, SpeechSynthesizer};
use tts_client::TtsClient;
use vision_client::VisionClient;

// --- App State ---

struct AppState {
    verifier: ClaimVerifier,
    analyzer: ImageAnalyzer,
    speech: SpeechSynthesizer,
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("arogya=info".parse()?))
        .init();

    let config = Config::from_env();

    let agent = Gemini::new(&config.gemini_api_key, &config.gemini_model);
    let searcher = GoogleCseSearcher::new(
        config.google_api_key.clone(),
        config.google_cse_id.clone(),
        reqwest::Client::new(),
    );

    let state = Arc::new(AppState {
        verifier: ClaimVerifier::new(agent, Arc::new(searcher)),
        analyzer: ImageAnalyzer::new(config.vision_api_key.as_deref().map(VisionClient::new)),
        speech: SpeechSynthesizer::new(config.tts_api_key.as_deref().map(TtsClient::new)),
    });

    let app = Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        .route("/api/verify", post(verify_claim))
        .route("/api/analyze-image", post(analyze_image))
        .with_state(state)
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Verdicts are per-request; never cache them
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Arogya web server starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Claim verification ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest {
    #[serde(default)]
    claim: String,
    #[serde(default)]
    language: String,
    /// Echoed back incremented on success so the client knows when to
    /// reset the input field.
    #[serde(default)]
    form_key: u64,
    #[serde(default)]
    speak: bool,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    verification_result: Option<VerificationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_data_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    form_key: u64,
}

async fn verify_claim(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VerifyRequest>,
) -> Json<VerifyResponse> {
    let (claim, language) = match validate_claim(&request.claim, &request.language) {
        Ok(validated) => validated,
        Err(message) => {
            return Json(VerifyResponse {
                error: Some(message),
                form_key: request.form_key,
                ..Default::default()
            })
        }
    };

    match state.verifier.verify(&claim, language).await {
        Ok(result) => {
            // Audio is strictly additive: a synthesis failure never fails
            // the verification response.
            let audio_data_uri = if request.speak {
                match state.speech.narrate(&result, language).await {
                    Ok(uri) => uri,
                    Err(e) => {
                        warn!(error = %e, "Audio synthesis failed, returning result without audio");
                        None
                    }
                }
            } else {
                None
            };

            Json(VerifyResponse {
                verification_result: Some(result),
                audio_data_uri,
                form_key: next_form_key(request.form_key),
                ..Default::default()
            })
        }
        Err(e) => {
            warn!(error = %e, "Claim verification failed");
            Json(VerifyResponse {
                error: Some(format!(
                    "An unexpected error occurred: {e}. Please try again later."
                )),
                form_key: request.form_key,
                ..Default::default()
            })
        }
    }
}

/// Incremented only on success. The key is client-supplied, so saturate
/// rather than trusting it to stay below the overflow boundary.
fn next_form_key(form_key: u64) -> u64 {
    form_key.saturating_add(1)
}

/// Field-level validation. Returns the first failing field's message.
fn validate_claim(claim: &str, language: &str) -> Result<(String, Language), String> {
    let claim = claim.trim();
    if claim.chars().count() < 10 {
        return Err("Please enter a health claim with at least 10 characters.".to_string());
    }

    let language = Language::parse(language).ok_or_else(|| "Please select a valid language.".to_string())?;

    Ok((claim.to_string(), language))
}

// --- Image analysis ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeImageRequest {
    #[serde(default)]
    image_data_uri: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeImageResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    extracted_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn analyze_image(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeImageRequest>,
) -> Json<AnalyzeImageResponse> {
    if request.image_data_uri.is_empty() {
        return Json(AnalyzeImageResponse {
            error: Some("No image data provided.".to_string()),
            ..Default::default()
        });
    }

    match state.analyzer.analyze(&request.image_data_uri).await {
        Ok(extracted_text) => Json(AnalyzeImageResponse {
            extracted_text: Some(extracted_text),
            ..Default::default()
        }),
        Err(e) => {
            warn!(error = %e, "Image analysis failed");
            Json(AnalyzeImageResponse {
                error: Some(format!("Image analysis failed: {e}")),
                ..Default::default()
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arogya_common::VerificationStatus;

    #[test]
    fn test_short_claim_rejected() {
        let err = validate_claim("too short", "en").unwrap_err();
        assert_eq!(
            err,
            "Please enter a health claim with at least 10 characters."
        );
    }

    #[test]
    fn test_surrounding_whitespace_does_not_pad_length() {
        // Only the trimmed claim counts toward the minimum; internal
        // whitespace is part of the claim text.
        assert!(validate_claim("  too short  ", "en").is_err());
        assert!(validate_claim("   hi     there   ", "en").is_ok());
    }

    #[test]
    fn test_unknown_language_rejected() {
        let err = validate_claim("Drinking turmeric milk daily boosts immunity", "fr").unwrap_err();
        assert_eq!(err, "Please select a valid language.");
    }

    #[test]
    fn test_valid_claim_passes() {
        let (claim, language) =
            validate_claim("Drinking turmeric milk daily boosts immunity", "hi").unwrap();
        assert_eq!(claim, "Drinking turmeric milk daily boosts immunity");
        assert_eq!(language, Language::Hi);
    }

    #[test]
    fn test_hindi_claim_length_counts_chars_not_bytes() {
        // 10+ Devanagari characters, far more than 10 bytes either way,
        // but also a 9-char claim must fail despite being >10 bytes.
        assert!(validate_claim("हल्दीदूधसे", "hi").is_ok());
        assert!(validate_claim("हल्दी दूध", "hi").is_err());
    }

    #[test]
    fn test_success_response_shape() {
        let response = VerifyResponse {
            verification_result: Some(VerificationResult {
                status: VerificationStatus::DebunkedMyth,
                truthfulness: "No evidence supports this.".to_string(),
                tips: String::new(),
                solution: String::new(),
                sources: vec!["https://www.who.int/x".to_string()],
            }),
            audio_data_uri: None,
            error: None,
            form_key: 3,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["verificationResult"]["status"], "Debunked Myth");
        assert_eq!(value["formKey"], 3);
        assert!(value.get("error").is_none());
        // Auxiliary fields are present even when empty
        assert_eq!(value["verificationResult"]["tips"], "");
        assert_eq!(value["verificationResult"]["solution"], "");
    }

    #[test]
    fn test_error_response_keeps_form_key() {
        let response = VerifyResponse {
            error: Some("Please select a valid language.".to_string()),
            form_key: 7,
            ..Default::default()
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("verificationResult").is_none());
        assert_eq!(value["formKey"], 7);
    }

    #[test]
    fn test_form_key_saturates_at_max() {
        assert_eq!(next_form_key(3), 4);
        assert_eq!(next_form_key(u64::MAX), u64::MAX);
    }
}
