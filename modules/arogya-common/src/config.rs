use std::env;

/// Application configuration loaded from environment variables.
///
/// The generative-model key is required at startup. The search, vision,
/// and speech keys are optional: search degrades to empty results, OCR
/// fails per-request with a clear message, and audio is simply skipped.
#[derive(Debug, Clone)]
pub struct Config {
    // Generative model
    pub gemini_api_key: String,
    pub gemini_model: String,

    // Trusted-source search (Programmable Search Engine)
    pub google_api_key: Option<String>,
    pub google_cse_id: Option<String>,

    // OCR and speech
    pub vision_api_key: Option<String>,
    pub tts_api_key: Option<String>,

    // Web server
    pub web_host: String,
    pub web_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        let google_api_key = optional_env("GOOGLE_API_KEY");

        Self {
            gemini_api_key: required_env("GEMINI_API_KEY"),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            google_cse_id: optional_env("GOOGLE_CSE_ID"),
            vision_api_key: optional_env("GOOGLE_VISION_API_KEY").or_else(|| google_api_key.clone()),
            tts_api_key: optional_env("GOOGLE_TTS_API_KEY").or_else(|| google_api_key.clone()),
            google_api_key,
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("WEB_PORT must be a number"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}
