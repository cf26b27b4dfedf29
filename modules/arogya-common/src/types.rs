use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// --- Language ---

/// Languages a claim can be submitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Hi,
}

impl Language {
    /// Parse the wire tag used by the claim form (`en` / `hi`).
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "en" => Some(Language::En),
            "hi" => Some(Language::Hi),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
        }
    }

    /// Human-readable name, used in the verification prompt.
    pub fn name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
        }
    }

    /// BCP-47 voice code for speech synthesis.
    pub fn voice_code(&self) -> &'static str {
        match self {
            Language::En => "en-IN",
            Language::Hi => "hi-IN",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

// --- Verification ---

/// Four-way classification of a health claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum VerificationStatus {
    #[serde(rename = "Verified Claim")]
    VerifiedClaim,
    #[serde(rename = "Unproven Claim")]
    UnprovenClaim,
    #[serde(rename = "Debunked Myth")]
    DebunkedMyth,
    #[serde(rename = "Not Applicable")]
    NotApplicable,
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationStatus::VerifiedClaim => write!(f, "Verified Claim"),
            VerificationStatus::UnprovenClaim => write!(f, "Unproven Claim"),
            VerificationStatus::DebunkedMyth => write!(f, "Debunked Myth"),
            VerificationStatus::NotApplicable => write!(f, "Not Applicable"),
        }
    }
}

/// Verdict for one claim. Auxiliary fields are always present, possibly
/// empty, so renderers never need null checks.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VerificationResult {
    /// Strict classification: "Verified Claim" (proven true), "Debunked
    /// Myth" (proven false), "Unproven Claim" (lacks evidence), or
    /// "Not Applicable" (not a health claim).
    pub status: VerificationStatus,
    /// One-sentence summary explaining the status.
    #[serde(default)]
    pub truthfulness: String,
    /// Helpful, actionable tips related to the health topic.
    #[serde(default)]
    pub tips: String,
    /// A clear solution or course of action based on trusted sources.
    #[serde(default)]
    pub solution: String,
    /// Full URLs of the trusted sources used for verification.
    #[serde(default)]
    pub sources: Vec<String>,
}
