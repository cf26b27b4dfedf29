pub mod ocr;
pub mod search;
pub mod speech;
pub mod tools;
pub mod verify;

pub use ocr::{ImageAnalyzer, NO_TEXT_FALLBACK};
pub use search::GoogleCseSearcher;
pub use speech::SpeechSynthesizer;
pub use tools::SearchTrustedSourcesTool;
pub use verify::ClaimVerifier;
