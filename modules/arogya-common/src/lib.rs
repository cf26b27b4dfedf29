pub mod config;
pub mod error;
pub mod search;
pub mod types;

pub use config::Config;
pub use error::ArogyaError;
pub use search::{SearchResultItem, TrustedSearcher};
pub use types::*;
