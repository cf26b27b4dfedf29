use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One hit from the trusted-source search engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// Seam over the restricted web search. Production uses the Programmable
/// Search adapter; tests substitute a stub.
#[async_trait]
pub trait TrustedSearcher: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>>;
}
