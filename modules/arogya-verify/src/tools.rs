use std::convert::Infallible;
use std::sync::Arc;

use ai_client::tool::ToolDefinition;
use ai_client::Tool;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use arogya_common::{SearchResultItem, TrustedSearcher};

#[derive(Debug, Deserialize)]
pub struct SearchArgs {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub results: Vec<SearchResultItem>,
}

/// Search tool handed to the verification model.
///
/// Any searcher failure (missing credentials, a non-success status, network
/// errors) degrades to an empty result list so the model can still answer
/// with an "Unproven Claim / no evidence found" classification.
pub struct SearchTrustedSourcesTool {
    searcher: Arc<dyn TrustedSearcher>,
}

impl SearchTrustedSourcesTool {
    pub fn new(searcher: Arc<dyn TrustedSearcher>) -> Self {
        Self { searcher }
    }
}

#[async_trait]
impl Tool for SearchTrustedSourcesTool {
    const NAME: &'static str = "search_trusted_sources";
    type Error = Infallible;
    type Args = SearchArgs;
    type Output = SearchOutput;

    async fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Searches for information across trusted medical sources: the World \
                          Health Organization (WHO), the Indian Council of Medical Research \
                          (ICMR), and the Ministry of Ayush."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query, which should be the health claim to verify"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let results = match self.searcher.search(&args.query).await {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, query = %args.query, "Trusted-source search failed, returning no results");
                Vec::new()
            }
        };

        Ok(SearchOutput { results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_client::{DynTool, ToolWrapper};
    use anyhow::{anyhow, Result};

    struct FailingSearcher;

    #[async_trait]
    impl TrustedSearcher for FailingSearcher {
        async fn search(&self, _query: &str) -> Result<Vec<SearchResultItem>> {
            Err(anyhow!("Search credentials are not configured"))
        }
    }

    struct StubSearcher(Vec<SearchResultItem>);

    #[async_trait]
    impl TrustedSearcher for StubSearcher {
        async fn search(&self, _query: &str) -> Result<Vec<SearchResultItem>> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_searcher_failure_degrades_to_empty_results() {
        let tool = SearchTrustedSourcesTool::new(Arc::new(FailingSearcher));
        let output = tool
            .call(SearchArgs {
                query: "drinking turmeric milk daily boosts immunity".to_string(),
            })
            .await
            .unwrap();
        assert!(output.results.is_empty());
    }

    #[tokio::test]
    async fn test_tool_payload_shape() {
        let tool: Box<dyn DynTool> = Box::new(ToolWrapper(SearchTrustedSourcesTool::new(
            Arc::new(FailingSearcher),
        )));
        let value = tool
            .call_json(serde_json::json!({"query": "claim"}))
            .await
            .unwrap();
        assert_eq!(value, serde_json::json!({"results": []}));
    }

    #[tokio::test]
    async fn test_results_pass_through() {
        let hit = SearchResultItem {
            title: "Turmeric: fact sheet".to_string(),
            link: "https://www.who.int/turmeric".to_string(),
            snippet: "Evidence summary".to_string(),
        };
        let tool = SearchTrustedSourcesTool::new(Arc::new(StubSearcher(vec![hit])));
        let output = tool
            .call(SearchArgs {
                query: "turmeric".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(output.results.len(), 1);
        assert_eq!(output.results[0].link, "https://www.who.int/turmeric");
    }
}
