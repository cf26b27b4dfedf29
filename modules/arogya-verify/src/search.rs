use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;

use arogya_common::{ArogyaError, SearchResultItem, TrustedSearcher};

const CSE_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Programmable Search adapter. The engine referenced by `cse_id` is
/// configured (outside this code) to search only the trusted domains:
/// who.int, icmr.gov.in, and main.ayush.gov.in.
pub struct GoogleCseSearcher {
    api_key: Option<String>,
    cse_id: Option<String>,
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
}

#[derive(Debug, Deserialize)]
struct CseItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl GoogleCseSearcher {
    pub fn new(api_key: Option<String>, cse_id: Option<String>, client: reqwest::Client) -> Self {
        Self {
            api_key,
            cse_id,
            client,
            base_url: CSE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl TrustedSearcher for GoogleCseSearcher {
    async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>> {
        let (api_key, cse_id) = match (&self.api_key, &self.cse_id) {
            (Some(key), Some(id)) => (key, id),
            _ => {
                return Err(
                    ArogyaError::Config("Search credentials are not configured".to_string()).into(),
                )
            }
        };

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("key", api_key.as_str()), ("cx", cse_id.as_str()), ("q", query)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Search API request failed ({status}): {body}"));
        }

        let parsed: CseResponse = resp.json().await?;

        Ok(parsed
            .items
            .into_iter()
            .map(|item| SearchResultItem {
                title: item.title,
                link: item.link,
                snippet: item.snippet,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credentials_is_an_error() {
        let searcher = GoogleCseSearcher::new(None, None, reqwest::Client::new());
        let err = searcher.search("turmeric milk immunity").await.unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }

    #[tokio::test]
    async fn test_partial_credentials_is_an_error() {
        let searcher =
            GoogleCseSearcher::new(Some("key".to_string()), None, reqwest::Client::new());
        assert!(searcher.search("q").await.is_err());
    }

    #[test]
    fn test_response_parse_without_items() {
        let parsed: CseResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.items.is_empty());
    }

    #[test]
    fn test_response_parse_with_items() {
        let json = r#"{
            "items": [
                {"title": "WHO | Turmeric", "link": "https://www.who.int/x", "snippet": "..."}
            ]
        }"#;
        let parsed: CseResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].link, "https://www.who.int/x");
    }
}
