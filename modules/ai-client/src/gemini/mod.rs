mod client;
pub mod prompt_builder;
pub(crate) mod types;

pub use prompt_builder::{GeminiOutputBuilder, GeminiPromptBuilder};

use crate::retry::RetryPolicy;
use crate::schema::StructuredOutput;
use crate::tool::{DynTool, Tool, ToolWrapper};
use crate::traits::Agent;
use anyhow::{anyhow, Result};
use std::sync::Arc;

use client::GeminiClient;
use types::*;

// =============================================================================
// Gemini Agent
// =============================================================================

#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    pub(crate) model: String,
    pub(crate) tools: Vec<Arc<dyn DynTool>>,
    base_url: Option<String>,
    retry: RetryPolicy,
}

impl Gemini {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            tools: Vec::new(),
            base_url: None,
            retry: RetryPolicy::none(),
        }
    }

    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            crate::AiError::Config("GEMINI_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::new(api_key, model))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn client(&self) -> GeminiClient {
        let client = GeminiClient::new(&self.api_key).with_retry(self.retry);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    // =========================================================================
    // Convenience methods
    // =========================================================================

    /// One-shot structured extraction without tools.
    pub async fn extract<T: StructuredOutput>(
        &self,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Result<T> {
        let schema = T::gemini_schema();

        let function_name = "structured_response";
        let mut request = GenerateRequest::new()
            .system(system_prompt)
            .content(Content::user_text(user_prompt))
            .temperature(0.0)
            .function(FunctionDeclarationWire {
                name: function_name.to_string(),
                description: "Record the structured result.".to_string(),
                parameters: schema,
            });
        request.tool_config = Some(serde_json::json!({
            "functionCallingConfig": {
                "mode": "ANY",
                "allowedFunctionNames": [function_name],
            }
        }));

        let response = self.client().generate(&self.model, &request).await?;

        for call in response.function_calls() {
            if call.name == function_name {
                return serde_json::from_value(call.args.clone())
                    .map_err(|e| anyhow!("Failed to deserialize response: {}", e));
            }
        }

        Err(anyhow!("No structured output in Gemini response"))
    }

    pub async fn chat_completion(
        &self,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<String> {
        let request = GenerateRequest::new()
            .system(system)
            .content(Content::user_text(user))
            .temperature(0.0);

        let response = self.client().generate(&self.model, &request).await?;

        response
            .text()
            .ok_or_else(|| anyhow!("No response from Gemini"))
    }
}

// =============================================================================
// Agent Implementation
// =============================================================================

impl Agent for Gemini {
    type PromptBuilder = GeminiPromptBuilder;

    fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.push(Arc::new(ToolWrapper(tool)));
        self
    }

    fn dyn_tool(mut self, tool: Arc<dyn DynTool>) -> Self {
        self.tools.push(tool);
        self
    }

    fn prompt(&self, input: impl Into<String>) -> GeminiPromptBuilder {
        GeminiPromptBuilder::new(self.clone(), input.into())
    }
}
