use std::marker::PhantomData;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::AiError;
use crate::schema::StructuredOutput;
use crate::traits::{Message, MessageRole, OutputBuilder, PromptBuilder};

use super::types::*;
use super::Gemini;

const STRUCTURED_FUNCTION: &str = "structured_response";

pub struct GeminiPromptBuilder {
    agent: Gemini,
    input: String,
    preamble: Option<String>,
    temperature: Option<f32>,
    max_turns: usize,
    messages: Vec<Message>,
}

impl GeminiPromptBuilder {
    pub(crate) fn new(agent: Gemini, input: String) -> Self {
        Self {
            agent,
            input,
            preamble: None,
            temperature: None,
            max_turns: 1,
            messages: Vec::new(),
        }
    }

    pub fn output<T: DeserializeOwned + JsonSchema + Send + 'static>(
        self,
    ) -> GeminiOutputBuilder<T> {
        GeminiOutputBuilder {
            builder: self,
            _phantom: PhantomData,
        }
    }

    fn base_request(&self) -> GenerateRequest {
        let mut request = GenerateRequest::new();

        if let Some(temp) = self.temperature {
            request = request.temperature(temp);
        }

        if let Some(ref preamble) = self.preamble {
            request = request.system(preamble);
        }

        let mut contents = Vec::new();

        for msg in &self.messages {
            match msg.role {
                MessageRole::System => {
                    // Gemini takes a single top-level system instruction, merge into it
                    let existing = request
                        .system_instruction
                        .take()
                        .and_then(|si| {
                            si.parts.into_iter().find_map(|p| match p {
                                Part::Text { text } => Some(text),
                                _ => None,
                            })
                        })
                        .unwrap_or_default();
                    let combined = if existing.is_empty() {
                        msg.content.clone()
                    } else {
                        format!("{}\n\n{}", existing, msg.content)
                    };
                    request = request.system(combined);
                }
                MessageRole::User => contents.push(Content::user_text(&msg.content)),
                MessageRole::Assistant => contents.push(Content::model_text(&msg.content)),
            }
        }

        if !self.input.is_empty() {
            contents.push(Content::user_text(&self.input));
        }

        request.contents(contents)
    }

    /// Execute the pending function calls in `response`, returning the
    /// function responses to feed back to the model.
    async fn run_function_calls(
        agent: &Gemini,
        response: &GenerateResponse,
    ) -> Result<Vec<FunctionResponse>> {
        let mut results = Vec::new();

        for call in response.function_calls() {
            if call.name == STRUCTURED_FUNCTION {
                continue;
            }

            let tool = agent
                .tools
                .iter()
                .find(|t| t.name() == call.name.as_str())
                .ok_or_else(|| anyhow!("Tool not found: {}", call.name))?;

            debug!(tool = %call.name, "Executing tool call");

            let response_value = match tool.call_json(call.args.clone()).await {
                Ok(v) => v,
                Err(e) => serde_json::json!({ "error": e }),
            };

            results.push(FunctionResponse {
                name: call.name.clone(),
                response: response_value,
            });
        }

        Ok(results)
    }
}

#[async_trait]
impl PromptBuilder for GeminiPromptBuilder {
    fn preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = Some(preamble.into());
        self
    }

    fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn multi_turn(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    async fn send(self) -> Result<String> {
        let client = self.agent.client();

        let mut request = self.base_request();

        for tool in &self.agent.tools {
            let def = tool.definition().await;
            request = request.function(FunctionDeclarationWire {
                name: def.name,
                description: def.description,
                parameters: def.parameters,
            });
        }

        // Function-calling loop
        let mut turn = 0;
        loop {
            turn += 1;
            if turn > self.max_turns {
                return Err(AiError::MaxTurns(self.max_turns).into());
            }

            let response = client.generate(&self.agent.model, &request).await?;

            let calls = Self::run_function_calls(&self.agent, &response).await?;
            if !calls.is_empty() {
                let model_content = response
                    .content()
                    .cloned()
                    .ok_or_else(|| anyhow!("Function call response had no content"))?;
                request.contents.push(model_content);
                request.contents.push(Content::function_responses(calls));
                continue;
            }

            return Ok(response.text().unwrap_or_default());
        }
    }
}

// =============================================================================
// Structured Output Builder
// =============================================================================

pub struct GeminiOutputBuilder<T> {
    builder: GeminiPromptBuilder,
    _phantom: PhantomData<T>,
}

#[async_trait]
impl<T: DeserializeOwned + JsonSchema + Send + 'static> OutputBuilder<T> for GeminiOutputBuilder<T> {
    async fn send(self) -> Result<T> {
        let schema = T::gemini_schema();

        debug!(
            type_name = T::type_name(),
            "Gemini structured output extraction"
        );

        let agent = self.builder.agent.clone();
        let max_turns = self.builder.max_turns;
        let client = agent.client();

        let mut request = self.builder.base_request();

        // Structured extraction must be deterministic
        if request
            .generation_config
            .as_ref()
            .and_then(|c| c.temperature)
            .is_none()
        {
            request = request.temperature(0.0);
        }

        // The model's tools, plus a forced function that carries the
        // structured result. Mode ANY means the model can never answer
        // with free text: it either calls a tool or emits the result.
        for tool in &agent.tools {
            let def = tool.definition().await;
            request = request.function(FunctionDeclarationWire {
                name: def.name,
                description: def.description,
                parameters: def.parameters,
            });
        }
        request = request.function(FunctionDeclarationWire {
            name: STRUCTURED_FUNCTION.to_string(),
            description: "Record the final structured result once the answer is known.".to_string(),
            parameters: schema,
        });
        request.tool_config = Some(serde_json::json!({
            "functionCallingConfig": { "mode": "ANY" }
        }));

        let mut turn = 0;
        loop {
            turn += 1;
            if turn > max_turns {
                return Err(AiError::MaxTurns(max_turns).into());
            }

            let response = client.generate(&agent.model, &request).await?;

            for call in response.function_calls() {
                if call.name == STRUCTURED_FUNCTION {
                    return serde_json::from_value(call.args.clone())
                        .map_err(|e| anyhow!("Failed to deserialize response: {}", e));
                }
            }

            let calls = GeminiPromptBuilder::run_function_calls(&agent, &response).await?;
            if calls.is_empty() {
                return Err(anyhow!("No structured output in Gemini response"));
            }

            let model_content = response
                .content()
                .cloned()
                .ok_or_else(|| anyhow!("Function call response had no content"))?;
            request.contents.push(model_content);
            request.contents.push(Content::function_responses(calls));
        }
    }
}
