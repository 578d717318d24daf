//! services/api/src/adapters/completion_llm.rs
//!
//! This module contains the adapter for the course-generation LLM.
//! It implements the `CompletionService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use course_forge_core::models::{CompletionRequest, TokenLimit};
use course_forge_core::ports::{CompletionService, PortError, PortResult};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CompletionService` using an OpenAI-compatible
/// chat-completions endpoint.
#[derive(Clone)]
pub struct OpenAiCompletionAdapter {
    client: Client<OpenAIConfig>,
}

impl OpenAiCompletionAdapter {
    /// Creates a new `OpenAiCompletionAdapter`.
    pub fn new(client: Client<OpenAIConfig>) -> Self {
        Self { client }
    }
}

//=========================================================================================
// `CompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CompletionService for OpenAiCompletionAdapter {
    /// Sends a request shaped for a single model and returns the raw text of
    /// the first choice.
    async fn complete(&self, request: &CompletionRequest) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(request.system.as_str())
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.user.as_str())
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&request.model).messages(messages);

        // Newer models reject `max_tokens` and `temperature`.
        match request.token_limit {
            TokenLimit::MaxTokens(limit) => {
                #[allow(deprecated)]
                args.max_tokens(limit);
            }
            TokenLimit::MaxCompletionTokens(limit) => {
                args.max_completion_tokens(limit);
            }
        }
        if let Some(temperature) = request.temperature {
            args.temperature(temperature);
        }
        if request.json_object {
            args.response_format(ResponseFormat::JsonObject);
        }

        let chat_request = args
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        debug!(model = %request.model, "Sending chat completion request");

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e: OpenAIError| {
                PortError::Unexpected(format!("{} API error: {}", request.model, e))
            })?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                PortError::Unexpected(format!("{} returned empty content", request.model))
            })
    }
}
