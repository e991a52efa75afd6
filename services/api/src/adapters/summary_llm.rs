//! services/api/src/adapters/summary_llm.rs
//!
//! This module contains the adapter for the summary-generating LLM.
//! It implements the `TextGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    error::OpenAIError,
    Client,
};
use async_trait::async_trait;
use seogenix_core::ports::{PortError, PortResult, TextGenerationService};

const SYSTEM_INSTRUCTIONS: &str = "You are an AI visibility analyst. Given the results of a \
citation check for a website, write a short, plain-language summary for the site owner: \
how visible the site currently is across search, news and discussion platforms, and one or \
two concrete suggestions to improve how AI assistants cite it. Two to four sentences, no \
markdown, no bullet points.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TextGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiSummaryAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiSummaryAdapter {
    /// Creates a new `OpenAiSummaryAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `TextGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextGenerationService for OpenAiSummaryAdapter {
    /// Sends the summarization prompt and returns the first choice's text.
    ///
    /// The response contract is strict: a reply with no choices, no content,
    /// or only whitespace is `InvalidResponse`, distinct from transport
    /// failures. The caller substitutes the fallback template in both cases.
    async fn generate(&self, prompt: &str) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Transport(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| {
                PortError::InvalidResponse(
                    "summary LLM returned no choices in its response".to_string(),
                )
            })?
            .message
            .content
            .ok_or_else(|| {
                PortError::InvalidResponse(
                    "summary LLM response contained no text content".to_string(),
                )
            })?;

        if content.trim().is_empty() {
            return Err(PortError::InvalidResponse(
                "summary LLM response was empty".to_string(),
            ));
        }
        Ok(content)
    }
}
