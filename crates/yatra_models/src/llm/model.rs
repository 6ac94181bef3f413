//! LLM handle for generation requests.

use super::context::ChatContext;
use super::error::GenerationError;
use super::provider::LlmProvider;
use super::types::{GenerationRequest, GenerationResponse, ToolCall, ToolDefinition};
use std::sync::Arc;

/// What the model decided to do for one completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The model answered with text.
    DirectReply(String),
    /// The model requested one or more tool invocations, in provider order.
    ToolCalls(Vec<ToolCall>),
}

/// An LLM handle for making generation requests.
///
/// Created via [`ModelRegistry::llm()`](crate::ModelRegistry::llm).
#[derive(Clone)]
pub struct Llm {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl core::fmt::Debug for Llm {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Llm").field("model", &self.model).finish()
    }
}

impl Llm {
    /// Creates a new LLM handle from provider and model name.
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Sends a generation request to the model.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] if the request fails.
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        self.provider.generate(&self.model, request).await
    }

    /// Runs one completion over the whole conversation.
    ///
    /// The context is only read. When `tools` is non-empty the model may pick
    /// any of them. Tool calls take precedence over any text the model sent
    /// alongside them.
    ///
    /// # Errors
    ///
    /// Returns the provider's [`GenerationError`] unchanged, or
    /// [`GenerationError::InvalidResponse`] when the response holds neither
    /// text nor tool calls.
    pub async fn complete(
        &self,
        context: &ChatContext,
        tools: &[ToolDefinition],
    ) -> Result<Outcome, GenerationError> {
        let mut request = GenerationRequest::from_context(context);
        if !tools.is_empty() {
            request = request.tools(tools.to_vec()).auto_tool();
        }

        let response = self.generate(request).await?;

        let calls = response.tool_calls();
        if !calls.is_empty() {
            return Ok(Outcome::ToolCalls(calls.into_iter().cloned().collect()));
        }

        let text = response.text();
        if text.trim().is_empty() {
            return Err(GenerationError::InvalidResponse(
                "completion contained no text and no tool calls".to_string(),
            ));
        }
        Ok(Outcome::DirectReply(text))
    }

    /// Returns the model name (without provider prefix).
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{AssistantBlock, ChatRole, Usage};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedProvider {
        response: Vec<AssistantBlock>,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedProvider {
        fn new(response: Vec<AssistantBlock>) -> Arc<Self> {
            Arc::new(Self {
                response,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn generate(
            &self,
            _model: &str,
            request: GenerationRequest,
        ) -> Result<GenerationResponse, GenerationError> {
            self.seen.lock().unwrap().push(request);
            Ok(GenerationResponse {
                content: self.response.clone(),
                usage: Usage::default(),
            })
        }
    }

    fn kb_tool() -> ToolDefinition {
        ToolDefinition {
            name: "query_kb".into(),
            description: "Answer a travel-related question from the knowledge base.".into(),
            parameters: serde_json::json!({"type": "object"}),
        }
    }

    #[tokio::test]
    async fn text_response_is_direct_reply() {
        let provider = ScriptedProvider::new(vec![AssistantBlock::text("Namaste!")]);
        let llm = Llm::new(provider.clone(), "test-model");

        let mut context = ChatContext::new();
        context.append(ChatRole::User, "hello");
        let outcome = llm.complete(&context, &[]).await.unwrap();

        assert_eq!(outcome, Outcome::DirectReply("Namaste!".into()));
        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[0].messages.len(), 2);
        assert!(seen[0].tools.is_none());
        assert_eq!(context.len(), 2);
    }

    #[tokio::test]
    async fn tool_calls_take_precedence_over_text() {
        let call = ToolCall::new("c1", "query_kb", r#"{"query":"Goa"}"#);
        let provider = ScriptedProvider::new(vec![
            AssistantBlock::text("Let me check."),
            AssistantBlock::tool_call(call.clone()),
        ]);
        let llm = Llm::new(provider.clone(), "test-model");

        let outcome = llm
            .complete(&ChatContext::new(), &[kb_tool()])
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::ToolCalls(vec![call]));
        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[0].tools.as_ref().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn empty_response_is_invalid() {
        let provider = ScriptedProvider::new(vec![AssistantBlock::text("  ")]);
        let llm = Llm::new(provider, "test-model");

        let err = llm.complete(&ChatContext::new(), &[]).await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse(_)));
    }
}
