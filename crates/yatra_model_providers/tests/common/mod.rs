//! Shared test helpers for provider integration tests.

use std::future::Future;
use std::sync::Once;

use serde_json::json;
use yatra_models::llm::{
    ChatContext, ChatRole, GenerationRequest, Llm, Outcome, ToolChoice, ToolDefinition,
};

static INIT: Once = Once::new();

/// Initialize environment variables from `.env` file (once).
pub fn init_env() {
    INIT.call_once(|| {
        let _ = dotenvy::dotenv();
    });
}

/// The retrieval tool the voicebot offers.
pub fn kb_tool() -> ToolDefinition {
    ToolDefinition {
        name: "query_kb".to_string(),
        description: "Answer a travel-related question from the knowledge base.".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The travel question to look up"
                }
            },
            "required": ["query"]
        }),
    }
}

/// Live checks shared by provider integration tests.
pub trait LlmTestExt {
    /// Expects the model to say "hello".
    fn test_basic_completion(&self) -> impl Future<Output = ()> + Send;

    /// Expects the model to call `query_kb`.
    fn test_tool_calling(&self) -> impl Future<Output = ()> + Send;

    /// Expects an error for an unknown model.
    fn test_invalid_model_error(&self) -> impl Future<Output = ()> + Send;
}

impl LlmTestExt for Llm {
    async fn test_basic_completion(&self) {
        let mut context = ChatContext::new();
        context.append(ChatRole::User, "Say 'hello' and nothing else.");

        let outcome = self
            .complete(&context, &[])
            .await
            .expect("completion should succeed");

        match outcome {
            Outcome::DirectReply(text) => assert!(
                text.to_lowercase().contains("hello"),
                "response should contain 'hello': {text}"
            ),
            Outcome::ToolCalls(calls) => panic!("unexpected tool calls: {calls:?}"),
        }
    }

    async fn test_tool_calling(&self) {
        let mut context = ChatContext::new();
        context.append(ChatRole::User, "What tour packages do you have for Meghalaya?");
        let request = GenerationRequest::from_context(&context)
            .tool(kb_tool())
            .tool_choice(ToolChoice::Required);

        let response = self
            .generate(request)
            .await
            .expect("generation should succeed");

        let calls = response.tool_calls();
        assert!(!calls.is_empty(), "should have at least one tool call");
        assert_eq!(calls[0].name, "query_kb");

        let args: serde_json::Value =
            serde_json::from_str(&calls[0].arguments).expect("arguments should be JSON");
        assert!(
            args.get("query").is_some(),
            "tool call should have a query argument: {args}"
        );
    }

    async fn test_invalid_model_error(&self) {
        let result = self.complete(&ChatContext::new(), &[]).await;
        assert!(result.is_err(), "should fail with invalid model");
    }
}
