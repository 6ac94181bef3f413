//! Integration tests for the `yatra_tools` crate.

use core::future::Future;
use core::pin::Pin;
use core::time::Duration;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use yatra_models::llm::{ChatRole, MessageKind, ToolCall, ToolDefinition, ToolResultStatus};
use yatra_tools::{
    FunctionMetadata, FunctionTool, InputParam, ParameterInfo, Tool, ToolError, ToolExecutor,
    ToolRegistry,
};

// ─────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────

struct ManualTool;

impl Tool for ManualTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "manual_tool".to_string(),
            description: "A manually implemented tool.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "input": { "type": "string" }
                },
                "required": ["input"]
            }),
        }
    }

    fn execute(
        &self,
        args: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + '_>> {
        Box::pin(async move {
            let input = args
                .get("input")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ToolError::parameter_error("Missing 'input'"))?;
            Ok(json!({ "result": format!("echo: {}", input) }))
        })
    }
}

fn kb_tool(calls: Arc<AtomicUsize>) -> impl Tool {
    FunctionTool::new(
        FunctionMetadata::new("query_kb")
            .with_description("Answer a travel-related question from the knowledge base.")
            .add_parameter(String::schema_info("query").with_description("The question.")),
        move |call| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let query: String = call.get_param("query")?;
                Ok(Value::String(format!("Packages for {query}: 5N/6D from Shillong.")))
            }
        },
    )
}

fn failing_tool() -> impl Tool {
    FunctionTool::new(FunctionMetadata::new("flaky"), |_call| async {
        Err(ToolError::execution_error("upstream unavailable"))
    })
}

fn slow_tool() -> impl Tool {
    FunctionTool::new(FunctionMetadata::new("slow"), |_call| async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Value::Null)
    })
}

fn panicking_tool() -> impl Tool {
    FunctionTool::new(FunctionMetadata::new("boom"), |_call| async {
        if true {
            panic!("handler bug");
        }
        Ok(Value::Null)
    })
}

fn executor_with(tools: impl FnOnce(&mut ToolRegistry)) -> ToolExecutor {
    let mut registry = ToolRegistry::new();
    tools(&mut registry);
    ToolExecutor::new(Arc::new(registry))
}

// ─────────────────────────────────────────────────────────────────────
// 1. Tool trait
// ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn manual_tool_definition_and_execute() {
    let tool = ManualTool;
    let def = tool.definition();
    assert_eq!(def.name, "manual_tool");
    assert_eq!(def.description, "A manually implemented tool.");

    let result = tool.execute(json!({"input": "hello"})).await.unwrap();
    assert_eq!(result["result"], "echo: hello");
}

#[test]
fn function_tool_definition_carries_schema() {
    let def = kb_tool(Arc::default()).definition();
    assert_eq!(def.name, "query_kb");
    assert_eq!(def.parameters["properties"]["query"]["type"], "string");
    assert_eq!(def.parameters["required"], json!(["query"]));
}

// ─────────────────────────────────────────────────────────────────────
// 2. ToolRegistry
// ─────────────────────────────────────────────────────────────────────

#[test]
fn resolve_after_register_returns_named_tool() {
    let mut registry = ToolRegistry::new();
    registry.register(ManualTool).unwrap();

    let tool = registry.resolve("manual_tool").unwrap();
    assert_eq!(tool.definition().name, "manual_tool");
    assert!(registry.has("manual_tool"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn resolve_unknown_is_not_found() {
    let registry = ToolRegistry::new();
    assert!(registry.is_empty());
    assert!(matches!(
        registry.resolve("nonexistent"),
        Err(ToolError::NotFound(name)) if name == "nonexistent"
    ));
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut registry = ToolRegistry::new();
    registry.register(ManualTool).unwrap();

    let err = registry.register(ManualTool).unwrap_err();
    assert!(matches!(err, ToolError::AlreadyRegistered(name) if name == "manual_tool"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn replace_overwrites_in_place() {
    let mut registry = ToolRegistry::new();
    registry.register(ManualTool).unwrap();
    registry.register(failing_tool()).unwrap();

    assert!(registry.replace(ManualTool).is_some());
    assert!(registry.replace(slow_tool()).is_none());
    assert_eq!(registry.names(), vec!["manual_tool", "flaky", "slow"]);
}

#[test]
fn list_for_prompt_follows_registration_order() {
    let mut registry = ToolRegistry::new();
    registry.register(kb_tool(Arc::default())).unwrap();
    registry.register(ManualTool).unwrap();
    registry.register(failing_tool()).unwrap();

    let names: Vec<String> = registry.list_for_prompt().map(|d| d.name).collect();
    assert_eq!(names, vec!["query_kb", "manual_tool", "flaky"]);
    assert_eq!(registry.definitions().len(), 3);
}

// ─────────────────────────────────────────────────────────────────────
// 3. ToolExecutor
// ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn successful_call_produces_tool_message() {
    let calls = Arc::new(AtomicUsize::new(0));
    let executor = executor_with(|r| r.register(kb_tool(calls.clone())).unwrap());

    let result = executor
        .execute(ToolCall::new("call_1", "query_kb", r#"{"query":"Meghalaya"}"#))
        .await;

    assert!(!result.is_error());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let message = result.to_message();
    assert_eq!(message.role, ChatRole::Tool);
    assert_eq!(
        message.content.as_deref(),
        Some("Packages for Meghalaya: 5N/6D from Shillong.")
    );
    assert_eq!(
        message.kind,
        MessageKind::ToolResult {
            call_id: "call_1".into(),
            tool_name: "query_kb".into(),
            status: ToolResultStatus::Success,
        }
    );
}

#[tokio::test]
async fn object_payload_is_json_encoded() {
    let executor = executor_with(|r| r.register(ManualTool).unwrap());
    let result = executor
        .execute(ToolCall::new("c", "manual_tool", r#"{"input":"x"}"#))
        .await;
    assert_eq!(result.content(), r#"{"result":"echo: x"}"#);
}

#[tokio::test]
async fn unknown_tool_is_error_result() {
    let executor = executor_with(|_| {});
    let result = executor.execute(ToolCall::new("c", "book_flight", "{}")).await;

    assert!(matches!(result.outcome, Err(ToolError::NotFound(_))));
    assert_eq!(
        result.content(),
        "Tool 'book_flight' failed: Unknown tool: book_flight"
    );
    assert_eq!(result.to_message().role, ChatRole::Tool);
}

#[tokio::test]
async fn unparseable_arguments_never_reach_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let executor = executor_with(|r| r.register(kb_tool(calls.clone())).unwrap());

    for raw in ["{not json", "[\"Goa\"]", "42"] {
        let result = executor
            .execute(ToolCall::new("c", "query_kb", raw))
            .await;
        assert!(
            matches!(result.outcome, Err(ToolError::ParameterError(_))),
            "raw = {raw}"
        );
        assert!(result.content().starts_with("Tool 'query_kb' failed: "));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn schema_violations_are_parameter_errors() {
    let calls = Arc::new(AtomicUsize::new(0));
    let executor = executor_with(|r| r.register(kb_tool(calls.clone())).unwrap());

    let missing = executor.execute(ToolCall::new("c", "query_kb", "")).await;
    assert!(matches!(missing.outcome, Err(ToolError::ParameterError(_))));
    assert!(missing.content().contains("\"query\""), "got: {}", missing.content());

    let wrong_type = executor
        .execute(ToolCall::new("c", "query_kb", r#"{"query": 7}"#))
        .await;
    assert!(matches!(wrong_type.outcome, Err(ToolError::ParameterError(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn handler_error_is_execution_error() {
    let executor = executor_with(|r| r.register(failing_tool()).unwrap());
    let result = executor.execute(ToolCall::new("c9", "flaky", "{}")).await;

    assert_eq!(result.status(), ToolResultStatus::Error);
    assert_eq!(
        result.content(),
        "Tool 'flaky' failed: Execution error: upstream unavailable"
    );
    assert_eq!(result.call_id, "c9");
}

#[tokio::test(start_paused = true)]
async fn slow_handler_times_out() {
    let executor =
        executor_with(|r| r.register(slow_tool()).unwrap()).with_timeout(Duration::from_secs(2));
    let result = executor.execute(ToolCall::new("c", "slow", "{}")).await;

    assert!(matches!(
        result.outcome,
        Err(ToolError::Timeout { ref name, after }) if name == "slow" && after == Duration::from_secs(2)
    ));
}

#[tokio::test]
async fn handler_panic_is_contained() {
    let executor = executor_with(|r| r.register(panicking_tool()).unwrap());
    let result = executor.execute(ToolCall::new("c", "boom", "{}")).await;

    assert!(matches!(result.outcome, Err(ToolError::ExecutionError(_))));
}

#[test]
fn parameter_info_default_makes_optional() {
    let info = ParameterInfo::new("limit", json!({"type": "integer"})).with_default(json!(3));
    assert!(!info.required);
}
