//! Tools exposed to the model.

use crate::knowledge::KnowledgeBase;
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use yatra_models::llm::ToolDefinition;
use yatra_tools::{Tool, ToolError, ToolRegistry};

/// Name the model uses to call the knowledge base.
pub const QUERY_KB: &str = "query_kb";

/// Parameters for the `query_kb` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QueryKbParams {
    /// The travel question to look up, e.g. "Meghalaya packages under 10000 rupees".
    pub query: String,
}

fn tool_def<T: JsonSchema>(name: &str, description: &str) -> ToolDefinition {
    let mut schema = schema_for!(T).to_value();
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
    }
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        parameters: schema,
    }
}

/// Looks up travel packages and destination facts.
pub struct QueryKnowledgeBase {
    knowledge: Arc<dyn KnowledgeBase>,
}

impl QueryKnowledgeBase {
    /// Wraps a knowledge base.
    #[must_use]
    pub fn new(knowledge: Arc<dyn KnowledgeBase>) -> Self {
        Self { knowledge }
    }
}

impl core::fmt::Debug for QueryKnowledgeBase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QueryKnowledgeBase").finish_non_exhaustive()
    }
}

impl Tool for QueryKnowledgeBase {
    fn definition(&self) -> ToolDefinition {
        tool_def::<QueryKbParams>(
            QUERY_KB,
            "Answer a travel-related question from the knowledge base.",
        )
    }

    fn execute(
        &self,
        args: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + '_>> {
        Box::pin(async move {
            let params: QueryKbParams = serde_json::from_value(args)
                .map_err(|err| ToolError::parameter_error(format!("invalid params: {err}")))?;
            let answer = self
                .knowledge
                .query(&params.query)
                .await
                .map_err(|err| ToolError::execution_error(err.to_string()))?;
            Ok(Value::String(answer))
        })
    }
}

/// Registry holding every tool the travel consultant may call.
///
/// # Errors
///
/// Returns [`ToolError::AlreadyRegistered`] if two tools share a name.
pub fn travel_tools(knowledge: Arc<dyn KnowledgeBase>) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(QueryKnowledgeBase::new(knowledge))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KeywordIndex;
    use serde_json::json;
    use yatra_models::llm::{ToolCall, ToolResultStatus};
    use yatra_tools::ToolExecutor;

    fn knowledge() -> Arc<dyn KnowledgeBase> {
        Arc::new(KeywordIndex::from_documents(
            [("kb.md", "Meghalaya Monsoon Escape, Rs 9,500, 4-star, SUV.")],
            3,
        ))
    }

    #[test]
    fn definition_requires_query_string() {
        let def = QueryKnowledgeBase::new(knowledge()).definition();
        assert_eq!(def.name, "query_kb");
        assert_eq!(
            def.description,
            "Answer a travel-related question from the knowledge base."
        );
        assert_eq!(def.parameters["type"], "object");
        assert_eq!(def.parameters["properties"]["query"]["type"], "string");
        assert_eq!(def.parameters["required"], json!(["query"]));
        assert!(def.parameters.get("$schema").is_none());
    }

    #[tokio::test]
    async fn executes_through_the_executor() {
        let executor = ToolExecutor::new(Arc::new(travel_tools(knowledge()).unwrap()));
        let result = executor
            .execute(ToolCall::new(
                "call_1",
                QUERY_KB,
                r#"{"query":"Meghalaya packages"}"#,
            ))
            .await;

        assert_eq!(result.status(), ToolResultStatus::Success);
        assert_eq!(result.content(), "Meghalaya Monsoon Escape, Rs 9,500, 4-star, SUV.");
    }

    #[tokio::test]
    async fn knowledge_errors_become_tool_errors() {
        let tool = QueryKnowledgeBase::new(knowledge());
        let err = tool.execute(json!({"query": "??"})).await.unwrap_err();
        assert!(matches!(err, ToolError::ExecutionError(_)));
    }
}
