//! Tool dispatch.
//!
//! [`ToolExecutor::execute`] turns one [`ToolCall`] into exactly one
//! [`ToolResult`]. Lookup failures, malformed arguments, schema violations,
//! handler errors, timeouts and handler panics all come back as an error
//! result; nothing escapes as `Err` or unwinds into the caller.

use crate::error::ToolError;
use crate::param::FunctionCall;
use crate::registry::ToolRegistry;
use crate::schema::validate_arguments;
use core::time::Duration;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::task::AbortOnDropHandle;
use yatra_models::llm::{ChatMessage, ToolCall, ToolResultStatus};

/// The outcome of one tool invocation.
#[derive(Debug)]
pub struct ToolResult {
    /// Id of the call this result answers.
    pub call_id: String,
    /// Name of the tool that was requested.
    pub tool_name: String,
    /// Payload on success, error otherwise.
    pub outcome: Result<Value, ToolError>,
}

impl ToolResult {
    /// Returns `true` if the invocation failed.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }

    /// Returns the result status.
    #[must_use]
    pub fn status(&self) -> ToolResultStatus {
        if self.is_error() {
            ToolResultStatus::Error
        } else {
            ToolResultStatus::Success
        }
    }

    /// Text handed back to the model.
    ///
    /// String payloads are passed through as-is; other payloads are JSON
    /// encoded. Failures read `Tool '<name>' failed: <message>`.
    #[must_use]
    pub fn content(&self) -> String {
        match &self.outcome {
            Ok(Value::String(text)) => text.clone(),
            Ok(value) => value.to_string(),
            Err(err) => format!("Tool '{}' failed: {err}", self.tool_name),
        }
    }

    /// Builds the role=tool message recording this result.
    #[must_use]
    pub fn to_message(&self) -> ChatMessage {
        ChatMessage::tool_result(
            self.call_id.clone(),
            self.tool_name.clone(),
            self.status(),
            self.content(),
        )
    }
}

/// Resolves, validates and invokes tool calls against a registry.
#[derive(Debug, Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    timeout: Option<Duration>,
}

impl ToolExecutor {
    /// Creates an executor without a timeout.
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            timeout: None,
        }
    }

    /// Bounds every handler invocation by `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the registry this executor dispatches to.
    #[must_use]
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Executes a tool call. The call is consumed so it cannot be dispatched
    /// twice.
    pub async fn execute(&self, call: ToolCall) -> ToolResult {
        let ToolCall {
            id,
            name,
            arguments,
        } = call;

        let outcome = self.run(&name, &arguments).await;
        match &outcome {
            Ok(_) => tracing::debug!(tool = %name, call_id = %id, "tool succeeded"),
            Err(err) => tracing::warn!(tool = %name, call_id = %id, error = %err, "tool failed"),
        }

        ToolResult {
            call_id: id,
            tool_name: name,
            outcome,
        }
    }

    async fn run(&self, name: &str, raw_arguments: &str) -> Result<Value, ToolError> {
        let tool = self.registry.resolve(name)?;
        let call = FunctionCall::parse(name, raw_arguments)?;
        let args = Value::Object(call.parameters);
        validate_arguments(&tool.definition().parameters, &args)?;

        // The handler runs on its own task so a panic surfaces as a JoinError
        // and dropping this future aborts it.
        let handle = AbortOnDropHandle::new(tokio::spawn(async move { tool.execute(args).await }));

        let joined = match self.timeout {
            Some(after) => tokio::time::timeout(after, handle)
                .await
                .map_err(|_| ToolError::Timeout {
                    name: name.to_string(),
                    after,
                })?,
            None => handle.await,
        };

        joined.map_err(|err| ToolError::execution_error(format!("handler aborted: {err}")))?
    }
}
