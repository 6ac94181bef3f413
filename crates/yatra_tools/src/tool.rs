//! The core [`Tool`] trait and the closure-backed [`FunctionTool`].

use crate::error::ToolError;
use crate::param::FunctionCall;
use crate::schema::FunctionMetadata;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use yatra_models::llm::ToolDefinition;

/// A tool that can be invoked by the model.
///
/// Tools expose a [`ToolDefinition`] (name, description, JSON schema) for the
/// model, and an async [`execute`](Tool::execute) method that receives
/// arguments already checked against that schema.
pub trait Tool: Send + Sync + 'static {
    /// Returns the model-facing tool definition with JSON schema.
    fn definition(&self) -> ToolDefinition;

    /// Executes the tool with a JSON object of arguments.
    fn execute(
        &self,
        args: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + '_>>;
}

/// A [`Tool`] made of [`FunctionMetadata`] and an async handler.
///
/// The handler receives the arguments as a [`FunctionCall`] and extracts
/// what it needs with [`FunctionCall::get_param`].
pub struct FunctionTool<F> {
    metadata: FunctionMetadata,
    handler: F,
}

impl<F> core::fmt::Debug for FunctionTool<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.metadata.name)
            .finish_non_exhaustive()
    }
}

impl<F, Fut> FunctionTool<F>
where
    F: Fn(FunctionCall) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    /// Creates a tool from its metadata and handler.
    pub fn new(metadata: FunctionMetadata, handler: F) -> Self {
        Self { metadata, handler }
    }

    /// Returns the tool metadata.
    #[must_use]
    pub fn metadata(&self) -> &FunctionMetadata {
        &self.metadata
    }
}

impl<F, Fut> Tool for FunctionTool<F>
where
    F: Fn(FunctionCall) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    fn definition(&self) -> ToolDefinition {
        self.metadata.to_tool_definition()
    }

    fn execute(
        &self,
        args: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + '_>> {
        Box::pin(async move {
            let call = FunctionCall::from_value(self.metadata.name.clone(), args)?;
            (self.handler)(call).await
        })
    }
}
