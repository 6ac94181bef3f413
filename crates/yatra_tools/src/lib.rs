//! Tool framework for Yatra.
//!
//! This crate provides the infrastructure for defining, registering, and
//! executing the tools the model can call during a turn. Tool failures never
//! escape as errors: the [`ToolExecutor`] turns every outcome into a
//! [`ToolResult`] that is appended to the conversation like any other message.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use yatra_tools::{FunctionMetadata, FunctionTool, InputParam, ToolExecutor, ToolRegistry};
//! use yatra_models::llm::ToolCall;
//!
//! let echo = FunctionTool::new(
//!     FunctionMetadata::new("echo")
//!         .with_description("Repeat the input.")
//!         .add_parameter(String::schema_info("text")),
//!     |call| async move {
//!         let text: String = call.get_param("text")?;
//!         Ok(serde_json::Value::String(text))
//!     },
//! );
//!
//! let mut registry = ToolRegistry::new();
//! registry.register(echo).unwrap();
//!
//! let executor = ToolExecutor::new(Arc::new(registry));
//! # tokio_test(async move {
//! let result = executor.execute(ToolCall::new("c1", "echo", r#"{"text":"hi"}"#)).await;
//! assert!(!result.is_error());
//! # });
//! # fn tokio_test<F: std::future::Future>(f: F) {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f);
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`Tool`]: trait for executable tools with a JSON schema
//! - [`FunctionTool`]: a [`Tool`] built from metadata and an async closure
//! - [`ToolRegistry`]: closed set of tools, in registration order
//! - [`ToolExecutor`]: resolve, validate, invoke, wrap
//! - [`FunctionMetadata`] / [`ParameterInfo`]: schema building

pub mod error;
pub mod executor;
pub mod param;
pub mod registry;
pub mod schema;
pub mod tool;

pub use error::ToolError;
pub use executor::{ToolExecutor, ToolResult};
pub use param::{FunctionCall, InputParam};
pub use registry::ToolRegistry;
pub use schema::{FunctionMetadata, ParameterInfo, validate_arguments};
pub use tool::{FunctionTool, Tool};
