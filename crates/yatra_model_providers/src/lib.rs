//! Model provider backends for Yatra.
//!
//! Each provider implements [`LlmProvider`](yatra_models::llm::LlmProvider)
//! and is registered with a [`ModelRegistry`](yatra_models::ModelRegistry)
//! under a short name, which becomes the prefix of model identifiers.
//!
//! # Supported Providers
//!
//! | Provider | Feature Flag | Description |
//! |----------|--------------|-------------|
//! | `OpenAI` | `openai` (default) | `OpenAI` Responses API via `async-openai` |
//!
//! # Usage
//!
//! ```no_run
//! # #[cfg(feature = "openai")]
//! # {
//! use std::sync::Arc;
//! use yatra_model_providers::OpenAiProvider;
//! use yatra_models::ModelRegistry;
//!
//! let mut registry = ModelRegistry::new();
//! registry.register_llm_provider("openai", Arc::new(OpenAiProvider::new("sk-...")));
//! let llm = registry.llm("openai/gpt-4o").unwrap();
//! # }
//! ```

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::OpenAiProvider;
