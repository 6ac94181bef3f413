//! Chat context, model provider interface and registry for Yatra.
//!
//! Provides a unified interface for language model access, decoupling the
//! conversation loop from provider implementations.
//!
//! # Overview
//!
//! - Conversation state: [`ChatContext`](llm::ChatContext) is the ordered
//!   history handed to the model on every call. It always carries exactly one
//!   instructions message.
//!
//! - Provider-agnostic: Consumers depend only on this crate, not on specific
//!   provider crates. Providers implement [`LlmProvider`](llm::LlmProvider)
//!   and are registered with a [`ModelRegistry`] at startup.
//!
//! - Pure completion: [`Llm::complete`](llm::Llm::complete) borrows the
//!   context immutably and returns an [`Outcome`](llm::Outcome), either a
//!   direct reply or the tool calls the model asked for.
//!
//! # Example
//!
//! ```ignore
//! use yatra_models::ModelRegistry;
//! use yatra_models::llm::{ChatContext, ChatRole, Outcome};
//!
//! let llm = registry.llm("openai/gpt-4o")?;
//!
//! let mut context = ChatContext::with_instructions("You are a travel consultant.");
//! context.append(ChatRole::User, "What packages do you have for Meghalaya?");
//!
//! match llm.complete(&context, &tools).await? {
//!     Outcome::DirectReply(text) => println!("{text}"),
//!     Outcome::ToolCalls(calls) => { /* dispatch */ }
//! }
//! ```

pub mod error;
pub mod llm;
mod registry;

pub use registry::ModelRegistry;
