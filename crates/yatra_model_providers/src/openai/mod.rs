//! `OpenAI` provider backend.
//!
//! Built on `async-openai` and the Responses API. System messages become the
//! request `instructions`; tool calls and their results travel as linked
//! function-call items.

mod provider;

pub use provider::OpenAiProvider;
