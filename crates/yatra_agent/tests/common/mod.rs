//! Shared fixtures for the agent integration tests.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use async_trait::async_trait;
use core::time::Duration;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;
use yatra_agent::{AgentSession, TurnPolicy, TurnState};
use yatra_models::llm::{
    AssistantBlock, GenerationError, GenerationRequest, GenerationResponse, Llm, LlmProvider,
    ToolCall, Usage,
};
use yatra_speech::{SpeechError, TextToSpeech};
use yatra_tools::{FunctionMetadata, FunctionTool, InputParam, ToolError, ToolRegistry};

pub const INSTRUCTIONS: &str = "You are a travel consultant.";
pub const PACKAGE: &str = "Meghalaya Monsoon Escape: 5N/6D, Rs 9,500, 4-star, SUV, veg meals.";

/// One scripted model response.
pub enum Step {
    Reply(Vec<AssistantBlock>),
    Fail(GenerationError),
    /// Waits for the gate, then answers with text.
    Gated(Arc<Notify>, String),
    /// Never answers.
    Hang,
}

pub fn text(reply: &str) -> Step {
    Step::Reply(vec![AssistantBlock::text(reply)])
}

pub fn call(id: &str, name: &str, arguments: &str) -> Step {
    Step::Reply(vec![AssistantBlock::tool_call(ToolCall::new(id, name, arguments))])
}

pub fn provider_error(message: &str) -> Step {
    Step::Fail(GenerationError::Provider {
        status: Some(500),
        message: message.to_string(),
        source: None,
    })
}

/// Replays a fixed script and records every request.
#[derive(Default)]
pub struct ScriptedLlm {
    script: parking_lot::Mutex<VecDeque<Step>>,
    requests: parking_lot::Mutex<Vec<GenerationRequest>>,
}

impl ScriptedLlm {
    pub fn new(script: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Arc::new(Self {
            script: parking_lot::Mutex::new(script.into_iter().collect()),
            requests: parking_lot::Mutex::default(),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn generate(
        &self,
        _model: &str,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        self.requests.lock().push(request);
        let step = self.script.lock().pop_front();
        let content = match step {
            Some(Step::Reply(content)) => content,
            Some(Step::Fail(err)) => return Err(err),
            Some(Step::Gated(gate, reply)) => {
                gate.notified().await;
                vec![AssistantBlock::text(reply)]
            }
            Some(Step::Hang) => core::future::pending().await,
            None => {
                return Err(GenerationError::InvalidResponse(
                    "script exhausted".to_string(),
                ));
            }
        };
        Ok(GenerationResponse {
            content,
            usage: Usage::default(),
        })
    }
}

/// `query_kb` stand-in that counts its calls.
pub fn kb_registry(calls: Arc<AtomicUsize>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry
        .register(FunctionTool::new(
            FunctionMetadata::new("query_kb")
                .with_description("Answer a travel-related question from the knowledge base.")
                .add_parameter(String::schema_info("query")),
            move |_call| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Value::String(PACKAGE.to_string()))
                }
            },
        ))
        .unwrap();
    registry
        .register(FunctionTool::new(
            FunctionMetadata::new("flaky"),
            |_call| async { Err(ToolError::execution_error("booking system offline")) },
        ))
        .unwrap();
    registry
}

pub fn session(llm: &Arc<ScriptedLlm>, registry: ToolRegistry) -> AgentSession {
    AgentSession::new(
        Llm::new(llm.clone(), "scripted"),
        Arc::new(registry),
        INSTRUCTIONS,
    )
    .with_policy(TurnPolicy {
        max_tool_depth: 5,
        llm_timeout: Duration::from_secs(2),
        tts_timeout: Duration::from_secs(2),
    })
}

/// Yields until the session reaches `state`.
pub async fn wait_for(session: &AgentSession, state: TurnState) {
    while session.state() != state {
        tokio::task::yield_now().await;
    }
}

/// TTS stand-in returning the text bytes, or failing.
#[derive(Default)]
pub struct MockTts {
    pub fail: bool,
    pub calls: AtomicUsize,
    /// When set, synthesis waits for this gate.
    pub gate: Option<Arc<Notify>>,
}

#[async_trait]
impl TextToSpeech for MockTts {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail {
            return Err(SpeechError::Provider {
                status: 503,
                message: "voice unavailable".to_string(),
            });
        }
        Ok(text.as_bytes().to_vec())
    }
}

/// Registry with one `hold_seat` tool that waits for `gate` and then marks
/// `booked`.
pub fn gated_registry(gate: Arc<Notify>, booked: Arc<AtomicBool>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry
        .register(FunctionTool::new(
            FunctionMetadata::new("hold_seat").with_description("Hold a seat on the trip."),
            move |_call| {
                let gate = gate.clone();
                let booked = booked.clone();
                async move {
                    gate.notified().await;
                    booked.store(true, Ordering::SeqCst);
                    Ok(Value::String("seat held".to_string()))
                }
            },
        ))
        .unwrap();
    registry
}
