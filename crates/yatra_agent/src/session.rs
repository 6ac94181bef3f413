//! Conversation turns.
//!
//! An [`AgentSession`] owns one conversation. Each user utterance runs a
//! turn: the model sees the whole context, may request tools, sees their
//! results, and eventually answers in text. The reply is then synthesized to
//! audio when a TTS adapter is attached.
//!
//! ```text
//!              ┌──────────────┐
//!   utterance ─► AwaitingInput│
//!              └──────┬───────┘
//!                     ▼
//!              ┌──────────────┐  tool calls  ┌──────────────┐
//!              │ ModelThinking├─────────────►│ ToolDispatch │
//!              │              │◄─────────────┤              │
//!              └──────┬───────┘   results    └──────────────┘
//!                     │ text
//!                     ▼
//!              ┌──────────────┐
//!              │  ReplyReady  ├──► AwaitingInput
//!              └──────────────┘
//! ```
//!
//! Failures never escape a turn as errors. The caller always gets a
//! [`Reply`]; when the turn failed it carries [`FALLBACK_UTTERANCE`] and the
//! [`TurnError`] that caused it. Only misuse of the session itself (a second
//! concurrent turn, a closed session) is reported as [`SessionError`].

use crate::prompt::FALLBACK_UTTERANCE;
use core::time::Duration;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use yatra_models::llm::{
    ChatContext, ChatMessage, ChatRole, ContextError, GenerationError, Llm, Outcome,
    ToolDefinition,
};
use yatra_speech::TextToSpeech;
use yatra_tools::{ToolExecutor, ToolRegistry};

/// Limits applied to every turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnPolicy {
    /// Maximum model completions in one turn. If the last allowed completion
    /// still asks for tools the turn fails.
    pub max_tool_depth: usize,
    /// Limit for one model completion.
    pub llm_timeout: Duration,
    /// Limit for one synthesis.
    pub tts_timeout: Duration,
}

impl Default for TurnPolicy {
    fn default() -> Self {
        Self {
            max_tool_depth: 5,
            llm_timeout: Duration::from_secs(30),
            tts_timeout: Duration::from_secs(15),
        }
    }
}

/// Where the session is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    /// Idle, ready for the next utterance.
    #[default]
    AwaitingInput,
    /// Waiting on the model.
    ModelThinking,
    /// Running requested tools.
    ToolDispatch,
    /// Reply text is final; audio is being produced.
    ReplyReady,
}

/// Why a turn fell back.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    /// The model call failed.
    #[error("model call failed: {0}")]
    Llm(#[from] GenerationError),

    /// The model did not answer in time.
    #[error("model call timed out after {0:?}")]
    LlmTimeout(Duration),

    /// The context was structurally invalid before a model call.
    #[error("conversation context is invalid: {0}")]
    Context(#[from] ContextError),

    /// The model kept asking for tools.
    #[error("model requested tools for {limit} consecutive rounds")]
    DepthExceeded {
        /// The configured round limit.
        limit: usize,
    },

    /// Speech could not be transcribed.
    #[error("transcription failed: {0}")]
    Transcription(String),
}

impl TurnError {
    /// Whether the conversation history was reset after this failure.
    #[must_use]
    pub fn resets_context(&self) -> bool {
        matches!(self, Self::Context(_) | Self::DepthExceeded { .. })
    }
}

/// Misuse of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Another turn is still running.
    #[error("a turn is already in progress")]
    TurnInProgress,
    /// The session was closed while this turn was running.
    #[error("turn cancelled")]
    Cancelled,
    /// The session was closed before this call.
    #[error("session is closed")]
    Closed,
}

/// What the bot says back.
#[derive(Debug)]
pub struct Reply {
    /// Spoken text.
    pub text: String,
    /// Synthesized audio, when TTS is attached and succeeded.
    pub audio: Option<Vec<u8>>,
    /// Set when `text` is the fallback utterance.
    pub failure: Option<TurnError>,
    /// Tool rounds completed during the turn.
    pub tool_rounds: usize,
}

impl Reply {
    /// Whether this reply is the fallback utterance.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.failure.is_some()
    }
}

/// One conversation with the model.
pub struct AgentSession {
    id: String,
    llm: Llm,
    executor: ToolExecutor,
    tools: Vec<ToolDefinition>,
    instructions: String,
    policy: TurnPolicy,
    tts: Option<Arc<dyn TextToSpeech>>,
    context: tokio::sync::Mutex<ChatContext>,
    state: Mutex<TurnState>,
    cancel: CancellationToken,
}

impl core::fmt::Debug for AgentSession {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AgentSession")
            .field("id", &self.id)
            .field("llm", &self.llm)
            .field("tools", &self.tools.len())
            .field("policy", &self.policy)
            .field("tts", &self.tts.is_some())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl AgentSession {
    /// Creates a session primed with `instructions`.
    ///
    /// The tool list is fixed for the life of the session.
    pub fn new(llm: Llm, registry: Arc<ToolRegistry>, instructions: impl Into<String>) -> Self {
        let instructions = instructions.into();
        let tools = registry.definitions();
        Self {
            id: nanoid::nanoid!(),
            llm,
            executor: ToolExecutor::new(registry),
            tools,
            context: tokio::sync::Mutex::new(ChatContext::with_instructions(instructions.clone())),
            instructions,
            policy: TurnPolicy::default(),
            tts: None,
            state: Mutex::new(TurnState::AwaitingInput),
            cancel: CancellationToken::new(),
        }
    }

    /// Sets the turn limits.
    #[must_use]
    pub fn with_policy(mut self, policy: TurnPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Limits each tool handler to `timeout`.
    #[must_use]
    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.executor = self.executor.with_timeout(timeout);
        self
    }

    /// Attaches a TTS adapter; replies then carry audio.
    #[must_use]
    pub fn with_tts(mut self, tts: Arc<dyn TextToSpeech>) -> Self {
        self.tts = Some(tts);
        self
    }

    /// Session identifier used in logs.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current turn state.
    #[must_use]
    pub fn state(&self) -> TurnState {
        *self.state.lock()
    }

    /// Whether [`close`](Self::close) was called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Clone of the conversation so far. Waits for a running turn to finish.
    pub async fn context_snapshot(&self) -> ChatContext {
        self.context.lock().await.clone()
    }

    /// Drops the whole history. The next turn re-primes the instructions.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::TurnInProgress`] while a turn is running, or
    /// [`SessionError::Closed`] after [`close`](Self::close).
    pub fn clear(&self) -> Result<(), SessionError> {
        let mut context = self.lock_context()?;
        context.clear();
        tracing::debug!(session = %self.id, "context cleared");
        Ok(())
    }

    /// Cancels any running turn and rejects later ones.
    pub fn close(&self) {
        if !self.cancel.is_cancelled() {
            tracing::info!(session = %self.id, "session closed");
        }
        self.cancel.cancel();
    }

    /// Speaks `text` without asking the model, e.g. the greeting.
    ///
    /// The text is recorded as an assistant message.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if a turn is running or the session is closed.
    pub async fn say(&self, text: &str) -> Result<Reply, SessionError> {
        let mut context = self.lock_context()?;
        self.ensure_primed(&mut context);
        context.append(ChatRole::Assistant, text);

        self.set_state(TurnState::ReplyReady);
        let audio = self.synthesize(text).await;
        self.set_state(TurnState::AwaitingInput);
        drop(context);
        Ok(Reply {
            text: text.to_string(),
            audio,
            failure: None,
            tool_rounds: 0,
        })
    }

    /// Runs one turn for a user utterance.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::TurnInProgress`] if another turn is running,
    /// [`SessionError::Closed`] if the session was already closed, and
    /// [`SessionError::Cancelled`] if it was closed during this turn. A
    /// cancelled turn leaves no trace in the context.
    pub async fn handle_utterance(&self, text: &str) -> Result<Reply, SessionError> {
        let mut context = self.lock_context()?;
        self.ensure_primed(&mut context);
        let checkpoint = context.len();

        let span = tracing::info_span!("turn", session = %self.id);
        let mut tool_rounds = 0;
        let outcome = tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            result = self
                .run_turn(&mut context, text, &mut tool_rounds)
                .instrument(span) => Some(result),
        };

        let reply = match outcome {
            None => {
                context.truncate(checkpoint);
                self.set_state(TurnState::AwaitingInput);
                tracing::warn!(session = %self.id, tool_rounds, "turn cancelled, context rolled back");
                return Err(SessionError::Cancelled);
            }
            Some(Ok(text)) => {
                tracing::info!(session = %self.id, tool_rounds, "turn complete");
                let audio = self.synthesize(&text).await;
                Reply {
                    text,
                    audio,
                    failure: None,
                    tool_rounds,
                }
            }
            Some(Err(err)) => {
                if err.resets_context() {
                    context.reprime(self.instructions.clone());
                    tracing::error!(
                        session = %self.id,
                        error = %err,
                        tool_rounds,
                        "turn failed, context reset"
                    );
                } else {
                    tracing::warn!(session = %self.id, error = %err, tool_rounds, "turn failed");
                }
                self.fallback(err, tool_rounds).await
            }
        };

        // The context guard is the turn gate: it is held through synthesis
        // and released only after the final state write.
        self.set_state(TurnState::AwaitingInput);
        drop(context);
        Ok(reply)
    }

    /// Answers a transcription failure with the fallback utterance.
    ///
    /// Takes the same turn gate as [`handle_utterance`](Self::handle_utterance)
    /// but leaves the context untouched.
    pub(crate) async fn transcription_failed(&self, reason: String) -> Result<Reply, SessionError> {
        let context = self.lock_context()?;
        let reply = self.fallback(TurnError::Transcription(reason), 0).await;
        self.set_state(TurnState::AwaitingInput);
        drop(context);
        Ok(reply)
    }

    /// Builds a fallback reply. Callers hold the context guard.
    async fn fallback(&self, failure: TurnError, tool_rounds: usize) -> Reply {
        self.set_state(TurnState::ReplyReady);
        let audio = self.synthesize(FALLBACK_UTTERANCE).await;
        Reply {
            text: FALLBACK_UTTERANCE.to_string(),
            audio,
            failure: Some(failure),
            tool_rounds,
        }
    }

    async fn run_turn(
        &self,
        context: &mut ChatContext,
        text: &str,
        tool_rounds: &mut usize,
    ) -> Result<String, TurnError> {
        context.append(ChatRole::User, text);
        let limit = self.policy.max_tool_depth.max(1);

        for round in 1..=limit {
            context.validate()?;

            self.set_state(TurnState::ModelThinking);
            let outcome = tokio::time::timeout(
                self.policy.llm_timeout,
                self.llm.complete(context, &self.tools),
            )
            .await
            .map_err(|_| TurnError::LlmTimeout(self.policy.llm_timeout))??;

            let calls = match outcome {
                Outcome::DirectReply(reply) => {
                    self.set_state(TurnState::ReplyReady);
                    context.append(ChatRole::Assistant, reply.clone());
                    return Ok(reply);
                }
                Outcome::ToolCalls(calls) if round == limit => {
                    tracing::debug!(requested = calls.len(), "tool calls past the round limit");
                    return Err(TurnError::DepthExceeded { limit });
                }
                Outcome::ToolCalls(calls) => calls,
            };

            self.set_state(TurnState::ToolDispatch);
            for call in calls {
                tracing::debug!(round, tool = %call.name, call_id = %call.id, "dispatching tool");
                context.push(ChatMessage::tool_call(call.clone()))?;
                let result = self.executor.execute(call).await;
                if let Err(err) = &result.outcome {
                    tracing::warn!(tool = %result.tool_name, error = %err, "tool failed");
                }
                context.push(result.to_message())?;
            }
            *tool_rounds = round;
        }

        Err(TurnError::DepthExceeded { limit })
    }

    async fn synthesize(&self, text: &str) -> Option<Vec<u8>> {
        let tts = self.tts.as_ref()?;
        let synthesis = tokio::time::timeout(self.policy.tts_timeout, tts.synthesize(text));
        let result = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return None,
            result = synthesis => result,
        };
        match result {
            Ok(Ok(audio)) => Some(audio),
            Ok(Err(err)) => {
                tracing::warn!(session = %self.id, error = %err, "speech synthesis failed");
                None
            }
            Err(_) => {
                tracing::warn!(
                    session = %self.id,
                    timeout = ?self.policy.tts_timeout,
                    "speech synthesis timed out"
                );
                None
            }
        }
    }

    fn lock_context(&self) -> Result<tokio::sync::MutexGuard<'_, ChatContext>, SessionError> {
        if self.cancel.is_cancelled() {
            return Err(SessionError::Closed);
        }
        self.context
            .try_lock()
            .map_err(|_| SessionError::TurnInProgress)
    }

    fn ensure_primed(&self, context: &mut ChatContext) {
        if !context.has_instructions() {
            tracing::warn!(session = %self.id, "context has no instructions, re-priming");
            context.reprime(self.instructions.clone());
        }
    }

    fn set_state(&self, state: TurnState) {
        *self.state.lock() = state;
    }
}
