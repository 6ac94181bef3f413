//! `OpenAI` [`LlmProvider`] implementation using the Responses API.

use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::responses::{
    CreateResponse, CreateResponseArgs, EasyInputContent, EasyInputMessage, FunctionCallOutput,
    FunctionCallOutputItemParam, FunctionTool, FunctionToolCall, InputItem, InputParam, Item,
    OutputItem, OutputMessageContent, Response, ResponseUsage, Role, Tool, ToolChoiceFunction,
    ToolChoiceOptions, ToolChoiceParam,
};
use async_trait::async_trait;
use yatra_models::llm::{
    AssistantBlock, ChatMessage, ChatRole, GenerationError, GenerationRequest, GenerationResponse,
    LlmProvider, MessageKind, ToolCall, ToolChoice, Usage,
};

/// `OpenAI` [`LlmProvider`] implementation using the Responses API.
pub struct OpenAiProvider {
    config: OpenAIConfig,
    client: async_openai::Client<OpenAIConfig>,
}

impl OpenAiProvider {
    /// Creates a new provider with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_config(OpenAIConfig::new().with_api_key(api_key))
    }

    /// Creates a provider from a fully built client configuration.
    #[must_use]
    pub fn from_config(config: OpenAIConfig) -> Self {
        Self {
            client: async_openai::Client::with_config(config.clone()),
            config,
        }
    }

    /// Points the provider at another API origin, such as a gateway or a
    /// local mock server. The `/v1` prefix is appended.
    #[must_use]
    pub fn with_base_url(self, base_url: impl AsRef<str>) -> Self {
        let api_base = format!("{}/v1", base_url.as_ref().trim_end_matches('/'));
        Self::from_config(self.config.with_api_base(api_base))
    }
}

impl core::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OpenAiProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(
        &self,
        model: &str,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let create_response = convert_request(model, &request)?;
        tracing::debug!(
            model,
            messages = request.messages.len(),
            tools = request.tools.as_ref().map_or(0, Vec::len),
            "sending response request"
        );

        let response = self
            .client
            .responses()
            .create(create_response)
            .await
            .map_err(convert_error)?;
        convert_response(response)
    }
}

fn convert_request(
    model: &str,
    request: &GenerationRequest,
) -> Result<CreateResponse, GenerationError> {
    let (instructions, input_items) = convert_messages(&request.messages)?;

    let tools: Option<Vec<Tool>> = request.tools.as_ref().map(|tools| {
        tools
            .iter()
            .map(|tool| {
                Tool::Function(FunctionTool {
                    name: tool.name.clone(),
                    description: Some(tool.description.clone()),
                    parameters: Some(tool.parameters.clone()),
                    strict: Some(false),
                })
            })
            .collect()
    });

    let mut builder = CreateResponseArgs::default();
    builder.model(model).input(InputParam::Items(input_items));

    if let Some(instructions) = instructions {
        builder.instructions(instructions);
    }
    if let Some(tools) = tools {
        builder.tools(tools);
    }
    if let Some(choice) = &request.tool_choice {
        builder.tool_choice(convert_tool_choice(choice));
    }

    builder.build().map_err(|build_err| {
        GenerationError::InvalidRequest(format!("failed to build response request: {build_err}"))
    })
}

/// Splits the conversation into the `instructions` string (every system
/// message, in order) and the input items for everything else.
fn convert_messages(
    messages: &[ChatMessage],
) -> Result<(Option<String>, Vec<InputItem>), GenerationError> {
    let mut system = Vec::new();
    let mut items = Vec::with_capacity(messages.len());

    for message in messages {
        match (&message.kind, message.role) {
            (MessageKind::ToolCall { call }, _) => {
                items.push(InputItem::Item(Item::FunctionCall(FunctionToolCall {
                    call_id: call.id.clone(),
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                    id: None,
                    status: None,
                })));
            }
            (MessageKind::ToolResult { call_id, .. }, _) => {
                items.push(InputItem::Item(Item::FunctionCallOutput(
                    FunctionCallOutputItemParam {
                        call_id: call_id.clone(),
                        output: FunctionCallOutput::Text(message.text().to_string()),
                        id: None,
                        status: None,
                    },
                )));
            }
            (MessageKind::Message, ChatRole::System) => system.push(message.text()),
            (MessageKind::Message, ChatRole::User) => {
                items.push(easy_message(Role::User, message.text()));
            }
            (MessageKind::Message, ChatRole::Assistant) => {
                items.push(easy_message(Role::Assistant, message.text()));
            }
            (MessageKind::Message, ChatRole::Tool) => {
                return Err(GenerationError::InvalidRequest(format!(
                    "tool message '{}' is not linked to a tool call",
                    message.id
                )));
            }
        }
    }

    let instructions = (!system.is_empty()).then(|| system.join("\n\n"));
    Ok((instructions, items))
}

fn easy_message(role: Role, text: &str) -> InputItem {
    InputItem::EasyMessage(EasyInputMessage {
        content: EasyInputContent::Text(text.to_string()),
        role,
        r#type: Default::default(),
    })
}

fn convert_tool_choice(choice: &ToolChoice) -> ToolChoiceParam {
    match choice {
        ToolChoice::Auto => ToolChoiceParam::Mode(ToolChoiceOptions::Auto),
        ToolChoice::Required => ToolChoiceParam::Mode(ToolChoiceOptions::Required),
        ToolChoice::None => ToolChoiceParam::Mode(ToolChoiceOptions::None),
        ToolChoice::Specific(name) => {
            ToolChoiceParam::Function(ToolChoiceFunction { name: name.clone() })
        }
    }
}

fn convert_response(response: Response) -> Result<GenerationResponse, GenerationError> {
    let mut content = Vec::new();
    for item in response.output {
        match item {
            OutputItem::Message(message) => {
                for part in message.content {
                    match part {
                        OutputMessageContent::OutputText(text) if text.text.is_empty() => {}
                        OutputMessageContent::OutputText(text) => {
                            content.push(AssistantBlock::Text(text.text));
                        }
                        OutputMessageContent::Refusal(refusal) => {
                            return Err(GenerationError::Refusal(refusal.refusal));
                        }
                    }
                }
            }
            // The raw argument string is kept; the executor parses it.
            OutputItem::FunctionCall(call) => {
                content.push(AssistantBlock::ToolCall(ToolCall {
                    id: call.call_id,
                    name: call.name,
                    arguments: call.arguments,
                }));
            }
            other => {
                tracing::debug!(item = ?other, "dropping unsupported output item");
            }
        }
    }

    let usage = response.usage.map(convert_usage).unwrap_or_default();
    tracing::debug!(blocks = content.len(), "response received");

    Ok(GenerationResponse { content, usage })
}

fn convert_usage(usage: ResponseUsage) -> Usage {
    Usage {
        input_tokens: Some(u64::from(usage.input_tokens)),
        output_tokens: Some(u64::from(usage.output_tokens)),
        total_tokens: Some(u64::from(usage.total_tokens)),
    }
}

fn convert_error(err: OpenAIError) -> GenerationError {
    match err {
        OpenAIError::ApiError(api_err) => match api_err.code.as_deref() {
            Some("invalid_api_key") => GenerationError::Auth(api_err.message),
            Some("rate_limit_exceeded") => GenerationError::RateLimited { retry_after: None },
            _ => GenerationError::Provider {
                status: None,
                message: api_err.message.clone(),
                source: Some(Box::new(OpenAIError::ApiError(api_err))),
            },
        },
        OpenAIError::Reqwest(reqwest_err) => {
            let message = reqwest_err.to_string();
            match reqwest_err.status().map(|status| status.as_u16()) {
                Some(401 | 403) => GenerationError::Auth(message),
                Some(429) => GenerationError::RateLimited { retry_after: None },
                Some(status) => GenerationError::Provider {
                    status: Some(status),
                    message,
                    source: Some(Box::new(reqwest_err)),
                },
                None => GenerationError::Http(message),
            }
        }
        OpenAIError::JSONDeserialize(serde_err, ref _body) => GenerationError::Json(serde_err),
        OpenAIError::InvalidArgument(message) => GenerationError::InvalidRequest(message),
        _ => GenerationError::Provider {
            status: None,
            message: err.to_string(),
            source: Some(Box::new(err)),
        },
    }
}
