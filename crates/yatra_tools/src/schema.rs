//! Tool parameter schemas.
//!
//! [`FunctionMetadata`] assembles per-parameter [`ParameterInfo`] into the
//! object schema the model sees, and [`validate_arguments`] holds model
//! supplied arguments to that schema before a handler runs.

use crate::error::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use yatra_models::llm::ToolDefinition;

/// One named parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Property name in the argument object.
    pub name: String,
    /// Shown to the model next to the schema.
    pub description: Option<String>,
    /// Schema of the value.
    pub schema: Value,
    /// Listed under `required` when set.
    pub required: bool,
    /// Advertised default; implies optional.
    pub default_value: Option<Value>,
}

impl ParameterInfo {
    /// A required parameter.
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            description: None,
            schema,
            required: true,
            default_value: None,
        }
    }

    /// Sets the parameter description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the parameter optional with a default value.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.required = false;
        self.default_value = Some(default);
        self
    }

    fn property_schema(&self) -> Value {
        let mut schema = self.schema.clone();
        if let Some(obj) = schema.as_object_mut() {
            if let Some(description) = &self.description {
                obj.insert("description".into(), Value::String(description.clone()));
            }
            if let Some(default) = &self.default_value {
                obj.insert("default".into(), default.clone());
            }
        }
        schema
    }
}

/// Name, description and parameters of a closure-backed tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionMetadata {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: Option<String>,
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterInfo>,
    schema: Value,
}

impl FunctionMetadata {
    /// Metadata with no description and no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        let mut metadata = Self {
            name: name.into(),
            description: None,
            parameters: Vec::new(),
            schema: Value::Null,
        };
        metadata.rebuild_schema();
        metadata
    }

    /// Sets the tool description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn add_parameter(mut self, param: ParameterInfo) -> Self {
        self.parameters.push(param);
        self.rebuild_schema();
        self
    }

    /// The object schema covering every parameter.
    #[must_use]
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// The model-facing definition.
    pub fn to_tool_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
            parameters: self.schema.clone(),
        }
    }

    fn rebuild_schema(&mut self) {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|param| (param.name.clone(), param.property_schema()))
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|param| param.required && param.default_value.is_none())
            .map(|param| param.name.as_str())
            .collect();

        self.schema = json!({
            "type": "object",
            "properties": properties,
            "required": required,
        });
    }
}

/// Checks arguments against a tool's JSON schema.
///
/// # Errors
///
/// Returns [`ToolError::ParameterError`] listing every violation, or
/// [`ToolError::ExecutionError`] when the schema itself does not compile.
pub fn validate_arguments(schema: &Value, args: &Value) -> Result<(), ToolError> {
    let validator = jsonschema::Validator::new(schema)
        .map_err(|err| ToolError::execution_error(format!("invalid tool schema: {err}")))?;
    if validator.is_valid(args) {
        return Ok(());
    }
    let violations: Vec<String> = validator.iter_errors(args).map(|err| err.to_string()).collect();
    Err(ToolError::parameter_error(format!(
        "Invalid arguments: {}",
        violations.join("; ")
    )))
}
