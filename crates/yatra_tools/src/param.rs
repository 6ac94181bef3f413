//! Decoding the arguments a model sends with a tool call.

use crate::error::ToolError;
use crate::schema::ParameterInfo;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tool arguments after parsing, keyed by parameter name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Tool the arguments belong to.
    pub name: String,
    /// Decoded argument object.
    pub parameters: Map<String, Value>,
}

impl FunctionCall {
    /// Wraps an already decoded argument object.
    pub fn new(name: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    /// Parses the raw argument string sent by the model.
    ///
    /// An empty or whitespace-only string is treated as `{}`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::ParameterError`] if the string is not valid JSON
    /// or does not encode an object.
    pub fn parse(name: impl Into<String>, raw: &str) -> Result<Self, ToolError> {
        let name = name.into();
        if raw.trim().is_empty() {
            return Ok(Self::new(name, Map::new()));
        }
        let value: Value = serde_json::from_str(raw).map_err(|err| {
            ToolError::parameter_error(format!("Arguments for '{name}' are not valid JSON: {err}"))
        })?;
        Self::from_value(name, value)
    }

    /// Accepts `parameters` only if it is a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::ParameterError`] for arrays, scalars and `null`.
    pub fn from_value(name: impl Into<String>, parameters: Value) -> Result<Self, ToolError> {
        let Value::Object(map) = parameters else {
            return Err(ToolError::parameter_error("Parameters must be an object"));
        };
        Ok(Self::new(name, map))
    }

    /// Reads argument `name` as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::ParameterError`] if it is absent or has the wrong shape.
    pub fn get_param<T: DeserializeOwned>(&self, name: &str) -> Result<T, ToolError> {
        match self.parameters.get(name) {
            Some(value) => decode(name, value),
            None => Err(ToolError::parameter_error(format!("Missing parameter: {name}"))),
        }
    }

    /// Like [`get_param`](Self::get_param), but absent and `null` read as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::ParameterError`] if a present value has the wrong shape.
    pub fn get_optional_param<T: DeserializeOwned>(
        &self,
        name: &str,
    ) -> Result<Option<T>, ToolError> {
        self.parameters
            .get(name)
            .filter(|value| !value.is_null())
            .map(|value| decode(name, value))
            .transpose()
    }
}

fn decode<T: DeserializeOwned>(name: &str, value: &Value) -> Result<T, ToolError> {
    T::deserialize(value)
        .map_err(|err| ToolError::parameter_error(format!("Parameter '{name}' is malformed: {err}")))
}

/// Types usable as a single tool parameter.
pub trait InputParam {
    /// A required [`ParameterInfo`] named `param_name` with this type's schema.
    fn schema_info(param_name: &str) -> ParameterInfo;
}

impl<T: DeserializeOwned + JsonSchema> InputParam for T {
    fn schema_info(param_name: &str) -> ParameterInfo {
        let schema = T::json_schema(&mut schemars::SchemaGenerator::default());
        ParameterInfo::new(param_name, schema.to_value())
    }
}
