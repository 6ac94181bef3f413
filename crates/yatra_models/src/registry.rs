//! Name-to-provider lookup.

use crate::error::CreateModelError;
use crate::llm::{Llm, LlmProvider};
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves `provider/model` ids such as `"openai/gpt-4o"` to [`Llm`] handles.
///
/// Fill it once at startup, then share it read-only.
///
/// ```
/// # use yatra_models::ModelRegistry;
/// # use yatra_models::llm::{LlmProvider, GenerationRequest, GenerationResponse, GenerationError};
/// # use async_trait::async_trait;
/// # use std::sync::Arc;
/// # struct MyProvider;
/// # #[async_trait]
/// # impl LlmProvider for MyProvider {
/// #   async fn generate(&self, _model: &str, _request: GenerationRequest) -> Result<GenerationResponse, GenerationError> {
/// #     unimplemented!()
/// #   }
/// # }
/// let mut registry = ModelRegistry::new();
/// registry.register_llm_provider("mine", Arc::new(MyProvider));
///
/// let llm = registry.llm("mine/small").unwrap();
/// assert_eq!(llm.model_name(), "small");
/// ```
#[derive(Default)]
pub struct ModelRegistry {
    providers: HashMap<String, Arc<dyn LlmProvider>>,
}

impl core::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("providers", &self.llm_provider_names())
            .finish()
    }
}

impl ModelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the provider named before the slash and binds it to the model
    /// named after it.
    ///
    /// # Errors
    ///
    /// [`CreateModelError::InvalidModelId`] when either half is missing,
    /// [`CreateModelError::UnknownProvider`] when nothing is registered under
    /// the provider name.
    pub fn llm(&self, model_id: impl AsRef<str>) -> Result<Llm, CreateModelError> {
        let model_id = model_id.as_ref();

        let Some((vendor, model)) = model_id
            .split_once('/')
            .filter(|(vendor, model)| !vendor.is_empty() && !model.is_empty())
        else {
            return Err(CreateModelError::InvalidModelId(model_id.to_string()));
        };

        let Some(provider) = self.providers.get(vendor) else {
            return Err(CreateModelError::UnknownProvider(vendor.to_string()));
        };

        tracing::debug!(provider = vendor, model, "resolved llm");
        Ok(Llm::new(Arc::clone(provider), model))
    }

    /// Adds `provider` under `name`, the part of a model id before the slash.
    ///
    /// # Panics
    ///
    /// Registering the same name twice is a wiring bug and panics.
    pub fn register_llm_provider<P: LlmProvider>(
        &mut self,
        name: impl Into<String>,
        provider: Arc<P>,
    ) {
        let name = name.into();
        assert!(
            !self.providers.contains_key(&name),
            "provider `{name}` already registered"
        );
        self.providers.insert(name, provider);
    }

    /// The provider registered under `name`.
    #[must_use]
    pub fn get_llm_provider(&self, name: impl AsRef<str>) -> Option<Arc<dyn LlmProvider>> {
        self.providers.get(name.as_ref()).map(Arc::clone)
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn has_llm_provider(&self, name: impl AsRef<str>) -> bool {
        self.providers.contains_key(name.as_ref())
    }

    /// Registered names in sorted order.
    #[must_use]
    pub fn llm_provider_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }
}
