//! Model lists derived from a provider and its template.

use super::template::template_by_id;
use crate::config::Provider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSource {
    /// Stored by the user and not part of the template defaults
    User,
    /// Shipped with the template
    Default,
}

impl ModelSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSource::User => "user",
            ModelSource::Default => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelWithSource {
    pub name: String,
    pub source: ModelSource,
}

/// The provider's stored models followed by template defaults not already
/// present. First occurrence wins. Always empty for OAuth providers.
pub fn effective_models(provider: &Provider) -> Vec<String> {
    if provider.is_oauth() {
        return Vec::new();
    }

    let defaults = template_by_id(&provider.template_id)
        .map(|t| t.default_models)
        .unwrap_or_default();

    let mut models: Vec<String> = Vec::with_capacity(provider.models.len() + defaults.len());
    let candidates = provider
        .models
        .iter()
        .map(String::as_str)
        .chain(defaults.iter().copied());
    for model in candidates {
        if !models.iter().any(|m| m == model) {
            models.push(model.to_string());
        }
    }
    models
}

/// [`effective_models`] annotated with where each entry comes from. A stored
/// model that is also a template default counts as a default.
pub fn models_with_source(provider: &Provider) -> Vec<ModelWithSource> {
    let defaults = template_by_id(&provider.template_id)
        .map(|t| t.default_models)
        .unwrap_or_default();

    effective_models(provider)
        .into_iter()
        .map(|name| {
            let source = if defaults.contains(&name.as_str()) {
                ModelSource::Default
            } else {
                ModelSource::User
            };
            ModelWithSource { name, source }
        })
        .collect()
}
