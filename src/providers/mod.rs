//! Provider families, model lists and remote metadata.

pub mod registry;
pub mod remote;
pub mod template;

pub use registry::{effective_models, models_with_source, ModelSource, ModelWithSource};
pub use remote::{fetch_models, supports_key_validation, supports_model_fetch, validate_api_key, ModelMeta};
pub use template::{template_by_id, EnvRule, ProviderTemplate, ANTHROPIC_TEMPLATE_ID, TEMPLATES};
