use std::sync::Arc;

use nl_core::{Config, Error, InferenceModel, Result};

pub mod dummy;
pub mod gemini;

pub use dummy::DummyModel;
pub use gemini::GeminiModel;

/// Build an inference provider by name. `gemini` needs an API key in the
/// configuration; `dummy` runs offline.
pub fn create_model(name: &str, config: &Config) -> Result<Arc<dyn InferenceModel>> {
    match name.to_ascii_lowercase().as_str() {
        "gemini" => Ok(Arc::new(GeminiModel::new(config.gemini_api_key.clone())?)),
        "dummy" => Ok(Arc::new(DummyModel::new())),
        other => Err(Error::Inference(format!(
            "unknown inference model: {} (available: gemini, dummy)",
            other
        ))),
    }
}
