pub mod models;

pub use models::{create_model, DummyModel, GeminiModel};
pub use models::dummy::VECTOR_SIZE;

pub mod prelude {
    pub use super::models::create_model;
    pub use nl_core::{Article, Error, InferenceModel, Result};
}
