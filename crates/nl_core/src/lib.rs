pub mod config;
pub mod editing;
pub mod error;
pub mod models;
pub mod similarity;
pub mod sources;
pub mod types;

pub use config::Config;
pub use editing::Editor;
pub use error::Error;
pub use models::InferenceModel;
pub use similarity::{cosine_similarity, normalized};
pub use sources::ContentSource;
pub use types::{Article, Category, Correction, Fix};

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use super::{Article, Category, ContentSource, Editor, Error, InferenceModel, Result};
}
