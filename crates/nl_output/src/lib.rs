pub mod draft;
pub mod export;

pub use draft::{compose, Newsletter, NewsletterMeta};
pub use export::{to_html, ExportFormat, Exporter};
