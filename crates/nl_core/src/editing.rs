use async_trait::async_trait;

use crate::types::Correction;
use crate::Result;

/// Editing collaborator: produces corrected text for text. The concrete
/// checker is an external service; this trait is the whole surface the
/// pipeline sees.
#[async_trait]
pub trait Editor: Send + Sync {
    fn name(&self) -> &str;

    async fn correct(&self, text: &str) -> Result<Correction>;
}
