use crate::CollaboratorError;
use async_trait::async_trait;

/// Hosted text-completion service used for semantic search and guidance.
#[async_trait]
pub trait TextCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, CollaboratorError>;
}
