use anyhow::Result;
use async_trait::async_trait;

/// One round-trip to a chat-completion provider.
///
/// Implementations send a system prompt and a user prompt and return the
/// assistant's text. Errors carry the provider's status and body so callers
/// can log them, but callers are expected to recover (the summarizer never
/// lets a completion failure escape).
#[async_trait]
pub trait CompletionAgent: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String>;
}
