//! Producers of incremental text for the chat endpoints.
//!
//! The real model backend lives outside this service; [`EchoGenerator`] replays
//! the prompt in word-sized deltas so both delivery modes can be exercised end to
//! end.

use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt};

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Prompt is empty")]
    EmptyPrompt,

    #[error("Generation failed: {0}")]
    Backend(String),
}

/// A stream of text deltas; ends on completion, yields `Err` on failure.
pub type DeltaStream = BoxStream<'static, Result<String, GenerateError>>;

pub trait TextGenerator: Send + Sync {
    /// Start generating for `prompt`. Rejections that happen before any output
    /// is produced are returned directly.
    fn generate(&self, prompt: &str) -> Result<DeltaStream, GenerateError>;

    fn name(&self) -> &str;
}

/// Echoes the prompt back, one whitespace-terminated word per delta.
#[derive(Debug, Clone)]
pub struct EchoGenerator {
    delay: Duration,
}

impl EchoGenerator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl TextGenerator for EchoGenerator {
    fn generate(&self, prompt: &str) -> Result<DeltaStream, GenerateError> {
        if prompt.trim().is_empty() {
            return Err(GenerateError::EmptyPrompt);
        }
        let words: Vec<String> = prompt.split_inclusive(' ').map(str::to_string).collect();
        let delay = self.delay;
        let deltas = stream::iter(words).then(move |word| async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok::<_, GenerateError>(word)
        });
        Ok(deltas.boxed())
    }

    fn name(&self) -> &str {
        "echo"
    }
}
