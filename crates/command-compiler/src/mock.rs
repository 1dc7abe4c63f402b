//! Offline completer for development and testing

use crate::error::{ProviderError, Result};
use crate::llm::{CodeCompleter, Completion, SYSTEM_PROMPT};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Completer that answers every prompt with the same reply
pub struct MockCompleter {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl MockCompleter {
    /// Always answer with `reply` (markdown fences are stripped).
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Behave like a provider without credentials.
    pub fn unavailable() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of prompts received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl CodeCompleter for MockCompleter {
    fn name(&self) -> &str {
        "mock"
    }

    fn complete(&self, prompt: &str) -> Result<Completion> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(prompt_len = prompt.len(), "mock completion requested");
        match &self.reply {
            Some(reply) => {
                // a real provider bills the system prompt as input too
                let tokens = [SYSTEM_PROMPT, prompt, reply.as_str()]
                    .iter()
                    .map(|text| text.split_whitespace().count())
                    .sum::<usize>();
                Completion::from_raw(reply, u32::try_from(tokens).unwrap_or(u32::MAX))
            }
            None => Err(ProviderError::MissingCredentials("mock".to_string())),
        }
    }
}
