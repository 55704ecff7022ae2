use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key-value attachments carried along the chain. Later writes to the same key win.
pub type ChatContext = HashMap<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_text: String,
    #[serde(default)]
    pub context: ChatContext,
}

impl ChatRequest {
    pub fn new(user_text: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
            context: ChatContext::new(),
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl Generation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: None,
        }
    }

    pub fn finished(text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: Some(reason.into()),
        }
    }
}

/// Result of a chain invocation, or one fragment of a streamed result.
///
/// A response with no generations is a normal outcome (for example a request
/// stopped by [`SafetyGuard`](crate::safety::SafetyGuard)) and is not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub generations: Vec<Generation>,
    #[serde(default)]
    pub context: ChatContext,
}

impl ChatResponse {
    pub fn new(generations: Vec<Generation>, context: ChatContext) -> Self {
        Self {
            generations,
            context,
        }
    }

    pub fn empty(context: ChatContext) -> Self {
        Self {
            generations: Vec::new(),
            context,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    pub fn text(&self) -> Option<&str> {
        self.generations
            .first()
            .map(|generation| generation.text.as_str())
    }
}
