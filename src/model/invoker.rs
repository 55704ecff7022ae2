use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;

use crate::{
    error::ChainError,
    interceptor::{ResponseStream, TerminalInvoker},
    types::{ChatRequest, ChatResponse, Generation},
};

use super::{ModelProvider, ModelRequest};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Keep replies concise.";

/// Terminal invoker that sends the user text to a [`ModelProvider`].
pub struct ModelInvoker {
    provider: Arc<dyn ModelProvider>,
    system_prompt: String,
}

impl ModelInvoker {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_owned(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    fn model_request(&self, request: &ChatRequest) -> ModelRequest {
        ModelRequest {
            system_prompt: self.system_prompt.clone(),
            user_prompt: request.user_text.clone(),
        }
    }
}

#[async_trait]
impl TerminalInvoker for ModelInvoker {
    async fn call(&self, request: ChatRequest) -> Result<ChatResponse, ChainError> {
        let text = self
            .provider
            .complete(self.model_request(&request))
            .await
            .map_err(ChainError::terminal)?;

        Ok(ChatResponse::new(
            vec![Generation::finished(text, "stop")],
            request.context,
        ))
    }

    fn stream(&self, request: ChatRequest) -> ResponseStream {
        let model_request = self.model_request(&request);
        let context = request.context;

        self.provider
            .clone()
            .complete_stream(model_request)
            .map(move |delta| {
                delta
                    .map(|text| ChatResponse::new(vec![Generation::new(text)], context.clone()))
                    .map_err(ChainError::terminal)
            })
            .boxed()
    }
}
