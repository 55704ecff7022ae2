mod invoker;
mod mock;
mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use futures::{StreamExt, stream::BoxStream};

pub use invoker::{DEFAULT_SYSTEM_PROMPT, ModelInvoker};
pub use mock::MockModelProvider;
pub use openai::{DEFAULT_BASE_URL, OpenAiProvider};

pub type TextStream = BoxStream<'static, anyhow::Result<String>>;

#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub system_prompt: String,
    pub user_prompt: String,
}

#[async_trait]
pub trait ModelProvider: Send + Sync + 'static {
    async fn complete(&self, request: ModelRequest) -> anyhow::Result<String>;

    /// Text deltas of a completion. Providers without native streaming emit
    /// the whole completion as a single delta.
    fn complete_stream(self: Arc<Self>, request: ModelRequest) -> TextStream {
        futures::stream::once(async move { self.complete(request).await }).boxed()
    }
}
