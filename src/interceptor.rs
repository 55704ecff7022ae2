use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::{
    chain::Chain,
    error::ChainError,
    types::{ChatRequest, ChatResponse},
};

/// Order used by interceptors that do not override [`Interceptor::order`].
pub const DEFAULT_ORDER: i32 = 0;

/// Lazily produced response fragments. Dropping the stream cancels everything upstream.
pub type ResponseStream = BoxStream<'static, Result<ChatResponse, ChainError>>;

/// A unit of logic wrapped around a chat call.
///
/// Implementations either delegate through `chain` (optionally rewriting the
/// request on the way in or the response on the way out) or answer directly,
/// in which case later interceptors and the terminal invoker never run.
#[async_trait]
pub trait Interceptor: Send + Sync {
    async fn around_call(
        &self,
        request: ChatRequest,
        chain: Chain,
    ) -> Result<ChatResponse, ChainError>;

    /// Streaming counterpart of [`Interceptor::around_call`]. A short-circuit
    /// returns a stream that completes without yielding anything.
    fn around_stream(&self, request: ChatRequest, chain: Chain) -> ResponseStream;

    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Lower values run earlier.
    fn order(&self) -> i32 {
        DEFAULT_ORDER
    }
}

/// The operation at the end of a chain, usually the model call.
#[async_trait]
pub trait TerminalInvoker: Send + Sync {
    async fn call(&self, request: ChatRequest) -> Result<ChatResponse, ChainError>;

    fn stream(&self, request: ChatRequest) -> ResponseStream;
}

fn short_type_name(full: &'static str) -> &'static str {
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}
