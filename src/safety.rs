use async_trait::async_trait;
use futures::{StreamExt, stream};
use tracing::info;

use crate::{
    chain::Chain,
    error::ChainError,
    interceptor::{DEFAULT_ORDER, Interceptor, ResponseStream},
    types::{ChatRequest, ChatResponse},
};

/// Stops a call before it reaches the model when the user text contains a
/// blocked term.
///
/// Matching is a case-sensitive substring test with no word boundaries, so
/// `"attack"` also blocks `"attackers"`. A blocked call yields an empty
/// response (or an empty stream) carrying the request context unchanged.
#[derive(Debug, Clone, Default)]
pub struct SafetyGuard {
    blocked_terms: Vec<String>,
    order: i32,
}

impl SafetyGuard {
    pub fn new<I, S>(blocked_terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blocked_terms: blocked_terms.into_iter().map(Into::into).collect(),
            order: DEFAULT_ORDER,
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn blocked_terms(&self) -> &[String] {
        &self.blocked_terms
    }

    /// First configured term found in `input`, if any.
    pub fn matched_term(&self, input: &str) -> Option<&str> {
        self.blocked_terms
            .iter()
            .find(|term| input.contains(term.as_str()))
            .map(String::as_str)
    }

    fn check(&self, request: &ChatRequest) -> Option<&str> {
        let term = self.matched_term(&request.user_text)?;
        info!(
            interceptor = %self.name(),
            blocked_term = %term,
            "blocked term in user text; skipping model call"
        );
        Some(term)
    }
}

#[async_trait]
impl Interceptor for SafetyGuard {
    async fn around_call(
        &self,
        request: ChatRequest,
        chain: Chain,
    ) -> Result<ChatResponse, ChainError> {
        if self.check(&request).is_some() {
            return Ok(ChatResponse::empty(request.context));
        }
        chain.next_call(request).await
    }

    fn around_stream(&self, request: ChatRequest, chain: Chain) -> ResponseStream {
        if self.check(&request).is_some() {
            return stream::empty().boxed();
        }
        chain.next_stream(request)
    }

    fn order(&self) -> i32 {
        self.order
    }
}
