use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Instant,
};

use async_trait::async_trait;
use futures::{StreamExt, future, stream};
use serde_json::json;
use tracing::{debug, info};

use crate::{
    chain::Chain,
    error::ChainError,
    interceptor::{Interceptor, ResponseStream},
    types::{ChatRequest, ChatResponse},
};

pub const DEFAULT_LOGGING_ORDER: i32 = 100;
pub const ELAPSED_MS_KEY: &str = "logging.elapsed_ms";

/// Logs each call on the way in and out and records the elapsed time in the
/// response context.
#[derive(Debug, Clone)]
pub struct LoggingInterceptor {
    order: i32,
}

impl Default for LoggingInterceptor {
    fn default() -> Self {
        Self {
            order: DEFAULT_LOGGING_ORDER,
        }
    }
}

impl LoggingInterceptor {
    pub fn with_order(order: i32) -> Self {
        Self { order }
    }
}

#[async_trait]
impl Interceptor for LoggingInterceptor {
    async fn around_call(
        &self,
        request: ChatRequest,
        chain: Chain,
    ) -> Result<ChatResponse, ChainError> {
        let started_at = Instant::now();
        info!(
            text_len = request.user_text.len(),
            context_keys = ?request.context.keys().collect::<Vec<_>>(),
            "chat call started"
        );

        let mut response = chain.next_call(request).await?;
        let elapsed_ms = elapsed_ms(started_at);
        response
            .context
            .insert(ELAPSED_MS_KEY.to_owned(), json!(elapsed_ms));

        info!(
            generations = response.generations.len(),
            elapsed_ms, "chat call finished"
        );
        Ok(response)
    }

    fn around_stream(&self, request: ChatRequest, chain: Chain) -> ResponseStream {
        let started_at = Instant::now();
        info!(
            text_len = request.user_text.len(),
            context_keys = ?request.context.keys().collect::<Vec<_>>(),
            "chat stream started"
        );

        let fragments = Arc::new(AtomicUsize::new(0));
        let seen = fragments.clone();
        let finished = stream::once(async move {
            info!(
                fragments = fragments.load(Ordering::Relaxed),
                elapsed_ms = elapsed_ms(started_at),
                "chat stream finished"
            );
        })
        .filter_map(|()| future::ready(None));

        chain
            .next_stream(request)
            .inspect(move |item| match item {
                Ok(fragment) => {
                    let fragment_no = seen.fetch_add(1, Ordering::Relaxed) + 1;
                    debug!(
                        fragment = fragment_no,
                        generations = fragment.generations.len(),
                        "chat stream fragment"
                    );
                }
                Err(error) => {
                    debug!(%error, fragments = seen.load(Ordering::Relaxed), "chat stream failed");
                }
            })
            .chain(finished)
            .boxed()
    }

    fn order(&self) -> i32 {
        self.order
    }
}

fn elapsed_ms(started_at: Instant) -> u64 {
    started_at.elapsed().as_millis().try_into().unwrap_or(u64::MAX)
}
