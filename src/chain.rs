use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use futures::{StreamExt, future, stream};
use tracing::{debug, warn};

use crate::{
    error::ChainError,
    interceptor::{Interceptor, ResponseStream, TerminalInvoker},
    types::{ChatRequest, ChatResponse},
};

struct ChainInner {
    interceptors: Vec<Arc<dyn Interceptor>>,
    terminal: Arc<dyn TerminalInvoker>,
}

/// Interceptors sorted by [`Interceptor::order`] around a terminal invoker.
///
/// Built once and shared; every [`invoke`](Self::invoke) or
/// [`invoke_streaming`](Self::invoke_streaming) walks the list with its own
/// [`Chain`] cursor, so concurrent calls never share position state.
#[derive(Clone)]
pub struct InterceptorChain {
    inner: Arc<ChainInner>,
}

#[derive(Default)]
pub struct InterceptorChainBuilder {
    interceptors: Vec<Arc<dyn Interceptor>>,
    terminal: Option<Arc<dyn TerminalInvoker>>,
}

impl InterceptorChainBuilder {
    pub fn interceptor(self, interceptor: impl Interceptor + 'static) -> Self {
        self.shared_interceptor(Arc::new(interceptor))
    }

    pub fn shared_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn interceptors(
        mut self,
        interceptors: impl IntoIterator<Item = Arc<dyn Interceptor>>,
    ) -> Self {
        self.interceptors.extend(interceptors);
        self
    }

    pub fn terminal(self, terminal: impl TerminalInvoker + 'static) -> Self {
        self.shared_terminal(Arc::new(terminal))
    }

    pub fn shared_terminal(mut self, terminal: Arc<dyn TerminalInvoker>) -> Self {
        self.terminal = Some(terminal);
        self
    }

    pub fn build(self) -> Result<InterceptorChain, ChainError> {
        let terminal = self.terminal.ok_or(ChainError::MissingTerminal)?;

        // sort_by_key is stable, so equal orders keep registration order
        let mut interceptors = self.interceptors;
        interceptors.sort_by_key(|interceptor| interceptor.order());

        debug!(
            interceptors = ?interceptors
                .iter()
                .map(|interceptor| format!("{}({})", interceptor.name(), interceptor.order()))
                .collect::<Vec<_>>(),
            "built interceptor chain"
        );

        Ok(InterceptorChain {
            inner: Arc::new(ChainInner {
                interceptors,
                terminal,
            }),
        })
    }
}

impl InterceptorChain {
    pub fn builder() -> InterceptorChainBuilder {
        InterceptorChainBuilder::default()
    }

    /// Interceptor names in execution order.
    pub fn interceptor_names(&self) -> Vec<&str> {
        self.inner
            .interceptors
            .iter()
            .map(|interceptor| interceptor.name())
            .collect()
    }

    pub async fn invoke(&self, request: ChatRequest) -> Result<ChatResponse, ChainError> {
        let result = self.cursor().next_call(request).await;
        if let Err(error) = &result {
            warn!(%error, "interceptor chain call failed");
        }
        result
    }

    /// Streams the response through every interceptor. The first `Err`
    /// element is the last element the caller sees.
    pub fn invoke_streaming(&self, request: ChatRequest) -> ResponseStream {
        end_after_error(self.cursor().next_stream(request))
    }

    fn cursor(&self) -> Chain {
        Chain::at(self.inner.clone(), 0)
    }
}

/// Cursor handed to an interceptor. It may advance exactly once.
pub struct Chain {
    inner: Arc<ChainInner>,
    position: usize,
    advanced: AtomicBool,
}

impl Chain {
    fn at(inner: Arc<ChainInner>, position: usize) -> Self {
        Self {
            inner,
            position,
            advanced: AtomicBool::new(false),
        }
    }

    pub async fn next_call(&self, request: ChatRequest) -> Result<ChatResponse, ChainError> {
        self.advance()?;

        match self.inner.interceptors.get(self.position) {
            Some(interceptor) => {
                debug!(
                    interceptor = %interceptor.name(),
                    position = self.position,
                    "around_call"
                );
                let next = Chain::at(self.inner.clone(), self.position + 1);
                interceptor.around_call(request, next).await
            }
            None => {
                debug!(position = self.position, "calling terminal invoker");
                self.inner.terminal.call(request).await
            }
        }
    }

    pub fn next_stream(&self, request: ChatRequest) -> ResponseStream {
        if let Err(error) = self.advance() {
            return stream::once(future::ready(Err(error))).boxed();
        }

        match self.inner.interceptors.get(self.position) {
            Some(interceptor) => {
                debug!(
                    interceptor = %interceptor.name(),
                    position = self.position,
                    "around_stream"
                );
                let next = Chain::at(self.inner.clone(), self.position + 1);
                interceptor.around_stream(request, next)
            }
            None => {
                debug!(position = self.position, "streaming from terminal invoker");
                self.inner.terminal.stream(request)
            }
        }
    }

    fn advance(&self) -> Result<(), ChainError> {
        if self.advanced.swap(true, Ordering::AcqRel) {
            return Err(ChainError::Reused {
                position: self.position,
            });
        }
        Ok(())
    }
}

fn end_after_error(stream: ResponseStream) -> ResponseStream {
    stream
        .scan(false, |failed, item| {
            if *failed {
                return future::ready(None);
            }
            *failed = item.is_err();
            future::ready(Some(item))
        })
        .boxed()
}
