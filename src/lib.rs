pub mod chain;
pub mod config;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod logging;
pub mod model;
pub mod safety;
pub mod types;

pub use chain::{Chain, InterceptorChain, InterceptorChainBuilder};
pub use error::ChainError;
pub use interceptor::{DEFAULT_ORDER, Interceptor, ResponseStream, TerminalInvoker};
pub use safety::SafetyGuard;
pub use types::{ChatContext, ChatRequest, ChatResponse, Generation};
