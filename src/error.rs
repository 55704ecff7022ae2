use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("interceptor chain has no terminal invoker")]
    MissingTerminal,

    #[error("chain position {position} was already advanced; build a new chain per call")]
    Reused { position: usize },

    #[error("interceptor {name} failed: {source}")]
    Interceptor {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("terminal invoker failed: {0}")]
    Terminal(#[source] anyhow::Error),
}

impl ChainError {
    pub fn interceptor(name: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Interceptor {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn terminal(source: impl Into<anyhow::Error>) -> Self {
        Self::Terminal(source.into())
    }

    pub fn is_reuse(&self) -> bool {
        matches!(self, Self::Reused { .. })
    }
}
