use std::sync::Arc;

use chatguard::{
    chain::InterceptorChain,
    config::AppConfig,
    http::{self, AppState},
    logging::LoggingInterceptor,
    model::{MockModelProvider, ModelInvoker, ModelProvider, OpenAiProvider},
    safety::SafetyGuard,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let chain = build_chain(&config)?;

    info!(interceptors = ?chain.interceptor_names(), "interceptor chain ready");

    let app = http::router(AppState { chain });
    let listener = TcpListener::bind(config.http_bind).await?;
    info!("chatguard HTTP API listening on {}", config.http_bind);

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .init();
}

fn build_chain(config: &AppConfig) -> anyhow::Result<InterceptorChain> {
    let guard = SafetyGuard::new(config.blocked_terms.iter().cloned())
        .with_order(config.safety_guard_order);
    if guard.blocked_terms().is_empty() {
        warn!("BLOCKED_TERMS is empty; the safety guard will let every request through");
    } else {
        info!(terms = guard.blocked_terms().len(), "safety guard configured");
    }

    let mut invoker = ModelInvoker::new(build_model_provider(config));
    if let Some(system_prompt) = &config.system_prompt {
        invoker = invoker.with_system_prompt(system_prompt.clone());
    }

    let mut builder = InterceptorChain::builder()
        .interceptor(guard)
        .terminal(invoker);
    if config.request_logging {
        builder = builder.interceptor(LoggingInterceptor::default());
    }

    Ok(builder.build()?)
}

fn build_model_provider(config: &AppConfig) -> Arc<dyn ModelProvider> {
    let provider = config.model_provider.to_lowercase();
    match provider.as_str() {
        "mock" => {
            warn!("MODEL_PROVIDER=mock; using mock model provider");
            Arc::new(MockModelProvider)
        }
        "openai" | "auto" => {
            if let Some(api_key) = config.openai_api_key.clone() {
                info!(model = %config.openai_model, "using OpenAI-compatible model provider");
                Arc::new(OpenAiProvider::with_base_url(
                    api_key,
                    config.openai_model.clone(),
                    config.openai_base_url.clone(),
                ))
            } else {
                warn!(provider = %provider, "OPENAI_API_KEY not set; using mock model provider");
                Arc::new(MockModelProvider)
            }
        }
        other => {
            warn!(
                provider = %other,
                "unknown MODEL_PROVIDER value; valid values are auto|openai|mock; using mock"
            );
            Arc::new(MockModelProvider)
        }
    }
}
