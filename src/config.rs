use std::{env, net::SocketAddr};

use crate::{interceptor::DEFAULT_ORDER, model::DEFAULT_BASE_URL};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_bind: SocketAddr,
    pub model_provider: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub system_prompt: Option<String>,
    pub blocked_terms: Vec<String>,
    pub safety_guard_order: i32,
    pub request_logging: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT").unwrap_or_else(|_| "8080".to_owned());
        let http_bind = env::var("HTTP_BIND").unwrap_or_else(|_| format!("0.0.0.0:{port}"));
        let http_bind = http_bind.parse()?;

        Ok(Self {
            http_bind,
            model_provider: env::var("MODEL_PROVIDER").unwrap_or_else(|_| "auto".to_owned()),
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_owned()),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned()),
            system_prompt: env::var("SYSTEM_PROMPT")
                .ok()
                .map(|prompt| prompt.trim().to_owned())
                .filter(|prompt| !prompt.is_empty()),
            blocked_terms: parse_terms(&env::var("BLOCKED_TERMS").unwrap_or_default()),
            safety_guard_order: env_i32("SAFETY_GUARD_ORDER", DEFAULT_ORDER),
            request_logging: env_bool("REQUEST_LOGGING", true),
        })
    }
}

/// Comma-separated list; entries are trimmed and blanks dropped. Case is kept
/// because matching is case-sensitive.
pub fn parse_terms(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_owned)
        .collect()
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .map(|raw| {
            matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
        .unwrap_or(default)
}

fn env_i32(name: &str, default: i32) -> i32 {
    env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<i32>().ok())
        .unwrap_or(default)
}
