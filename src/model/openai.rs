use std::sync::Arc;

use async_trait::async_trait;
use futures::{Stream, StreamExt, future, stream};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ModelProvider, ModelRequest, TextStream};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for OpenAI-compatible `chat/completions` endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn payload<'a>(&'a self, request: &'a ModelRequest, stream: bool) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            stream,
        }
    }

    async fn open_stream(&self, request: ModelRequest) -> anyhow::Result<TextStream> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.payload(&request, true))
            .send()
            .await?
            .error_for_status()?;

        Ok(sse_deltas(response.bytes_stream()))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl ModelProvider for OpenAiProvider {
    async fn complete(&self, request: ModelRequest) -> anyhow::Result<String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.payload(&request, false))
            .send()
            .await?
            .error_for_status()?
            .json::<ChatCompletionResponse>()
            .await?;

        let content = response
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("model returned no choices"))?;

        Ok(content)
    }

    fn complete_stream(self: Arc<Self>, request: ModelRequest) -> TextStream {
        stream::once(async move { self.open_stream(request).await })
            .flat_map(|opened| match opened {
                Ok(deltas) => deltas,
                Err(error) => stream::once(future::ready(Err(error))).boxed(),
            })
            .boxed()
    }
}

#[derive(Debug, PartialEq)]
enum SseLine {
    Delta(String),
    Done,
    Skip,
}

fn parse_sse_line(line: &str) -> anyhow::Result<SseLine> {
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(SseLine::Skip);
    };
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(SseLine::Done);
    }
    if data.is_empty() {
        return Ok(SseLine::Skip);
    }

    let chunk: ChatCompletionChunk = serde_json::from_str(data)?;
    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty())
        .map_or(SseLine::Skip, SseLine::Delta))
}

/// Turns a server-sent-events byte stream into content deltas. Lines may be
/// split across chunks; the stream ends at `[DONE]` or after the first error.
fn sse_deltas<S, B, E>(bytes: S) -> TextStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<anyhow::Error> + Send + 'static,
{
    let state = (bytes.boxed(), Vec::<u8>::new(), false);
    stream::unfold(state, |(mut bytes, mut buffer, finished)| async move {
        if finished {
            return None;
        }
        loop {
            if let Some(newline) = buffer.iter().position(|byte| *byte == b'\n') {
                let line = buffer.drain(..=newline).collect::<Vec<_>>();
                let line = String::from_utf8_lossy(&line);
                match parse_sse_line(line.trim()) {
                    Ok(SseLine::Delta(text)) => return Some((Ok(text), (bytes, buffer, false))),
                    Ok(SseLine::Done) => return None,
                    Ok(SseLine::Skip) => continue,
                    Err(error) => return Some((Err(error), (bytes, buffer, true))),
                }
            }

            match bytes.next().await {
                Some(Ok(chunk)) => buffer.extend_from_slice(chunk.as_ref()),
                Some(Err(error)) => return Some((Err(error.into()), (bytes, buffer, true))),
                None => return None,
            }
        }
    })
    .boxed()
}
