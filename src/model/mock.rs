use std::sync::Arc;

use async_trait::async_trait;
use futures::{StreamExt, stream};

use super::{ModelProvider, ModelRequest, TextStream};

#[derive(Debug, Default)]
pub struct MockModelProvider;

impl MockModelProvider {
    fn reply(request: &ModelRequest) -> String {
        format!("chatguard mock reply to: {}", request.user_prompt.trim())
    }
}

#[async_trait]
impl ModelProvider for MockModelProvider {
    async fn complete(&self, request: ModelRequest) -> anyhow::Result<String> {
        Ok(Self::reply(&request))
    }

    fn complete_stream(self: Arc<Self>, request: ModelRequest) -> TextStream {
        let reply = Self::reply(&request);
        let words = reply
            .split_inclusive(' ')
            .map(|word| Ok(word.to_owned()))
            .collect::<Vec<_>>();
        stream::iter(words).boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::TryStreamExt;

    use super::{MockModelProvider, ModelProvider, ModelRequest};

    fn request(user_prompt: &str) -> ModelRequest {
        ModelRequest {
            system_prompt: "be brief".to_owned(),
            user_prompt: user_prompt.to_owned(),
        }
    }

    #[tokio::test]
    async fn streamed_words_join_to_the_full_reply() {
        let provider = Arc::new(MockModelProvider);
        let full = provider
            .complete(request("hello there"))
            .await
            .expect("mock completion should succeed");

        let chunks = provider
            .clone()
            .complete_stream(request("hello there"))
            .try_collect::<Vec<_>>()
            .await
            .expect("mock stream should succeed");

        assert!(chunks.len() > 1);
        assert_eq!(chunks.concat(), full);
        assert_eq!(full, "chatguard mock reply to: hello there");
    }
}
