use futures_util::StreamExt;

use crate::openai::chat;

pub struct Backend {
    client: crate::openai::Client,
    model: String,
    temperature: Option<f64>,
    top_p: Option<f64>,
    max_tokens: Option<u32>,
    request_timeout: std::time::Duration,
}

fn base_url_default() -> String {
    "https://api.openai.com".to_owned()
}

const fn request_timeout_secs_default() -> u64 {
    30
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    api_key: String,
    model: String,
    #[serde(default = "base_url_default")]
    base_url: String,
    #[serde(default = "request_timeout_secs_default")]
    request_timeout_secs: u64,
    temperature: Option<f64>,
    top_p: Option<f64>,
    max_tokens: Option<u32>,
}

impl Backend {
    pub fn new(config: &Config) -> Result<Self, anyhow::Error> {
        Ok(Self {
            client: crate::openai::Client::new(&config.api_key, config.base_url.clone())?,
            model: config.model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
            request_timeout: std::time::Duration::from_secs(config.request_timeout_secs),
        })
    }
}

fn convert_message(m: &super::Message) -> chat::Message {
    chat::Message {
        content: m.content.clone(),
        role: match m.role {
            super::Role::Assistant => chat::Role::Assistant,
            super::Role::User => chat::Role::User,
        },
    }
}

#[async_trait::async_trait]
impl super::Backend for Backend {
    async fn send_turn(&self, history: &[super::Message], next_text: &str) -> Result<String, anyhow::Error> {
        let req = {
            let mut req = chat::CreateRequest::new(
                self.model.clone(),
                history
                    .iter()
                    .map(convert_message)
                    .chain(std::iter::once(chat::Message {
                        role: chat::Role::User,
                        content: next_text.to_owned(),
                    }))
                    .collect(),
            );
            req.temperature = self.temperature;
            req.top_p = self.top_p;
            req.max_tokens = self.max_tokens;
            req
        };
        log::debug!("openai request: {:?}", req);

        let mut stream = Box::pin(self.client.create_chat_completion(&req).await?);
        let mut reply = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            let content = if let Some(content) = chunk.choices.first().and_then(|c| c.delta.content.as_ref()) {
                content
            } else {
                continue;
            };
            reply.push_str(content);
        }

        if reply.trim().is_empty() {
            return Err(anyhow::anyhow!("empty reply"));
        }
        Ok(reply)
    }

    fn name(&self) -> &str {
        "openai_chat"
    }

    fn request_timeout(&self) -> std::time::Duration {
        self.request_timeout
    }
}
