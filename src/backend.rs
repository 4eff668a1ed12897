pub mod gemini;
pub mod openai_chat;

#[derive(serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    #[serde(alias = "model")]
    Assistant,
}

#[derive(serde::Deserialize, Clone, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// A remote text generator. Each `send_turn` is a single round trip: the history is replayed as prior
/// turns and `next_text` is sent as the next user turn.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn send_turn(&self, history: &[Message], next_text: &str) -> Result<String, anyhow::Error>;
    fn name(&self) -> &str;
    fn request_timeout(&self) -> std::time::Duration;
}

pub fn new_backend_from_config(typ: String, config: toml::Value) -> Result<Box<dyn Backend>, anyhow::Error> {
    Ok(match typ.as_str() {
        "gemini" => {
            let config = config.try_into()?;
            Box::new(gemini::Backend::new(&config)?)
        }
        "openai_chat" => {
            let config = config.try_into()?;
            Box::new(openai_chat::Backend::new(&config)?)
        }
        _ => {
            return Err(anyhow::format_err!("unknown backend type: {}", typ));
        }
    })
}
