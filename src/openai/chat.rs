#[derive(serde::Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Assistant,
    User,
}

#[derive(serde::Serialize, Clone, Debug)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Delta {
    pub content: Option<String>,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Choice {
    pub delta: Delta,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Chunk {
    pub choices: Vec<Choice>,
}

#[derive(serde::Serialize, Clone, Debug)]
pub struct CreateRequest {
    pub model: String,

    pub messages: Vec<Message>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl CreateRequest {
    pub fn new(model: String, messages: Vec<Message>) -> Self {
        Self {
            model,
            messages,
            temperature: None,
            top_p: None,
            max_tokens: None,
        }
    }
}
