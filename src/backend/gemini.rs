pub struct Backend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    request_timeout: std::time::Duration,
}

fn model_default() -> String {
    "gemini-2.0-flash-lite".to_owned()
}

fn base_url_default() -> String {
    "https://generativelanguage.googleapis.com".to_owned()
}

const fn request_timeout_secs_default() -> u64 {
    30
}

#[derive(serde::Deserialize)]
pub struct Config {
    api_key: String,
    #[serde(default = "model_default")]
    model: String,
    #[serde(default = "base_url_default")]
    base_url: String,
    #[serde(default = "request_timeout_secs_default")]
    request_timeout_secs: u64,
}

impl Config {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: model_default(),
            base_url: base_url_default(),
            request_timeout_secs: request_timeout_secs_default(),
        }
    }
}

#[derive(serde::Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(serde::Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(serde::Serialize)]
struct Request<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(serde::Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(serde::Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(serde::Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(serde::Deserialize)]
struct Response {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

fn convert_message(message: &super::Message) -> Content<'_> {
    Content {
        role: match message.role {
            super::Role::User => "user",
            super::Role::Assistant => "model",
        },
        parts: vec![Part { text: &message.content }],
    }
}

impl Backend {
    pub fn new(config: &Config) -> Result<Self, anyhow::Error> {
        Ok(Self {
            client: reqwest::ClientBuilder::new()
                .default_headers({
                    let mut headers = reqwest::header::HeaderMap::new();
                    headers.insert(reqwest::header::ACCEPT, reqwest::header::HeaderValue::from_static("application/json"));
                    headers.insert(reqwest::header::CONTENT_TYPE, reqwest::header::HeaderValue::from_static("application/json"));
                    headers
                })
                .build()?,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            request_timeout: std::time::Duration::from_secs(config.request_timeout_secs),
        })
    }
}

#[async_trait::async_trait]
impl super::Backend for Backend {
    async fn send_turn(&self, history: &[super::Message], next_text: &str) -> Result<String, anyhow::Error> {
        let req = Request {
            contents: history
                .iter()
                .map(convert_message)
                .chain(std::iter::once(Content {
                    role: "user",
                    parts: vec![Part { text: next_text }],
                }))
                .collect(),
        };
        log::info!("gemini request: model={} turns={}", self.model, req.contents.len());

        // The API key travels in the query string, so URLs are stripped from every error.
        let resp = self
            .client
            .post(format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model))
            .query(&[("key", &self.api_key)])
            .json(&req)
            .send()
            .await
            .map_err(|e| e.without_url())?;

        if let Err(e) = resp.error_for_status_ref() {
            let body = resp.text().await.map_err(|e| e.without_url())?;
            return Err(anyhow::format_err!("{:?} ({:?})", e.without_url(), body));
        }

        let text = resp
            .json::<Response>()
            .await
            .map_err(|e| e.without_url())?
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .ok_or_else(|| anyhow::anyhow!("no candidates"))?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<String>();

        if text.trim().is_empty() {
            return Err(anyhow::anyhow!("empty reply"));
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn request_timeout(&self) -> std::time::Duration {
        self.request_timeout
    }
}
