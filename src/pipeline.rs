use crate::backend::{Backend, Message};
use crate::classify::{self, Category};

/// Instruction prefixed to the first turn of a conversation.
pub const SYSTEM_CONTEXT: &str = "You are an AI assistant for Law Enforcement and Civic Aid.
Your goal is to analyze reports (theft, assault, fraud, etc.) and provide structured recommendations.
Use Markdown formatting. Use headings like '## Analysis', '## Next Steps', '## Key Findings'.
If appropriate, provide a Mermaid diagram for the workflow using ```mermaid ... ``` syntax.";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum GenerationError {
    #[error("no generator configured")]
    Unavailable,

    #[error("generator request failed")]
    RemoteFailure,
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    text: String,
    history: Vec<Message>,
}

impl AnalysisRequest {
    pub fn new(text: &str, history: Vec<Message>) -> Result<Self, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::MissingField("case_text"));
        }
        Ok(Self {
            text: text.to_owned(),
            history,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }
}

#[derive(serde::Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    #[serde(rename = "ai")]
    Generated,
    #[serde(rename = "local_fallback")]
    Fallback,
}

#[derive(serde::Serialize, Clone, Debug, PartialEq)]
pub struct AnalysisResult {
    #[serde(rename = "response")]
    pub response_text: String,
    pub source: Source,
    #[serde(rename = "case_type", skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// Performs a single round trip against the generator. Failure detail is logged here and not passed on.
pub async fn try_generate(text: &str, history: &[Message], generator: Option<&dyn Backend>) -> Result<String, GenerationError> {
    let generator = generator.ok_or(GenerationError::Unavailable)?;

    let prompt;
    let next_text = if history.is_empty() {
        prompt = format!("{}\n\nCase Report: {}", SYSTEM_CONTEXT, text);
        &prompt
    } else {
        text
    };

    let timeout = generator.request_timeout();
    match tokio::time::timeout(timeout, generator.send_turn(history, next_text)).await {
        Ok(Ok(reply)) if !reply.trim().is_empty() => Ok(reply),
        Ok(Ok(_)) => {
            log::warn!("{}: empty reply", generator.name());
            Err(GenerationError::RemoteFailure)
        }
        Ok(Err(e)) => {
            log::warn!("{}: request failed: {:?}", generator.name(), e);
            Err(GenerationError::RemoteFailure)
        }
        Err(_) => {
            log::warn!("{}: timed out after {:?}", generator.name(), timeout);
            Err(GenerationError::RemoteFailure)
        }
    }
}

pub async fn analyze(request: &AnalysisRequest, generator: Option<&dyn Backend>) -> AnalysisResult {
    let err = match try_generate(request.text(), request.history(), generator).await {
        Ok(response_text) => {
            return AnalysisResult {
                response_text,
                source: Source::Generated,
                category: None,
            };
        }
        Err(e) => e,
    };

    let category = classify::classify(request.text());
    let mut response_text = classify::fallback_respond(category).to_owned();
    if err == GenerationError::Unavailable {
        response_text.push_str(classify::DEMO_DISCLAIMER);
    }
    log::info!("answering with {} fallback ({})", category, err);

    AnalysisResult {
        response_text,
        source: Source::Fallback,
        category: Some(category),
    }
}

/// Holds the generator configured at startup.
pub struct Pipeline {
    generator: Option<std::sync::Arc<dyn Backend>>,
}

impl Pipeline {
    pub fn new(generator: Option<std::sync::Arc<dyn Backend>>) -> Self {
        Self { generator }
    }

    pub fn generator_enabled(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult {
        analyze(request, self.generator.as_deref()).await
    }
}
