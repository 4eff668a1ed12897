use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::Json;

#[derive(serde::Deserialize)]
struct GenerateBody {
    title: Option<String>,
    slides: Option<serde_json::Value>,
}

#[derive(serde::Serialize)]
struct ContentPreview {
    title: String,
    slides: Vec<String>,
}

#[derive(serde::Serialize)]
struct Presentation {
    status: &'static str,
    message: &'static str,
    artifact: String,
    slide_count: usize,
    note: &'static str,
    content_preview: ContentPreview,
}

#[derive(serde::Serialize)]
struct Health {
    status: &'static str,
    module: &'static str,
}

fn artifact_name(title: &str) -> String {
    format!("{}.pptx", title.replace(' ', "_").to_lowercase())
}

fn slide_heading(slide: &serde_json::Value) -> String {
    slide
        .get("heading")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("Untitled")
        .to_owned()
}

// Rendering is mocked; only the request shape is checked.
async fn generate(body: Result<Json<GenerateBody>, JsonRejection>) -> Result<Json<Presentation>, super::ApiError> {
    let Json(body) = body?;
    let title = body
        .title
        .filter(|t| !t.is_empty())
        .ok_or(super::ApiError::MissingField("title"))?;
    let slides = match body.slides {
        Some(serde_json::Value::Array(slides)) if !slides.is_empty() => slides,
        _ => return Err(super::ApiError::MissingField("slides array")),
    };

    log::info!("presentation {:?} with {} slides", title, slides.len());
    Ok(Json(Presentation {
        status: "success",
        message: "Presentation content generated",
        artifact: artifact_name(&title),
        slide_count: slides.len(),
        note: "Presentation generation is mocked in this deployment.",
        content_preview: ContentPreview {
            slides: slides.iter().map(slide_heading).collect(),
            title,
        },
    }))
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy",
        module: "education",
    })
}

pub fn router() -> axum::Router<super::State> {
    axum::Router::new()
        .route("/api/education/generate", post(generate))
        .route("/api/education/health", get(health))
}
