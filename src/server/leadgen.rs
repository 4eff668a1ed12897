use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::Json;

use crate::backend::Message;
use crate::pipeline::{AnalysisRequest, AnalysisResult};

#[derive(serde::Deserialize)]
struct AnalyzeBody {
    #[serde(default, alias = "text")]
    case_text: Option<String>,
    #[serde(default)]
    history: Option<Vec<Message>>,
}

#[derive(serde::Serialize)]
struct Health {
    status: &'static str,
    module: &'static str,
    ai_enabled: bool,
}

async fn analyze(
    axum::extract::State(state): axum::extract::State<super::State>,
    body: Result<Json<AnalyzeBody>, JsonRejection>,
) -> Result<Json<AnalysisResult>, super::ApiError> {
    let Json(body) = body?;
    let request = AnalysisRequest::new(body.case_text.as_deref().unwrap_or(""), body.history.unwrap_or_default())?;
    Ok(Json(state.analyze(&request).await))
}

async fn health(axum::extract::State(state): axum::extract::State<super::State>) -> Json<Health> {
    Json(Health {
        status: "healthy",
        module: "leadgen",
        ai_enabled: state.generator_enabled(),
    })
}

pub fn router() -> axum::Router<super::State> {
    axum::Router::new()
        .route("/api/leadgen/analyze", post(analyze))
        .route("/api/leadgen/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::super::tests::{app, get, post_json, send};
    use crate::classify::{fallback_respond, Category, DEMO_DISCLAIMER};
    use crate::pipeline::tests::FakeBackend;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn fallback_without_generator() {
        let (status, body) = post_json(app(None), "/api/leadgen/analyze", r#"{"case_text": "my car was stolen"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({
                "response": format!("{}{}", fallback_respond(Category::Theft), DEMO_DISCLAIMER),
                "source": "local_fallback",
                "case_type": "theft",
            })
        );
    }

    #[tokio::test]
    async fn generated_reply() {
        let generator = std::sync::Arc::new(FakeBackend::replying("Sample analysis."));
        let (status, body) = post_json(
            app(Some(generator.clone())),
            "/api/leadgen/analyze",
            r#"{"case_text": "it was red", "history": [{"role": "user", "content": "my car was stolen"}, {"role": "model", "content": "noted"}]}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"response": "Sample analysis.", "source": "ai"}));

        let calls = generator.calls.lock().unwrap();
        assert_eq!(calls[0].0.len(), 2);
        assert_eq!(calls[0].1, "it was red");
    }

    #[tokio::test]
    async fn remote_failure_has_no_disclaimer() {
        let generator = std::sync::Arc::new(FakeBackend::failing("upstream 500: secret detail"));
        let (status, body) = post_json(app(Some(generator)), "/api/leadgen/analyze", r#"{"text": "a fight at the bar"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "local_fallback");
        assert_eq!(body["case_type"], "assault");
        assert_eq!(body["response"], fallback_respond(Category::Assault));
        assert!(!body.to_string().contains("secret detail"));
    }

    #[tokio::test]
    async fn null_history_is_empty() {
        let generator = std::sync::Arc::new(FakeBackend::replying("ok"));
        let (status, body) = post_json(
            app(Some(generator.clone())),
            "/api/leadgen/analyze",
            r#"{"case_text": "my car was stolen", "history": null}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "ai");
        assert!(generator.calls.lock().unwrap()[0].0.is_empty());

        let (status, body) = post_json(
            app(None),
            "/api/leadgen/analyze",
            r#"{"case_text": "my car was stolen", "history": null}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["case_type"], "theft");
    }

    #[tokio::test]
    async fn blank_text_is_missing_field() {
        for payload in [r#"{"case_text": "   "}"#, r#"{"history": []}"#] {
            let (status, body) = post_json(app(None), "/api/leadgen/analyze", payload).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, serde_json::json!({"error": "missing_field", "message": "case_text is required"}));
        }
    }

    #[tokio::test]
    async fn non_json_is_bad_request() {
        let (status, body) = post_json(app(None), "/api/leadgen/analyze", "case_text=hello").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"error": "bad_request", "message": "Request body must be JSON"}));

        let (status, body) = send(
            app(None),
            axum::http::Request::builder()
                .method("POST")
                .uri("/api/leadgen/analyze")
                .body(axum::body::Body::from(r#"{"case_text": "hello"}"#))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn unknown_history_role_is_bad_request() {
        let (status, body) = post_json(
            app(None),
            "/api/leadgen/analyze",
            r#"{"case_text": "hello", "history": [{"role": "system", "content": "x"}]}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn health_reports_generator() {
        let (status, body) = get(app(None), "/api/leadgen/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"status": "healthy", "module": "leadgen", "ai_enabled": false}));

        let (_, body) = get(app(Some(std::sync::Arc::new(FakeBackend::replying("x")))), "/api/leadgen/health").await;
        assert_eq!(body["ai_enabled"], true);
    }
}
