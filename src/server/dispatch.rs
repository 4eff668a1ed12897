//! Call dispatch webhook. Nothing is actually connected yet: a free primary agent gets a connect
//! instruction, and a busy one gets a canned AI hand-off record for the reported emergency.

use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::Json;

#[derive(serde::Deserialize, Default)]
struct Metadata {
    emergency_type: Option<String>,
}

#[derive(serde::Deserialize)]
struct WebhookBody {
    #[serde(default)]
    call_id: serde_json::Value,
    #[serde(default)]
    from: serde_json::Value,
    #[serde(default)]
    primary_busy: Option<bool>,
    metadata: Option<Metadata>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Emergency {
    Police,
    Medical,
    Fire,
}

impl Emergency {
    fn from_type(typ: Option<&str>) -> Self {
        match typ {
            Some("medical") => Emergency::Medical,
            Some("fire") => Emergency::Fire,
            _ => Emergency::Police,
        }
    }

    fn classification(&self) -> &'static str {
        match self {
            Emergency::Police => "police",
            Emergency::Medical => "medical",
            Emergency::Fire => "fire",
        }
    }

    fn transcript(&self) -> &'static str {
        match self {
            Emergency::Police => "User: I am being robbed",
            Emergency::Medical => "User: Someone is having a heart attack",
            Emergency::Fire => "User: There is a fire in my building",
        }
    }

    fn forward_to(&self) -> &'static str {
        match self {
            Emergency::Medical => "102",
            Emergency::Police | Emergency::Fire => "101",
        }
    }
}

#[derive(serde::Serialize, Debug)]
#[serde(tag = "action", rename_all = "snake_case")]
enum Dispatch {
    ConnectPrimary {
        call_id: serde_json::Value,
        note: &'static str,
    },
    FallbackAi {
        classification: &'static str,
        transcript: &'static str,
        forward_to: &'static str,
        call_id: serde_json::Value,
        note: &'static str,
    },
}

#[derive(serde::Serialize)]
struct Features {
    ai_classification: bool,
    voice_synthesis: bool,
}

#[derive(serde::Serialize)]
struct Health {
    status: &'static str,
    module: &'static str,
    features: Features,
}

/// Null, false, zero and empty values count as absent. Anything else is passed through unchanged.
fn required(value: serde_json::Value, field: &'static str) -> Result<serde_json::Value, super::ApiError> {
    let present = match &value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64() != Some(0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(a) => !a.is_empty(),
        serde_json::Value::Object(o) => !o.is_empty(),
    };
    if !present {
        return Err(super::ApiError::MissingField(field));
    }
    Ok(value)
}

async fn webhook(body: Result<Json<WebhookBody>, JsonRejection>) -> Result<Json<Dispatch>, super::ApiError> {
    let Json(body) = body?;
    let call_id = required(body.call_id, "call_id")?;
    let from = required(body.from, "from")?;

    if !body.primary_busy.unwrap_or(false) {
        log::info!("call {} from {}: connecting primary", call_id, from);
        return Ok(Json(Dispatch::ConnectPrimary {
            call_id,
            note: "STUB: Would connect to primary agent via Twilio",
        }));
    }

    let emergency = Emergency::from_type(body.metadata.unwrap_or_default().emergency_type.as_deref());
    log::info!("call {} from {}: primary busy, {:?} fallback", call_id, from, emergency);
    Ok(Json(Dispatch::FallbackAi {
        classification: emergency.classification(),
        transcript: emergency.transcript(),
        forward_to: emergency.forward_to(),
        call_id,
        note: "STUB: Replace with actual Twilio + AI integration",
    }))
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy",
        module: "dispatch",
        features: Features {
            ai_classification: true,
            voice_synthesis: true,
        },
    })
}

pub fn router() -> axum::Router<super::State> {
    axum::Router::new()
        .route("/api/dispatch/webhook", post(webhook))
        .route("/api/dispatch/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::super::tests::{app, get, post_json};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn free_primary_connects() {
        let (status, body) = post_json(app(None), "/api/dispatch/webhook", r#"{"call_id": "c1", "from": "+10000000000"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({
                "action": "connect_primary",
                "call_id": "c1",
                "note": "STUB: Would connect to primary agent via Twilio",
            })
        );
    }

    #[tokio::test]
    async fn busy_primary_uses_emergency_type() {
        let (status, body) = post_json(
            app(None),
            "/api/dispatch/webhook",
            r#"{"call_id": "c2", "from": "+1", "primary_busy": true, "metadata": {"emergency_type": "medical"}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({
                "action": "fallback_ai",
                "classification": "medical",
                "transcript": "User: Someone is having a heart attack",
                "forward_to": "102",
                "call_id": "c2",
                "note": "STUB: Replace with actual Twilio + AI integration",
            })
        );
    }

    #[tokio::test]
    async fn unknown_emergency_is_police() {
        for payload in [
            r#"{"call_id": "c3", "from": "+1", "primary_busy": true}"#,
            r#"{"call_id": "c3", "from": "+1", "primary_busy": true, "metadata": {"emergency_type": "flood"}}"#,
        ] {
            let (_, body) = post_json(app(None), "/api/dispatch/webhook", payload).await;
            assert_eq!(body["classification"], "police");
            assert_eq!(body["forward_to"], "101");
        }

        let (_, body) = post_json(
            app(None),
            "/api/dispatch/webhook",
            r#"{"call_id": "c4", "from": "+1", "primary_busy": true, "metadata": {"emergency_type": "fire"}}"#,
        )
        .await;
        assert_eq!(body["classification"], "fire");
        assert_eq!(body["forward_to"], "101");
    }

    #[tokio::test]
    async fn missing_fields_are_named_in_order() {
        let (status, body) = post_json(app(None), "/api/dispatch/webhook", r#"{"from": "+1"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"error": "missing_field", "message": "call_id is required"}));

        let (status, body) = post_json(app(None), "/api/dispatch/webhook", r#"{"call_id": "c5", "from": ""}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "from is required");
    }

    #[tokio::test]
    async fn numeric_call_id_is_echoed() {
        let (status, body) = post_json(app(None), "/api/dispatch/webhook", r#"{"call_id": 123, "from": "+1"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["action"], "connect_primary");
        assert_eq!(body["call_id"], serde_json::json!(123));

        let (status, body) = post_json(
            app(None),
            "/api/dispatch/webhook",
            r#"{"call_id": 7, "from": "+1", "primary_busy": true, "metadata": null}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["action"], "fallback_ai");
        assert_eq!(body["call_id"], serde_json::json!(7));
    }

    #[tokio::test]
    async fn null_primary_busy_connects() {
        let (status, body) = post_json(
            app(None),
            "/api/dispatch/webhook",
            r#"{"call_id": "c", "from": "+1", "primary_busy": null}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["action"], "connect_primary");
        assert_eq!(body["call_id"], "c");
    }

    #[tokio::test]
    async fn empty_values_are_missing() {
        for payload in [
            r#"{"call_id": null, "from": "+1"}"#,
            r#"{"call_id": false, "from": "+1"}"#,
            r#"{"call_id": 0, "from": "+1"}"#,
        ] {
            let (status, body) = post_json(app(None), "/api/dispatch/webhook", payload).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, serde_json::json!({"error": "missing_field", "message": "call_id is required"}));
        }
    }

    #[tokio::test]
    async fn non_json_is_bad_request() {
        let (status, body) = post_json(app(None), "/api/dispatch/webhook", "{").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn health() {
        let (status, body) = get(app(None), "/api/dispatch/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({
                "status": "healthy",
                "module": "dispatch",
                "features": {"ai_classification": true, "voice_synthesis": true},
            })
        );
    }
}
