pub mod dispatch;
pub mod education;
pub mod leadgen;

use axum::response::IntoResponse;

use crate::pipeline;

pub type State = std::sync::Arc<pipeline::Pipeline>;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ApiError {
    #[error("Request body must be JSON")]
    BadRequest,

    #[error("{0} is required")]
    MissingField(&'static str),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest => "bad_request",
            ApiError::MissingField(..) => "missing_field",
        }
    }
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            axum::http::StatusCode::BAD_REQUEST,
            axum::Json(ErrorBody {
                error: self.code(),
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<axum::extract::rejection::JsonRejection> for ApiError {
    fn from(e: axum::extract::rejection::JsonRejection) -> Self {
        log::debug!("rejected request body: {}", e);
        ApiError::BadRequest
    }
}

impl From<pipeline::ValidationError> for ApiError {
    fn from(e: pipeline::ValidationError) -> Self {
        match e {
            pipeline::ValidationError::MissingField(field) => ApiError::MissingField(field),
        }
    }
}

pub fn router(state: State) -> axum::Router {
    axum::Router::new()
        .merge(leadgen::router())
        .merge(dispatch::router())
        .merge(education::router())
        .with_state(state)
}
