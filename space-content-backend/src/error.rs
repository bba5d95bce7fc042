use bytes::Bytes;
use http::{Response, StatusCode};
use http_body_util::Full;
use serde_json::{json, Value};
use space_content_config::ConfigError;
use space_content_target::error::TargetError;
use tracing::{error, warn};

use crate::routes::json_response;
use crate::space::model::UpstreamFailure;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{} upstream fetches failed", .0.len())]
    Upstream(Vec<UpstreamFailure>),
    #[error("listing {resource} failed: {error}")]
    Listing { resource: String, error: Value },
    #[error("upstream error: {0}")]
    Target(#[from] TargetError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    File(#[from] std::io::Error),
    #[error("webserver error: {0}")]
    Hyper(#[from] hyper::Error),
}

impl AppError {
    /// Upstream failures are reported as a bad request listing every failed record, anything
    /// else is an internal server error.
    #[must_use]
    pub fn into_response(self) -> Response<Full<Bytes>> {
        match self {
            Self::Upstream(failures) => {
                for failure in &failures {
                    let error = Value::Object(failure.error.clone());
                    warn!("upstream {} {:?} failed: {error}", failure.kind, failure.id);
                }
                json_response(
                    StatusCode::BAD_REQUEST,
                    &json!({
                        "status": 400,
                        "message": "Bad Request",
                        "result": failures,
                    }),
                )
            }
            err @ (Self::Listing { .. }
            | Self::Target(_)
            | Self::Json(_)
            | Self::Config(_)
            | Self::File(_)
            | Self::Hyper(_)) => {
                error!("{err}");
                json_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &json!({
                        "status": 500,
                        "message": "Internal Server Error",
                        "error": err.to_string(),
                    }),
                )
            }
        }
    }
}
