use std::time::Instant;

use bytes::Bytes;
use chrono::Utc;
use http::{Response, StatusCode};
use http_body_util::Full;
use serde_json::json;
use space_content_target::TargetApi;
use tracing::{info, info_span, warn, Instrument as _};

use super::json_response;
use crate::space::{assemble_space, SpaceContent};

pub const NO_CONTENT_MESSAGE: &str = "no active experiences target this space";

/// `GET /space/{space}`
pub async fn space_content<T: TargetApi>(target: &T, raw_space: &str) -> Response<Full<Bytes>> {
    let space = urlencoding::decode(raw_space).map_or_else(
        |err| {
            warn!("space {raw_space} is not valid percent encoding: {err}");
            raw_space.to_owned()
        },
        |space| space.into_owned(),
    );

    let span = info_span!("space", space = %space);
    async {
        let start = Instant::now();
        let response = match assemble_space(target, &space, Utc::now()).await {
            Ok(SpaceContent::Entries(entries)) => json_response(StatusCode::OK, &entries),
            Ok(SpaceContent::NotFound) => json_response(
                StatusCode::NOT_FOUND,
                &json!({
                    "message": NO_CONTENT_MESSAGE,
                    "data": [],
                }),
            ),
            Err(err) => err.into_response(),
        };
        info!(
            "space {space} answered {} in {:?}",
            response.status(),
            start.elapsed()
        );
        response
    }
    .instrument(span)
    .await
}
