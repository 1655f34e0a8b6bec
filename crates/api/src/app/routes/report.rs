use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use storekeep_report::ReportError;

use crate::app::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/daily", post(trigger_daily_report))
}

/// Generate today's report and fan it out.
///
/// Summarization is a hard dependency: if it is down, nothing is dispatched
/// and the trigger fails. Channel failures never fail the trigger; they come
/// back in the body as per-channel outcomes.
pub async fn trigger_daily_report(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let report = match services.reports().generate().await {
        Ok(report) => report,
        Err(ReportError::SummarizationUnavailable(msg)) => {
            return errors::json_error(StatusCode::BAD_GATEWAY, "summarization_unavailable", msg);
        }
        Err(ReportError::Store(msg)) => {
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg);
        }
    };

    let outcome = services.dispatcher().dispatch(&report.summary).await;

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "report": dto::report_to_json(&report),
            "dispatch": outcome,
        })),
    )
        .into_response()
}
