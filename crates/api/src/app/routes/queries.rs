use std::fmt::Write as _;
use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use storekeep_ai::{AiError, Assistant};
use storekeep_sales::Store;

use crate::app::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", post(handle_query))
}

/// Answer a customer question, grounded in the current inventory snapshot.
pub async fn handle_query(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CustomerQueryRequest>,
) -> axum::response::Response {
    let items = match services.store().list_items().await {
        Ok(items) => items,
        Err(e) => return errors::domain_error_to_response(e.into()),
    };

    let mut inventory = String::new();
    for item in &items {
        let _ = writeln!(
            inventory,
            "- {}: {} units at {}",
            item.name(),
            item.quantity(),
            item.price()
        );
    }

    match services.assistant().answer(&body.query, &inventory).await {
        Ok(response) => {
            tracing::debug!(customer = %body.customer_name, "query answered");
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "customer_name": body.customer_name,
                    "query": body.query,
                    "response": response,
                })),
            )
                .into_response()
        }
        Err(AiError::Unavailable(msg)) => {
            errors::json_error(StatusCode::BAD_GATEWAY, "assistant_unavailable", msg)
        }
        Err(AiError::InvalidResponse(msg)) => {
            errors::json_error(StatusCode::BAD_GATEWAY, "assistant_error", msg)
        }
    }
}
