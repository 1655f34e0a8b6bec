use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use storekeep_core::ItemId;

use crate::app::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", post(create_sale))
}

pub async fn create_sale(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateSaleRequest>,
) -> axum::response::Response {
    let item_id: ItemId = match body.item_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id"),
    };

    match services.sales().record_sale(item_id, body.quantity).await {
        Ok(sale) => (StatusCode::CREATED, Json(dto::sale_to_json(&sale))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
