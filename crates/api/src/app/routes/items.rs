use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use storekeep_core::{ItemId, Money};
use storekeep_inventory::{Item, ItemUpdate};
use storekeep_sales::Store;

use crate::app::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_item).get(list_items))
        .route("/:id", get(get_item).put(update_item))
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateItemRequest>,
) -> axum::response::Response {
    let price = match Money::from_cents(body.price_cents) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let item = match Item::new(ItemId::new(), body.name, body.quantity, price) {
        Ok(item) => item,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.store().insert_item(item.clone()).await {
        return errors::domain_error_to_response(e.into());
    }

    tracing::debug!(item_id = %item.id(), name = %item.name(), "item created");
    (StatusCode::CREATED, Json(dto::item_to_json(&item))).into_response()
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store().list_items().await {
        Ok(items) => {
            let body: Vec<serde_json::Value> = items.iter().map(dto::item_to_json).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::domain_error_to_response(e.into()),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ItemId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id"),
    };

    match services.store().get_item(id).await {
        Ok(Some(item)) => (StatusCode::OK, Json(dto::item_to_json(&item))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "item not found"),
        Err(e) => errors::domain_error_to_response(e.into()),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateItemRequest>,
) -> axum::response::Response {
    let id: ItemId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id"),
    };

    let price = match Money::from_cents(body.price_cents) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let item = match services.store().get_item(id).await {
        Ok(Some(item)) => item,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "item not found"),
        Err(e) => return errors::domain_error_to_response(e.into()),
    };

    let expected_version = item.version();
    let mut edited = item;
    if let Err(e) = edited.apply_update(ItemUpdate {
        name: body.name,
        quantity: body.quantity,
        price,
    }) {
        return errors::domain_error_to_response(e);
    }

    match services.store().update_item(expected_version, edited.clone()).await {
        Ok(()) => {
            tracing::debug!(item_id = %edited.id(), "item updated");
            (StatusCode::OK, Json(dto::item_to_json(&edited))).into_response()
        }
        // A racing sale surfaces as 409; the client re-fetches and retries.
        Err(e) => errors::domain_error_to_response(e.into()),
    }
}
