use serde::Deserialize;

use storekeep_inventory::Item;
use storekeep_report::DailyReport;
use storekeep_sales::Sale;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub quantity: i64,
    pub price_cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub name: String,
    pub quantity: i64,
    pub price_cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateSaleRequest {
    pub item_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct CustomerQueryRequest {
    pub customer_name: String,
    pub query: String,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn item_to_json(item: &Item) -> serde_json::Value {
    serde_json::json!({
        "id": item.id().to_string(),
        "name": item.name(),
        "quantity": item.quantity(),
        "price_cents": item.price().cents(),
    })
}

pub fn sale_to_json(sale: &Sale) -> serde_json::Value {
    serde_json::json!({
        "id": sale.id().to_string(),
        "item_id": sale.item_id().to_string(),
        "quantity": sale.quantity(),
        "total_cents": sale.total().cents(),
        "sale_date": sale.sale_date().to_string(),
    })
}

pub fn report_to_json(report: &DailyReport) -> serde_json::Value {
    serde_json::json!({
        "date": report.date.to_string(),
        "raw": report.raw,
        "summary": report.summary,
    })
}
