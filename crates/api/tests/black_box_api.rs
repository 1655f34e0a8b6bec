use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;

use storekeep_ai::{AiError, Assistant, Summarizer};
use storekeep_api::app::{build_app_with, AppServices};
use storekeep_notify::{Channel, ChannelError};
use storekeep_sales::MemoryStore;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(services: AppServices) -> Self {
        // Build the same router as prod, but bind to an ephemeral port.
        let app = build_app_with(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct StubSummarizer;

#[async_trait]
impl Summarizer for StubSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, AiError> {
        Ok(format!("CONDENSED {} bytes", text.len()))
    }
}

struct DownSummarizer;

#[async_trait]
impl Summarizer for DownSummarizer {
    async fn summarize(&self, _text: &str) -> Result<String, AiError> {
        Err(AiError::Unavailable("connect refused".to_string()))
    }
}

struct StubAssistant;

#[async_trait]
impl Assistant for StubAssistant {
    async fn answer(&self, query: &str, inventory: &str) -> Result<String, AiError> {
        Ok(format!(
            "asked {:?} against {} inventory lines",
            query,
            inventory.lines().count()
        ))
    }
}

struct OkChannel(&'static str);

#[async_trait]
impl Channel for OkChannel {
    fn name(&self) -> &str {
        self.0
    }

    async fn send(&self, _text: &str) -> Result<(), ChannelError> {
        Ok(())
    }
}

struct UnconfiguredChannel(&'static str);

#[async_trait]
impl Channel for UnconfiguredChannel {
    fn name(&self) -> &str {
        self.0
    }

    async fn send(&self, _text: &str) -> Result<(), ChannelError> {
        Err(ChannelError::Config)
    }
}

/// Memory store, stub LLM, messaging channel missing its config, email fine.
fn test_services() -> AppServices {
    AppServices::from_parts(
        Arc::new(MemoryStore::new()),
        Arc::new(StubSummarizer),
        Arc::new(StubAssistant),
        vec![
            Arc::new(UnconfiguredChannel("messaging")),
            Arc::new(OkChannel("email")),
        ],
        10,
    )
}

async fn create_item(
    client: &reqwest::Client,
    base_url: &str,
    name: &str,
    quantity: i64,
    price_cents: i64,
) -> serde_json::Value {
    let res = client
        .post(format!("{base_url}/items"))
        .json(&json!({ "name": name, "quantity": quantity, "price_cents": price_cents }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn item_crud_roundtrip() {
    let server = TestServer::spawn(test_services()).await;
    let client = reqwest::Client::new();

    let created = create_item(&client, &server.base_url, "Widget", 5, 200).await;
    let id = created["id"].as_str().unwrap().to_string();

    let fetched: serde_json::Value = client
        .get(format!("{}/items/{id}", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["name"], "Widget");
    assert_eq!(fetched["quantity"], 5);
    assert_eq!(fetched["price_cents"], 200);

    let res = client
        .put(format!("{}/items/{id}", server.base_url))
        .json(&json!({ "name": "Widget XL", "quantity": 12, "price_cents": 350 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let listed: Vec<serde_json::Value> = client
        .get(format!("{}/items", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "Widget XL");
}

#[tokio::test]
async fn sale_decrements_stock_and_fixes_total() {
    let server = TestServer::spawn(test_services()).await;
    let client = reqwest::Client::new();

    let created = create_item(&client, &server.base_url, "Widget", 5, 200).await;
    let id = created["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/sales", server.base_url))
        .json(&json!({ "item_id": id, "quantity": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let sale: serde_json::Value = res.json().await.unwrap();
    assert_eq!(sale["quantity"], 3);
    assert_eq!(sale["total_cents"], 600);

    let item: serde_json::Value = client
        .get(format!("{}/items/{id}", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(item["quantity"], 2);
}

#[tokio::test]
async fn oversell_is_rejected_without_mutation() {
    let server = TestServer::spawn(test_services()).await;
    let client = reqwest::Client::new();

    let created = create_item(&client, &server.base_url, "Widget", 2, 200).await;
    let id = created["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/sales", server.base_url))
        .json(&json!({ "item_id": id, "quantity": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "insufficient_stock");

    let item: serde_json::Value = client
        .get(format!("{}/items/{id}", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(item["quantity"], 2);
}

#[tokio::test]
async fn sale_error_mapping() {
    let server = TestServer::spawn(test_services()).await;
    let client = reqwest::Client::new();

    // Unknown (but well-formed) item id.
    let res = client
        .post(format!("{}/sales", server.base_url))
        .json(&json!({ "item_id": uuid::Uuid::now_v7().to_string(), "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Malformed id.
    let res = client
        .post(format!("{}/sales", server.base_url))
        .json(&json!({ "item_id": "not-a-uuid", "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Non-positive quantity.
    let created = create_item(&client, &server.base_url, "Widget", 5, 200).await;
    let id = created["id"].as_str().unwrap().to_string();
    let res = client
        .post(format!("{}/sales", server.base_url))
        .json(&json!({ "item_id": id, "quantity": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn daily_report_includes_sales_and_mixed_dispatch_outcome() {
    let server = TestServer::spawn(test_services()).await;
    let client = reqwest::Client::new();

    let created = create_item(&client, &server.base_url, "Widget", 5, 200).await;
    let widget_id = created["id"].as_str().unwrap().to_string();
    create_item(&client, &server.base_url, "Gadget", 1, 500).await;

    let res = client
        .post(format!("{}/sales", server.base_url))
        .json(&json!({ "item_id": widget_id, "quantity": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/reports/daily", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();

    let raw = body["report"]["raw"].as_str().unwrap();
    assert!(raw.contains("- Widget: 3 units, Total: $6.00"));
    assert!(raw.contains("Total Sales: $6.00"));
    // Widget is down to 2 and Gadget sits at 1: both under the threshold.
    assert!(raw.contains("- Widget: 2 units"));
    assert!(raw.contains("- Gadget: 1 units"));

    let summary = body["report"]["summary"].as_str().unwrap();
    assert!(summary.starts_with("CONDENSED"));

    // One channel down, one up: mixed outcome, overall call still 200.
    let channels = body["dispatch"]["channels"].as_array().unwrap();
    assert_eq!(channels[0]["channel"], "messaging");
    assert_eq!(channels[0]["status"], "failure");
    assert_eq!(channels[0]["reason"], "config");
    assert_eq!(channels[1]["channel"], "email");
    assert_eq!(channels[1]["status"], "success");
}

#[tokio::test]
async fn report_trigger_fails_when_summarizer_is_down() {
    let services = AppServices::from_parts(
        Arc::new(MemoryStore::new()),
        Arc::new(DownSummarizer),
        Arc::new(StubAssistant),
        vec![Arc::new(OkChannel("email"))],
        10,
    );
    let server = TestServer::spawn(services).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/reports/daily", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "summarization_unavailable");
}

#[tokio::test]
async fn customer_query_is_grounded_in_inventory() {
    let server = TestServer::spawn(test_services()).await;
    let client = reqwest::Client::new();

    create_item(&client, &server.base_url, "Widget", 5, 200).await;
    create_item(&client, &server.base_url, "Gadget", 1, 500).await;

    let res = client
        .post(format!("{}/queries", server.base_url))
        .json(&json!({ "customer_name": "Ada", "query": "do you have widgets?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["response"],
        "asked \"do you have widgets?\" against 2 inventory lines"
    );
}
