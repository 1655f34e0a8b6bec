use std::sync::Arc;

use async_trait::async_trait;
use axum::{Extension, Router};
use sqlx::PgPool;

use storekeep_ai::{AiError, Assistant, Summarizer};
use storekeep_infra::{
    ChatClient, EmailChannel, LlmConfig, MessagingChannel, MessagingConfig, PostgresStore,
    SmtpConfig,
};
use storekeep_notify::{Channel, NotificationDispatcher};
use storekeep_report::{ReportGenerator, DEFAULT_LOW_STOCK_THRESHOLD};
use storekeep_sales::{MemoryStore, SaleManager, Store};

pub mod dto;
pub mod errors;
pub mod routes;

/// Process-wide services.
///
/// Built exactly once at startup, shared by handle via
/// `Extension<Arc<AppServices>>`, torn down with the process. Nothing here is
/// re-created per request.
pub struct AppServices {
    store: Arc<dyn Store>,
    sales: SaleManager,
    reports: ReportGenerator,
    dispatcher: NotificationDispatcher,
    assistant: Arc<dyn Assistant>,
}

impl AppServices {
    pub fn from_parts(
        store: Arc<dyn Store>,
        summarizer: Arc<dyn Summarizer>,
        assistant: Arc<dyn Assistant>,
        channels: Vec<Arc<dyn Channel>>,
        low_stock_threshold: i64,
    ) -> Self {
        let sales = SaleManager::new(store.clone());
        let reports = ReportGenerator::new(store.clone(), summarizer, low_stock_threshold);
        let dispatcher = NotificationDispatcher::new(channels);
        Self {
            store,
            sales,
            reports,
            dispatcher,
            assistant,
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn sales(&self) -> &SaleManager {
        &self.sales
    }

    pub fn reports(&self) -> &ReportGenerator {
        &self.reports
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    pub fn assistant(&self) -> &Arc<dyn Assistant> {
        &self.assistant
    }
}

/// Stand-in for an absent language-model configuration.
///
/// Report generation then fails `SummarizationUnavailable` and customer
/// queries return 502, instead of the process refusing to start: the store
/// still sells without its LLM.
struct UnconfiguredLlm;

#[async_trait]
impl Summarizer for UnconfiguredLlm {
    async fn summarize(&self, _text: &str) -> Result<String, AiError> {
        Err(AiError::Unavailable(
            "LLM_BASE_URL / LLM_API_KEY not set".to_string(),
        ))
    }
}

#[async_trait]
impl Assistant for UnconfiguredLlm {
    async fn answer(&self, _query: &str, _inventory: &str) -> Result<String, AiError> {
        Err(AiError::Unavailable(
            "LLM_BASE_URL / LLM_API_KEY not set".to_string(),
        ))
    }
}

fn low_stock_threshold_from_env() -> i64 {
    std::env::var("LOW_STOCK_THRESHOLD")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD)
}

/// Assemble services from the environment.
///
/// `USE_PERSISTENT_STORE=true` selects Postgres (requires `DATABASE_URL`);
/// the default is the in-memory store for dev/test. Channels and the LLM are
/// configured if their variables are present and degrade per-call otherwise.
pub async fn build_services() -> AppServices {
    let use_persistent = std::env::var("USE_PERSISTENT_STORE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    let store: Arc<dyn Store> = if use_persistent {
        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set when USE_PERSISTENT_STORE=true");
        let pool = PgPool::connect(&database_url)
            .await
            .expect("failed to connect to Postgres");
        tracing::info!("using Postgres store");
        Arc::new(PostgresStore::new(pool))
    } else {
        tracing::info!("using in-memory store");
        Arc::new(MemoryStore::new())
    };

    let (summarizer, assistant): (Arc<dyn Summarizer>, Arc<dyn Assistant>) =
        match LlmConfig::from_env() {
            Some(config) => {
                let client = Arc::new(ChatClient::new(config));
                (client.clone(), client)
            }
            None => {
                tracing::warn!("LLM not configured; reports and queries will be unavailable");
                (Arc::new(UnconfiguredLlm), Arc::new(UnconfiguredLlm))
            }
        };

    let channels: Vec<Arc<dyn Channel>> = vec![
        Arc::new(MessagingChannel::new(MessagingConfig::from_env())),
        Arc::new(EmailChannel::new(SmtpConfig::from_env())),
    ];

    AppServices::from_parts(
        store,
        summarizer,
        assistant,
        channels,
        low_stock_threshold_from_env(),
    )
}

/// Build the production router from the environment.
pub async fn build_app() -> Router {
    build_app_with(build_services().await)
}

/// Build the router around pre-assembled services (tests inject stubs here).
pub fn build_app_with(services: AppServices) -> Router {
    Router::new()
        .nest("/items", routes::items::router())
        .nest("/sales", routes::sales::router())
        .nest("/reports", routes::report::router())
        .nest("/queries", routes::queries::router())
        .layer(Extension(Arc::new(services)))
}
