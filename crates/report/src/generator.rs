use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use storekeep_ai::{AiError, Summarizer};
use storekeep_core::{ItemId, Money};
use storekeep_inventory::Item;
use storekeep_sales::{Sale, Store, StoreError};

/// Policy default: items under this quantity count as low stock.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Report generation failure. Both variants abort generation; nothing is
/// dispatched downstream.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The summarization collaborator is a hard dependency.
    #[error("summarization unavailable: {0}")]
    SummarizationUnavailable(String),

    #[error("store error: {0}")]
    Store(String),
}

impl From<StoreError> for ReportError {
    fn from(err: StoreError) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<AiError> for ReportError {
    fn from(err: AiError) -> Self {
        Self::SummarizationUnavailable(err.to_string())
    }
}

/// A generated daily report: the deterministic raw text and the condensed
/// summary that gets dispatched.
#[derive(Debug, Clone, Serialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub raw: String,
    pub summary: String,
}

/// Builds the daily report from the sale ledger and current inventory.
#[derive(Clone)]
pub struct ReportGenerator {
    store: Arc<dyn Store>,
    summarizer: Arc<dyn Summarizer>,
    low_stock_threshold: i64,
}

impl ReportGenerator {
    pub fn new(
        store: Arc<dyn Store>,
        summarizer: Arc<dyn Summarizer>,
        low_stock_threshold: i64,
    ) -> Self {
        Self {
            store,
            summarizer,
            low_stock_threshold,
        }
    }

    /// Generate today's report and condense it.
    ///
    /// Fails only on store errors or an unreachable summarizer; a sale whose
    /// item no longer resolves is logged and skipped, never fatal.
    pub async fn generate(&self) -> Result<DailyReport, ReportError> {
        let date = chrono::Local::now().date_naive();
        let sales = self.store.list_sales_on(date).await?;
        let items = self.store.list_items().await?;

        let raw = render_raw(date, &sales, &items, self.low_stock_threshold);
        tracing::debug!(%date, sales = sales.len(), "raw report assembled");

        let summary = self.summarizer.summarize(&raw).await?;
        Ok(DailyReport { date, raw, summary })
    }
}

/// Render the raw report text. Pure and deterministic: the same ledger and
/// item set always produce identical bytes.
pub fn render_raw(date: NaiveDate, sales: &[Sale], items: &[Item], threshold: i64) -> String {
    let by_id: HashMap<ItemId, &Item> = items.iter().map(|i| (i.id(), i)).collect();

    let mut out = format!("Daily Sales Report for {date}\n\n");
    out.push_str("Sales:\n");

    let mut total = Money::ZERO;
    for sale in sales {
        match by_id.get(&sale.item_id()) {
            Some(item) => {
                let _ = writeln!(
                    out,
                    "- {}: {} units, Total: {}",
                    item.name(),
                    sale.quantity(),
                    sale.total()
                );
                total = total.saturating_add(sale.total());
            }
            None => {
                // Ledger rows are immutable and items are never deleted, so a
                // dangling reference means upstream data damage. Soft-fail:
                // skip the line, keep the report.
                tracing::warn!(
                    sale_id = %sale.id(),
                    item_id = %sale.item_id(),
                    "sale references a missing item; skipping line"
                );
            }
        }
    }

    let _ = write!(out, "\nTotal Sales: {total}\n");

    out.push_str("\nLow Stock Items:\n");
    let low: Vec<&Item> = items.iter().filter(|i| i.is_below(threshold)).collect();
    if low.is_empty() {
        out.push_str("No low stock items.\n");
    } else {
        for item in low {
            let _ = writeln!(out, "- {}: {} units", item.name(), item.quantity());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use storekeep_core::SaleId;
    use storekeep_sales::MemoryStore;

    struct EchoSummarizer;

    #[async_trait]
    impl Summarizer for EchoSummarizer {
        async fn summarize(&self, text: &str) -> Result<String, AiError> {
            Ok(format!("summary of {} bytes", text.len()))
        }
    }

    struct DownSummarizer;

    #[async_trait]
    impl Summarizer for DownSummarizer {
        async fn summarize(&self, _text: &str) -> Result<String, AiError> {
            Err(AiError::Unavailable("connect refused".to_string()))
        }
    }

    fn item(name: &str, quantity: i64, price_cents: i64) -> Item {
        Item::new(
            ItemId::new(),
            name,
            quantity,
            Money::from_cents(price_cents).unwrap(),
        )
        .unwrap()
    }

    fn sale_of(item: &Item, quantity: i64, date: NaiveDate) -> Sale {
        Sale::new(
            SaleId::new(),
            item.id(),
            quantity,
            item.price().times(quantity).unwrap(),
            date,
        )
    }

    fn a_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    #[test]
    fn raw_report_matches_expected_layout() {
        // Ledger: one Widget sale (3 units, $6.00). Items: Widget(2), Gadget(1),
        // both under the threshold of 10.
        let widget = item("Widget", 2, 200);
        let gadget = item("Gadget", 1, 500);
        let sales = vec![sale_of(&widget, 3, a_date())];
        let items = vec![widget, gadget];

        let raw = render_raw(a_date(), &sales, &items, 10);
        assert_eq!(
            raw,
            "Daily Sales Report for 2026-08-07\n\
             \n\
             Sales:\n\
             - Widget: 3 units, Total: $6.00\n\
             \n\
             Total Sales: $6.00\n\
             \n\
             Low Stock Items:\n\
             - Widget: 2 units\n\
             - Gadget: 1 units\n"
        );
    }

    #[test]
    fn raw_report_is_deterministic() {
        let widget = item("Widget", 2, 200);
        let gadget = item("Gadget", 15, 500);
        let sales = vec![sale_of(&widget, 3, a_date()), sale_of(&gadget, 1, a_date())];
        let items = vec![widget, gadget];

        let first = render_raw(a_date(), &sales, &items, 10);
        let second = render_raw(a_date(), &sales, &items, 10);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_day_reports_no_low_stock_marker() {
        let items = vec![item("Widget", 50, 200)];
        let raw = render_raw(a_date(), &[], &items, 10);
        assert!(raw.contains("Total Sales: $0.00"));
        assert!(raw.contains("No low stock items.\n"));
    }

    #[test]
    fn dangling_sale_is_skipped_and_excluded_from_total() {
        let widget = item("Widget", 20, 200);
        let ghost = item("Ghost", 1, 10_000);
        let sales = vec![sale_of(&widget, 2, a_date()), sale_of(&ghost, 1, a_date())];
        // Ghost is absent from the item set.
        let items = vec![widget];

        let raw = render_raw(a_date(), &sales, &items, 10);
        assert!(raw.contains("- Widget: 2 units, Total: $4.00\n"));
        assert!(!raw.contains("Ghost"));
        assert!(raw.contains("Total Sales: $4.00"));
    }

    #[tokio::test]
    async fn generate_condenses_through_the_summarizer() {
        let store = Arc::new(MemoryStore::new());
        store.insert_item(item("Widget", 3, 200)).await.unwrap();

        let generator = ReportGenerator::new(store, Arc::new(EchoSummarizer), 10);
        let report = generator.generate().await.unwrap();
        assert_eq!(report.summary, format!("summary of {} bytes", report.raw.len()));
        assert!(report.raw.starts_with("Daily Sales Report for "));
    }

    #[tokio::test]
    async fn unreachable_summarizer_is_a_hard_failure() {
        let store = Arc::new(MemoryStore::new());
        let generator = ReportGenerator::new(store, Arc::new(DownSummarizer), 10);
        let err = generator.generate().await.unwrap_err();
        assert!(matches!(err, ReportError::SummarizationUnavailable(_)));
    }
}
