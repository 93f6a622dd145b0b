use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

use crate::costing::CostBreakdown;
use crate::domain::prospect::{PricingRecord, ProspectId};
use crate::report::{self, ReportIdentity, ReportPayload};
use crate::workflows::collaborators::{
    EmailAttachment, OutboundEmail, PricingStore, RenderedReport, ReportMailer, ReportRenderer,
    StoreError,
};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("cost per minute must be positive, got {0}")]
    InvalidPrice(Decimal),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("price update committed, report delivery failed: {0}")]
    Delivery(String),
}

impl From<StoreError> for WorkflowError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(detail) => Self::NotFound(detail),
            StoreError::Backend(message) => Self::Persistence(message),
        }
    }
}

/// Admin repricing: durably update one prospect's price, then
/// regenerate and redeliver their report at that price.
///
/// The price write and the delivery are deliberately asymmetric: a
/// committed price survives any later rendering or dispatch failure,
/// and a retry recomputes everything from the durable record, so
/// redelivery can never disagree with the stored price.
pub struct PricingOverrideWorkflow<S, R, M> {
    store: S,
    renderer: R,
    mailer: M,
}

impl<S, R, M> PricingOverrideWorkflow<S, R, M>
where
    S: PricingStore,
    R: ReportRenderer,
    M: ReportMailer,
{
    pub fn new(store: S, renderer: R, mailer: M) -> Self {
        Self { store, renderer, mailer }
    }

    pub async fn reprice(
        &self,
        id: &ProspectId,
        new_cost_per_minute: Decimal,
        generated_at: DateTime<Utc>,
    ) -> Result<ReportPayload, WorkflowError> {
        if new_cost_per_minute <= Decimal::ZERO {
            return Err(WorkflowError::InvalidPrice(new_cost_per_minute));
        }

        self.store.update_price(id, new_cost_per_minute, generated_at).await?;
        info!(
            event_name = "pricing.reprice.price_updated",
            prospect_id = %id,
            cost_per_minute = %new_cost_per_minute,
            "prospect price updated"
        );

        // From here on the price is committed: every failure below is
        // a delivery failure, retryable without touching the price.
        let record = self
            .store
            .get_by_id(id)
            .await
            .map_err(|error| self.delivery_failure(id, error.to_string()))?;

        let breakdown = CostBreakdown::compute(record.minutes, record.cost_per_minute)
            .map_err(|error| self.delivery_failure(id, error.to_string()))?;
        let payload = report::assemble(ReportIdentity::from(&record), &breakdown, generated_at);

        let rendered = self
            .renderer
            .render(&payload)
            .await
            .map_err(|error| self.delivery_failure(id, error.to_string()))?;

        self.mailer
            .send(report_email(&record, rendered))
            .await
            .map_err(|error| self.delivery_failure(id, error.to_string()))?;

        info!(
            event_name = "pricing.reprice.report_sent",
            prospect_id = %id,
            recipient = %record.email,
            "updated report delivered"
        );
        Ok(payload)
    }

    fn delivery_failure(&self, id: &ProspectId, detail: String) -> WorkflowError {
        warn!(
            event_name = "pricing.reprice.delivery_failed",
            prospect_id = %id,
            error = %detail,
            "price update is committed; delivery must be retried"
        );
        WorkflowError::Delivery(detail)
    }
}

/// Admin global-price path: validates and writes the sentinel record.
/// No recomputation cascade; already-submitted reports keep the price
/// they were generated at.
pub async fn update_global_price<S: PricingStore>(
    store: &S,
    price: Decimal,
    updated_at: DateTime<Utc>,
) -> Result<(), WorkflowError> {
    if price <= Decimal::ZERO {
        return Err(WorkflowError::InvalidPrice(price));
    }

    store.set_default_price(price, updated_at).await?;
    info!(
        event_name = "pricing.global_price_updated",
        cost_per_minute = %price,
        "global base price updated"
    );
    Ok(())
}

fn report_email(record: &PricingRecord, rendered: RenderedReport) -> OutboundEmail {
    OutboundEmail {
        to: vec![record.email.clone()],
        subject: format!("Updated Voice AI cost analysis for {}", record.company_name),
        html_body: format!(
            "<p>Hi {},</p>\
             <p>Your Voice AI cost analysis has been updated with revised pricing. \
             The full report is attached.</p>",
            record.client_name
        ),
        attachments: vec![EmailAttachment {
            filename: rendered.filename,
            content_type: rendered.content_type,
            bytes: rendered.bytes,
        }],
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::{update_global_price, PricingOverrideWorkflow, WorkflowError};
    use crate::domain::prospect::{
        PricingRecord, ProspectId, DEFAULT_CLIENT_NAME, DEFAULT_COMPANY_NAME, DEFAULT_EMAIL,
    };
    use crate::report::ReportPayload;
    use crate::workflows::collaborators::{
        MailError, OutboundEmail, PricingStore, RenderError, RenderedReport, ReportMailer,
        ReportRenderer, StoreError,
    };

    struct FakeStore {
        records: Mutex<Vec<PricingRecord>>,
        fail_writes: AtomicBool,
    }

    impl FakeStore {
        fn with_records(records: Vec<PricingRecord>) -> Self {
            Self { records: Mutex::new(records), fail_writes: AtomicBool::new(false) }
        }

        fn stored_price(&self, id: &ProspectId) -> Decimal {
            self.records
                .lock()
                .expect("store lock")
                .iter()
                .find(|record| &record.id == id)
                .expect("record exists")
                .cost_per_minute
        }
    }

    #[async_trait]
    impl PricingStore for FakeStore {
        async fn get_default(&self) -> Result<PricingRecord, StoreError> {
            self.records
                .lock()
                .expect("store lock")
                .iter()
                .find(|record| record.is_default_sentinel())
                .cloned()
                .ok_or_else(|| StoreError::NotFound("default sentinel".to_string()))
        }

        async fn set_default_price(
            &self,
            price: Decimal,
            updated_at: DateTime<Utc>,
        ) -> Result<(), StoreError> {
            let mut records = self.records.lock().expect("store lock");
            let sentinel = records
                .iter_mut()
                .find(|record| record.is_default_sentinel())
                .ok_or_else(|| StoreError::NotFound("default sentinel".to_string()))?;
            sentinel.cost_per_minute = price;
            sentinel.updated_at = updated_at;
            Ok(())
        }

        async fn get_by_id(&self, id: &ProspectId) -> Result<PricingRecord, StoreError> {
            self.records
                .lock()
                .expect("store lock")
                .iter()
                .find(|record| &record.id == id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(id.to_string()))
        }

        async fn update_price(
            &self,
            id: &ProspectId,
            price: Decimal,
            updated_at: DateTime<Utc>,
        ) -> Result<(), StoreError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Backend("write rejected".to_string()));
            }
            let mut records = self.records.lock().expect("store lock");
            let record = records
                .iter_mut()
                .find(|record| &record.id == id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            record.cost_per_minute = price;
            record.updated_at = updated_at;
            Ok(())
        }

        async fn list_all(&self) -> Result<Vec<PricingRecord>, StoreError> {
            Ok(self.records.lock().expect("store lock").clone())
        }

        async fn upsert_submission(
            &self,
            record: PricingRecord,
        ) -> Result<PricingRecord, StoreError> {
            let mut records = self.records.lock().expect("store lock");
            records.push(record.clone());
            Ok(record)
        }
    }

    struct FakeRenderer;

    #[async_trait]
    impl ReportRenderer for FakeRenderer {
        async fn render(&self, payload: &ReportPayload) -> Result<RenderedReport, RenderError> {
            Ok(RenderedReport {
                filename: "voice-ai-cost-analysis.html".to_string(),
                content_type: "text/html",
                bytes: format!("report for {}", payload.client.company_name).into_bytes(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutboundEmail>>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl ReportMailer for RecordingMailer {
        async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(MailError("smtp relay unavailable".to_string()));
            }
            self.sent.lock().expect("mailer lock").push(email);
            Ok(())
        }
    }

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 6, 9, 30, 0).unwrap()
    }

    fn prospect(id: &ProspectId, minutes: u32, cents: i64) -> PricingRecord {
        PricingRecord {
            id: id.clone(),
            client_name: "Grace Hopper".to_string(),
            company_name: "Flowmatic".to_string(),
            email: "grace@flowmatic.example".to_string(),
            phone: Some("+1 555 0100".to_string()),
            website: None,
            minutes,
            cost_per_minute: Decimal::new(cents, 2),
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    fn sentinel(cents: i64) -> PricingRecord {
        PricingRecord {
            id: ProspectId::generate(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            company_name: DEFAULT_COMPANY_NAME.to_string(),
            email: DEFAULT_EMAIL.to_string(),
            phone: None,
            website: None,
            minutes: 0,
            cost_per_minute: Decimal::new(cents, 2),
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    #[tokio::test]
    async fn reprice_commits_price_and_reports_at_the_new_rate() {
        let id = ProspectId::generate();
        let store = Arc::new(FakeStore::with_records(vec![prospect(&id, 1_000, 5)]));
        let mailer = Arc::new(RecordingMailer::default());
        let workflow =
            PricingOverrideWorkflow::new(Arc::clone(&store), FakeRenderer, Arc::clone(&mailer));

        let new_price = Decimal::new(8, 2);
        let payload =
            workflow.reprice(&id, new_price, timestamp()).await.expect("reprice succeeds");

        assert_eq!(store.stored_price(&id), new_price);
        // The payload must reflect the durable price, not a stale one.
        assert_eq!(payload.pricing.cost_per_minute, new_price);
        assert_eq!(payload.costs.standard_cost, Decimal::new(8_000, 2));

        let sent = mailer.sent.lock().expect("mailer lock");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["grace@flowmatic.example".to_string()]);
        assert_eq!(sent[0].attachments.len(), 1);
    }

    #[tokio::test]
    async fn non_positive_price_is_rejected_before_any_write() {
        let id = ProspectId::generate();
        let store = Arc::new(FakeStore::with_records(vec![prospect(&id, 1_000, 5)]));
        let workflow = PricingOverrideWorkflow::new(
            Arc::clone(&store),
            FakeRenderer,
            RecordingMailer::default(),
        );

        let error = workflow
            .reprice(&id, Decimal::ZERO, timestamp())
            .await
            .expect_err("zero price rejected");

        assert!(matches!(error, WorkflowError::InvalidPrice(_)));
        assert_eq!(store.stored_price(&id), Decimal::new(5, 2), "price untouched");
    }

    #[tokio::test]
    async fn persistence_failure_stops_the_workflow_before_delivery() {
        let id = ProspectId::generate();
        let store = Arc::new(FakeStore::with_records(vec![prospect(&id, 1_000, 5)]));
        store.fail_writes.store(true, Ordering::SeqCst);
        let mailer = Arc::new(RecordingMailer::default());
        let workflow =
            PricingOverrideWorkflow::new(Arc::clone(&store), FakeRenderer, Arc::clone(&mailer));

        let error = workflow
            .reprice(&id, Decimal::new(8, 2), timestamp())
            .await
            .expect_err("write fails");

        assert!(matches!(error, WorkflowError::Persistence(_)));
        assert!(mailer.sent.lock().expect("mailer lock").is_empty(), "nothing delivered");
    }

    #[tokio::test]
    async fn delivery_failure_keeps_the_committed_price() {
        let id = ProspectId::generate();
        let store = Arc::new(FakeStore::with_records(vec![prospect(&id, 1_000, 5)]));
        let mailer = Arc::new(RecordingMailer::default());
        mailer.fail.store(true, Ordering::SeqCst);
        let workflow =
            PricingOverrideWorkflow::new(Arc::clone(&store), FakeRenderer, Arc::clone(&mailer));

        let new_price = Decimal::new(9, 2);
        let error =
            workflow.reprice(&id, new_price, timestamp()).await.expect_err("mailer fails");

        assert!(matches!(error, WorkflowError::Delivery(_)));
        // Partial-failure rule: the price write is not rolled back.
        assert_eq!(store.stored_price(&id), new_price);
    }

    #[tokio::test]
    async fn unknown_prospect_reports_not_found() {
        let store = Arc::new(FakeStore::with_records(vec![sentinel(5)]));
        let workflow = PricingOverrideWorkflow::new(
            Arc::clone(&store),
            FakeRenderer,
            RecordingMailer::default(),
        );

        let error = workflow
            .reprice(&ProspectId::generate(), Decimal::new(8, 2), timestamp())
            .await
            .expect_err("missing prospect");

        assert!(matches!(error, WorkflowError::NotFound(_)));
    }

    #[tokio::test]
    async fn global_price_update_touches_only_the_sentinel() {
        let id = ProspectId::generate();
        let store = FakeStore::with_records(vec![sentinel(5), prospect(&id, 1_000, 7)]);

        update_global_price(&store, Decimal::new(6, 2), timestamp())
            .await
            .expect("global update succeeds");

        let sentinel_price = store.get_default().await.expect("sentinel").cost_per_minute;
        assert_eq!(sentinel_price, Decimal::new(6, 2));
        assert_eq!(store.stored_price(&id), Decimal::new(7, 2), "prospects not cascaded");

        let error = update_global_price(&store, Decimal::new(-1, 2), timestamp())
            .await
            .expect_err("negative price rejected");
        assert!(matches!(error, WorkflowError::InvalidPrice(_)));
    }
}
