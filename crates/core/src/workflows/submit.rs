use chrono::{DateTime, Utc};
use tracing::info;

use crate::costing::CostBreakdown;
use crate::domain::prospect::{PricingRecord, ProspectId};
use crate::domain::submission::Submission;
use crate::report::{self, ReportIdentity, ReportPayload};
use crate::workflows::collaborators::PricingStore;
use crate::workflows::reprice::WorkflowError;

/// Calculator submit: persist a finalized submission at the current
/// global price and hand back the payload for the detailed report
/// view.
///
/// The record write is keyed on the submission's identity, so a user
/// resubmitting unchanged data from the review step re-issues the
/// same logical write instead of creating a duplicate prospect.
pub struct SubmissionWorkflow<S> {
    store: S,
}

impl<S: PricingStore> SubmissionWorkflow<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn submit(
        &self,
        submission: &Submission,
        submitted_at: DateTime<Utc>,
    ) -> Result<ReportPayload, WorkflowError> {
        let default = self.store.get_default().await?;

        let record = PricingRecord::from_submission(
            ProspectId::generate(),
            submission,
            default.cost_per_minute,
            submitted_at,
        );
        let stored = self.store.upsert_submission(record).await?;
        info!(
            event_name = "wizard.submit.record_stored",
            prospect_id = %stored.id,
            company = %stored.company_name,
            cost_per_minute = %stored.cost_per_minute,
            "submission stored at the global base price"
        );

        // The breakdown comes from the stored row, so the report view
        // matches what a later regeneration would produce.
        let breakdown = CostBreakdown::compute(stored.minutes, stored.cost_per_minute)
            .map_err(|error| WorkflowError::Persistence(error.to_string()))?;
        Ok(report::assemble(ReportIdentity::from(&stored), &breakdown, submitted_at))
    }
}
