use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::submission::Submission;

/// Identity of the sentinel record that carries the global base
/// price. New submissions inherit their price from this row until an
/// operator overrides them individually.
pub const DEFAULT_CLIENT_NAME: &str = "default";
pub const DEFAULT_COMPANY_NAME: &str = "default";
pub const DEFAULT_EMAIL: &str = "default@example.com";

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProspectId(pub Uuid);

impl ProspectId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ProspectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One pricing row per prospect, owned by the persistence
/// collaborator. The core reads and updates these; it never caches a
/// price across a write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRecord {
    pub id: ProspectId,
    pub client_name: String,
    pub company_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub minutes: u32,
    pub cost_per_minute: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PricingRecord {
    /// Builds the row a finalized submission writes, priced at the
    /// current global rate.
    pub fn from_submission(
        id: ProspectId,
        submission: &Submission,
        cost_per_minute: Decimal,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            client_name: submission.name.clone(),
            company_name: submission.company_name.clone(),
            email: submission.email.clone(),
            phone: Some(submission.phone.clone()),
            website: None,
            minutes: submission.minutes,
            cost_per_minute,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_default_sentinel(&self) -> bool {
        self.client_name == DEFAULT_CLIENT_NAME
            && self.company_name == DEFAULT_COMPANY_NAME
            && self.email == DEFAULT_EMAIL
    }
}
