use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::costing::{CallCapacity, CostBreakdown};
use crate::domain::prospect::PricingRecord;
use crate::domain::submission::Submission;

/// The prospect identity a report is generated for, independent of
/// whether it came from a live wizard session or a stored record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportIdentity {
    pub name: String,
    pub company_name: String,
    pub email: String,
    pub phone: String,
    pub minutes: u32,
}

impl From<&Submission> for ReportIdentity {
    fn from(submission: &Submission) -> Self {
        Self {
            name: submission.name.clone(),
            company_name: submission.company_name.clone(),
            email: submission.email.clone(),
            phone: submission.phone.clone(),
            minutes: submission.minutes,
        }
    }
}

impl From<&PricingRecord> for ReportIdentity {
    fn from(record: &PricingRecord) -> Self {
        Self {
            name: record.client_name.clone(),
            company_name: record.company_name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone().unwrap_or_default(),
            minutes: record.minutes,
        }
    }
}

// ReportPayload is the contract with the document renderer: field
// names and nesting are frozen once a template depends on them.
// Extend with new fields if needed; never rename or move existing
// ones.

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSection {
    pub name: String,
    pub company_name: String,
    pub email: String,
    pub phone: String,
    pub minutes: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSection {
    pub cost_per_minute: Decimal,
    pub premium_cost_per_minute: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSection {
    pub standard_cost: Decimal,
    pub premium_cost: Decimal,
    pub human_cost: Decimal,
    pub standard_savings: Decimal,
    pub premium_savings: Decimal,
    pub standard_savings_pct: Decimal,
    pub premium_savings_pct: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub client: ClientSection,
    pub pricing: PricingSection,
    pub costs: CostSection,
    pub capacity: CallCapacity,
    pub generated_at: DateTime<Utc>,
}

/// Combines an identity and a computed breakdown into the payload the
/// renderer consumes. Pure transformation; amounts are rounded to two
/// decimal places and percentages to one, half away from zero, so the
/// document shows the figures a reader would compute by hand.
pub fn assemble(
    identity: ReportIdentity,
    breakdown: &CostBreakdown,
    generated_at: DateTime<Utc>,
) -> ReportPayload {
    ReportPayload {
        client: ClientSection {
            name: identity.name,
            company_name: identity.company_name,
            email: identity.email,
            phone: identity.phone,
            minutes: identity.minutes,
        },
        pricing: PricingSection {
            cost_per_minute: breakdown.cost_per_minute,
            premium_cost_per_minute: breakdown.premium_cost_per_minute,
        },
        costs: CostSection {
            standard_cost: money(breakdown.standard_cost),
            premium_cost: money(breakdown.premium_cost),
            human_cost: money(breakdown.human_cost),
            standard_savings: money(breakdown.standard_savings),
            premium_savings: money(breakdown.premium_savings),
            standard_savings_pct: percent(breakdown.standard_savings_pct),
            premium_savings_pct: percent(breakdown.premium_savings_pct),
        },
        capacity: breakdown.capacity,
        generated_at,
    }
}

fn money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn percent(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}
