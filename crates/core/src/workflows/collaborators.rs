use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::prospect::{PricingRecord, ProspectId};
use crate::report::ReportPayload;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("pricing record not found: {0}")]
    NotFound(String),
    #[error("pricing store failure: {0}")]
    Backend(String),
}

/// Persistence collaborator for pricing records. One row per
/// prospect, plus the sentinel default row every new submission
/// inherits its price from.
#[async_trait]
pub trait PricingStore: Send + Sync {
    /// The sentinel default record (global base price).
    async fn get_default(&self) -> Result<PricingRecord, StoreError>;

    /// Single-field update of the global base price. No cascade:
    /// already-stored prospects keep their own price.
    async fn set_default_price(
        &self,
        price: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn get_by_id(&self, id: &ProspectId) -> Result<PricingRecord, StoreError>;

    async fn update_price(
        &self,
        id: &ProspectId,
        price: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// All prospect records, newest first.
    async fn list_all(&self) -> Result<Vec<PricingRecord>, StoreError>;

    /// Writes a submission's record, keyed on its
    /// (client_name, company_name, email) identity so an unchanged
    /// resubmission re-issues the same logical write. Returns the
    /// stored row.
    async fn upsert_submission(&self, record: PricingRecord)
        -> Result<PricingRecord, StoreError>;
}

#[derive(Debug, Error)]
#[error("report rendering failed: {0}")]
pub struct RenderError(pub String);

/// A rendered report document, ready to stream to a browser or
/// attach to an email.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedReport {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Document-rendering collaborator: payload in, document artifact
/// out.
#[async_trait]
pub trait ReportRenderer: Send + Sync {
    async fn render(&self, payload: &ReportPayload) -> Result<RenderedReport, RenderError>;
}

#[derive(Debug, Error)]
#[error("email dispatch failed: {0}")]
pub struct MailError(pub String);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: Vec<String>,
    pub subject: String,
    pub html_body: String,
    pub attachments: Vec<EmailAttachment>,
}

/// Delivery collaborator. Failures here are non-fatal to a committed
/// price update; callers retry delivery explicitly.
#[async_trait]
pub trait ReportMailer: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError>;
}

#[async_trait]
impl<T: PricingStore + ?Sized> PricingStore for Arc<T> {
    async fn get_default(&self) -> Result<PricingRecord, StoreError> {
        (**self).get_default().await
    }

    async fn set_default_price(
        &self,
        price: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        (**self).set_default_price(price, updated_at).await
    }

    async fn get_by_id(&self, id: &ProspectId) -> Result<PricingRecord, StoreError> {
        (**self).get_by_id(id).await
    }

    async fn update_price(
        &self,
        id: &ProspectId,
        price: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        (**self).update_price(id, price, updated_at).await
    }

    async fn list_all(&self) -> Result<Vec<PricingRecord>, StoreError> {
        (**self).list_all().await
    }

    async fn upsert_submission(
        &self,
        record: PricingRecord,
    ) -> Result<PricingRecord, StoreError> {
        (**self).upsert_submission(record).await
    }
}

#[async_trait]
impl<T: ReportRenderer + ?Sized> ReportRenderer for Arc<T> {
    async fn render(&self, payload: &ReportPayload) -> Result<RenderedReport, RenderError> {
        (**self).render(payload).await
    }
}

#[async_trait]
impl<T: ReportMailer + ?Sized> ReportMailer for Arc<T> {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        (**self).send(email).await
    }
}
