pub mod config;
pub mod costing;
pub mod domain;
pub mod errors;
pub mod report;
pub mod wizard;
pub mod workflows;

pub use costing::{CallCapacity, CostBreakdown};
pub use domain::prospect::{
    PricingRecord, ProspectId, DEFAULT_CLIENT_NAME, DEFAULT_COMPANY_NAME, DEFAULT_EMAIL,
};
pub use domain::submission::{FieldUpdate, Submission, SubmissionField};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use report::{assemble, ReportIdentity, ReportPayload};
pub use wizard::{WizardError, WizardSession, WizardStep};
pub use workflows::{
    update_global_price, EmailAttachment, MailError, OutboundEmail, PricingOverrideWorkflow,
    PricingStore, RenderError, RenderedReport, ReportMailer, ReportRenderer, StoreError,
    SubmissionWorkflow, WorkflowError,
};
