pub mod collaborators;
pub mod reprice;
pub mod submit;

pub use collaborators::{
    EmailAttachment, MailError, OutboundEmail, PricingStore, RenderError, RenderedReport,
    ReportMailer, ReportRenderer, StoreError,
};
pub use reprice::{update_global_price, PricingOverrideWorkflow, WorkflowError};
pub use submit::SubmissionWorkflow;
