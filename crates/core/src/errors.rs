use rust_decimal::Decimal;
use thiserror::Error;

use crate::wizard::WizardError;
use crate::workflows::WorkflowError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("cost per minute must be positive, got {cost_per_minute}")]
    NonPositiveRate { cost_per_minute: Decimal },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Validation(#[from] WizardError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("delivery failure: {0}")]
    Delivery(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl From<WorkflowError> for ApplicationError {
    fn from(value: WorkflowError) -> Self {
        match value {
            WorkflowError::InvalidPrice(cost_per_minute) => {
                Self::Domain(DomainError::NonPositiveRate { cost_per_minute })
            }
            WorkflowError::NotFound(detail) => Self::NotFound(detail),
            WorkflowError::Persistence(message) => Self::Persistence(message),
            WorkflowError::Delivery(message) => Self::Delivery(message),
        }
    }
}

/// Errors as the HTTP layer reports them. Each carries the
/// correlation id of the request that produced it; the detailed
/// message stays in logs while `user_message` is what a caller sees.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("unauthorized: {message}")]
    Unauthorized { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::Unauthorized { .. } => "This operation requires administrator access.",
            Self::NotFound { .. } => "The requested record does not exist.",
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::Unauthorized { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(error) => Self::BadRequest {
                message: error.to_string(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Validation(error) => Self::BadRequest {
                message: error.to_string(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::NotFound(message) => {
                Self::NotFound { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Persistence(message) | ApplicationError::Delivery(message) => {
                Self::ServiceUnavailable { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Unauthorized(message) => {
                Self::Unauthorized { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{ApplicationError, DomainError, InterfaceError};
    use crate::workflows::WorkflowError;

    #[test]
    fn domain_error_maps_to_bad_request() {
        let interface = ApplicationError::from(DomainError::NonPositiveRate {
            cost_per_minute: Decimal::ZERO,
        })
        .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest { ref correlation_id, .. } if correlation_id == "req-1"
        ));
        assert_eq!(
            interface.user_message(),
            "The request could not be processed. Check inputs and try again."
        );
    }

    #[test]
    fn persistence_and_delivery_map_to_service_unavailable() {
        for error in [
            ApplicationError::Persistence("database lock timeout".to_owned()),
            ApplicationError::Delivery("mail relay rejected message".to_owned()),
        ] {
            let interface = error.into_interface("req-2");
            assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        }
    }

    #[test]
    fn unauthorized_maps_to_its_own_lane() {
        let interface =
            ApplicationError::Unauthorized("missing admin token".to_owned()).into_interface("req-3");

        assert!(matches!(interface, InterfaceError::Unauthorized { .. }));
        assert_eq!(interface.user_message(), "This operation requires administrator access.");
    }

    #[test]
    fn workflow_delivery_failure_keeps_its_class() {
        let interface = ApplicationError::from(WorkflowError::Delivery(
            "renderer exited with status 1".to_owned(),
        ))
        .into_interface("req-4");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
    }

    #[test]
    fn missing_prospect_maps_to_not_found() {
        let interface =
            ApplicationError::from(WorkflowError::NotFound("prospect 42".to_owned()))
                .into_interface("req-5");

        assert!(matches!(interface, InterfaceError::NotFound { .. }));
        assert_eq!(interface.user_message(), "The requested record does not exist.");
    }
}
