use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::domain::submission::{FieldUpdate, Submission, SubmissionField};
use crate::wizard::states::WizardStep;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("step {step:?} is missing valid input for: {fields:?}")]
    InvalidFields { step: WizardStep, fields: Vec<SubmissionField> },
    #[error("already at the final step {step:?}")]
    NoFurtherStep { step: WizardStep },
    #[error("submit is only available from the review step, currently at {step:?}")]
    SubmitUnavailable { step: WizardStep },
}

/// One user's in-progress calculator session.
///
/// Created when the wizard opens and discarded after submit or
/// abandonment; the step index and the submission live here rather
/// than in any shared state. Transitions mutate only this session;
/// `finalize` is the single point where the collected data leaves it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WizardSession {
    step: WizardStep,
    submission: Submission,
}

impl WizardSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes a session at a given step, e.g. after the caller
    /// re-renders from persisted UI state.
    pub fn resume(step: WizardStep, submission: Submission) -> Self {
        Self { step, submission }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    /// Merges one field into the submission. Allowed from any step;
    /// validation only happens when the step is left forward.
    pub fn update_field(&mut self, update: FieldUpdate) {
        self.submission.apply(update);
    }

    /// Advances one step if the current step's gate passes. On
    /// failure the step is unchanged and the error names every
    /// missing or invalid field of the current step.
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        let missing = missing_fields(self.step, &self.submission);
        if !missing.is_empty() {
            return Err(WizardError::InvalidFields { step: self.step, fields: missing });
        }

        match self.step.forward() {
            Some(step) => {
                self.step = step;
                Ok(step)
            }
            None => Err(WizardError::NoFurtherStep { step: self.step }),
        }
    }

    /// Retreats one step, clamped at the first. Never validates;
    /// going back to fix input is always allowed.
    pub fn back(&mut self) -> WizardStep {
        if let Some(step) = self.step.backward() {
            self.step = step;
        }
        self.step
    }

    /// Yields the finalized submission. Only available from the
    /// review step, and re-checks every gated step so a submission
    /// can never leave the wizard with a field its step would have
    /// rejected.
    pub fn finalize(&self) -> Result<Submission, WizardError> {
        if self.step != WizardStep::LAST {
            return Err(WizardError::SubmitUnavailable { step: self.step });
        }

        for step in [WizardStep::PersonalInfo, WizardStep::ContactInfo, WizardStep::CostEstimate] {
            let missing = missing_fields(step, &self.submission);
            if !missing.is_empty() {
                return Err(WizardError::InvalidFields { step, fields: missing });
            }
        }

        Ok(self.submission.clone())
    }
}

fn missing_fields(step: WizardStep, submission: &Submission) -> Vec<SubmissionField> {
    let mut missing = Vec::new();
    match step {
        WizardStep::Introduction | WizardStep::Review => {}
        WizardStep::PersonalInfo => {
            if submission.name.trim().is_empty() {
                missing.push(SubmissionField::Name);
            }
            if submission.company_name.trim().is_empty() {
                missing.push(SubmissionField::CompanyName);
            }
        }
        WizardStep::ContactInfo => {
            if !is_valid_email(&submission.email) {
                missing.push(SubmissionField::Email);
            }
            if submission.phone.trim().is_empty() {
                missing.push(SubmissionField::Phone);
            }
        }
        WizardStep::CostEstimate => {
            if submission.minutes == 0 {
                missing.push(SubmissionField::Minutes);
            }
        }
    }
    missing
}

fn is_valid_email(candidate: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    let pattern = EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    });
    pattern.is_match(candidate.trim())
}
