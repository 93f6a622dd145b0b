pub mod engine;
pub mod states;

pub use engine::{WizardError, WizardSession};
pub use states::WizardStep;
