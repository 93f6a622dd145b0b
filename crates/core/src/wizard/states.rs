use serde::{Deserialize, Serialize};

/// The five calculator steps, in presentation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WizardStep {
    Introduction,
    PersonalInfo,
    ContactInfo,
    CostEstimate,
    Review,
}

impl Default for WizardStep {
    fn default() -> Self {
        WizardStep::FIRST
    }
}

impl WizardStep {
    pub const FIRST: WizardStep = WizardStep::Introduction;
    pub const LAST: WizardStep = WizardStep::Review;

    /// 1-based position, matching the step indicator shown to users.
    pub fn number(self) -> u8 {
        match self {
            Self::Introduction => 1,
            Self::PersonalInfo => 2,
            Self::ContactInfo => 3,
            Self::CostEstimate => 4,
            Self::Review => 5,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::Introduction),
            2 => Some(Self::PersonalInfo),
            3 => Some(Self::ContactInfo),
            4 => Some(Self::CostEstimate),
            5 => Some(Self::Review),
            _ => None,
        }
    }

    pub(crate) fn forward(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub(crate) fn backward(self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }
}
