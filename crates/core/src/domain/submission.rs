use serde::{Deserialize, Serialize};

/// In-progress calculator input, owned by the wizard session while it
/// is being collected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub name: String,
    pub company_name: String,
    pub email: String,
    pub phone: String,
    pub minutes: u32,
}

/// The closed set of submission fields. Validation failures name
/// fields from this set so the caller can surface per-field messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionField {
    Name,
    CompanyName,
    Email,
    Phone,
    Minutes,
}

impl SubmissionField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::CompanyName => "company_name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Minutes => "minutes",
        }
    }
}

impl std::fmt::Display for SubmissionField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field update, tagged by field. Keeping this a closed union
/// (rather than a string-keyed map) means a new submission field
/// cannot be added without the compiler pointing at every site that
/// must handle it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FieldUpdate {
    Name(String),
    CompanyName(String),
    Email(String),
    Phone(String),
    Minutes(u32),
}

impl FieldUpdate {
    pub fn field(&self) -> SubmissionField {
        match self {
            Self::Name(_) => SubmissionField::Name,
            Self::CompanyName(_) => SubmissionField::CompanyName,
            Self::Email(_) => SubmissionField::Email,
            Self::Phone(_) => SubmissionField::Phone,
            Self::Minutes(_) => SubmissionField::Minutes,
        }
    }
}

impl Submission {
    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::Name(value) => self.name = value,
            FieldUpdate::CompanyName(value) => self.company_name = value,
            FieldUpdate::Email(value) => self.email = value,
            FieldUpdate::Phone(value) => self.phone = value,
            FieldUpdate::Minutes(value) => self.minutes = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldUpdate, Submission, SubmissionField};

    #[test]
    fn apply_merges_single_fields() {
        let mut submission = Submission::default();

        submission.apply(FieldUpdate::Name("Ada Lovelace".to_string()));
        submission.apply(FieldUpdate::Minutes(1_500));

        assert_eq!(submission.name, "Ada Lovelace");
        assert_eq!(submission.minutes, 1_500);
        assert_eq!(submission.company_name, "");
    }

    #[test]
    fn updates_report_their_field_tag() {
        assert_eq!(FieldUpdate::Email(String::new()).field(), SubmissionField::Email);
        assert_eq!(SubmissionField::CompanyName.as_str(), "company_name");
    }
}
