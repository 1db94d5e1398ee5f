//! The `OnboardingRecord` aggregate as the backend serves it.
//!
//! The backend is permissive about absent fields and legacy spellings, so
//! every enum here decodes from its wire string with an explicit fallback
//! instead of failing the whole record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::{Deserializer, Error as DeError};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Pipeline position of a record.
///
/// Progresses linearly: PersonalInformation → SchedulingInterview →
/// OfferAcceptance → Onboarding → PhysicalDocumentVerification →
/// Completed. It only moves backward when a verified record's
/// `document_status` is reverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressStep {
    #[default]
    PersonalInformation,
    SchedulingInterview,
    OfferAcceptance,
    Onboarding,
    PhysicalDocumentVerification,
    Completed,
}

impl ProgressStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PersonalInformation => "Personal Information",
            Self::SchedulingInterview => "Scheduling Interview",
            Self::OfferAcceptance => "Offer Acceptance",
            Self::Onboarding => "Onboarding",
            Self::PhysicalDocumentVerification => "Physical Document Verification",
            Self::Completed => "Completed",
        }
    }

    /// Decode a wire string. `"Document Verification"` is a legacy
    /// spelling of the physical-verification step, accepted on read only;
    /// anything unrecognized falls back to the first step.
    fn from_wire(s: &str) -> Self {
        match s.trim() {
            "Personal Information" => Self::PersonalInformation,
            "Scheduling Interview" => Self::SchedulingInterview,
            "Offer Acceptance" => Self::OfferAcceptance,
            "Onboarding" => Self::Onboarding,
            "Physical Document Verification" | "Document Verification" => {
                Self::PhysicalDocumentVerification
            }
            "Completed" => Self::Completed,
            _ => Self::PersonalInformation,
        }
    }

    /// Stage number this step maps to, 1..=5. `Completed` belongs to the
    /// verification stage.
    pub fn stage(&self) -> u8 {
        match self {
            Self::PersonalInformation => 1,
            Self::SchedulingInterview => 2,
            Self::OfferAcceptance => 3,
            Self::Onboarding => 4,
            Self::PhysicalDocumentVerification | Self::Completed => 5,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for ProgressStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the stage-2 interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterviewStatus {
    #[default]
    Pending,
    Passed,
    Failed,
    DidNotShowUp,
}

impl InterviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Passed => "Passed",
            Self::Failed => "Failed",
            Self::DidNotShowUp => "Did Not Show Up",
        }
    }

    fn from_wire(s: &str) -> Self {
        match s.trim() {
            "Passed" => Self::Passed,
            "Failed" => Self::Failed,
            "Did Not Show Up" => Self::DidNotShowUp,
            _ => Self::Pending,
        }
    }
}

impl std::fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the backend has sent candidate mail for this record.
///
/// The backend overloads the single field: both the interview invite and
/// the offer mail set it to `Sent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MailStatus {
    #[default]
    Unset,
    Sent,
}

impl MailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::Sent => "Sent",
        }
    }

    fn from_wire(s: &str) -> Self {
        if s.trim() == "Sent" {
            Self::Sent
        } else {
            Self::Unset
        }
    }
}

/// The candidate's reply to the offer mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MailReply {
    #[default]
    Unset,
    Pending,
    Yes,
    No,
}

impl MailReply {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::Pending => "Pending",
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }

    fn from_wire(s: &str) -> Self {
        match s.trim() {
            "Pending" => Self::Pending,
            "Yes" => Self::Yes,
            "No" => Self::No,
            _ => Self::Unset,
        }
    }

    /// Yes or No; Pending/Unset are still awaiting the candidate.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Yes | Self::No)
    }
}

/// Operator verdict on the couriered physical documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentStatus {
    #[default]
    Pending,
    Verified,
    NotVerified,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Verified => "Verified",
            Self::NotVerified => "Not Verified",
        }
    }

    fn from_wire(s: &str) -> Self {
        match s.trim() {
            "Verified" => Self::Verified,
            "Not Verified" => Self::NotVerified,
            _ => Self::Pending,
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! wire_enum_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = Option::<String>::deserialize(deserializer)?;
                Ok(s.as_deref().map(Self::from_wire).unwrap_or_default())
            }
        }
    };
}

wire_enum_serde!(ProgressStep);
wire_enum_serde!(InterviewStatus);
wire_enum_serde!(MailStatus);
wire_enum_serde!(MailReply);
wire_enum_serde!(DocumentStatus);

/// A candidate's onboarding record, the single aggregate the console
/// works with. Created by the stage-1 submission; every later stage
/// mutates it through its own endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OnboardingRecord {
    /// Backend-assigned opaque id.
    #[serde(default, alias = "_id")]
    pub id: String,

    // Personal (stage 1). Empty string means not captured yet.
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub designation: String,

    // Interview (stage 2).
    #[serde(default, deserialize_with = "de_opt_string")]
    pub interview_date: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub interview_time: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub meet_link: Option<String>,
    #[serde(default)]
    pub interview_status: InterviewStatus,

    // Offer mail (stages 2–3).
    #[serde(default)]
    pub mail_status: MailStatus,
    #[serde(default)]
    pub mail_reply: MailReply,

    // Documents (stages 3–5).
    #[serde(default, deserialize_with = "de_document_urls")]
    pub document_urls: Vec<String>,
    #[serde(default)]
    pub document_status: DocumentStatus,

    // Onboarding (stage 4).
    #[serde(default, deserialize_with = "de_opt_date")]
    pub doj: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub converted_to_master: bool,

    #[serde(default)]
    pub progress_step: ProgressStep,

    // Audit timestamps.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub personal_updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub interview_updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub mail_updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub document_updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl OnboardingRecord {
    /// All seven personal fields captured.
    pub fn personal_complete(&self) -> bool {
        [
            &self.firstname,
            &self.lastname,
            &self.email,
            &self.contact,
            &self.address,
            &self.department,
            &self.designation,
        ]
        .iter()
        .all(|f| !f.trim().is_empty())
    }

    /// The decoded document URL sequence.
    pub fn documents(&self) -> &[String] {
        &self.document_urls
    }

    pub fn has_documents(&self) -> bool {
        !self.document_urls.is_empty()
    }

    pub fn mail_sent(&self) -> bool {
        self.mail_status == MailStatus::Sent
    }

    pub fn interview_scheduled(&self) -> bool {
        self.interview_date.is_some() && self.interview_time.is_some()
    }

    /// The candidate has been promoted to an employee, through either the
    /// master-conversion flag or an allocated employee id.
    pub fn is_employee(&self) -> bool {
        self.converted_to_master || self.employee_id.is_some()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname.trim(), self.lastname.trim())
            .trim()
            .to_string()
    }
}

fn de_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let v = Option::<String>::deserialize(d)?;
    Ok(v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

/// Date-of-joining arrives as `"YYYY-MM-DD"`, sometimes with a time
/// suffix, sometimes empty.
fn de_opt_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    let v = Option::<String>::deserialize(d)?;
    let Some(s) = v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let prefix = s.get(..10).unwrap_or(&s);
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| D::Error::custom(format!("invalid date {s:?}: {e}")))
}

/// `document_urls` is served either as a JSON array of URLs or as a
/// string holding the JSON-encoded array. Decode both to a sequence.
fn de_document_urls<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Seq(Vec<String>),
        Text(String),
    }

    match Option::<Wire>::deserialize(d)? {
        None => Ok(Vec::new()),
        Some(Wire::Seq(urls)) => Ok(urls),
        Some(Wire::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(Vec::new());
            }
            // An encoded array, or a single bare URL.
            match serde_json::from_str::<Vec<String>>(text) {
                Ok(urls) => Ok(urls),
                Err(_) => Ok(vec![text.to_string()]),
            }
        }
    }
}
