//! Record persistence boundary: a single async trait over the backend's
//! onboarding HTTP contract, plus the request/outcome types it speaks.
//!
//! The trait exists so the controller, poller, and view layer can be
//! exercised against an in-memory fake; production wiring uses
//! [`HttpRecordStore`].

#[cfg(test)]
pub(crate) mod fake;
mod http;

pub use http::HttpRecordStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use crate::error::StoreError;
use crate::record::{DocumentStatus, InterviewStatus, MailReply, OnboardingRecord};

/// The seven stage-1 personal fields.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PersonalFields {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub contact: String,
    pub address: String,
    pub department: String,
    pub designation: String,
}

impl PersonalFields {
    pub fn is_complete(&self) -> bool {
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
}

/// Stage-2 interview slot.
#[derive(Debug, Clone, Serialize)]
pub struct InterviewSchedule {
    pub interview_date: String,
    pub interview_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meet_link: Option<String>,
}

/// A file selected by the operator for a multipart upload.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// Outcome of the stage-4 verify-and-create-employee call.
///
/// `already_exists` is informational: the employee was created by an
/// earlier invocation and the backend did not duplicate it.
#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    pub already_exists: bool,
    pub message: Option<String>,
}

/// Candidate's reply to the stage-5 physical-documents mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentsReply {
    Yes,
    YesSent,
}

/// Typed CRUD over candidate onboarding records.
///
/// Operations fail with a [`StoreError`]; no operation retries, recovery
/// is the caller's. `Validation` errors are raised before any request
/// goes out.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// List records, optionally filtered by a search query.
    async fn list(&self, search: Option<&str>) -> Result<Vec<OnboardingRecord>, StoreError>;

    /// Fetch a single record by id.
    async fn get(&self, id: &str) -> Result<OnboardingRecord, StoreError>;

    /// Create a record from the stage-1 personal fields.
    async fn create(&self, fields: &PersonalFields) -> Result<OnboardingRecord, StoreError>;

    /// Update the personal fields of an existing record.
    async fn update_personal(
        &self,
        id: &str,
        fields: &PersonalFields,
    ) -> Result<OnboardingRecord, StoreError>;

    /// Persist the interview slot and send the invite mail.
    async fn schedule_interview(
        &self,
        id: &str,
        schedule: &InterviewSchedule,
    ) -> Result<(), StoreError>;

    /// Record the interview result and send the matching mail (offer or
    /// rejection). The backend performs both atomically.
    async fn finalize_interview_and_send_mail(
        &self,
        id: &str,
        status: InterviewStatus,
    ) -> Result<(), StoreError>;

    /// Persist the candidate's offer reply.
    async fn set_mail_reply(&self, id: &str, reply: MailReply) -> Result<(), StoreError>;

    /// Ask the backend whether the candidate has replied to the offer.
    async fn check_email(&self, id: &str) -> Result<Option<MailReply>, StoreError>;

    /// Replace the record's documents with the uploaded files.
    async fn upload_documents(&self, id: &str, files: Vec<FileUpload>) -> Result<(), StoreError>;

    /// Clear the record's documents.
    async fn delete_documents(&self, id: &str) -> Result<(), StoreError>;

    /// Persist the date of joining and send the policy letter with the
    /// given attachments.
    async fn send_policy_letter(
        &self,
        id: &str,
        doj: NaiveDate,
        files: Vec<FileUpload>,
    ) -> Result<(), StoreError>;

    /// Promote the candidate to an employee. Idempotent on the backend.
    async fn verify_and_create_employee(&self, id: &str) -> Result<VerifyOutcome, StoreError>;

    /// Persist the stage-5 physical-document verdict.
    async fn set_document_status(&self, id: &str, status: DocumentStatus)
    -> Result<(), StoreError>;

    /// Ask the candidate to courier their physical documents.
    async fn send_documents_mail(&self, id: &str) -> Result<Option<String>, StoreError>;

    /// Ask the backend whether the candidate confirmed sending documents.
    async fn check_documents_email(&self, id: &str)
    -> Result<Option<DocumentsReply>, StoreError>;

    /// Delete a record (list-view bulk deletion).
    async fn delete_record(&self, id: &str) -> Result<(), StoreError>;
}
