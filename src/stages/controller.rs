//! StageController: one action per transition of the onboarding state
//! machine. Each action validates its precondition, performs the store
//! call(s), and re-fetches the record only on the success path, so the
//! caller always renders backend truth.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::warn;

use crate::error::StoreError;
use crate::record::{DocumentStatus, InterviewStatus, MailReply, OnboardingRecord};
use crate::stages::eval;
use crate::store::{
    DocumentsReply, FileUpload, InterviewSchedule, PersonalFields, RecordStore, VerifyOutcome,
};

/// Drives the per-stage submit/upload/verify actions.
pub struct StageController {
    store: Arc<dyn RecordStore>,
}

impl StageController {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    async fn refresh(&self, id: &str) -> Result<OnboardingRecord, StoreError> {
        self.store.get(id).await
    }

    /// Stage 1: create a new record, or update the personal fields of an
    /// existing one. Creation advances the backend to stage 2; an edit
    /// leaves `progress_step` untouched.
    pub async fn submit_personal(
        &self,
        existing: Option<&OnboardingRecord>,
        fields: &PersonalFields,
    ) -> Result<OnboardingRecord, StoreError> {
        if !fields.is_complete() {
            return Err(StoreError::validation("all personal fields are required"));
        }
        match existing {
            Some(record) => self.store.update_personal(&record.id, fields).await,
            None => self.store.create(fields).await,
        }
    }

    /// Stage 2: persist the interview slot; the backend sends the invite.
    pub async fn schedule_interview(
        &self,
        record: &OnboardingRecord,
        schedule: &InterviewSchedule,
    ) -> Result<OnboardingRecord, StoreError> {
        if !eval::can_enter(2, record) {
            return Err(StoreError::validation("personal information is incomplete"));
        }
        self.store.schedule_interview(&record.id, schedule).await?;
        self.refresh(&record.id).await
    }

    /// Stage 2: record the interview result and let the backend send the
    /// matching mail (offer on Passed, rejection otherwise). The endpoint
    /// is atomic; on failure nothing advances here.
    pub async fn finalize_interview(
        &self,
        record: &OnboardingRecord,
        status: InterviewStatus,
    ) -> Result<OnboardingRecord, StoreError> {
        if !record.interview_scheduled() {
            return Err(StoreError::validation("schedule the interview first"));
        }
        self.store
            .finalize_interview_and_send_mail(&record.id, status)
            .await?;
        self.refresh(&record.id).await
    }

    /// Stage 3: one-shot check for an offer reply. A terminal reply is
    /// persisted before being returned.
    pub async fn check_reply(
        &self,
        record: &OnboardingRecord,
    ) -> Result<Option<MailReply>, StoreError> {
        if !record.mail_sent() {
            return Err(StoreError::validation("offer mail has not been sent"));
        }
        let reply = self.store.check_email(&record.id).await?;
        if let Some(reply) = reply.filter(MailReply::is_terminal) {
            self.store.set_mail_reply(&record.id, reply).await?;
            return Ok(Some(reply));
        }
        Ok(None)
    }

    /// Stage 3: replace the record's documents. The overwrite
    /// confirmation happens in the view before this is called.
    pub async fn upload_documents(
        &self,
        record: &OnboardingRecord,
        files: Vec<FileUpload>,
    ) -> Result<OnboardingRecord, StoreError> {
        if record.mail_reply != MailReply::Yes {
            return Err(StoreError::validation(
                "candidate has not accepted the offer",
            ));
        }
        if files.is_empty() {
            return Err(StoreError::validation("no documents selected"));
        }
        self.store.upload_documents(&record.id, files).await?;
        self.refresh(&record.id).await
    }

    /// Stage 3: clear the uploaded documents.
    pub async fn delete_documents(
        &self,
        record: &OnboardingRecord,
    ) -> Result<OnboardingRecord, StoreError> {
        if !record.has_documents() {
            return Err(StoreError::validation("no documents to delete"));
        }
        self.store.delete_documents(&record.id).await?;
        self.refresh(&record.id).await
    }

    /// Stage 4: persist the date of joining and send the policy letter.
    pub async fn send_policy_letter(
        &self,
        record: &OnboardingRecord,
        doj: NaiveDate,
        files: Vec<FileUpload>,
    ) -> Result<OnboardingRecord, StoreError> {
        if !record.has_documents() {
            return Err(StoreError::validation("upload documents before onboarding"));
        }
        if files.is_empty() {
            return Err(StoreError::validation("no policy attachments selected"));
        }
        self.store.send_policy_letter(&record.id, doj, files).await?;
        self.refresh(&record.id).await
    }

    /// Stage 4: promote the candidate to an employee. A repeat call is
    /// answered with `already_exists` and must not be treated as a
    /// failure.
    pub async fn verify_employee(
        &self,
        record: &OnboardingRecord,
    ) -> Result<(VerifyOutcome, OnboardingRecord), StoreError> {
        if !record.has_documents() || record.doj.is_none() {
            return Err(StoreError::validation(
                "documents and a date of joining are required",
            ));
        }
        let outcome = self.store.verify_and_create_employee(&record.id).await?;
        if outcome.already_exists {
            warn!(record_id = %record.id, "verify called on an existing employee");
        }
        let record = self.refresh(&record.id).await?;
        Ok((outcome, record))
    }

    /// Stage 5: ask the candidate to courier the physical documents.
    pub async fn send_documents_mail(
        &self,
        record: &OnboardingRecord,
    ) -> Result<Option<String>, StoreError> {
        if !eval::can_enter(5, record) {
            return Err(StoreError::validation("record has not reached verification"));
        }
        self.store.send_documents_mail(&record.id).await
    }

    /// Stage 5: one-shot check for the documents-mailed confirmation.
    pub async fn check_documents_mail(
        &self,
        record: &OnboardingRecord,
    ) -> Result<Option<DocumentsReply>, StoreError> {
        if !eval::can_enter(5, record) {
            return Err(StoreError::validation("record has not reached verification"));
        }
        self.store.check_documents_email(&record.id).await
    }

    /// Stage 5: persist the verification verdict. Verified completes the
    /// pipeline; leaving Verified drops the record back to the
    /// verification step.
    pub async fn save_verification(
        &self,
        record: &OnboardingRecord,
        status: DocumentStatus,
    ) -> Result<OnboardingRecord, StoreError> {
        if !eval::can_enter(5, record) {
            return Err(StoreError::validation("record has not reached verification"));
        }
        self.store.set_document_status(&record.id, status).await?;
        self.refresh(&record.id).await
    }
}
