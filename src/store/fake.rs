//! In-memory [`RecordStore`] fake for unit tests.
//!
//! Models the backend's own stage transitions so controller and view
//! tests can walk the whole pipeline without a network.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::StoreError;
use crate::record::{
    DocumentStatus, InterviewStatus, MailReply, MailStatus, OnboardingRecord, ProgressStep,
};

use super::{
    DocumentsReply, FileUpload, InterviewSchedule, PersonalFields, RecordStore, VerifyOutcome,
};

#[derive(Default)]
pub(crate) struct FakeStore {
    pub records: Mutex<Vec<OnboardingRecord>>,
    /// Operation log, one entry per store call.
    pub calls: Mutex<Vec<String>>,
    /// What `check_email` reports the candidate replied.
    pub email_reply: Mutex<Option<MailReply>>,
    /// What `check_documents_email` reports.
    pub documents_reply: Mutex<Option<DocumentsReply>>,
    /// When set, every operation fails with this protocol message.
    pub fail_with: Mutex<Option<String>>,
    next_id: AtomicU64,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, record: OnboardingRecord) -> String {
        let id = record.id.clone();
        self.records.lock().unwrap().push(record);
        id
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == op).count()
    }

    fn log(&self, op: &str) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(op.to_string());
        if let Some(message) = self.fail_with.lock().unwrap().clone() {
            return Err(StoreError::protocol(message));
        }
        Ok(())
    }

    fn mutate<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut OnboardingRecord) -> T,
    ) -> Result<T, StoreError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::protocol(format!("record {id} not found")))?;
        Ok(f(record))
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn list(&self, search: Option<&str>) -> Result<Vec<OnboardingRecord>, StoreError> {
        self.log("list")?;
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| match search {
                Some(q) => {
                    let q = q.to_lowercase();
                    r.full_name().to_lowercase().contains(&q)
                        || r.email.to_lowercase().contains(&q)
                }
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> Result<OnboardingRecord, StoreError> {
        self.log("get")?;
        self.mutate(id, |r| r.clone())
    }

    async fn create(&self, fields: &PersonalFields) -> Result<OnboardingRecord, StoreError> {
        self.log("create")?;
        let id = format!("rec-{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let record = OnboardingRecord {
            id,
            firstname: fields.firstname.clone(),
            lastname: fields.lastname.clone(),
            email: fields.email.clone(),
            contact: fields.contact.clone(),
            address: fields.address.clone(),
            department: fields.department.clone(),
            designation: fields.designation.clone(),
            progress_step: ProgressStep::SchedulingInterview,
            created_at: Some(chrono::Utc::now()),
            ..Default::default()
        };
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update_personal(
        &self,
        id: &str,
        fields: &PersonalFields,
    ) -> Result<OnboardingRecord, StoreError> {
        self.log("update_personal")?;
        self.mutate(id, |r| {
            r.firstname = fields.firstname.clone();
            r.lastname = fields.lastname.clone();
            r.email = fields.email.clone();
            r.contact = fields.contact.clone();
            r.address = fields.address.clone();
            r.department = fields.department.clone();
            r.designation = fields.designation.clone();
            r.clone()
        })
    }

    async fn schedule_interview(
        &self,
        id: &str,
        schedule: &InterviewSchedule,
    ) -> Result<(), StoreError> {
        self.log("schedule_interview")?;
        self.mutate(id, |r| {
            r.interview_date = Some(schedule.interview_date.clone());
            r.interview_time = Some(schedule.interview_time.clone());
            r.meet_link = schedule.meet_link.clone();
            r.mail_status = MailStatus::Sent;
            r.progress_step = ProgressStep::SchedulingInterview;
        })
    }

    async fn finalize_interview_and_send_mail(
        &self,
        id: &str,
        status: InterviewStatus,
    ) -> Result<(), StoreError> {
        self.log("finalize_interview")?;
        self.mutate(id, |r| {
            r.interview_status = status;
            if status == InterviewStatus::Passed {
                r.mail_status = MailStatus::Sent;
                r.mail_reply = MailReply::Pending;
                r.progress_step = ProgressStep::OfferAcceptance;
            }
        })
    }

    async fn set_mail_reply(&self, id: &str, reply: MailReply) -> Result<(), StoreError> {
        self.log("set_mail_reply")?;
        self.mutate(id, |r| r.mail_reply = reply)
    }

    async fn check_email(&self, id: &str) -> Result<Option<MailReply>, StoreError> {
        self.log("check_email")?;
        self.mutate(id, |_| ())?;
        Ok(*self.email_reply.lock().unwrap())
    }

    async fn upload_documents(&self, id: &str, files: Vec<FileUpload>) -> Result<(), StoreError> {
        self.log("upload_documents")?;
        self.mutate(id, |r| {
            r.document_urls = files
                .iter()
                .map(|f| format!("https://files.local/{id}/{}", f.file_name))
                .collect();
        })
    }

    async fn delete_documents(&self, id: &str) -> Result<(), StoreError> {
        self.log("delete_documents")?;
        self.mutate(id, |r| r.document_urls.clear())
    }

    async fn send_policy_letter(
        &self,
        id: &str,
        doj: NaiveDate,
        _files: Vec<FileUpload>,
    ) -> Result<(), StoreError> {
        self.log("send_policy_letter")?;
        self.mutate(id, |r| {
            r.doj = Some(doj);
            r.progress_step = ProgressStep::Onboarding;
        })
    }

    async fn verify_and_create_employee(&self, id: &str) -> Result<VerifyOutcome, StoreError> {
        self.log("verify_and_create_employee")?;
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.mutate(id, |r| {
            if r.is_employee() {
                VerifyOutcome {
                    already_exists: true,
                    message: Some("Employee already exists".to_string()),
                }
            } else {
                r.employee_id = Some(format!("EMP-{n}"));
                r.converted_to_master = true;
                r.progress_step = ProgressStep::PhysicalDocumentVerification;
                VerifyOutcome {
                    already_exists: false,
                    message: None,
                }
            }
        })
    }

    async fn set_document_status(
        &self,
        id: &str,
        status: DocumentStatus,
    ) -> Result<(), StoreError> {
        self.log("set_document_status")?;
        self.mutate(id, |r| {
            r.document_status = status;
            r.progress_step = if status == DocumentStatus::Verified {
                ProgressStep::Completed
            } else {
                ProgressStep::PhysicalDocumentVerification
            };
        })
    }

    async fn send_documents_mail(&self, id: &str) -> Result<Option<String>, StoreError> {
        self.log("send_documents_mail")?;
        self.mutate(id, |_| ())?;
        Ok(Some("Documents mail sent".to_string()))
    }

    async fn check_documents_email(
        &self,
        id: &str,
    ) -> Result<Option<DocumentsReply>, StoreError> {
        self.log("check_documents_email")?;
        self.mutate(id, |_| ())?;
        Ok(*self.documents_reply.lock().unwrap())
    }

    async fn delete_record(&self, id: &str) -> Result<(), StoreError> {
        self.log("delete_record")?;
        let mut records = self.records.lock().unwrap();
        records.retain(|r| r.id != id);
        Ok(())
    }
}
