//! Reqwest-backed [`RecordStore`] speaking the backend's `/onboarding`
//! HTTP contract.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::config::ConsoleConfig;
use crate::error::StoreError;
use crate::record::{DocumentStatus, InterviewStatus, MailReply, OnboardingRecord};

use super::{
    DocumentsReply, FileUpload, InterviewSchedule, PersonalFields, RecordStore, VerifyOutcome,
};

/// HTTP client for the onboarding backend.
pub struct HttpRecordStore {
    http: reqwest::Client,
    base: String,
}

impl HttpRecordStore {
    pub fn new(config: &ConsoleConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/onboarding{path}", self.base)
    }

    /// Send a request, apply the shared envelope rules, return the body.
    ///
    /// Non-2xx with a decodable `message` surfaces that message verbatim;
    /// non-2xx without one is a bare server error. A 2xx body carrying
    /// `success: false` is treated the same as a backend message.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, StoreError> {
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let body: Option<Value> = serde_json::from_slice(&bytes).ok();

        if !status.is_success() {
            if let Some(message) = body
                .as_ref()
                .and_then(|b| b.get("message"))
                .and_then(Value::as_str)
            {
                return Err(StoreError::protocol(message));
            }
            return Err(StoreError::Server {
                status: status.as_u16(),
            });
        }

        let body = body.ok_or_else(|| StoreError::Decode("response body is not JSON".into()))?;
        if body.get("success").and_then(Value::as_bool) == Some(false) {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("request failed");
            return Err(StoreError::protocol(message));
        }
        Ok(body)
    }

    fn decode_record(mut body: Value) -> Result<OnboardingRecord, StoreError> {
        let record = body
            .get_mut("record")
            .map(Value::take)
            .ok_or_else(|| StoreError::Decode("missing `record` in response".into()))?;
        serde_json::from_value(record).map_err(|e| StoreError::Decode(e.to_string()))
    }

    fn multipart_form(field: &str, files: Vec<FileUpload>) -> Result<Form, StoreError> {
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes)
                .file_name(file.file_name.clone())
                .mime_str(&file.content_type)
                .map_err(|_| {
                    StoreError::validation(format!(
                        "invalid content type {:?} for {}",
                        file.content_type, file.file_name
                    ))
                })?;
            form = form.part(field.to_string(), part);
        }
        Ok(form)
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn list(&self, search: Option<&str>) -> Result<Vec<OnboardingRecord>, StoreError> {
        let mut request = self.http.get(self.url(""));
        if let Some(q) = search.map(str::trim).filter(|q| !q.is_empty()) {
            request = request.query(&[("search", q)]);
        }
        let mut body = self.send(request).await?;
        let records = body
            .get_mut("records")
            .map(Value::take)
            .ok_or_else(|| StoreError::Decode("missing `records` in response".into()))?;
        serde_json::from_value(records).map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn get(&self, id: &str) -> Result<OnboardingRecord, StoreError> {
        let body = self.send(self.http.get(self.url(&format!("/{id}")))).await?;
        Self::decode_record(body)
    }

    async fn create(&self, fields: &PersonalFields) -> Result<OnboardingRecord, StoreError> {
        if !fields.is_complete() {
            return Err(StoreError::validation("all personal fields are required"));
        }
        let body = self.send(self.http.post(self.url("")).json(fields)).await?;
        Self::decode_record(body)
    }

    async fn update_personal(
        &self,
        id: &str,
        fields: &PersonalFields,
    ) -> Result<OnboardingRecord, StoreError> {
        if !fields.is_complete() {
            return Err(StoreError::validation("all personal fields are required"));
        }
        let body = self
            .send(self.http.put(self.url(&format!("/{id}"))).json(fields))
            .await?;
        Self::decode_record(body)
    }

    async fn schedule_interview(
        &self,
        id: &str,
        schedule: &InterviewSchedule,
    ) -> Result<(), StoreError> {
        if schedule.interview_date.trim().is_empty() || schedule.interview_time.trim().is_empty() {
            return Err(StoreError::validation("interview date and time are required"));
        }
        self.send(
            self.http
                .post(self.url(&format!("/{id}/schedule-interview")))
                .json(schedule),
        )
        .await?;
        Ok(())
    }

    async fn finalize_interview_and_send_mail(
        &self,
        id: &str,
        status: InterviewStatus,
    ) -> Result<(), StoreError> {
        if status == InterviewStatus::Pending {
            return Err(StoreError::validation("select an interview result first"));
        }
        self.send(
            self.http
                .post(self.url(&format!("/{id}/update-result-send-mail")))
                .json(&serde_json::json!({ "interview_status": status })),
        )
        .await?;
        Ok(())
    }

    async fn set_mail_reply(&self, id: &str, reply: MailReply) -> Result<(), StoreError> {
        if !reply.is_terminal() {
            return Err(StoreError::validation("mail reply must be Yes or No"));
        }
        self.send(
            self.http
                .put(self.url(&format!("/{id}/mail-reply")))
                .json(&serde_json::json!({ "mail_reply": reply })),
        )
        .await?;
        Ok(())
    }

    async fn check_email(&self, id: &str) -> Result<Option<MailReply>, StoreError> {
        let body = self
            .send(self.http.get(self.url(&format!("/{id}/check-email"))))
            .await?;
        Ok(
            match body.get("reply").and_then(Value::as_str).map(str::trim) {
                Some("Yes") => Some(MailReply::Yes),
                Some("No") => Some(MailReply::No),
                _ => None,
            },
        )
    }

    async fn upload_documents(&self, id: &str, files: Vec<FileUpload>) -> Result<(), StoreError> {
        if files.is_empty() {
            return Err(StoreError::validation("no documents selected"));
        }
        let form = Self::multipart_form("documents", files)?;
        self.send(
            self.http
                .post(self.url(&format!("/{id}/documents")))
                .multipart(form),
        )
        .await?;
        Ok(())
    }

    async fn delete_documents(&self, id: &str) -> Result<(), StoreError> {
        self.send(self.http.delete(self.url(&format!("/{id}/documents"))))
            .await?;
        Ok(())
    }

    async fn send_policy_letter(
        &self,
        id: &str,
        doj: NaiveDate,
        files: Vec<FileUpload>,
    ) -> Result<(), StoreError> {
        if files.is_empty() {
            return Err(StoreError::validation("no policy attachments selected"));
        }
        let form =
            Self::multipart_form("attachments", files)?.text("doj", doj.format("%Y-%m-%d").to_string());
        self.send(
            self.http
                .post(self.url(&format!("/{id}/policy-letter-upload")))
                .multipart(form),
        )
        .await?;
        Ok(())
    }

    async fn verify_and_create_employee(&self, id: &str) -> Result<VerifyOutcome, StoreError> {
        let body = self
            .send(self.http.put(self.url(&format!("/{id}/verify"))))
            .await?;
        Ok(VerifyOutcome {
            already_exists: body
                .get("already_exists")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            message: body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    async fn set_document_status(
        &self,
        id: &str,
        status: DocumentStatus,
    ) -> Result<(), StoreError> {
        self.send(
            self.http
                .put(self.url(&format!("/{id}/document-status")))
                .json(&serde_json::json!({ "document_status": status })),
        )
        .await?;
        Ok(())
    }

    async fn send_documents_mail(&self, id: &str) -> Result<Option<String>, StoreError> {
        let body = self
            .send(
                self.http
                    .post(self.url(&format!("/{id}/send-documents-mail"))),
            )
            .await?;
        Ok(body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    async fn check_documents_email(
        &self,
        id: &str,
    ) -> Result<Option<DocumentsReply>, StoreError> {
        let body = self
            .send(
                self.http
                    .get(self.url(&format!("/{id}/check-documents-email"))),
            )
            .await?;
        Ok(
            match body.get("reply").and_then(Value::as_str).map(str::trim) {
                Some("YesSent") => Some(DocumentsReply::YesSent),
                Some("Yes") => Some(DocumentsReply::Yes),
                _ => None,
            },
        )
    }

    async fn delete_record(&self, id: &str) -> Result<(), StoreError> {
        self.send(self.http.delete(self.url(&format!("/{id}"))))
            .await?;
        Ok(())
    }
}
