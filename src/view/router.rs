//! View router: turns record state into typed views, owns navigation,
//! and wraps every stage action so errors surface as toasts and the view
//! stays put.
//!
//! Navigation is always by record id. What the operator sees is always
//! derived from the most recently fetched record, never from a client
//! guess; action handlers re-render from the record the controller
//! re-fetched on success.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use crate::config::ConsoleConfig;
use crate::error::{StoreError, ViewError};
use crate::poller::{PollEvent, spawn_reply_poller};
use crate::record::{
    DocumentStatus, InterviewStatus, MailReply, OnboardingRecord,
};
use crate::stages::eval::{self, StageStatus};
use crate::stages::{STAGE_COUNT, StageController};
use crate::store::{DocumentsReply, FileUpload, InterviewSchedule, PersonalFields, RecordStore};

use super::list::ListState;
use super::session::{OperatorContext, SessionState};
use super::shell::Shell;
use super::toast::Toast;

const STAGE_TITLES: [&str; 5] = [
    "Personal Information",
    "Scheduling Interview",
    "Offer Acceptance",
    "Onboarding",
    "Physical Document Verification",
];

/// What the host shell is asked to draw.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum View {
    /// Operator's role is not elevated; nothing else is shown.
    Denied,
    List(ListView),
    Detail(DetailView),
    Stage(StageView),
}

#[derive(Debug, Clone, Serialize)]
pub struct ListRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub stage: u8,
    pub progress_percent: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListView {
    pub query: String,
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
    pub rows: Vec<ListRow>,
    pub selected: Vec<String>,
}

/// One step of the clickable progress stepper.
#[derive(Debug, Clone, Serialize)]
pub struct StepperStep {
    pub stage: u8,
    pub title: &'static str,
    pub status: StageStatus,
    pub percent: u8,
    pub accessible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailView {
    pub record_id: String,
    pub name: String,
    pub current_stage: u8,
    pub progress_percent: u8,
    pub stepper: Vec<StepperStep>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageView {
    pub record_id: Option<String>,
    pub stage: u8,
    pub stepper: Vec<StepperStep>,
    pub panel: StagePanel,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum StagePanel {
    PersonalSummary {
        fields: PersonalFields,
    },
    PersonalForm {
        existing: bool,
        fields: PersonalFields,
    },
    Interview {
        scheduled: bool,
        interview_date: Option<String>,
        interview_time: Option<String>,
        meet_link: Option<String>,
        interview_status: InterviewStatus,
    },
    Offer {
        mail_reply: MailReply,
        documents: Vec<String>,
        upload_enabled: bool,
        polling: bool,
    },
    Onboarding {
        documents: Vec<String>,
        doj: Option<NaiveDate>,
        employee_id: Option<String>,
        converted_to_master: bool,
    },
    Verification {
        document_status: DocumentStatus,
        select_enabled: bool,
    },
}

/// The onboarding module's top-level coordinator, one per mount.
pub struct ViewRouter {
    controller: StageController,
    store: Arc<dyn RecordStore>,
    shell: Arc<dyn Shell>,
    operator: OperatorContext,
    config: ConsoleConfig,
    pub session: SessionState,
    stage_open: Option<u8>,
    poll_tx: mpsc::UnboundedSender<PollEvent>,
    poll_rx: mpsc::UnboundedReceiver<PollEvent>,
}

impl ViewRouter {
    pub fn new(
        store: Arc<dyn RecordStore>,
        shell: Arc<dyn Shell>,
        operator: OperatorContext,
        config: ConsoleConfig,
    ) -> Self {
        let (poll_tx, poll_rx) = mpsc::unbounded_channel();
        let mut session = SessionState::new(config.page_size);
        session.list = ListState::with_debounce(config.page_size, config.search_debounce);
        Self {
            controller: StageController::new(Arc::clone(&store)),
            store,
            shell,
            operator,
            config,
            session,
            stage_open: None,
            poll_tx,
            poll_rx,
        }
    }

    pub fn current_record(&self) -> Option<&OnboardingRecord> {
        self.session.current.as_ref()
    }

    pub fn open_stage_number(&self) -> Option<u8> {
        self.stage_open
    }

    /// Stop the poller and drop all session state. Call on unmount.
    pub fn unmount(&mut self) {
        self.stop_poller();
        self.stage_open = None;
        self.session.close_record();
        self.session.list.reset();
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Show the record list for the current query/page.
    pub async fn open_list(&mut self) {
        if !self.ensure_elevated() {
            return;
        }
        self.stop_poller();
        self.stage_open = None;
        self.session.close_record();
        let query = self.session.list.query.clone();
        let query = Some(query.as_str()).filter(|q| !q.trim().is_empty());
        match self.store.list(query).await {
            Ok(records) => self.render_list(records),
            Err(e) => self.report(&e),
        }
    }

    /// Record a search keystroke; queries only once the input settles.
    pub async fn search_input(&mut self, query: &str) {
        if !self.ensure_elevated() {
            return;
        }
        self.session.list.query = query.to_string();
        self.session.list.reset();
        if self.session.list.debouncer.settle().await {
            self.open_list().await;
        }
    }

    pub async fn next_page(&mut self) {
        if !self.ensure_elevated() {
            return;
        }
        let query = self.session.list.query.clone();
        let query = Some(query.as_str()).filter(|q| !q.trim().is_empty());
        match self.store.list(query).await {
            Ok(records) => {
                self.session.list.next_page(records.len());
                self.render_list(records);
            }
            Err(e) => self.report(&e),
        }
    }

    pub async fn prev_page(&mut self) {
        if !self.ensure_elevated() {
            return;
        }
        self.session.list.prev_page();
        self.open_list().await;
    }

    /// Open the detail modal for a record.
    pub async fn open_detail(&mut self, id: &str) {
        if !self.ensure_elevated() {
            return;
        }
        self.stop_poller();
        self.stage_open = None;
        match self.store.get(id).await {
            Ok(record) => {
                let view = View::Detail(self.detail_view(&record));
                self.session.current = Some(record);
                self.session.editing_personal = false;
                self.session.verification_unlocked = false;
                self.shell.render(&view);
            }
            Err(e) => self.report(&e),
        }
    }

    /// Start capturing a brand-new candidate (stage-1 form, no record).
    pub fn open_new(&mut self) {
        if !self.ensure_elevated() {
            return;
        }
        self.stop_poller();
        self.session.close_record();
        self.stage_open = Some(1);
        let view = View::Stage(StageView {
            record_id: None,
            stage: 1,
            stepper: Vec::new(),
            panel: StagePanel::PersonalForm {
                existing: false,
                fields: PersonalFields::default(),
            },
        });
        self.shell.render(&view);
    }

    /// Jump to a stage of the open record. The access gate is checked
    /// against the last-fetched record before any request goes out; a
    /// locked stage costs no network call. The returned error mirrors
    /// the toast for hosts that want to inspect the outcome.
    pub async fn open_stage(&mut self, stage: u8) -> Result<(), ViewError> {
        if !self.ensure_elevated() {
            return Err(ViewError::AccessDenied);
        }
        let Some(record) = self.session.current.clone() else {
            self.shell.toast(Toast::warning("Open a record first"));
            return Err(ViewError::NoCurrentRecord);
        };
        if !(1..=STAGE_COUNT).contains(&stage) || !eval::can_enter(stage, &record) {
            debug!(record_id = %record.id, stage, "stage gate rejected navigation");
            self.shell
                .toast(Toast::warning(format!("Stage {stage} is locked")));
            return Err(ViewError::StageGated {
                stage,
                record_id: record.id,
            });
        }
        match self.store.get(&record.id).await {
            Ok(fresh) => {
                self.session.current = Some(fresh.clone());
                self.enter_stage(stage, &fresh);
                Ok(())
            }
            Err(e) => {
                self.report(&e);
                Err(e.into())
            }
        }
    }

    /// Flip stage 1 between summary and edit form.
    pub fn toggle_personal_edit(&mut self) {
        self.session.editing_personal = !self.session.editing_personal;
        if self.stage_open == Some(1) {
            if let Some(record) = self.session.current.clone() {
                self.render_stage(1, &record);
            }
        }
    }

    // ── Stage actions ───────────────────────────────────────────────

    /// Stage 1 submit: create a new record or save an edit. Creation
    /// moves straight into stage 2.
    pub async fn submit_personal(&mut self, fields: PersonalFields) {
        if !self.ensure_elevated() {
            return;
        }
        let existing = self.session.current.clone();
        match self
            .controller
            .submit_personal(existing.as_ref(), &fields)
            .await
        {
            Ok(record) => {
                let created = existing.is_none();
                self.session.editing_personal = false;
                self.session.current = Some(record.clone());
                if created {
                    self.shell.toast(Toast::success("Candidate created"));
                    self.enter_stage(2, &record);
                } else {
                    self.shell.toast(Toast::success("Personal details updated"));
                    self.enter_stage(1, &record);
                }
            }
            Err(e) => self.report(&e),
        }
    }

    pub async fn schedule_interview(&mut self, schedule: InterviewSchedule) {
        let Some(record) = self.require_record() else {
            return;
        };
        match self.controller.schedule_interview(&record, &schedule).await {
            Ok(record) => {
                self.session.current = Some(record.clone());
                self.shell
                    .toast(Toast::success("Interview scheduled, invite sent"));
                self.enter_stage(2, &record);
            }
            Err(e) => self.report(&e),
        }
    }

    /// Stage 2 finalize. On Passed, the offer is out and the view moves
    /// to stage 3; on Failed/No-show the rejection went out and the view
    /// stays on stage 2.
    pub async fn finalize_interview(&mut self, status: InterviewStatus) {
        let Some(record) = self.require_record() else {
            return;
        };
        match self.controller.finalize_interview(&record, status).await {
            Ok(record) => {
                self.session.current = Some(record.clone());
                if status == InterviewStatus::Passed {
                    self.shell.toast(Toast::success("Offer mail sent"));
                    self.enter_stage(3, &record);
                } else {
                    self.shell.toast(Toast::info("Rejection mail sent"));
                    self.enter_stage(2, &record);
                }
            }
            Err(e) => self.report(&e),
        }
    }

    /// Manual stage-3 reply check.
    pub async fn check_reply_now(&mut self) {
        let Some(record) = self.require_record() else {
            return;
        };
        match self.controller.check_reply(&record).await {
            Ok(Some(reply)) => {
                self.stop_poller();
                self.shell.toast(Toast::success(format!(
                    "Candidate replied {}",
                    reply.as_str()
                )));
                self.refresh_open_stage(&record.id).await;
            }
            Ok(None) => self.shell.toast(Toast::info("No reply yet")),
            Err(e) => self.report(&e),
        }
    }

    /// Stage 3 upload. Replaces any previous upload; the operator
    /// confirms before overwriting.
    pub async fn upload_documents(&mut self, files: Vec<FileUpload>) {
        let Some(record) = self.require_record() else {
            return;
        };
        if record.has_documents()
            && !self
                .shell
                .confirm("This replaces the previously uploaded documents. Continue?")
        {
            return;
        }
        match self.controller.upload_documents(&record, files).await {
            Ok(record) => {
                self.session.current = Some(record.clone());
                self.shell.toast(Toast::success(format!(
                    "{} document(s) uploaded",
                    record.documents().len()
                )));
                self.enter_stage(3, &record);
            }
            Err(e) => self.report(&e),
        }
    }

    pub async fn delete_documents(&mut self) {
        let Some(record) = self.require_record() else {
            return;
        };
        if !self.shell.confirm("Delete all uploaded documents?") {
            return;
        }
        match self.controller.delete_documents(&record).await {
            Ok(record) => {
                self.session.current = Some(record.clone());
                self.shell.toast(Toast::success("Documents deleted"));
                self.enter_stage(3, &record);
            }
            Err(e) => self.report(&e),
        }
    }

    pub async fn send_policy_letter(&mut self, doj: NaiveDate, files: Vec<FileUpload>) {
        let Some(record) = self.require_record() else {
            return;
        };
        match self.controller.send_policy_letter(&record, doj, files).await {
            Ok(record) => {
                self.session.current = Some(record.clone());
                self.shell.toast(Toast::success("Policy letter sent"));
                self.enter_stage(4, &record);
            }
            Err(e) => self.report(&e),
        }
    }

    /// Stage 4 verify. A duplicate is informational, not an error.
    pub async fn verify_employee(&mut self) {
        let Some(record) = self.require_record() else {
            return;
        };
        match self.controller.verify_employee(&record).await {
            Ok((outcome, record)) => {
                self.session.current = Some(record.clone());
                if outcome.already_exists {
                    let message = outcome
                        .message
                        .unwrap_or_else(|| "Employee already exists".to_string());
                    self.shell.toast(Toast::info(message));
                } else {
                    self.shell.toast(Toast::success("Employee created"));
                }
                self.enter_stage(4, &record);
            }
            Err(e) => self.report(&e),
        }
    }

    pub async fn send_documents_mail(&mut self) {
        let Some(record) = self.require_record() else {
            return;
        };
        match self.controller.send_documents_mail(&record).await {
            Ok(message) => self.shell.toast(Toast::success(
                message.unwrap_or_else(|| "Documents mail sent".to_string()),
            )),
            Err(e) => self.report(&e),
        }
    }

    /// Stage 5 manual confirmation check. An affirmative reply unlocks
    /// the verification select for this session.
    pub async fn check_documents_mail(&mut self) {
        let Some(record) = self.require_record() else {
            return;
        };
        match self.controller.check_documents_mail(&record).await {
            Ok(Some(reply)) => {
                debug_assert!(matches!(
                    reply,
                    DocumentsReply::Yes | DocumentsReply::YesSent
                ));
                self.session.verification_unlocked = true;
                self.shell
                    .toast(Toast::success("Candidate confirmed sending documents"));
                if self.stage_open == Some(5) {
                    self.render_stage(5, &record);
                }
            }
            Ok(None) => self.shell.toast(Toast::info("No confirmation yet")),
            Err(e) => self.report(&e),
        }
    }

    pub async fn save_verification(&mut self, status: DocumentStatus) {
        let Some(record) = self.require_record() else {
            return;
        };
        if !self.verification_select_enabled(&record) {
            self.shell.toast(Toast::warning(
                "Verification is locked until the candidate confirms sending documents",
            ));
            return;
        }
        match self.controller.save_verification(&record, status).await {
            Ok(record) => {
                self.session.current = Some(record.clone());
                if record.progress_step.is_terminal() {
                    self.shell.toast(Toast::success("Onboarding completed"));
                } else {
                    self.shell.toast(Toast::success("Verification saved"));
                }
                self.enter_stage(5, &record);
            }
            Err(e) => self.report(&e),
        }
    }

    /// Bulk-delete the selected list rows.
    pub async fn delete_selected(&mut self) {
        if !self.ensure_elevated() {
            return;
        }
        let ids: Vec<String> = self.session.list.selected.iter().cloned().collect();
        if ids.is_empty() {
            self.shell.toast(Toast::info("Nothing selected"));
            return;
        }
        if !self
            .shell
            .confirm(&format!("Delete {} record(s)?", ids.len()))
        {
            return;
        }
        let mut deleted = 0usize;
        for id in &ids {
            match self.store.delete_record(id).await {
                Ok(()) => deleted += 1,
                Err(e) => self.report(&e),
            }
        }
        self.session.list.clear_selection();
        if deleted > 0 {
            self.shell
                .toast(Toast::success(format!("Deleted {deleted} record(s)")));
        }
        self.open_list().await;
    }

    // ── Poller plumbing ─────────────────────────────────────────────

    /// Drain poller events: persist already happened in the poller, so
    /// this re-fetches and re-renders stage 3 if it is open.
    pub async fn pump_poll_events(&mut self) {
        while let Ok(event) = self.poll_rx.try_recv() {
            let PollEvent::ReplyReceived(reply) = event;
            self.stop_poller();
            self.shell.toast(Toast::success(format!(
                "Candidate replied {}",
                reply.as_str()
            )));
            if self.stage_open == Some(3) {
                if let Some(record) = self.session.current.clone() {
                    self.refresh_open_stage(&record.id).await;
                }
            }
        }
    }

    fn stop_poller(&mut self) {
        if let Some(poller) = self.session.poller.take() {
            poller.stop();
        }
    }

    fn manage_poller(&mut self, stage: u8, record: &OnboardingRecord) {
        self.stop_poller();
        if stage == 3 && record.mail_sent() && !record.mail_reply.is_terminal() {
            self.session.poller = Some(spawn_reply_poller(
                Arc::clone(&self.store),
                record.id.clone(),
                self.config.poll_interval,
                self.poll_tx.clone(),
            ));
        }
    }

    // ── Rendering ───────────────────────────────────────────────────

    fn ensure_elevated(&self) -> bool {
        if self.operator.is_elevated() {
            return true;
        }
        self.shell.render(&View::Denied);
        false
    }

    fn require_record(&mut self) -> Option<OnboardingRecord> {
        if !self.ensure_elevated() {
            return None;
        }
        let record = self.session.current.clone();
        if record.is_none() {
            self.shell.toast(Toast::warning("Open a record first"));
        }
        record
    }

    async fn refresh_open_stage(&mut self, id: &str) {
        match self.store.get(id).await {
            Ok(fresh) => {
                self.session.current = Some(fresh.clone());
                if let Some(stage) = self.stage_open {
                    self.render_stage(stage, &fresh);
                }
            }
            Err(e) => self.report(&e),
        }
    }

    fn enter_stage(&mut self, stage: u8, record: &OnboardingRecord) {
        self.stage_open = Some(stage);
        self.manage_poller(stage, record);
        self.render_stage(stage, record);
    }

    fn render_list(&mut self, records: Vec<OnboardingRecord>) {
        let total = records.len();
        let page_count = self.session.list.page_count(total);
        let rows = self
            .session
            .list
            .page_items(&records)
            .iter()
            .map(|r| {
                let stage = eval::stage_number(r);
                ListRow {
                    id: r.id.clone(),
                    name: r.full_name(),
                    email: r.email.clone(),
                    department: r.department.clone(),
                    stage,
                    progress_percent: eval::progress_percent(stage),
                }
            })
            .collect();
        let mut selected: Vec<String> = self.session.list.selected.iter().cloned().collect();
        selected.sort();
        let view = View::List(ListView {
            query: self.session.list.query.clone(),
            page: self.session.list.page,
            page_count,
            total,
            rows,
            selected,
        });
        self.shell.render(&view);
    }

    fn detail_view(&self, record: &OnboardingRecord) -> DetailView {
        let current = eval::stage_number(record);
        DetailView {
            record_id: record.id.clone(),
            name: record.full_name(),
            current_stage: current,
            progress_percent: eval::progress_percent(current),
            stepper: self.stepper(record),
        }
    }

    fn stepper(&self, record: &OnboardingRecord) -> Vec<StepperStep> {
        (1..=STAGE_COUNT)
            .map(|stage| StepperStep {
                stage,
                title: STAGE_TITLES[usize::from(stage) - 1],
                status: eval::stage_status(stage, record),
                percent: eval::progress_percent(stage),
                accessible: eval::can_enter(stage, record),
            })
            .collect()
    }

    fn verification_select_enabled(&self, record: &OnboardingRecord) -> bool {
        // Once a terminal verdict was saved the select stays editable;
        // before that the candidate's confirmation is required.
        self.session.verification_unlocked || record.document_status != DocumentStatus::Pending
    }

    fn render_stage(&mut self, stage: u8, record: &OnboardingRecord) {
        let panel = match stage {
            1 => {
                let fields = PersonalFields {
                    firstname: record.firstname.clone(),
                    lastname: record.lastname.clone(),
                    email: record.email.clone(),
                    contact: record.contact.clone(),
                    address: record.address.clone(),
                    department: record.department.clone(),
                    designation: record.designation.clone(),
                };
                if self.session.editing_personal {
                    StagePanel::PersonalForm {
                        existing: true,
                        fields,
                    }
                } else {
                    StagePanel::PersonalSummary { fields }
                }
            }
            2 => StagePanel::Interview {
                scheduled: record.interview_scheduled(),
                interview_date: record.interview_date.clone(),
                interview_time: record.interview_time.clone(),
                meet_link: record.meet_link.clone(),
                interview_status: record.interview_status,
            },
            3 => StagePanel::Offer {
                mail_reply: record.mail_reply,
                documents: record.documents().to_vec(),
                upload_enabled: record.mail_reply == MailReply::Yes,
                polling: self.session.poller_active(),
            },
            4 => StagePanel::Onboarding {
                documents: record.documents().to_vec(),
                doj: record.doj,
                employee_id: record.employee_id.clone(),
                converted_to_master: record.converted_to_master,
            },
            _ => StagePanel::Verification {
                document_status: record.document_status,
                select_enabled: self.verification_select_enabled(record),
            },
        };
        let view = View::Stage(StageView {
            record_id: Some(record.id.clone()),
            stage,
            stepper: self.stepper(record),
            panel,
        });
        self.shell.render(&view);
    }

    /// Map a store failure to operator feedback. The view does not move.
    fn report(&self, err: &StoreError) {
        let toast = match err {
            StoreError::Validation(message) => Toast::warning(message.clone()),
            StoreError::Protocol { message } => Toast::error(message.clone()),
            StoreError::Network(_) => Toast::error("Request failed, check your connection"),
            StoreError::Server { status } => Toast::error(format!("Request failed (HTTP {status})")),
            StoreError::Decode(_) => Toast::error("Unexpected response from server"),
        };
        self.shell.toast(toast);
    }
}
