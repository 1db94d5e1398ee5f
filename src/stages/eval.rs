//! Pure stage evaluation: status, access gates, and progress, derived
//! from a record alone. No I/O; the view layer calls these against the
//! most recently fetched record.

use serde::Serialize;

use crate::record::{DocumentStatus, MailReply, OnboardingRecord, ProgressStep};

/// Tri-state label for a stage in the stepper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Completed,
    InProgress,
    Pending,
}

/// The record's current stage, 1..=5, from `progress_step` alone.
pub fn stage_number(record: &OnboardingRecord) -> u8 {
    record.progress_step.stage()
}

/// Status of `stage` for the stepper. Completed wins over in-progress.
pub fn stage_status(stage: u8, record: &OnboardingRecord) -> StageStatus {
    let current = stage_number(record);
    let (completed, in_progress) = match stage {
        1 => (record.personal_complete(), current == 1),
        2 => (
            record.mail_sent(),
            record.interview_date.is_some() || current == 2,
        ),
        3 => (
            record.mail_reply == MailReply::Yes && record.has_documents(),
            record.mail_sent() || current == 3,
        ),
        4 => (
            current > 4 || record.converted_to_master,
            current == 4,
        ),
        5 => (
            record.progress_step.is_terminal()
                || record.document_status == DocumentStatus::Verified,
            current == 5,
        ),
        _ => (false, false),
    };

    if completed {
        StageStatus::Completed
    } else if in_progress {
        StageStatus::InProgress
    } else {
        StageStatus::Pending
    }
}

/// Whether the operator may open `stage` for this record.
pub fn can_enter(stage: u8, record: &OnboardingRecord) -> bool {
    let current = stage_number(record);
    match stage {
        1 => true,
        2 => record.personal_complete(),
        3 => record.mail_sent(),
        4 => current >= 4 || (record.mail_reply == MailReply::Yes && record.has_documents()),
        5 => {
            current >= 5
                || record.document_status == DocumentStatus::Verified
                || record.is_employee()
                || (record.has_documents() && record.doj.is_some())
        }
        _ => false,
    }
}

/// Stepper units for a stage, out of 20. The uneven spacing drives the
/// stepper animation and is part of the display contract.
pub fn progress_units(stage: u8) -> u8 {
    match stage {
        1 => 3,
        2 => 8,
        3 => 12,
        4 => 18,
        _ => 20,
    }
}

/// Rounded progress percentage for a stage.
pub fn progress_percent(stage: u8) -> u8 {
    (u16::from(progress_units(stage)) * 100 / 20) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{InterviewStatus, MailStatus};

    fn blank() -> OnboardingRecord {
        OnboardingRecord::default()
    }

    /// Record with all personal fields captured.
    fn personal_done() -> OnboardingRecord {
        OnboardingRecord {
            id: "r1".into(),
            firstname: "Ada".into(),
            lastname: "Lovelace".into(),
            email: "ada@x.io".into(),
            contact: "555".into(),
            address: "1".into(),
            department: "R&D".into(),
            designation: "Eng".into(),
            progress_step: ProgressStep::SchedulingInterview,
            ..Default::default()
        }
    }

    fn offer_sent() -> OnboardingRecord {
        OnboardingRecord {
            interview_date: Some("2025-04-01".into()),
            interview_time: Some("10:00".into()),
            interview_status: InterviewStatus::Passed,
            mail_status: MailStatus::Sent,
            progress_step: ProgressStep::OfferAcceptance,
            ..personal_done()
        }
    }

    fn docs_uploaded() -> OnboardingRecord {
        OnboardingRecord {
            mail_reply: MailReply::Yes,
            document_urls: vec!["https://s3/a.pdf".into(), "https://s3/b.pdf".into()],
            ..offer_sent()
        }
    }

    fn employee_created() -> OnboardingRecord {
        OnboardingRecord {
            doj: Some(chrono::NaiveDate::from_ymd_opt(2025, 5, 15).unwrap()),
            employee_id: Some("EMP-7".into()),
            converted_to_master: true,
            progress_step: ProgressStep::PhysicalDocumentVerification,
            ..docs_uploaded()
        }
    }

    #[test]
    fn stage_number_spans_one_to_five() {
        let mut record = blank();
        for (step, expected) in [
            (ProgressStep::PersonalInformation, 1),
            (ProgressStep::SchedulingInterview, 2),
            (ProgressStep::OfferAcceptance, 3),
            (ProgressStep::Onboarding, 4),
            (ProgressStep::PhysicalDocumentVerification, 5),
            (ProgressStep::Completed, 5),
        ] {
            record.progress_step = step;
            let stage = stage_number(&record);
            assert_eq!(stage, expected);
            assert!((1..=5).contains(&stage));
        }
    }

    #[test]
    fn blank_record_statuses() {
        let record = blank();
        assert_eq!(stage_status(1, &record), StageStatus::InProgress);
        for stage in 2..=5 {
            assert_eq!(stage_status(stage, &record), StageStatus::Pending);
        }
    }

    #[test]
    fn personal_stage_completes_on_all_fields() {
        let record = personal_done();
        assert_eq!(stage_status(1, &record), StageStatus::Completed);
        assert_eq!(stage_status(2, &record), StageStatus::InProgress);
    }

    #[test]
    fn interview_stage_completes_when_mail_sent() {
        let record = offer_sent();
        assert_eq!(stage_status(2, &record), StageStatus::Completed);
        assert_eq!(stage_status(3, &record), StageStatus::InProgress);
    }

    #[test]
    fn offer_stage_completed_implies_reply_and_documents() {
        // stage 3 completion requires both signals
        let mut record = offer_sent();
        record.mail_reply = MailReply::Yes;
        assert_ne!(stage_status(3, &record), StageStatus::Completed);

        record.document_urls = vec!["https://s3/a.pdf".into()];
        assert_eq!(stage_status(3, &record), StageStatus::Completed);
        assert!(record.has_documents() && record.mail_reply == MailReply::Yes);
    }

    #[test]
    fn onboarding_stage_completes_past_stage_four() {
        let record = employee_created();
        assert_eq!(stage_status(4, &record), StageStatus::Completed);

        let mut converted_only = docs_uploaded();
        converted_only.converted_to_master = true;
        assert_eq!(stage_status(4, &converted_only), StageStatus::Completed);
    }

    #[test]
    fn verification_stage_completed_only_when_verified_or_done() {
        let mut record = employee_created();
        assert_eq!(stage_status(5, &record), StageStatus::InProgress);

        record.document_status = DocumentStatus::Verified;
        assert_eq!(stage_status(5, &record), StageStatus::Completed);

        let mut done = employee_created();
        done.progress_step = ProgressStep::Completed;
        assert_eq!(stage_status(5, &done), StageStatus::Completed);
    }

    #[test]
    fn gates_open_progressively() {
        let record = blank();
        assert!(can_enter(1, &record));
        for stage in 2..=5 {
            assert!(!can_enter(stage, &record), "stage {stage} should be gated");
        }

        let record = personal_done();
        assert!(can_enter(2, &record));
        assert!(!can_enter(3, &record));

        let record = offer_sent();
        assert!(can_enter(3, &record));
        assert!(!can_enter(4, &record));

        let record = docs_uploaded();
        assert!(can_enter(4, &record));
        assert!(!can_enter(5, &record));

        let record = employee_created();
        assert!(can_enter(5, &record));
    }

    #[test]
    fn stage_five_gate_alternate_signals() {
        // docs + doj is enough even before employee creation
        let mut record = docs_uploaded();
        record.doj = Some(chrono::NaiveDate::from_ymd_opt(2025, 5, 15).unwrap());
        assert!(can_enter(5, &record));

        // employee_id alone is enough
        let mut record = docs_uploaded();
        record.employee_id = Some("EMP-7".into());
        assert!(can_enter(5, &record));

        // converted_to_master alone is enough
        let mut record = docs_uploaded();
        record.converted_to_master = true;
        assert!(can_enter(5, &record));
    }

    #[test]
    fn gated_stage_is_never_completed() {
        // Walk the canonical lifecycle; at every point, a stage the
        // operator cannot enter must not be reported completed.
        let snapshots = [
            blank(),
            personal_done(),
            offer_sent(),
            docs_uploaded(),
            employee_created(),
        ];
        for record in &snapshots {
            for stage in 1..=5 {
                if !can_enter(stage, record) {
                    assert_ne!(
                        stage_status(stage, record),
                        StageStatus::Completed,
                        "gated stage {stage} reported completed"
                    );
                }
            }
        }
    }

    #[test]
    fn progress_contract() {
        assert_eq!(
            (1..=5).map(progress_units).collect::<Vec<_>>(),
            vec![3, 8, 12, 18, 20]
        );
        assert_eq!(
            (1..=5).map(progress_percent).collect::<Vec<_>>(),
            vec![15, 40, 60, 90, 100]
        );
    }
}
