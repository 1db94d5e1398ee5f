//! Onboarding record aggregate and its wire-level enums.

mod model;

pub use model::{
    DocumentStatus, InterviewStatus, MailReply, MailStatus, OnboardingRecord, ProgressStep,
};
