//! Per-mount session state and the operator gate.

use crate::poller::ReplyPoller;
use crate::record::OnboardingRecord;

use super::list::ListState;

/// Identity of the internal user driving the console, as provided by the
/// host. Not the candidate.
#[derive(Debug, Clone, Default)]
pub struct OperatorContext {
    pub id: String,
    pub email: String,
    pub role: String,
    pub designation: String,
}

impl OperatorContext {
    /// The single access-control predicate for the onboarding surface.
    /// Elevated means an admin/HR role or an HR designation.
    pub fn is_elevated(&self) -> bool {
        let role = self.role.trim();
        if role.eq_ignore_ascii_case("admin") || role.eq_ignore_ascii_case("hr") {
            return true;
        }
        self.designation
            .split_whitespace()
            .any(|word| word.eq_ignore_ascii_case("hr"))
    }
}

/// Mutable state scoped to one mount of the onboarding module.
///
/// Everything that the original UI kept in module-level variables lives
/// here: the open record, the stage-1 edit toggle, the stage-5 unlock
/// flag, the poll handle, and the list's pagination/selection state.
/// Dropped wholesale on unmount, which also stops the poller.
pub struct SessionState {
    /// The record the operator currently has open, as last fetched.
    pub current: Option<OnboardingRecord>,
    /// Stage 1 shows an edit form instead of the summary.
    pub editing_personal: bool,
    /// The stage-5 verification select has been unlocked this session.
    pub verification_unlocked: bool,
    pub(crate) poller: Option<ReplyPoller>,
    pub list: ListState,
}

impl SessionState {
    pub fn new(page_size: usize) -> Self {
        Self {
            current: None,
            editing_personal: false,
            verification_unlocked: false,
            poller: None,
            list: ListState::new(page_size),
        }
    }

    /// Forget the open record and its per-record flags.
    pub fn close_record(&mut self) {
        self.current = None;
        self.editing_personal = false;
        self.verification_unlocked = false;
    }

    pub fn poller_active(&self) -> bool {
        self.poller.as_ref().is_some_and(|p| !p.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elevated_roles() {
        let mut op = OperatorContext {
            role: "admin".into(),
            ..Default::default()
        };
        assert!(op.is_elevated());

        op.role = "HR".into();
        assert!(op.is_elevated());

        op.role = "employee".into();
        op.designation = "HR Manager".into();
        assert!(op.is_elevated());
    }

    #[test]
    fn ordinary_operator_is_not_elevated() {
        let op = OperatorContext {
            role: "employee".into(),
            designation: "Software Engineer".into(),
            ..Default::default()
        };
        assert!(!op.is_elevated());

        // "hr" must be its own word in the designation
        let op = OperatorContext {
            role: "employee".into(),
            designation: "Chrome Specialist".into(),
            ..Default::default()
        };
        assert!(!op.is_elevated());
    }
}
