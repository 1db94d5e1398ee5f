//! View layer: session state, host-shell boundary, list view, and the
//! view router.

pub mod list;
pub mod router;
pub mod session;
pub mod shell;
pub mod toast;

pub use list::{ListState, SearchDebouncer};
pub use router::{
    DetailView, ListRow, ListView, StagePanel, StageView, StepperStep, View, ViewRouter,
};
pub use session::{OperatorContext, SessionState};
pub use shell::Shell;
pub use toast::{Toast, ToastLevel};
