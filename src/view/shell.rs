//! Host-shell boundary.
//!
//! The console core never draws anything itself; it hands typed views
//! and toasts to whatever hosts it: the terminal shell in `main`, a
//! recording fake in tests.

use super::router::View;
use super::toast::Toast;

pub trait Shell: Send + Sync {
    /// Replace the shell's content area with this view.
    fn render(&self, view: &View);

    /// Show a transient feedback message.
    fn toast(&self, toast: Toast);

    /// Ask the operator to confirm a destructive action.
    fn confirm(&self, prompt: &str) -> bool;
}
