//! Onboarding console core: the employee onboarding pipeline of the HR
//! operations console.
//!
//! Five cooperating pieces: a typed HTTP client over the backend's
//! onboarding records ([`store`]), pure stage evaluation ([`stages::eval`]),
//! per-stage actions ([`stages::controller`]), a background reply poller
//! ([`poller`]), and the view router that turns record state into a
//! stepper plus stage panels ([`view`]).

pub mod config;
pub mod error;
pub mod poller;
pub mod record;
pub mod stages;
pub mod store;
pub mod view;
