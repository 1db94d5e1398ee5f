//! The five-stage pipeline: pure stage evaluation and the per-stage
//! controller actions.

pub mod controller;
pub mod eval;

pub use controller::StageController;
pub use eval::{StageStatus, can_enter, progress_percent, progress_units, stage_number, stage_status};

/// Number of stages in the pipeline.
pub const STAGE_COUNT: u8 = 5;
