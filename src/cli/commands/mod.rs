//! Command implementations

pub mod analyze;
pub mod completions;
pub mod lead_time;
pub mod rules;
pub mod utils;
