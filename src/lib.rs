//! VSM: Value Stream Map observation engine
//!
//! Computes lead time, bottleneck cycle time and lean-waste scores from
//! per-station measurements, then writes ranked, human-readable observations
//! from a rule/template book.

pub mod cli;
pub mod core;
pub mod schema;
pub mod yaml;
