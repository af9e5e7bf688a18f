//! Core module - the lead-time, waste-scoring and observation engine

pub mod analysis;
pub mod config;
pub mod lead_time;
pub mod loader;
pub mod numeric;
pub mod observation;
pub mod rules;
pub mod step;
pub mod waste;

pub use analysis::{analyze, Analysis, AnalysisError, AnalysisOptions, TopWastes};
pub use config::Config;
pub use lead_time::{compute_lead_time, LeadTime, StepTiming};
pub use loader::{load_steps, InputError};
pub use observation::{
    priority_index, rank_observations, ObservationContext, ObservationEngine, ObservationRow,
};
pub use rules::{RuleBook, RulesError, Thresholds};
pub use step::{link_sequence, validate_steps, Metric, ProcessStep, ProcessType, PushPull, StepError};
pub use waste::{
    score_wastes, Confidence, ScoringModel, ScoringRule, SeverityBand, Signal, WasteCategory,
    WasteScores,
};
