//! End-to-end analysis: lead time → waste scores → ranked observations

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::lead_time::{compute_lead_time, LeadTime};
use crate::core::observation::{rank_observations, ObservationContext, ObservationEngine, ObservationRow};
use crate::core::rules::{RuleBook, RulesError};
use crate::core::step::{previous_step, validate_steps, ProcessStep, StepError};
use crate::core::waste::{ScoringModel, WasteCategory, WasteScores};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Steps(#[from] StepError),

    #[error(transparent)]
    Rules(#[from] RulesError),
}

/// Highest-scoring wastes for one step, for map annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopWastes {
    pub step_id: String,
    pub wastes: Vec<(WasteCategory, f64)>,
}

/// Everything one run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub lead_time: LeadTime,
    /// Scores per step, in process order
    pub scores: Vec<WasteScores>,
    /// Observations in ranking order
    pub observations: Vec<ObservationRow>,
    pub top_wastes: Vec<TopWastes>,
}

impl Analysis {
    pub fn scores_for(&self, step_id: &str) -> Option<&WasteScores> {
        self.scores.iter().find(|s| s.step_id == step_id)
    }
}

/// Options for a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisOptions {
    /// Shift length in seconds
    pub available_time_sec: f64,
    /// How many wastes to keep per step in [`Analysis::top_wastes`]
    pub top_wastes: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            available_time_sec: 8.0 * 3600.0,
            top_wastes: 2,
        }
    }
}

/// Run the full pipeline over an ordered step sequence
pub fn analyze(
    steps: &[ProcessStep],
    rules: &RuleBook,
    options: AnalysisOptions,
) -> Result<Analysis, AnalysisError> {
    validate_steps(steps)?;

    let model = ScoringModel::from_rules(rules)?;
    let engine = ObservationEngine::new(rules)?;
    let lead_time = compute_lead_time(steps, options.available_time_sec);

    let mut scores = Vec::with_capacity(steps.len());
    let mut observations = Vec::new();
    for (idx, step) in steps.iter().enumerate() {
        let ws = model.score(step);
        let ctx = ObservationContext {
            prev_name: previous_step(steps, idx).map(|p| p.display_name()),
            waiting_sec: lead_time.waiting_sec(&step.id),
        };
        observations.extend(WasteCategory::ALL.iter().filter_map(|waste| {
            engine.observe(step, *waste, ws.score(*waste), ws.confidence(*waste), &ctx)
        }));
        scores.push(ws);
    }
    rank_observations(&mut observations);

    let top_wastes = scores
        .iter()
        .map(|ws| TopWastes {
            step_id: ws.step_id.clone(),
            wastes: ws.top(options.top_wastes),
        })
        .collect();

    tracing::info!(
        steps = steps.len(),
        observations = observations.len(),
        lead_time_sec = lead_time.lead_time_sec,
        "analysis complete"
    );

    Ok(Analysis {
        lead_time,
        scores,
        observations,
        top_wastes,
    })
}
