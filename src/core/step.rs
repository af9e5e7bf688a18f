//! Process step record - one station's measurements for one analysis run
//!
//! Every measured field is optional. A missing value means "unknown" and is
//! treated as zero or neutral by the calculators, never as an error.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;
use thiserror::Error;

/// Kind of work performed at a station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProcessType {
    #[default]
    Manual,
    #[serde(rename = "Semi-auto", alias = "semi-auto", alias = "SemiAuto")]
    SemiAuto,
    Auto,
}

impl std::fmt::Display for ProcessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessType::Manual => write!(f, "Manual"),
            ProcessType::SemiAuto => write!(f, "Semi-auto"),
            ProcessType::Auto => write!(f, "Auto"),
        }
    }
}

impl FromStr for ProcessType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(ProcessType::Manual),
            "semi-auto" | "semiauto" | "semi" => Ok(ProcessType::SemiAuto),
            "auto" | "automatic" => Ok(ProcessType::Auto),
            _ => Err(format!("Unknown process type: {}", s)),
        }
    }
}

/// Material flow control between a station and its customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PushPull {
    #[serde(alias = "push")]
    Push,
    #[serde(alias = "pull")]
    Pull,
}

impl std::fmt::Display for PushPull {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PushPull::Push => write!(f, "Push"),
            PushPull::Pull => write!(f, "Pull"),
        }
    }
}

impl FromStr for PushPull {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "push" => Ok(PushPull::Push),
            "pull" => Ok(PushPull::Pull),
            _ => Err(format!("Unknown flow type: {}. Expected Push or Pull", s)),
        }
    }
}

/// Numeric step fields that scoring rules can read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    CycleTime,
    DowntimePct,
    DefectPct,
    ReworkPct,
    WaitingStarvedPct,
    WipUnitsIn,
    DistanceM,
    LayoutMoves,
    WalkMPerUnit,
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::CycleTime => write!(f, "ct_sec"),
            Metric::DowntimePct => write!(f, "downtime_pct"),
            Metric::DefectPct => write!(f, "defect_pct"),
            Metric::ReworkPct => write!(f, "rework_pct"),
            Metric::WaitingStarvedPct => write!(f, "waiting_starved_pct"),
            Metric::WipUnitsIn => write!(f, "wip_units_in"),
            Metric::DistanceM => write!(f, "distance_m"),
            Metric::LayoutMoves => write!(f, "layout_moves"),
            Metric::WalkMPerUnit => write!(f, "walk_m_per_unit"),
        }
    }
}

/// A single process step (station) in the value stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessStep {
    /// Unique identifier within the run (e.g., "P1")
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Upstream step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_id: Option<String>,

    /// Downstream step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<String>,

    #[serde(default)]
    pub process_type: ProcessType,

    /// Observed cycle time per unit (seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ct_sec: Option<f64>,

    /// Share of time lost to unplanned stops (0-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downtime_pct: Option<f64>,

    /// Minutes per changeover
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co_time_min: Option<f64>,

    /// Changeovers per shift
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co_freq_per_shift: Option<f64>,

    /// Share of available time the station sits starved or blocked (0-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting_starved_pct: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defect_pct: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rework_pct: Option<f64>,

    /// Work-in-process units queued ahead of the station
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wip_units_in: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_pull: Option<PushPull>,

    /// Distance material travels to reach the station (meters)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,

    /// Material handling moves caused by layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_moves: Option<u32>,

    /// Operator walking per unit (meters)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walk_m_per_unit: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operators: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_incidents: Option<u32>,

    /// Explicit evidence answers keyed by question id.
    /// `None` means "not answered, infer from metrics".
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub answers: BTreeMap<String, Option<bool>>,
}

impl ProcessStep {
    /// Create a step with only its identity set
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Raw value of a metric, if measured
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::CycleTime => self.ct_sec,
            Metric::DowntimePct => self.downtime_pct,
            Metric::DefectPct => self.defect_pct,
            Metric::ReworkPct => self.rework_pct,
            Metric::WaitingStarvedPct => self.waiting_starved_pct,
            Metric::WipUnitsIn => self.wip_units_in,
            Metric::DistanceM => self.distance_m,
            Metric::LayoutMoves => self.layout_moves.map(f64::from),
            Metric::WalkMPerUnit => self.walk_m_per_unit,
        }
    }

    /// Value of a metric with "unknown" read as zero
    pub fn metric_or_zero(&self, metric: Metric) -> f64 {
        self.metric(metric).unwrap_or(0.0)
    }

    /// Explicit answer for a question, flattening "present but unset" to `None`
    pub fn answer(&self, question_id: &str) -> Option<bool> {
        self.answers.get(question_id).copied().flatten()
    }

    /// Name to show in text, falling back to the id
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Builder-style helper for explicit answers
    pub fn with_answer(mut self, question_id: impl Into<String>, value: Option<bool>) -> Self {
        self.answers.insert(question_id.into(), value);
        self
    }
}

/// Errors in the shape of a step sequence
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StepError {
    #[error("step at position {0} has an empty id")]
    EmptyId(usize),

    #[error("duplicate step id '{0}'")]
    DuplicateId(String),
}

/// Check the run-level invariants: every id present and unique
pub fn validate_steps(steps: &[ProcessStep]) -> Result<(), StepError> {
    let mut seen = HashSet::new();
    for (idx, step) in steps.iter().enumerate() {
        if step.id.trim().is_empty() {
            return Err(StepError::EmptyId(idx + 1));
        }
        if !seen.insert(step.id.as_str()) {
            return Err(StepError::DuplicateId(step.id.clone()));
        }
    }
    Ok(())
}

/// Fill missing `prev_id`/`next_id` links from sequence order.
///
/// Links that are already set are left untouched.
pub fn link_sequence(steps: &mut [ProcessStep]) {
    let ids: Vec<String> = steps.iter().map(|s| s.id.clone()).collect();
    for (idx, step) in steps.iter_mut().enumerate() {
        if step.prev_id.is_none() && idx > 0 {
            step.prev_id = Some(ids[idx - 1].clone());
        }
        if step.next_id.is_none() && idx + 1 < ids.len() {
            step.next_id = Some(ids[idx + 1].clone());
        }
    }
}

/// Resolve the upstream step: explicit `prev_id` first, then sequence order
pub fn previous_step<'a>(steps: &'a [ProcessStep], idx: usize) -> Option<&'a ProcessStep> {
    let step = steps.get(idx)?;
    match &step.prev_id {
        Some(prev_id) => steps.iter().find(|s| &s.id == prev_id),
        None if idx > 0 => steps.get(idx - 1),
        None => None,
    }
}
