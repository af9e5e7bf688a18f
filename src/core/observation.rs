//! Observation synthesizer
//!
//! Turns a waste score into a templated sentence plus a priority index
//! ("RPN%"), a 0-100 ranking that mirrors an FMEA risk priority number:
//!
//! ```text
//! severity   = score / 5 × 10
//! recurrence = 7 if downtime_pct > downtime_pct_high else 4
//! detection  = 3 (High) | 6 (Medium) | 8 (Low)
//! rpn_pct    = (severity + recurrence + detection) / 30 × 100
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::core::numeric::{round2, round_to};
use crate::core::rules::{RuleBook, RulesError, Thresholds};
use crate::core::step::ProcessStep;
use crate::core::waste::{Confidence, SeverityBand, WasteCategory, MAX_SCORE};
use crate::schema::template::{ObservationTemplates, TemplateValues};

const RECURRENCE_HIGH: f64 = 7.0;
const RECURRENCE_BASE: f64 = 4.0;
const RPN_SCALE: f64 = 30.0;

/// One emitted finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRow {
    pub step_id: String,
    pub step_name: String,
    pub waste: WasteCategory,
    /// Severity on the 0-5 scale
    pub score: f64,
    pub confidence: Confidence,
    /// Priority index, 0-100
    pub rpn_pct: f64,
    pub text: String,
}

/// Context the synthesizer cannot derive from the step itself
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ObservationContext<'a> {
    pub prev_name: Option<&'a str>,
    pub waiting_sec: f64,
}

/// Detection difficulty for a confidence tier (higher = harder to detect)
pub fn detection_term(confidence: Confidence) -> f64 {
    match confidence {
        Confidence::High => 3.0,
        Confidence::Medium => 6.0,
        Confidence::Low => 8.0,
    }
}

/// Composite priority index, rounded to one decimal
pub fn priority_index(
    score: f64,
    confidence: Confidence,
    downtime_pct: Option<f64>,
    thresholds: &Thresholds,
) -> f64 {
    let severity = score.clamp(0.0, MAX_SCORE) / MAX_SCORE * 10.0;
    let recurrence = if downtime_pct.unwrap_or(0.0) > thresholds.downtime_pct_high {
        RECURRENCE_HIGH
    } else {
        RECURRENCE_BASE
    };
    let detection = detection_term(confidence);
    round_to((severity + recurrence + detection) / RPN_SCALE * 100.0, 1)
}

/// Placeholder values for a step and waste. Unknown metrics become zero.
pub fn template_values(
    step: &ProcessStep,
    waste: WasteCategory,
    score: f64,
    thresholds: &Thresholds,
    ctx: &ObservationContext<'_>,
) -> TemplateValues {
    let ct_sec = step.ct_sec.unwrap_or(0.0);
    TemplateValues {
        step: step.display_name().to_string(),
        prev_step: ctx.prev_name.unwrap_or_default().to_string(),
        defect_pct: round2(step.defect_pct.unwrap_or(0.0)),
        rework_pct: round2(step.rework_pct.unwrap_or(0.0)),
        downtime_pct: round2(step.downtime_pct.unwrap_or(0.0)),
        threshold: thresholds.for_waste(waste).unwrap_or(0.0),
        wait_sec: round2(ctx.waiting_sec),
        wait_min: round_to(ctx.waiting_sec / 60.0, 1),
        waiting_pct: round2(step.waiting_starved_pct.unwrap_or(0.0)),
        ct_sec: round2(ct_sec),
        ct_min: round_to(ct_sec / 60.0, 1),
        wip: round2(step.wip_units_in.unwrap_or(0.0)),
        moves: step.layout_moves.unwrap_or(0),
        distance_m: round2(step.distance_m.unwrap_or(0.0)),
        walk_m: round2(step.walk_m_per_unit.unwrap_or(0.0)),
        operators: step.operators.unwrap_or(0),
        score,
    }
}

/// Synthesizer bound to one rule book
pub struct ObservationEngine<'r> {
    rules: &'r RuleBook,
    templates: ObservationTemplates,
}

impl<'r> ObservationEngine<'r> {
    pub fn new(rules: &'r RuleBook) -> Result<Self, RulesError> {
        Ok(Self {
            rules,
            templates: ObservationTemplates::compile(rules)?,
        })
    }

    /// Produce at most one observation for a (step, waste) pair.
    ///
    /// Nothing is produced for a zero score or when no template is
    /// configured for the waste's severity band.
    pub fn observe(
        &self,
        step: &ProcessStep,
        waste: WasteCategory,
        score: f64,
        confidence: Confidence,
        ctx: &ObservationContext<'_>,
    ) -> Option<ObservationRow> {
        let band = SeverityBand::from_score(score)?;
        let source = self.rules.template(waste, band)?;

        let values = template_values(step, waste, score, &self.rules.thresholds, ctx);
        let sentence = match self.templates.render(waste, band, &values) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(step = %step.id, waste = %waste, error = %e, "template render failed; using raw text");
                source.trim().to_string()
            }
        };
        let text = match self.templates.wrap(confidence, &sentence) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(step = %step.id, waste = %waste, error = %e, "wrapper render failed");
                sentence
            }
        };

        Some(ObservationRow {
            step_id: step.id.clone(),
            step_name: step.name.clone(),
            waste,
            score,
            confidence,
            rpn_pct: priority_index(score, confidence, step.downtime_pct, &self.rules.thresholds),
            text,
        })
    }
}

/// Ranking order: priority index descending, then score descending
pub fn compare_rows(a: &ObservationRow, b: &ObservationRow) -> Ordering {
    b.rpn_pct
        .total_cmp(&a.rpn_pct)
        .then(b.score.total_cmp(&a.score))
}

/// Sort observations into ranking order (stable for full ties)
pub fn rank_observations(rows: &mut [ObservationRow]) {
    rows.sort_by(compare_rows);
}
