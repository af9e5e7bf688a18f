//! Waste scorer
//!
//! Scores the eight lean wastes for a process step on a 0-5 scale and attaches
//! a confidence tier. Each waste resolves to one [`ScoringRule`]:
//!
//! - Configured questions → weighted evidence. Each question takes the step's
//!   explicit answer, or is inferred from a metric signal when unanswered.
//! - No questions → a built-in metric rule: threshold ratio (defects, waiting,
//!   motion) or a fixed step score (inventory, overproduction, transportation).
//!
//! Overprocessing and talent have no metric rule and must be configured with
//! questions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::core::numeric::{floor_denominator, round2};
use crate::core::rules::{Question, RuleBook, RulesError, Thresholds};
use crate::core::step::{Metric, ProcessStep, PushPull};

/// Upper bound of every waste score
pub const MAX_SCORE: f64 = 5.0;

/// Score at or above which an observation is "high" severity
pub const HIGH_BAND_MIN: f64 = 3.5;

/// The eight lean wastes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WasteCategory {
    Defects,
    Waiting,
    Inventory,
    Overproduction,
    Transportation,
    Motion,
    Overprocessing,
    Talent,
}

impl WasteCategory {
    /// All wastes in reporting order
    pub const ALL: [WasteCategory; 8] = [
        WasteCategory::Defects,
        WasteCategory::Waiting,
        WasteCategory::Inventory,
        WasteCategory::Overproduction,
        WasteCategory::Transportation,
        WasteCategory::Motion,
        WasteCategory::Overprocessing,
        WasteCategory::Talent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WasteCategory::Defects => "defects",
            WasteCategory::Waiting => "waiting",
            WasteCategory::Inventory => "inventory",
            WasteCategory::Overproduction => "overproduction",
            WasteCategory::Transportation => "transportation",
            WasteCategory::Motion => "motion",
            WasteCategory::Overprocessing => "overprocessing",
            WasteCategory::Talent => "talent",
        }
    }
}

impl std::fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WasteCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "defects" | "defect" => Ok(WasteCategory::Defects),
            "waiting" | "wait" => Ok(WasteCategory::Waiting),
            "inventory" | "wip" => Ok(WasteCategory::Inventory),
            "overproduction" => Ok(WasteCategory::Overproduction),
            "transportation" | "transport" => Ok(WasteCategory::Transportation),
            "motion" => Ok(WasteCategory::Motion),
            "overprocessing" | "over-processing" => Ok(WasteCategory::Overprocessing),
            "talent" | "skills" => Ok(WasteCategory::Talent),
            _ => Err(format!("Unknown waste category: {}", s)),
        }
    }
}

/// How far a score can be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Tier from how many evidence items were measured vs. answered
    pub fn from_evidence(measured: usize, answered: usize) -> Self {
        match (measured > 0, answered > 0) {
            (true, false) => Confidence::High,
            (true, true) => Confidence::Medium,
            (false, _) => Confidence::Low,
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Low => write!(f, "Low"),
            Confidence::Medium => write!(f, "Medium"),
            Confidence::High => write!(f, "High"),
        }
    }
}

impl FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Confidence::Low),
            "medium" | "med" => Ok(Confidence::Medium),
            "high" => Ok(Confidence::High),
            _ => Err(format!("Unknown confidence: {}. Expected Low, Medium, or High", s)),
        }
    }
}

/// Severity band used to pick an observation template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityBand {
    Medium,
    High,
}

impl SeverityBand {
    /// Band for a positive score; `None` when there is nothing to report
    pub fn from_score(score: f64) -> Option<Self> {
        if score <= 0.0 {
            None
        } else if score >= HIGH_BAND_MIN {
            Some(SeverityBand::High)
        } else {
            Some(SeverityBand::Medium)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityBand::Medium => "medium",
            SeverityBand::High => "high",
        }
    }
}

impl std::fmt::Display for SeverityBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A condition on measured step data
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Metric is measured and `>= limit`
    AtLeast(Metric, f64),
    /// Metric is measured and `> limit`
    Above(Metric, f64),
    /// Step is push-controlled
    PushFlow,
    /// Any of the inner signals fires
    Any(Vec<Signal>),
}

impl Signal {
    pub fn fires(&self, step: &ProcessStep) -> bool {
        match self {
            Signal::AtLeast(metric, limit) => step.metric(*metric).is_some_and(|v| v > 0.0 && v >= *limit),
            Signal::Above(metric, limit) => step.metric(*metric).is_some_and(|v| v > *limit),
            Signal::PushFlow => step.push_pull == Some(PushPull::Push),
            Signal::Any(signals) => signals.iter().any(|s| s.fires(step)),
        }
    }

    /// Whether the data this signal reads was recorded at all
    pub fn measured(&self, step: &ProcessStep) -> bool {
        match self {
            Signal::AtLeast(metric, _) | Signal::Above(metric, _) => step.metric(*metric).is_some(),
            Signal::PushFlow => step.push_pull.is_some(),
            Signal::Any(signals) => signals.iter().any(|s| s.measured(step)),
        }
    }
}

/// Scoring strategy for one waste
#[derive(Debug, Clone, PartialEq)]
pub enum ScoringRule {
    /// Weighted yes/no evidence, with optional metric inference for
    /// unanswered questions
    Evidence {
        questions: Vec<Question>,
        inference: Option<Signal>,
    },
    /// `min(5, metric / threshold × 5)`
    Ratio { metric: Metric, threshold: f64 },
    /// `score` when the signal fires, else 0
    Fixed { signal: Signal, score: f64 },
}

/// Score and tier for one waste
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub score: f64,
    pub confidence: Confidence,
}

impl ScoringRule {
    /// Built-in metric rule for wastes without configured questions
    pub fn metric_default(waste: WasteCategory, t: &Thresholds) -> Option<Self> {
        match waste {
            WasteCategory::Defects => Some(ScoringRule::Ratio {
                metric: Metric::DefectPct,
                threshold: t.defect_pct_high,
            }),
            WasteCategory::Waiting => Some(ScoringRule::Ratio {
                metric: Metric::WaitingStarvedPct,
                threshold: t.waiting_pct_high,
            }),
            WasteCategory::Motion => Some(ScoringRule::Ratio {
                metric: Metric::WalkMPerUnit,
                threshold: t.walk_m_high,
            }),
            WasteCategory::Inventory => Some(ScoringRule::Fixed {
                signal: Signal::Above(Metric::WipUnitsIn, t.wip_high),
                score: MAX_SCORE,
            }),
            WasteCategory::Overproduction => Some(ScoringRule::Fixed {
                signal: Signal::PushFlow,
                score: t.push_score,
            }),
            WasteCategory::Transportation => Some(ScoringRule::Fixed {
                signal: transport_signal(t),
                score: t.transport_score,
            }),
            WasteCategory::Overprocessing | WasteCategory::Talent => None,
        }
    }

    /// Metric signal that stands in for an unanswered question
    pub fn inference(waste: WasteCategory, t: &Thresholds) -> Option<Signal> {
        match waste {
            WasteCategory::Defects => Some(Signal::AtLeast(Metric::DefectPct, t.defect_pct_infer)),
            WasteCategory::Waiting => {
                Some(Signal::AtLeast(Metric::WaitingStarvedPct, t.waiting_pct_high))
            }
            WasteCategory::Inventory => Some(Signal::Above(Metric::WipUnitsIn, 0.0)),
            WasteCategory::Overproduction => Some(Signal::PushFlow),
            WasteCategory::Transportation => Some(transport_signal(t)),
            WasteCategory::Motion => Some(Signal::AtLeast(Metric::WalkMPerUnit, t.walk_m_high)),
            WasteCategory::Overprocessing | WasteCategory::Talent => None,
        }
    }

    /// Resolve the rule for a waste from a rule book
    pub fn resolve(waste: WasteCategory, rules: &RuleBook) -> Result<Self, RulesError> {
        let questions = rules.questions(waste);
        if !questions.is_empty() {
            return Ok(ScoringRule::Evidence {
                questions: questions.to_vec(),
                inference: Self::inference(waste, &rules.thresholds),
            });
        }
        Self::metric_default(waste, &rules.thresholds).ok_or(RulesError::NoScoringRule(waste))
    }

    /// Apply the rule to one step.
    ///
    /// Metric rules accept an explicit answer keyed by the waste name as
    /// confirmation (`true`) or dismissal (`false`, forces the score to 0).
    pub fn assess(&self, waste: WasteCategory, step: &ProcessStep) -> Assessment {
        match self {
            ScoringRule::Evidence {
                questions,
                inference,
            } => assess_evidence(questions, inference.as_ref(), step),
            ScoringRule::Ratio { metric, threshold } => {
                let value = step.metric_or_zero(*metric).max(0.0);
                let score = (value / floor_denominator(*threshold) * MAX_SCORE).min(MAX_SCORE);
                confirm(waste, step, round2(score), step.metric(*metric).is_some())
            }
            ScoringRule::Fixed { signal, score } => {
                let raw = if signal.fires(step) { *score } else { 0.0 };
                confirm(waste, step, round2(raw.clamp(0.0, MAX_SCORE)), signal.measured(step))
            }
        }
    }
}

fn transport_signal(t: &Thresholds) -> Signal {
    Signal::Any(vec![
        Signal::Above(Metric::LayoutMoves, t.layout_moves_high),
        Signal::Above(Metric::DistanceM, t.distance_m_high),
    ])
}

fn assess_evidence(
    questions: &[Question],
    inference: Option<&Signal>,
    step: &ProcessStep,
) -> Assessment {
    let total_weight: f64 = questions.iter().map(|q| q.weight).sum();
    let mut true_weight = 0.0;
    let mut measured = 0;
    let mut answered = 0;

    for q in questions {
        let value = match step.answer(&q.id) {
            Some(v) => {
                answered += 1;
                v
            }
            None => {
                let inferred = inference.is_some_and(|s| s.fires(step));
                if inferred {
                    measured += 1;
                }
                inferred
            }
        };
        if value {
            true_weight += q.weight;
        }
    }

    let score = (true_weight * MAX_SCORE / floor_denominator(total_weight)).min(MAX_SCORE);
    Assessment {
        score: round2(score),
        confidence: Confidence::from_evidence(measured, answered),
    }
}

fn confirm(waste: WasteCategory, step: &ProcessStep, score: f64, measured: bool) -> Assessment {
    match (step.answer(waste.as_str()), measured) {
        (Some(false), _) => Assessment {
            score: 0.0,
            confidence: Confidence::from_evidence(usize::from(measured), 1),
        },
        (Some(true), true) => Assessment {
            score,
            confidence: Confidence::High,
        },
        (None, true) => Assessment {
            score,
            confidence: Confidence::Medium,
        },
        (_, false) => Assessment {
            score,
            confidence: Confidence::Low,
        },
    }
}

/// Scores for one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteScores {
    pub step_id: String,
    pub scores: BTreeMap<WasteCategory, f64>,
    pub confidence: BTreeMap<WasteCategory, Confidence>,
}

impl WasteScores {
    pub fn score(&self, waste: WasteCategory) -> f64 {
        self.scores.get(&waste).copied().unwrap_or(0.0)
    }

    pub fn confidence(&self, waste: WasteCategory) -> Confidence {
        self.confidence.get(&waste).copied().unwrap_or(Confidence::Low)
    }

    /// The `n` highest non-zero wastes, highest first (category order on ties)
    pub fn top(&self, n: usize) -> Vec<(WasteCategory, f64)> {
        let mut ranked: Vec<(WasteCategory, f64)> = self
            .scores
            .iter()
            .filter(|(_, score)| **score > 0.0)
            .map(|(waste, score)| (*waste, *score))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }
}

/// Resolved scoring rules for all eight wastes
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringModel {
    rules: Vec<(WasteCategory, ScoringRule)>,
}

impl ScoringModel {
    pub fn from_rules(rules: &RuleBook) -> Result<Self, RulesError> {
        let rules = WasteCategory::ALL
            .iter()
            .map(|waste| Ok((*waste, ScoringRule::resolve(*waste, rules)?)))
            .collect::<Result<Vec<_>, RulesError>>()?;
        Ok(Self { rules })
    }

    pub fn rule(&self, waste: WasteCategory) -> Option<&ScoringRule> {
        self.rules.iter().find(|(w, _)| *w == waste).map(|(_, r)| r)
    }

    /// Score every waste for one step
    pub fn score(&self, step: &ProcessStep) -> WasteScores {
        let mut scores = BTreeMap::new();
        let mut confidence = BTreeMap::new();
        for (waste, rule) in &self.rules {
            let a = rule.assess(*waste, step);
            tracing::debug!(
                step = %step.id,
                waste = %waste,
                score = a.score,
                confidence = %a.confidence,
                "waste scored"
            );
            scores.insert(*waste, a.score);
            confidence.insert(*waste, a.confidence);
        }
        WasteScores {
            step_id: step.id.clone(),
            scores,
            confidence,
        }
    }
}

/// Score one step against a rule book
pub fn score_wastes(step: &ProcessStep, rules: &RuleBook) -> Result<WasteScores, RulesError> {
    Ok(ScoringModel::from_rules(rules)?.score(step))
}
