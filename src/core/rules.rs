//! Rule/template store
//!
//! Thresholds, waste question lists, observation templates and confidence
//! wrappers. Loaded once, validated at load time, then passed by reference to
//! every calculation as an immutable value.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;

use crate::core::waste::{Confidence, ScoringModel, SeverityBand, WasteCategory};
use crate::schema::registry::RuleRegistry;
use crate::schema::template::ObservationTemplates;
use crate::yaml::{parse_yaml, parse_yaml_file, YamlError};

/// Errors raised while loading or validating a rule book
#[derive(Debug, Error)]
pub enum RulesError {
    #[error(transparent)]
    Yaml(#[from] YamlError),

    #[error("embedded rule book not found: {0}")]
    MissingEmbedded(String),

    #[error("waste '{0}' has no questions and no built-in metric rule")]
    NoScoringRule(WasteCategory),

    #[error("waste '{category}' has a question with an empty id")]
    EmptyQuestionId { category: WasteCategory },

    #[error("waste '{category}' lists question '{question}' more than once")]
    DuplicateQuestion {
        category: WasteCategory,
        question: String,
    },

    #[error("question '{question}' in '{category}' has invalid weight {weight} (must be > 0)")]
    InvalidWeight {
        category: WasteCategory,
        question: String,
        weight: f64,
    },

    #[error("threshold '{name}' must be a finite number >= 0, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("template '{name}' is invalid: {message}")]
    InvalidTemplate { name: String, message: String },
}

fn default_defect_pct_high() -> f64 {
    5.0
}
fn default_defect_pct_infer() -> f64 {
    3.0
}
fn default_waiting_pct_high() -> f64 {
    10.0
}
fn default_wip_high() -> f64 {
    200.0
}
fn default_downtime_pct_high() -> f64 {
    5.0
}
fn default_layout_moves_high() -> f64 {
    2.0
}
fn default_distance_m_high() -> f64 {
    25.0
}
fn default_walk_m_high() -> f64 {
    10.0
}
fn default_push_score() -> f64 {
    3.0
}
fn default_transport_score() -> f64 {
    3.0
}

/// Numeric cutoffs used by inference, ratio scoring and the priority index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Thresholds {
    /// Defect % that counts as a full-severity defect problem
    #[serde(default = "default_defect_pct_high")]
    pub defect_pct_high: f64,

    /// Defect % from which defect evidence is inferred without an answer
    #[serde(default = "default_defect_pct_infer")]
    pub defect_pct_infer: f64,

    /// Starved/waiting % that counts as a waiting problem
    #[serde(default = "default_waiting_pct_high")]
    pub waiting_pct_high: f64,

    /// WIP units above which inventory is flagged
    #[serde(default = "default_wip_high")]
    pub wip_high: f64,

    /// Downtime % above which issues are treated as recurrent
    #[serde(default = "default_downtime_pct_high")]
    pub downtime_pct_high: f64,

    #[serde(default = "default_layout_moves_high")]
    pub layout_moves_high: f64,

    #[serde(default = "default_distance_m_high")]
    pub distance_m_high: f64,

    #[serde(default = "default_walk_m_high")]
    pub walk_m_high: f64,

    /// Fixed overproduction score for push-controlled steps
    #[serde(default = "default_push_score")]
    pub push_score: f64,

    /// Fixed transportation score when moves or distance exceed limits
    #[serde(default = "default_transport_score")]
    pub transport_score: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            defect_pct_high: default_defect_pct_high(),
            defect_pct_infer: default_defect_pct_infer(),
            waiting_pct_high: default_waiting_pct_high(),
            wip_high: default_wip_high(),
            downtime_pct_high: default_downtime_pct_high(),
            layout_moves_high: default_layout_moves_high(),
            distance_m_high: default_distance_m_high(),
            walk_m_high: default_walk_m_high(),
            push_score: default_push_score(),
            transport_score: default_transport_score(),
        }
    }
}

impl Thresholds {
    /// All named values, for validation and display
    pub fn entries(&self) -> [(&'static str, f64); 10] {
        [
            ("defect_pct_high", self.defect_pct_high),
            ("defect_pct_infer", self.defect_pct_infer),
            ("waiting_pct_high", self.waiting_pct_high),
            ("wip_high", self.wip_high),
            ("downtime_pct_high", self.downtime_pct_high),
            ("layout_moves_high", self.layout_moves_high),
            ("distance_m_high", self.distance_m_high),
            ("walk_m_high", self.walk_m_high),
            ("push_score", self.push_score),
            ("transport_score", self.transport_score),
        ]
    }

    /// The threshold quoted in observation text for a waste
    pub fn for_waste(&self, waste: WasteCategory) -> Option<f64> {
        match waste {
            WasteCategory::Defects => Some(self.defect_pct_high),
            WasteCategory::Waiting => Some(self.waiting_pct_high),
            WasteCategory::Inventory => Some(self.wip_high),
            WasteCategory::Transportation => Some(self.distance_m_high),
            WasteCategory::Motion => Some(self.walk_m_high),
            WasteCategory::Overproduction
            | WasteCategory::Overprocessing
            | WasteCategory::Talent => None,
        }
    }
}

fn default_weight() -> f64 {
    1.0
}

/// A yes/no evidence question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Question {
    pub id: String,

    #[serde(default = "default_weight")]
    pub weight: f64,

    /// Prompt shown to whoever fills in the answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Question {
    pub fn new(id: impl Into<String>, weight: f64) -> Self {
        Self {
            id: id.into(),
            weight,
            text: None,
        }
    }
}

/// Per-waste scoring configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WasteConfig {
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Templates for one waste, by severity band
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandTemplates {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub high: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub medium: Vec<String>,
}

impl BandTemplates {
    /// First template configured for a band; blank text counts as none
    pub fn first(&self, band: SeverityBand) -> Option<&str> {
        match band {
            SeverityBand::High => self.high.first(),
            SeverityBand::Medium => self.medium.first(),
        }
        .map(|s| s.as_str())
        .filter(|s| !s.trim().is_empty())
    }
}

fn default_high_conf() -> String {
    "{{ text }}".to_string()
}
fn default_med_conf() -> String {
    "{{ text }} (to be confirmed on the floor)".to_string()
}
fn default_low_conf() -> String {
    "Possible issue, not backed by measurements: {{ text }}".to_string()
}

/// Phrasing wrappers applied around a rendered sentence, by confidence tier.
/// Each wrapper receives the sentence as `text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservationWrappers {
    #[serde(default = "default_high_conf")]
    pub high_conf: String,

    #[serde(default = "default_med_conf")]
    pub med_conf: String,

    #[serde(default = "default_low_conf")]
    pub low_conf: String,
}

impl Default for ObservationWrappers {
    fn default() -> Self {
        Self {
            high_conf: default_high_conf(),
            med_conf: default_med_conf(),
            low_conf: default_low_conf(),
        }
    }
}

impl ObservationWrappers {
    pub fn for_confidence(&self, confidence: Confidence) -> &str {
        match confidence {
            Confidence::High => &self.high_conf,
            Confidence::Medium => &self.med_conf,
            Confidence::Low => &self.low_conf,
        }
    }
}

/// The full rule/template store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleBook {
    #[serde(default)]
    pub thresholds: Thresholds,

    #[serde(default)]
    pub wastes: BTreeMap<WasteCategory, WasteConfig>,

    #[serde(default)]
    pub waste_templates: BTreeMap<WasteCategory, BandTemplates>,

    #[serde(default)]
    pub observation_wrappers: ObservationWrappers,
}

impl RuleBook {
    /// Parse and validate a rule book from YAML text
    pub fn from_yaml(content: &str, filename: &str) -> Result<Self, RulesError> {
        let rules: RuleBook = parse_yaml(content, filename)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Load and validate a rule book file
    pub fn load(path: &Path) -> Result<Self, RulesError> {
        let rules: RuleBook = parse_yaml_file(path)?;
        rules.validate()?;
        tracing::debug!(path = %path.display(), "loaded rule book");
        Ok(rules)
    }

    /// The rule book compiled into the binary
    pub fn embedded() -> Result<Self, RulesError> {
        let registry = RuleRegistry::new();
        let content = registry
            .get(RuleRegistry::DEFAULT)
            .ok_or_else(|| RulesError::MissingEmbedded(RuleRegistry::DEFAULT.to_string()))?;
        Self::from_yaml(content, RuleRegistry::DEFAULT)
    }

    /// Load from a path when given, otherwise use the embedded rule book
    pub fn load_or_embedded(path: Option<&Path>) -> Result<Self, RulesError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::embedded(),
        }
    }

    /// Questions configured for a waste (empty if none)
    pub fn questions(&self, waste: WasteCategory) -> &[Question] {
        self.wastes
            .get(&waste)
            .map(|w| w.questions.as_slice())
            .unwrap_or(&[])
    }

    /// First template configured for a waste and band
    pub fn template(&self, waste: WasteCategory, band: SeverityBand) -> Option<&str> {
        self.waste_templates.get(&waste).and_then(|t| t.first(band))
    }

    /// Check the configuration contract.
    ///
    /// Every waste must resolve to a scoring rule, question ids must be
    /// unique with positive weights, thresholds must be finite and
    /// non-negative, and every template must render against an all-zero
    /// context.
    pub fn validate(&self) -> Result<(), RulesError> {
        for (name, value) in self.thresholds.entries() {
            if !value.is_finite() || value < 0.0 {
                return Err(RulesError::InvalidThreshold { name, value });
            }
        }

        for (category, config) in &self.wastes {
            let mut seen = HashSet::new();
            for q in &config.questions {
                if q.id.trim().is_empty() {
                    return Err(RulesError::EmptyQuestionId {
                        category: *category,
                    });
                }
                if !seen.insert(q.id.as_str()) {
                    return Err(RulesError::DuplicateQuestion {
                        category: *category,
                        question: q.id.clone(),
                    });
                }
                if !q.weight.is_finite() || q.weight <= 0.0 {
                    return Err(RulesError::InvalidWeight {
                        category: *category,
                        question: q.id.clone(),
                        weight: q.weight,
                    });
                }
            }
        }

        ScoringModel::from_rules(self)?;
        ObservationTemplates::compile(self)?;
        Ok(())
    }
}
