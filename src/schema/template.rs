//! Observation template rendering using Tera
//!
//! Every configured sentence template and confidence wrapper is compiled once
//! and trial-rendered against an all-zero context, so placeholder mistakes
//! surface when the rule book is loaded rather than mid-report.

use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

use crate::core::rules::{RuleBook, RulesError};
use crate::core::waste::{Confidence, SeverityBand, WasteCategory};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template rendering error: {0}")]
    RenderError(String),
}

/// Values available to observation templates.
///
/// Unknown metrics are passed as zero so templates never fail on partial data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TemplateValues {
    /// Step display name
    pub step: String,
    /// Upstream step name (empty for the first step)
    pub prev_step: String,
    pub defect_pct: f64,
    pub rework_pct: f64,
    pub downtime_pct: f64,
    /// Threshold quoted for this waste
    pub threshold: f64,
    pub wait_sec: f64,
    pub wait_min: f64,
    pub waiting_pct: f64,
    pub ct_sec: f64,
    pub ct_min: f64,
    pub wip: f64,
    pub moves: u32,
    pub distance_m: f64,
    pub walk_m: f64,
    pub operators: u32,
    pub score: f64,
}

#[derive(Serialize)]
struct WrapValues<'a> {
    text: &'a str,
}

fn template_name(waste: WasteCategory, band: SeverityBand) -> String {
    format!("{}/{}", waste, band)
}

fn wrapper_name(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::High => "wrap/high_conf",
        Confidence::Medium => "wrap/med_conf",
        Confidence::Low => "wrap/low_conf",
    }
}

/// Compiled observation templates for one rule book
pub struct ObservationTemplates {
    tera: Tera,
}

impl ObservationTemplates {
    /// Compile the first template of every (waste, band) plus the wrappers
    pub fn compile(rules: &RuleBook) -> Result<Self, RulesError> {
        let mut tera = Tera::default();
        let mut names = Vec::new();

        for waste in WasteCategory::ALL {
            for band in [SeverityBand::High, SeverityBand::Medium] {
                if let Some(source) = rules.template(waste, band) {
                    let name = template_name(waste, band);
                    add(&mut tera, &name, source)?;
                    names.push(name);
                }
            }
        }

        for confidence in [Confidence::High, Confidence::Medium, Confidence::Low] {
            let source = rules.observation_wrappers.for_confidence(confidence);
            add(&mut tera, wrapper_name(confidence), source)?;
        }

        let templates = Self { tera };
        templates.check(&names)?;
        Ok(templates)
    }

    fn check(&self, names: &[String]) -> Result<(), RulesError> {
        let zero = Context::from_serialize(TemplateValues::default())
            .map_err(|e| invalid("context", &e))?;
        for name in names {
            self.tera.render(name, &zero).map_err(|e| invalid(name, &e))?;
        }

        let wrap = Context::from_serialize(WrapValues { text: "" })
            .map_err(|e| invalid("context", &e))?;
        for confidence in [Confidence::High, Confidence::Medium, Confidence::Low] {
            let name = wrapper_name(confidence);
            self.tera.render(name, &wrap).map_err(|e| invalid(name, &e))?;
        }
        Ok(())
    }

    /// Whether a sentence template exists for a waste and band
    pub fn has(&self, waste: WasteCategory, band: SeverityBand) -> bool {
        let name = template_name(waste, band);
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Render the sentence for a waste and band
    pub fn render(
        &self,
        waste: WasteCategory,
        band: SeverityBand,
        values: &TemplateValues,
    ) -> Result<String, TemplateError> {
        let name = template_name(waste, band);
        if !self.has(waste, band) {
            return Err(TemplateError::NotFound(name));
        }
        let context = Context::from_serialize(values)
            .map_err(|e| TemplateError::RenderError(e.to_string()))?;
        self.tera
            .render(&name, &context)
            .map(|s| s.trim().to_string())
            .map_err(|e| TemplateError::RenderError(e.to_string()))
    }

    /// Wrap a rendered sentence in its confidence phrasing
    pub fn wrap(&self, confidence: Confidence, text: &str) -> Result<String, TemplateError> {
        let context = Context::from_serialize(WrapValues { text })
            .map_err(|e| TemplateError::RenderError(e.to_string()))?;
        self.tera
            .render(wrapper_name(confidence), &context)
            .map(|s| s.trim().to_string())
            .map_err(|e| TemplateError::RenderError(e.to_string()))
    }
}

fn add(tera: &mut Tera, name: &str, source: &str) -> Result<(), RulesError> {
    tera.add_raw_template(name, source)
        .map_err(|e| invalid(name, &e))
}

fn invalid(name: &str, err: &tera::Error) -> RulesError {
    // Tera keeps the useful part of the message in the source chain
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        message = format!("{}: {}", message, inner);
        source = std::error::Error::source(inner);
    }
    RulesError::InvalidTemplate {
        name: name.to_string(),
        message,
    }
}
