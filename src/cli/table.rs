//! Table rendering for observation and timing lists

use tabled::{settings::Style, Table, Tabled};

use crate::cli::helpers::{format_duration, truncate_str};
use crate::core::lead_time::{LeadTime, StepTiming};
use crate::core::observation::ObservationRow;

/// Widest observation text shown in a terminal table
const TEXT_WIDTH: usize = 90;

#[derive(Debug, Tabled)]
pub struct ObservationLine {
    #[tabled(rename = "#")]
    pub rank: usize,
    #[tabled(rename = "STEP")]
    pub step: String,
    #[tabled(rename = "WASTE")]
    pub waste: String,
    #[tabled(rename = "SCORE")]
    pub score: String,
    #[tabled(rename = "CONF")]
    pub confidence: String,
    #[tabled(rename = "RPN%")]
    pub rpn_pct: String,
    #[tabled(rename = "OBSERVATION")]
    pub text: String,
}

impl ObservationLine {
    pub fn new(rank: usize, row: &ObservationRow, full_text: bool) -> Self {
        let step = if row.step_name.is_empty() {
            row.step_id.clone()
        } else {
            format!("{} {}", row.step_id, row.step_name)
        };
        Self {
            rank,
            step,
            waste: row.waste.to_string(),
            score: format!("{:.2}", row.score),
            confidence: row.confidence.to_string(),
            rpn_pct: format!("{:.1}", row.rpn_pct),
            text: if full_text {
                row.text.clone()
            } else {
                truncate_str(&row.text, TEXT_WIDTH)
            },
        }
    }
}

#[derive(Debug, Tabled)]
pub struct TimingLine {
    #[tabled(rename = "STEP")]
    pub step: String,
    #[tabled(rename = "CT_EFF")]
    pub ct_eff: String,
    #[tabled(rename = "WAITING")]
    pub waiting: String,
    #[tabled(rename = "REWORK")]
    pub rework: String,
    #[tabled(rename = "TOTAL")]
    pub total: String,
    #[tabled(rename = "")]
    pub marker: String,
}

impl TimingLine {
    pub fn new(timing: &StepTiming, is_bottleneck: bool) -> Self {
        Self {
            step: timing.step_id.clone(),
            ct_eff: format!("{:.2}s", timing.ct_eff_sec),
            waiting: format_duration(timing.waiting_sec),
            rework: format!("{:.2}s", timing.rework_sec),
            total: format_duration(timing.total_sec),
            marker: if is_bottleneck { "bottleneck".to_string() } else { String::new() },
        }
    }
}

/// Render observation rows; `markdown` switches to a pipe table with full text
pub fn observation_table(rows: &[ObservationRow], markdown: bool) -> String {
    let lines: Vec<ObservationLine> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| ObservationLine::new(i + 1, row, markdown))
        .collect();
    let mut table = Table::new(lines);
    if markdown {
        table.with(Style::markdown());
    } else {
        table.with(Style::rounded());
    }
    table.to_string()
}

/// Render per-step timing with the bottleneck marked
pub fn timing_table(lead_time: &LeadTime, markdown: bool) -> String {
    let bottleneck = lead_time.bottleneck_step();
    let lines: Vec<TimingLine> = lead_time
        .by_step
        .iter()
        .map(|t| TimingLine::new(t, Some(t.step_id.as_str()) == bottleneck))
        .collect();
    let mut table = Table::new(lines);
    if markdown {
        table.with(Style::markdown());
    } else {
        table.with(Style::rounded());
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::waste::{Confidence, WasteCategory};

    fn row() -> ObservationRow {
        ObservationRow {
            step_id: "P2".into(),
            step_name: "Welding".into(),
            waste: WasteCategory::Defects,
            score: 5.0,
            confidence: Confidence::High,
            rpn_pct: 56.7,
            text: "Welding runs hot.".into(),
        }
    }

    #[test]
    fn test_observation_table_has_headers() {
        let out = observation_table(&[row()], false);
        assert!(out.contains("RPN%"));
        assert!(out.contains("56.7"));
        assert!(out.contains("P2 Welding"));
        assert!(out.contains("defects"));
    }

    #[test]
    fn test_markdown_style() {
        let out = observation_table(&[row()], true);
        assert!(out.lines().all(|l| l.starts_with('|')));
    }

    #[test]
    fn test_timing_table_marks_bottleneck() {
        let lead_time = LeadTime {
            lead_time_sec: 150.0,
            ct_bottleneck_sec: 90.0,
            by_step: vec![
                StepTiming {
                    step_id: "P1".into(),
                    ct_eff_sec: 60.0,
                    waiting_sec: 0.0,
                    rework_sec: 0.0,
                    total_sec: 60.0,
                },
                StepTiming {
                    step_id: "P2".into(),
                    ct_eff_sec: 90.0,
                    waiting_sec: 0.0,
                    rework_sec: 0.0,
                    total_sec: 90.0,
                },
            ],
        };
        let out = timing_table(&lead_time, false);
        let marked: Vec<&str> = out.lines().filter(|l| l.contains("bottleneck")).collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains("P2"));
    }
}
