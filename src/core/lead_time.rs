//! Lead-time calculator
//!
//! Derives effective cycle time, the bottleneck, WIP-induced waiting, rework
//! time and total lead time from an ordered sequence of process steps.
//!
//! Waiting is modelled as `wip_units_in / throughput` with
//! `throughput = 1 / bottleneck`, i.e. `wip × bottleneck` seconds. With WIP in
//! the hundreds and cycle times in seconds this yields very large values; the
//! formula is kept as-is for compatibility with existing reports.

use serde::{Deserialize, Serialize};

use crate::core::numeric::{floor_denominator, round2};
use crate::core::step::ProcessStep;

/// Timing derived for one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepTiming {
    pub step_id: String,
    pub ct_eff_sec: f64,
    pub waiting_sec: f64,
    pub rework_sec: f64,
    pub total_sec: f64,
}

/// Lead-time result for a whole step sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadTime {
    pub lead_time_sec: f64,
    pub ct_bottleneck_sec: f64,
    /// Per-step timing in process order; serialized as a map keyed by step id
    #[serde(with = "by_step_map")]
    pub by_step: Vec<StepTiming>,
}

/// `by_step` on the wire: `{ step_id: {ct_eff_sec, waiting_sec, rework_sec, total_sec} }`
/// with entries in process order
mod by_step_map {
    use serde::de::{MapAccess, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;

    use super::StepTiming;

    #[derive(Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Entry {
        ct_eff_sec: f64,
        waiting_sec: f64,
        rework_sec: f64,
        total_sec: f64,
    }

    pub fn serialize<S: Serializer>(steps: &[StepTiming], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(steps.iter().map(|t| {
            (
                t.step_id.as_str(),
                Entry {
                    ct_eff_sec: t.ct_eff_sec,
                    waiting_sec: t.waiting_sec,
                    rework_sec: t.rework_sec,
                    total_sec: t.total_sec,
                },
            )
        }))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<StepTiming>, D::Error> {
        struct InOrder;

        impl<'de> Visitor<'de> for InOrder {
            type Value = Vec<StepTiming>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of step id to timing")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut steps = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((step_id, e)) = map.next_entry::<String, Entry>()? {
                    steps.push(StepTiming {
                        step_id,
                        ct_eff_sec: e.ct_eff_sec,
                        waiting_sec: e.waiting_sec,
                        rework_sec: e.rework_sec,
                        total_sec: e.total_sec,
                    });
                }
                Ok(steps)
            }
        }

        deserializer.deserialize_map(InOrder)
    }
}

impl LeadTime {
    /// Timing for a step id
    pub fn get(&self, step_id: &str) -> Option<&StepTiming> {
        self.by_step.iter().find(|t| t.step_id == step_id)
    }

    /// Waiting seconds for a step, zero when unknown
    pub fn waiting_sec(&self, step_id: &str) -> f64 {
        self.get(step_id).map(|t| t.waiting_sec).unwrap_or(0.0)
    }

    /// Id of the bottleneck step (first one on ties)
    pub fn bottleneck_step(&self) -> Option<&str> {
        if self.by_step.is_empty() {
            return None;
        }
        self.by_step
            .iter()
            .find(|t| t.ct_eff_sec == self.ct_bottleneck_sec)
            .map(|t| t.step_id.as_str())
    }

    /// Copy with every figure rounded to two decimals for display
    pub fn rounded(&self) -> LeadTime {
        LeadTime {
            lead_time_sec: round2(self.lead_time_sec),
            ct_bottleneck_sec: round2(self.ct_bottleneck_sec),
            by_step: self
                .by_step
                .iter()
                .map(|t| StepTiming {
                    step_id: t.step_id.clone(),
                    ct_eff_sec: round2(t.ct_eff_sec),
                    waiting_sec: round2(t.waiting_sec),
                    rework_sec: round2(t.rework_sec),
                    total_sec: round2(t.total_sec),
                })
                .collect(),
        }
    }
}

/// Cycle time inflated by unplanned downtime and changeover losses.
///
/// Falls back to the raw cycle time if the result is non-positive; a step
/// without a cycle time yields zero.
pub fn effective_cycle_time(step: &ProcessStep, available_time_sec: f64) -> f64 {
    let ct = step.ct_sec.unwrap_or(0.0);
    if ct == 0.0 {
        return 0.0;
    }

    let downtime = step.downtime_pct.unwrap_or(0.0);
    let availability = 1.0 - downtime / 100.0;
    if availability <= 0.0 {
        tracing::warn!(
            step = %step.id,
            downtime_pct = downtime,
            "downtime leaves no availability; denominator floored"
        );
    }
    let dt_factor = 1.0 / floor_denominator(availability);

    let co_time = step.co_time_min.unwrap_or(0.0);
    let co_freq = step.co_freq_per_shift.unwrap_or(0.0);
    let co_loss = if co_time != 0.0 && co_freq != 0.0 && available_time_sec > 0.0 {
        (co_time * 60.0) * co_freq / available_time_sec
    } else {
        0.0
    };

    let effective = ct * dt_factor + co_loss;
    if effective > 0.0 {
        effective
    } else {
        ct
    }
}

/// Units per second the bottleneck lets through (zero without a bottleneck)
pub fn throughput(ct_bottleneck_sec: f64) -> f64 {
    if ct_bottleneck_sec > 0.0 {
        1.0 / ct_bottleneck_sec
    } else {
        0.0
    }
}

/// Queueing delay caused by WIP ahead of a station
pub fn waiting_time(wip_units: f64, ct_bottleneck_sec: f64) -> f64 {
    let th = throughput(ct_bottleneck_sec);
    if th <= 0.0 || wip_units == 0.0 {
        return 0.0;
    }
    wip_units / th
}

/// Time spent re-doing units, based on the raw cycle time
pub fn rework_time(step: &ProcessStep) -> f64 {
    step.rework_pct.unwrap_or(0.0) / 100.0 * step.ct_sec.unwrap_or(0.0)
}

/// Compute lead time for a step sequence.
///
/// Figures are kept at full precision; use [`LeadTime::rounded`] for display.
pub fn compute_lead_time(steps: &[ProcessStep], available_time_sec: f64) -> LeadTime {
    if steps.is_empty() {
        return LeadTime::default();
    }

    let ct_eff: Vec<f64> = steps
        .iter()
        .map(|s| effective_cycle_time(s, available_time_sec))
        .collect();
    let ct_bottleneck = ct_eff.iter().copied().fold(0.0, f64::max);

    let mut lead_time = 0.0;
    let mut by_step = Vec::with_capacity(steps.len());
    for (step, ct_eff_sec) in steps.iter().zip(ct_eff) {
        let waiting_sec = waiting_time(step.wip_units_in.unwrap_or(0.0), ct_bottleneck);
        let rework_sec = rework_time(step);
        let total_sec = ct_eff_sec + waiting_sec + rework_sec;

        tracing::debug!(
            step = %step.id,
            ct_eff_sec,
            waiting_sec,
            rework_sec,
            total_sec,
            "step timing"
        );

        lead_time += total_sec;
        by_step.push(StepTiming {
            step_id: step.id.clone(),
            ct_eff_sec,
            waiting_sec,
            rework_sec,
            total_sec,
        });
    }

    LeadTime {
        lead_time_sec: lead_time,
        ct_bottleneck_sec: ct_bottleneck,
        by_step,
    }
}
