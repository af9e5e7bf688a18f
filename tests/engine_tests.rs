//! Engine tests: scoring and observation properties over the library API

use vsm::core::{
    analyze, compute_lead_time, priority_index, score_wastes, AnalysisOptions, Confidence,
    ProcessStep, PushPull, RuleBook, WasteCategory,
};

const SHIFT_SEC: f64 = 8.0 * 3600.0;

fn rules() -> RuleBook {
    RuleBook::embedded().unwrap()
}

fn line() -> Vec<ProcessStep> {
    let mut p1 = ProcessStep::new("P1", "Cutting");
    p1.ct_sec = Some(60.0);
    p1.wip_units_in = Some(300.0);
    p1.push_pull = Some(PushPull::Push);
    p1.distance_m = Some(40.0);

    let mut p2 = ProcessStep::new("P2", "Welding");
    p2.ct_sec = Some(90.0);
    p2.downtime_pct = Some(10.0);
    p2.defect_pct = Some(6.0);
    p2.rework_pct = Some(4.0);
    p2.waiting_starved_pct = Some(15.0);

    let mut p3 = ProcessStep::new("P3", "Assembly");
    p3.ct_sec = Some(45.0);
    p3.push_pull = Some(PushPull::Pull);
    p3.walk_m_per_unit = Some(5.0);

    vec![p1, p2, p3]
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}

// ============================================================================
// Lead Time Properties
// ============================================================================

#[test]
fn test_lead_time_is_sum_of_step_totals() {
    let lt = compute_lead_time(&line(), SHIFT_SEC);
    let sum: f64 = lt.by_step.iter().map(|t| t.total_sec).sum();
    assert_close(lt.lead_time_sec, sum);
    // 60 + 300 × 100 + 100 + 3.6 + 45
    assert_close(lt.lead_time_sec, 30_208.6);
}

#[test]
fn test_bottleneck_is_max_effective_cycle_time() {
    let lt = compute_lead_time(&line(), SHIFT_SEC);
    let max = lt.by_step.iter().map(|t| t.ct_eff_sec).fold(0.0, f64::max);
    assert_close(lt.ct_bottleneck_sec, max);
    assert_close(lt.ct_bottleneck_sec, 100.0);
    assert_eq!(lt.bottleneck_step(), Some("P2"));
}

#[test]
fn test_zero_wip_means_zero_waiting() {
    let lt = compute_lead_time(&line(), SHIFT_SEC);
    assert_eq!(lt.waiting_sec("P2"), 0.0);
    assert_eq!(lt.waiting_sec("P3"), 0.0);
    assert_close(lt.waiting_sec("P1"), 30_000.0);
}

// ============================================================================
// Waste Score Properties
// ============================================================================

#[test]
fn test_scores_within_range() {
    let rules = rules();
    let mut extreme = ProcessStep::new("X", "Extreme");
    extreme.defect_pct = Some(500.0);
    extreme.waiting_starved_pct = Some(100.0);
    extreme.walk_m_per_unit = Some(1_000.0);
    extreme.wip_units_in = Some(1e9);
    extreme.layout_moves = Some(50);

    for step in line().iter().chain(std::iter::once(&extreme)) {
        let ws = score_wastes(step, &rules).unwrap();
        for waste in WasteCategory::ALL {
            let s = ws.score(waste);
            assert!((0.0..=5.0).contains(&s), "{} {} = {}", step.id, waste, s);
        }
    }
}

#[test]
fn test_scoring_is_idempotent() {
    let rules = rules();
    for step in line() {
        assert_eq!(
            score_wastes(&step, &rules).unwrap(),
            score_wastes(&step, &rules).unwrap()
        );
    }
}

#[test]
fn test_defect_score_monotonic_in_defect_rate() {
    let rules = rules();
    let mut previous = 0.0;
    for pct in [0.0, 1.0, 2.9, 3.0, 4.0, 5.0, 8.0, 20.0] {
        let mut step = ProcessStep::new("P1", "Cutting");
        step.defect_pct = Some(pct);
        let score = score_wastes(&step, &rules)
            .unwrap()
            .score(WasteCategory::Defects);
        assert!(score >= previous, "score dropped at {}%", pct);
        previous = score;
    }
}

#[test]
fn test_explicit_answer_overrides_inference() {
    let rules = rules();
    let mut step = ProcessStep::new("P1", "Cutting");
    step.defect_pct = Some(10.0);
    let step = step
        .with_answer("defects_above_target", Some(false))
        .with_answer("defects_recurring", Some(false));
    let ws = score_wastes(&step, &rules).unwrap();
    assert_eq!(ws.score(WasteCategory::Defects), 0.0);
    // answered only, nothing inferred from measurements
    assert_eq!(ws.confidence(WasteCategory::Defects), Confidence::Low);
}

#[test]
fn test_unmeasured_step_scores_zero_with_low_confidence() {
    let rules = rules();
    let ws = score_wastes(&ProcessStep::new("P9", "Empty"), &rules).unwrap();
    for waste in WasteCategory::ALL {
        assert_eq!(ws.score(waste), 0.0);
        assert_eq!(ws.confidence(waste), Confidence::Low);
    }
}

// ============================================================================
// Observation Properties
// ============================================================================

#[test]
fn test_zero_scores_produce_no_observations() {
    let rules = rules();
    let analysis = analyze(&line(), &rules, AnalysisOptions::default()).unwrap();
    for obs in &analysis.observations {
        let ws = analysis.scores_for(&obs.step_id).unwrap();
        assert!(ws.score(obs.waste) > 0.0);
    }
    // inventory, overproduction, transportation, defects, waiting, motion
    assert_eq!(analysis.observations.len(), 6);
}

#[test]
fn test_priority_index_bounds() {
    let rules = rules();
    let t = &rules.thresholds;
    for confidence in [Confidence::Low, Confidence::Medium, Confidence::High] {
        for score in [0.0, 0.5, 2.5, 5.0] {
            for downtime in [None, Some(0.0), Some(50.0)] {
                let rpn = priority_index(score, confidence, downtime, t);
                assert!((0.0..=100.0).contains(&rpn));
            }
        }
    }
}

#[test]
fn test_observations_ranked_by_priority() {
    let rules = rules();
    let analysis = analyze(&line(), &rules, AnalysisOptions::default()).unwrap();
    for pair in analysis.observations.windows(2) {
        assert!(pair[0].rpn_pct >= pair[1].rpn_pct);
        if pair[0].rpn_pct == pair[1].rpn_pct {
            assert!(pair[0].score >= pair[1].score);
        }
    }
    let first = &analysis.observations[0];
    assert_eq!(first.rpn_pct, 66.7);
    let last = analysis.observations.last().unwrap();
    assert_eq!((last.step_id.as_str(), last.waste), ("P3", WasteCategory::Motion));
    assert_eq!(last.rpn_pct, 50.0);
}

#[test]
fn test_waiting_observation_names_previous_step() {
    let rules = rules();
    let analysis = analyze(&line(), &rules, AnalysisOptions::default()).unwrap();
    let waiting = analysis
        .observations
        .iter()
        .find(|o| o.step_id == "P2" && o.waste == WasteCategory::Waiting)
        .unwrap();
    assert_eq!(waiting.confidence, Confidence::High);
    assert!(waiting.text.contains("Welding"));
    assert!(waiting.text.contains("from Cutting"));
    assert!(waiting.text.contains("15%"));
}

#[test]
fn test_first_step_waiting_text_omits_upstream() {
    let rules = rules();
    let mut step = ProcessStep::new("P1", "Cutting");
    step.waiting_starved_pct = Some(30.0);
    let analysis = analyze(&[step], &rules, AnalysisOptions::default()).unwrap();
    let waiting = analysis
        .observations
        .iter()
        .find(|o| o.waste == WasteCategory::Waiting)
        .unwrap();
    assert!(waiting.text.contains("for material and is starved 30%"));
    assert!(!waiting.text.contains("from "));
}

#[test]
fn test_top_wastes_per_step() {
    let rules = rules();
    let analysis = analyze(&line(), &rules, AnalysisOptions::default()).unwrap();
    let p1 = &analysis.top_wastes[0];
    assert_eq!(p1.step_id, "P1");
    assert_eq!(
        p1.wastes,
        vec![(WasteCategory::Inventory, 5.0), (WasteCategory::Overproduction, 3.0)]
    );
}

// ============================================================================
// Reference Scenarios
// ============================================================================

#[test]
fn test_scenario_single_step() {
    let mut step = ProcessStep::new("P1", "Press");
    step.ct_sec = Some(70.0 * 60.0);
    step.downtime_pct = Some(0.0);
    step.co_time_min = Some(0.0);

    let lt = compute_lead_time(&[step], SHIFT_SEC);
    assert_close(lt.by_step[0].ct_eff_sec, 4200.0);
    assert_close(lt.ct_bottleneck_sec, 4200.0);
    assert_close(lt.lead_time_sec, 4200.0);
}

#[test]
fn test_scenario_wip_waiting() {
    let mut steps = Vec::new();
    for (id, wip) in [("P1", 400.0), ("P2", 250.0), ("P3", 300.0)] {
        let mut s = ProcessStep::new(id, id);
        s.ct_sec = Some(if id == "P2" { 4200.0 } else { 600.0 });
        s.wip_units_in = Some(wip);
        steps.push(s);
    }
    let lt = compute_lead_time(&steps, SHIFT_SEC);
    assert_close(lt.ct_bottleneck_sec, 4200.0);
    assert_close(lt.waiting_sec("P1"), 1_680_000.0);
    assert_close(lt.waiting_sec("P2"), 1_050_000.0);
}

#[test]
fn test_scenario_defect_at_threshold() {
    let mut step = ProcessStep::new("P1", "Welding");
    step.defect_pct = Some(5.0);
    let ws = score_wastes(&step, &rules()).unwrap();
    assert_eq!(ws.score(WasteCategory::Defects), 5.0);
    assert_eq!(ws.confidence(WasteCategory::Defects), Confidence::High);
}

#[test]
fn test_scenario_push_vs_pull() {
    let rules = rules();
    let mut push = ProcessStep::new("P1", "Cutting");
    push.push_pull = Some(PushPull::Push);
    let mut pull = ProcessStep::new("P2", "Welding");
    pull.push_pull = Some(PushPull::Pull);

    let push_score = score_wastes(&push, &rules)
        .unwrap()
        .score(WasteCategory::Overproduction);
    let pull_score = score_wastes(&pull, &rules)
        .unwrap()
        .score(WasteCategory::Overproduction);
    assert!(push_score > 0.0);
    assert_eq!(pull_score, 0.0);
}
