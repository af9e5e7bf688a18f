//! Step loading and lead-time tests over real files

mod common;

use common::{write_temp, LINE_CSV, LINE_YAML};
use vsm::core::{compute_lead_time, load_steps, InputError, StepError};

const SHIFT_SEC: f64 = 8.0 * 3600.0;

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_yaml_and_csv_load_the_same_line() {
    let (_y, yaml) = write_temp("line.yaml", LINE_YAML);
    let (_c, csv) = write_temp("line.csv", LINE_CSV);

    let from_yaml = load_steps(&yaml).unwrap();
    let from_csv = load_steps(&csv).unwrap();

    assert_eq!(from_yaml.len(), 3);
    assert_eq!(from_csv.len(), 3);
    for (a, b) in from_yaml.iter().zip(&from_csv) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.ct_sec, b.ct_sec);
        assert_eq!(a.wip_units_in, b.wip_units_in);
        assert_eq!(a.push_pull, b.push_pull);
        assert_eq!(a.defect_pct, b.defect_pct);
    }
    assert_eq!(
        compute_lead_time(&from_yaml, SHIFT_SEC),
        compute_lead_time(&from_csv, SHIFT_SEC)
    );
}

#[test]
fn test_loading_links_neighbours() {
    let (_tmp, path) = write_temp("line.yaml", LINE_YAML);
    let steps = load_steps(&path).unwrap();
    assert_eq!(steps[0].prev_id, None);
    assert_eq!(steps[0].next_id.as_deref(), Some("P2"));
    assert_eq!(steps[1].prev_id.as_deref(), Some("P1"));
    assert_eq!(steps[2].next_id, None);
}

#[test]
fn test_duplicate_ids_rejected() {
    let (_tmp, path) = write_temp("dup.yaml", "- id: P1\n- id: P1\n");
    let err = load_steps(&path).unwrap_err();
    assert!(matches!(err, InputError::Steps(StepError::DuplicateId(ref id)) if id == "P1"));
}

#[test]
fn test_empty_id_rejected() {
    let (_tmp, path) = write_temp("empty.yaml", "- id: P1\n- id: ''\n");
    let err = load_steps(&path).unwrap_err();
    assert!(matches!(err, InputError::Steps(StepError::EmptyId(2))));
}

#[test]
fn test_yaml_syntax_error_reports_file() {
    let (_tmp, path) = write_temp("bad.yaml", "- id: P1\n  ct_sec: [60\n");
    let err = load_steps(&path).unwrap_err();
    assert!(matches!(err, InputError::Yaml(_)));
}

#[test]
fn test_missing_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = load_steps(&tmp.path().join("nope.yaml")).unwrap_err();
    assert!(matches!(err, InputError::Io { .. }));
}

// ============================================================================
// Timing Edge Cases
// ============================================================================

#[test]
fn test_empty_sequence() {
    let (_tmp, path) = write_temp("empty.yaml", "steps: []\n");
    let steps = load_steps(&path).unwrap();
    let lt = compute_lead_time(&steps, SHIFT_SEC);
    assert_eq!(lt.lead_time_sec, 0.0);
    assert_eq!(lt.ct_bottleneck_sec, 0.0);
    assert!(lt.by_step.is_empty());
}

#[test]
fn test_full_downtime_stays_finite() {
    let (_tmp, path) = write_temp("down.yaml", "- id: P1\n  ct_sec: 60\n  downtime_pct: 100\n");
    let steps = load_steps(&path).unwrap();
    let lt = compute_lead_time(&steps, SHIFT_SEC);
    assert!(lt.lead_time_sec.is_finite());
    assert!(lt.lead_time_sec > 60.0);
}

#[test]
fn test_changeover_loss_added() {
    let yaml = "- id: P1\n  ct_sec: 60\n  co_time_min: 30\n  co_freq_per_shift: 2\n";
    let (_tmp, path) = write_temp("co.yaml", yaml);
    let steps = load_steps(&path).unwrap();
    let lt = compute_lead_time(&steps, SHIFT_SEC);
    // 60 + 1800 × 2 / 28800
    assert!((lt.by_step[0].ct_eff_sec - 60.125).abs() < 1e-9);
}

#[test]
fn test_steps_without_cycle_time() {
    let (_tmp, path) = write_temp("bare.yaml", "- id: P1\n  wip_units_in: 50\n- id: P2\n");
    let steps = load_steps(&path).unwrap();
    let lt = compute_lead_time(&steps, SHIFT_SEC);
    assert_eq!(lt.ct_bottleneck_sec, 0.0);
    assert_eq!(lt.waiting_sec("P1"), 0.0);
    assert_eq!(lt.lead_time_sec, 0.0);
}

#[test]
fn test_untimed_step_with_wip_still_waits() {
    let yaml = "- id: A\n  wip_units_in: 10\n- id: B\n  ct_sec: 60\n";
    let (_tmp, path) = write_temp("mixed.yaml", yaml);
    let steps = load_steps(&path).unwrap();
    let lt = compute_lead_time(&steps, SHIFT_SEC);
    assert_eq!(lt.by_step[0].ct_eff_sec, 0.0);
    assert_eq!(lt.waiting_sec("A"), 600.0);
    assert_eq!(lt.lead_time_sec, 660.0);
}

#[test]
fn test_lead_time_is_idempotent() {
    let (_tmp, path) = write_temp("line.yaml", LINE_YAML);
    let steps = load_steps(&path).unwrap();
    assert_eq!(
        compute_lead_time(&steps, SHIFT_SEC),
        compute_lead_time(&steps, SHIFT_SEC)
    );
}
