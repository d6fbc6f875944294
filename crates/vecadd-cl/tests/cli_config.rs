//! Host-seitige Prüfungen ohne OpenCL-Gerät.

use vecadd_cl::{ClError, Fill, ReportMode, RunConfig, report};

#[test]
fn default_run_is_the_classic_example() {
    let cfg = RunConfig::default();
    cfg.validate().unwrap();
    let (a, b) = cfg.inputs();
    let expected: Vec<f32> = a.iter().zip(&b).map(|(x, y)| x + y).collect();
    assert!(expected.iter().all(|&x| x == 3.0));
    assert!(report::verify(&a, &b, &expected).is_correct());
}

#[test]
fn invalid_configs_are_caught_before_any_driver_call() {
    let cases = [
        RunConfig { len: 0, ..RunConfig::default() },
        RunConfig { len: usize::MAX, ..RunConfig::default() },
        RunConfig { b_value: f32::INFINITY, ..RunConfig::default() },
        RunConfig { fill: Fill::Ramp, len: 1 << 24, ..RunConfig::default() },
        RunConfig { mode: ReportMode::Sample, sample_count: 0, ..RunConfig::default() },
    ];
    for cfg in cases {
        let err = cfg.validate().unwrap_err();
        assert!(
            matches!(err, ClError::InvalidSize(_) | ClError::Config(_)),
            "unexpected error for {cfg:?}: {err}"
        );
    }
}

#[test]
fn sample_mode_prints_leading_values() {
    let cfg = RunConfig { len: 4, fill: Fill::Ramp, ..RunConfig::default() };
    let (a, b) = cfg.inputs();
    let c: Vec<f32> = a.iter().zip(&b).map(|(x, y)| x + y).collect();
    assert_eq!(report::sample(&c, 3), vec!["C[0] = 0", "C[1] = 3", "C[2] = 6"]);
}
