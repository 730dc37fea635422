use super::*;

const EPS: f64 = 1e-6;

fn range(min: i64, max: i64) -> ScoreRange {
    ScoreRange::new(min, max)
}

#[test]
fn test_qwk_identical_non_constant_is_one() {
    let scores = [2, 5, 7, 12, 9, 3];
    let kappa = weighted_kappa(&scores, &scores, range(2, 12), Weighting::Quadratic);
    assert_eq!(kappa, 1.0);
    let kappa = weighted_kappa(&scores, &scores, range(2, 12), Weighting::Linear);
    assert_eq!(kappa, 1.0);
}

#[test]
fn test_qwk_hand_computed() {
    let truth = [1, 2, 3];
    let pred = [1, 2, 2];
    let qwk = weighted_kappa(&truth, &pred, range(1, 3), Weighting::Quadratic);
    assert!((qwk - 2.0 / 3.0).abs() < EPS, "qwk = {}", qwk);
}

#[test]
fn test_lwk_hand_computed() {
    let truth = [1, 2, 3];
    let pred = [1, 2, 2];
    let lwk = weighted_kappa(&truth, &pred, range(1, 3), Weighting::Linear);
    assert!((lwk - 4.0 / 7.0).abs() < EPS, "lwk = {}", lwk);
}

#[test]
fn test_quadratic_penalizes_distance_more_than_linear() {
    let truth = [0, 1, 2, 3, 4, 0, 1, 2, 3, 4];
    let pred = [0, 1, 2, 3, 4, 4, 1, 2, 3, 0];
    let qwk = weighted_kappa(&truth, &pred, range(0, 4), Weighting::Quadratic);
    let lwk = weighted_kappa(&truth, &pred, range(0, 4), Weighting::Linear);
    assert!(qwk < lwk, "qwk {} should be below lwk {}", qwk, lwk);
}

#[test]
fn test_kappa_identical_constant_is_perfect() {
    let scores = [3, 3, 3, 3];
    assert_eq!(
        weighted_kappa(&scores, &scores, range(0, 4), Weighting::Quadratic),
        1.0
    );
}

#[test]
fn test_kappa_different_constants_is_zero() {
    let kappa = weighted_kappa(&[1, 1, 1], &[3, 3, 3], range(0, 4), Weighting::Quadratic);
    assert!(kappa.abs() < EPS);
}

#[test]
fn test_kappa_clamps_values_outside_scale() {
    let clamped = weighted_kappa(&[0, 2, 9], &[1, 2, 3], range(1, 3), Weighting::Quadratic);
    let in_range = weighted_kappa(&[1, 2, 3], &[1, 2, 3], range(1, 3), Weighting::Quadratic);
    assert_eq!(clamped, in_range);
}

#[test]
fn test_kappa_empty_is_zero() {
    assert_eq!(weighted_kappa(&[], &[], range(0, 4), Weighting::Linear), 0.0);
}

#[test]
fn test_correlation_constant_sequences_is_zero() {
    let corr = pearson_correlation(&[4, 4, 4], &[4, 4, 4]);
    assert_eq!(corr, 0.0);
    assert!(!corr.is_nan());
    assert_eq!(pearson_correlation(&[1, 2, 3], &[2, 2, 2]), 0.0);
}

#[test]
fn test_correlation_hand_computed() {
    let corr = pearson_correlation(&[1, 2, 3], &[1, 2, 2]);
    assert!((corr - 0.75_f64.sqrt()).abs() < EPS, "corr = {}", corr);
    assert!((pearson_correlation(&[1, 2, 3], &[3, 2, 1]) + 1.0).abs() < EPS);
}

#[test]
fn test_errors_on_raw_scale() {
    let truth = [2, 12, 7];
    let pred = [4, 12, 6];
    assert!((root_mean_squared_error(&truth, &pred) - (5.0_f64 / 3.0).sqrt()).abs() < EPS);
    assert!((mean_absolute_error(&truth, &pred) - 1.0).abs() < EPS);
}

#[test]
fn test_evaluate_item_collects_all_statistics() {
    let metrics = MetricEngine::evaluate_item(&[1, 2, 3], &[1, 2, 2], range(1, 3)).unwrap();
    assert!((metrics.qwk - 2.0 / 3.0).abs() < EPS);
    assert!((metrics.lwk - 4.0 / 7.0).abs() < EPS);
    assert!((metrics.rmse - (1.0_f64 / 3.0).sqrt()).abs() < EPS);
    assert!((metrics.mae - 1.0 / 3.0).abs() < EPS);
    assert_eq!(metrics.get(Statistic::Corr), metrics.corr);
}

#[test]
fn test_evaluate_item_rejects_out_of_range() {
    let err = MetricEngine::evaluate_item(&[1, 2, 7], &[1, 2, 2], range(1, 6)).unwrap_err();
    assert!(matches!(err, EssayCvError::InvalidData { .. }));
}

#[test]
fn test_evaluate_item_rejects_length_mismatch() {
    let err = MetricEngine::evaluate_item(&[1, 2], &[1], range(1, 6)).unwrap_err();
    assert!(matches!(err, EssayCvError::ShapeMismatch { .. }));
}

#[test]
fn test_evaluate_uses_per_item_ranges() {
    let truth = vec![vec![2, 1], vec![12, 6], vec![7, 3]];
    let pred = truth.clone();
    let epoch =
        MetricEngine::evaluate(&truth, &pred, &[range(2, 12), range(1, 6)]).unwrap();

    assert_eq!(epoch.items.len(), 2);
    assert_eq!(epoch.column(Statistic::Qwk), vec![1.0, 1.0]);
    assert_eq!(epoch.column(Statistic::Rmse), vec![0.0, 0.0]);
    assert_eq!(epoch.overall().map(|m| m.corr), Some(1.0));
}

#[test]
fn test_statistic_names() {
    let names: Vec<&str> = Statistic::ALL.iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["qwk", "lwk", "rmse", "mae", "corr"]);
}
