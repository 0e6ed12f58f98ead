use domain_clusters::clustering::cramers::{
    chi2_statistic, cramers_corrected_stat, crosstab, Contingency,
};

fn table(counts: Vec<Vec<u64>>) -> Contingency {
    Contingency {
        row_labels: (0..counts.len()).collect(),
        col_labels: (0..counts[0].len()).collect(),
        counts,
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn corrected_v_matches_reference_values() {
    assert_close(
        cramers_corrected_stat(&table(vec![vec![10, 0], vec![0, 10]])).unwrap(),
        0.894_116_572_066_777_2,
    );
    assert_close(
        cramers_corrected_stat(&table(vec![vec![20, 5], vec![4, 21]])).unwrap(),
        0.589_283_979_906_427_6,
    );
    assert_close(
        cramers_corrected_stat(&table(vec![
            vec![30, 2, 1],
            vec![3, 25, 4],
            vec![0, 1, 40],
        ]))
        .unwrap(),
        0.838_266_318_131_491_1,
    );
    assert_close(
        cramers_corrected_stat(&table(vec![vec![12, 3, 0, 1], vec![2, 14, 6, 0]])).unwrap(),
        0.692_906_156_355_967_3,
    );
}

#[test]
fn independent_labels_score_zero() {
    let uniform = table(vec![vec![5, 5, 5], vec![5, 5, 5]]);
    assert_close(chi2_statistic(&uniform), 0.0);
    assert_close(cramers_corrected_stat(&uniform).unwrap(), 0.0);
}

#[test]
fn small_samples_are_shrunk_to_zero() {
    // phi^2 falls below its bias term for tiny perfect tables.
    let tiny = table(vec![vec![2, 0], vec![0, 2]]);
    assert_close(cramers_corrected_stat(&tiny).unwrap(), 0.0);
}

#[test]
fn needs_two_observations() {
    let single = crosstab(&[0], &[3]).unwrap();
    assert!(cramers_corrected_stat(&single).is_err());
}

#[test]
fn crosstab_keeps_only_observed_labels() {
    let truth = [0, 0, 2, 2, 2];
    let hat = [5, 5, 1, 1, 5];
    let table = crosstab(&truth, &hat).unwrap();
    assert_eq!(table.row_labels, vec![0, 2]);
    assert_eq!(table.col_labels, vec![1, 5]);
    assert_eq!(table.counts, vec![vec![0, 2], vec![2, 1]]);
    assert_eq!(table.total(), 5);
}

#[test]
fn crosstab_rejects_length_mismatch() {
    assert!(crosstab(&[0, 1], &[0]).is_err());
}
