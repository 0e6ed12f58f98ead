//! Contingency tables and bias-corrected Cramér's V.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{ensure, Result};

use crate::error::PipelineError;

/// Counts of (true label, predicted label) pairs over observed labels only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contingency {
    /// Sorted true labels, one per row.
    pub row_labels: Vec<usize>,
    /// Sorted predicted labels, one per column.
    pub col_labels: Vec<usize>,
    pub counts: Vec<Vec<u64>>,
}

impl Contingency {
    pub fn shape(&self) -> (usize, usize) {
        (self.row_labels.len(), self.col_labels.len())
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    fn row_sums(&self) -> Vec<f64> {
        self.counts
            .iter()
            .map(|row| row.iter().sum::<u64>() as f64)
            .collect()
    }

    fn col_sums(&self) -> Vec<f64> {
        (0..self.col_labels.len())
            .map(|j| self.counts.iter().map(|row| row[j]).sum::<u64>() as f64)
            .collect()
    }
}

/// Cross-tabulate true against predicted labels.
pub fn crosstab(labels_true: &[usize], labels_hat: &[usize]) -> Result<Contingency> {
    ensure!(
        labels_true.len() == labels_hat.len(),
        "label lengths differ: {} true vs {} predicted",
        labels_true.len(),
        labels_hat.len()
    );
    let rows: BTreeSet<usize> = labels_true.iter().copied().collect();
    let cols: BTreeSet<usize> = labels_hat.iter().copied().collect();
    let row_index: BTreeMap<usize, usize> = rows.iter().enumerate().map(|(i, &l)| (l, i)).collect();
    let col_index: BTreeMap<usize, usize> = cols.iter().enumerate().map(|(i, &l)| (l, i)).collect();

    let mut counts = vec![vec![0u64; cols.len()]; rows.len()];
    for (truth, hat) in labels_true.iter().zip(labels_hat) {
        counts[row_index[truth]][col_index[hat]] += 1;
    }
    Ok(Contingency {
        row_labels: rows.into_iter().collect(),
        col_labels: cols.into_iter().collect(),
        counts,
    })
}

/// Pearson's chi-squared statistic, Yates-corrected when there is one degree of freedom.
pub fn chi2_statistic(table: &Contingency) -> f64 {
    let (r, k) = table.shape();
    let n = table.total() as f64;
    if r < 2 || k < 2 || n == 0.0 {
        return 0.0;
    }
    let yates = (r - 1) * (k - 1) == 1;
    let row_sums = table.row_sums();
    let col_sums = table.col_sums();

    let mut chi2 = 0.0;
    for (i, row) in table.counts.iter().enumerate() {
        for (j, &count) in row.iter().enumerate() {
            let expected = row_sums[i] * col_sums[j] / n;
            let mut observed = count as f64;
            if yates {
                let diff = expected - observed;
                observed += diff.signum() * diff.abs().min(0.5);
            }
            chi2 += (observed - expected).powi(2) / expected;
        }
    }
    chi2
}

/// Cramér's V with Bergsma's small-sample bias correction.
///
/// Tables with a single row or column carry no association and score 0.
pub fn cramers_corrected_stat(table: &Contingency) -> Result<f64> {
    let n = table.total();
    if n < 2 {
        return Err(PipelineError::TooFewObservations {
            needed: 2,
            found: n as usize,
        }
        .into());
    }
    let (r, k) = table.shape();
    let (r, k, n) = (r as f64, k as f64, n as f64);

    let phi2 = chi2_statistic(table) / n;
    let phi2corr = (phi2 - (k - 1.0) * (r - 1.0) / (n - 1.0)).max(0.0);
    let rcorr = r - (r - 1.0).powi(2) / (n - 1.0);
    let kcorr = k - (k - 1.0).powi(2) / (n - 1.0);
    let denom = (kcorr - 1.0).min(rcorr - 1.0);
    if denom <= 0.0 {
        return Ok(0.0);
    }
    Ok((phi2corr / denom).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(counts: Vec<Vec<u64>>) -> Contingency {
        Contingency {
            row_labels: (0..counts.len()).collect(),
            col_labels: (0..counts[0].len()).collect(),
            counts,
        }
    }

    #[test]
    fn yates_applies_only_to_two_by_two() {
        let two = table(vec![vec![10, 0], vec![0, 10]]);
        assert!((chi2_statistic(&two) - 16.2).abs() < 1e-9);

        let three = table(vec![vec![30, 2, 1], vec![3, 25, 4], vec![0, 1, 40]]);
        assert!((chi2_statistic(&three) - 150.170_933_462_888_85).abs() < 1e-9);
    }

    #[test]
    fn single_column_scores_zero() {
        let flat = table(vec![vec![4], vec![6]]);
        assert_eq!(cramers_corrected_stat(&flat).unwrap(), 0.0);
    }
}
