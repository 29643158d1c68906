//! Binary link-classification metrics on host vectors.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MetricsError {
    #[error("no samples to score")]
    Empty,
    #[error("{labels} labels but {scores} scores")]
    LengthMismatch { labels: usize, scores: usize },
    #[error("ROC AUC is undefined when only one class is present")]
    SingleClass,
    #[error("score {index} is not finite ({value})")]
    NonFinite { index: usize, value: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LinkMetrics {
    pub auc: f64,
    pub f1: f64,
    pub precision: f64,
    pub recall: f64,
    pub accuracy: f64,
}

impl LinkMetrics {
    /// One line of the result file.
    pub fn result_line(&self) -> String {
        format!(
            "AUC: {:?}, F1 Score: {:?}, Precision: {:?}, Recall: {:?}, Accuracy: {:?}",
            self.auc, self.f1, self.precision, self.recall, self.accuracy
        )
    }

    pub fn as_array(&self) -> [f64; 5] {
        [self.auc, self.f1, self.precision, self.recall, self.accuracy]
    }

    pub fn from_array(v: [f64; 5]) -> Self {
        Self {
            auc: v[0],
            f1: v[1],
            precision: v[2],
            recall: v[3],
            accuracy: v[4],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Confusion {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_: usize,
}

impl Confusion {
    /// Count outcomes with `score > threshold` as a positive prediction.
    pub fn from_scores(labels: &[bool], scores: &[f32], threshold: f32) -> Self {
        let mut c = Confusion::default();
        for (&label, &score) in labels.iter().zip(scores) {
            match (score > threshold, label) {
                (true, true) => c.tp += 1,
                (true, false) => c.fp += 1,
                (false, true) => c.fn_ += 1,
                (false, false) => c.tn += 1,
            }
        }
        c
    }

    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    pub fn f1(&self) -> f64 {
        ratio(2 * self.tp, 2 * self.tp + self.fp + self.fn_)
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.tp + self.tn + self.fp + self.fn_)
    }
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

/// Area under the ROC curve via the rank-sum statistic; tied scores share their mean rank.
pub fn roc_auc(labels: &[bool], scores: &[f32]) -> Result<f64, MetricsError> {
    check_scores(labels, scores)?;
    let positives = labels.iter().filter(|l| **l).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(MetricsError::SingleClass);
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut positive_rank_sum = 0.0f64;
    let mut i = 0;
    while i < order.len() {
        let mut j = i + 1;
        while j < order.len() && scores[order[j]] == scores[order[i]] {
            j += 1;
        }
        // Ranks are 1-based; the tie group i..j shares the mean of ranks i+1..=j.
        let mean_rank = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            if labels[idx] {
                positive_rank_sum += mean_rank;
            }
        }
        i = j;
    }

    let p = positives as f64;
    let n = negatives as f64;
    Ok((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * n))
}

/// AUC plus thresholded F1/precision/recall/accuracy.
pub fn link_metrics(
    labels: &[bool],
    scores: &[f32],
    threshold: f32,
) -> Result<LinkMetrics, MetricsError> {
    check_scores(labels, scores)?;
    let auc = roc_auc(labels, scores)?;
    let c = Confusion::from_scores(labels, scores, threshold);
    Ok(LinkMetrics {
        auc,
        f1: c.f1(),
        precision: c.precision(),
        recall: c.recall(),
        accuracy: c.accuracy(),
    })
}

fn check_scores(labels: &[bool], scores: &[f32]) -> Result<(), MetricsError> {
    if labels.is_empty() {
        return Err(MetricsError::Empty);
    }
    if labels.len() != scores.len() {
        return Err(MetricsError::LengthMismatch {
            labels: labels.len(),
            scores: scores.len(),
        });
    }
    if let Some((index, &value)) = scores.iter().enumerate().find(|(_, s)| !s.is_finite()) {
        return Err(MetricsError::NonFinite { index, value });
    }
    Ok(())
}

/// Append `metrics.result_line()` to the result file, creating it if needed.
pub fn append_result(path: &Path, metrics: &LinkMetrics) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut f = fs::OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(f, "{}", metrics.result_line())
}

/// Mean and population standard deviation across runs.
pub fn mean_std(runs: &[LinkMetrics]) -> Option<(LinkMetrics, LinkMetrics)> {
    if runs.is_empty() {
        return None;
    }
    let n = runs.len() as f64;
    let mut mean = [0.0f64; 5];
    for m in runs {
        for (acc, v) in mean.iter_mut().zip(m.as_array()) {
            *acc += v / n;
        }
    }
    let mut var = [0.0f64; 5];
    for m in runs {
        for ((acc, v), mu) in var.iter_mut().zip(m.as_array()).zip(mean) {
            *acc += (v - mu).powi(2) / n;
        }
    }
    Some((
        LinkMetrics::from_array(mean),
        LinkMetrics::from_array(var.map(f64::sqrt)),
    ))
}
