//! Per-class classification metrics and report formatting

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metrics for one class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Precision/recall/F1 per class plus accuracy and the usual averages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: (f64, f64, f64),
    pub weighted_avg: (f64, f64, f64),
    pub n_samples: usize,
}

/// Build a classification report from true and predicted labels.
///
/// Labels are rounded to integer classes. `target_names` maps classes (in
/// ascending label order) to display names; missing entries fall back to the
/// numeric label.
pub fn classification_report(
    y_true: &Array1<f64>,
    y_pred: &Array1<f64>,
    target_names: Option<&[&str]>,
) -> ClassificationReport {
    let n_samples = y_true.len();

    // Sorted distinct classes over both vectors
    let mut labels: Vec<i64> = y_true
        .iter()
        .chain(y_pred.iter())
        .map(|v| v.round() as i64)
        .collect();
    labels.sort_unstable();
    labels.dedup();

    let mut classes = Vec::with_capacity(labels.len());
    for (idx, &label) in labels.iter().enumerate() {
        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        let mut support = 0usize;

        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            let t = t.round() as i64;
            let p = p.round() as i64;
            if t == label {
                support += 1;
            }
            match (t == label, p == label) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (false, false) => {}
            }
        }

        let precision = if tp + fp > 0 {
            tp as f64 / (tp + fp) as f64
        } else {
            0.0
        };
        let recall = if tp + fn_ > 0 {
            tp as f64 / (tp + fn_) as f64
        } else {
            0.0
        };
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        let name = target_names
            .and_then(|names| names.get(idx))
            .map(|s| s.to_string())
            .unwrap_or_else(|| label.to_string());

        classes.push(ClassMetrics {
            label: name,
            precision,
            recall,
            f1_score,
            support,
        });
    }

    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t.round() as i64 == p.round() as i64)
        .count();
    let accuracy = if n_samples > 0 {
        correct as f64 / n_samples as f64
    } else {
        0.0
    };

    let n_classes = classes.len().max(1) as f64;
    let macro_avg = (
        classes.iter().map(|c| c.precision).sum::<f64>() / n_classes,
        classes.iter().map(|c| c.recall).sum::<f64>() / n_classes,
        classes.iter().map(|c| c.f1_score).sum::<f64>() / n_classes,
    );

    let total_support = classes.iter().map(|c| c.support).sum::<usize>().max(1) as f64;
    let weighted_avg = (
        classes
            .iter()
            .map(|c| c.precision * c.support as f64)
            .sum::<f64>()
            / total_support,
        classes
            .iter()
            .map(|c| c.recall * c.support as f64)
            .sum::<f64>()
            / total_support,
        classes
            .iter()
            .map(|c| c.f1_score * c.support as f64)
            .sum::<f64>()
            / total_support,
    );

    ClassificationReport {
        classes,
        accuracy,
        macro_avg,
        weighted_avg,
        n_samples,
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>15} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>15} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                c.label, c.precision, c.recall, c.f1_score, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>15} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.n_samples
        )?;
        writeln!(
            f,
            "{:>15} {:>10.2} {:>10.2} {:>10.2} {:>10}",
            "macro avg", self.macro_avg.0, self.macro_avg.1, self.macro_avg.2, self.n_samples
        )?;
        writeln!(
            f,
            "{:>15} {:>10.2} {:>10.2} {:>10.2} {:>10}",
            "weighted avg",
            self.weighted_avg.0,
            self.weighted_avg.1,
            self.weighted_avg.2,
            self.n_samples
        )
    }
}
