//! Binary classification metrics

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{Result, TrainerError};

/// Counts laid out as `[[tn, fp], [fn, tp]]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_positives: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(actual: &[u8], predicted: &[u8]) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(TrainerError::RowMismatch {
                expected: actual.len(),
                actual: predicted.len(),
            });
        }
        let mut cm = Self::default();
        for (&a, &p) in actual.iter().zip(predicted) {
            match (a, p) {
                (0, 0) => cm.true_negatives += 1,
                (0, _) => cm.false_positives += 1,
                (_, 0) => cm.false_negatives += 1,
                _ => cm.true_positives += 1,
            }
        }
        Ok(cm)
    }

    pub fn total(&self) -> usize {
        self.true_negatives + self.false_positives + self.false_negatives + self.true_positives
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_negatives + self.true_positives, self.total())
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.total().to_string().len();
        writeln!(
            f,
            "[[{:>w$} {:>w$}]",
            self.true_negatives,
            self.false_positives,
            w = width
        )?;
        write!(
            f,
            " [{:>w$} {:>w$}]]",
            self.false_negatives,
            self.true_positives,
            w = width
        )
    }
}

/// Zero when the denominator is zero
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

fn weighted_average(classes: &[ClassMetrics; 2], weights: [f64; 2], support: usize) -> ClassMetrics {
    let norm: f64 = weights.iter().sum();
    let avg = |metric: fn(&ClassMetrics) -> f64| {
        if norm == 0.0 {
            0.0
        } else {
            classes.iter().zip(weights).map(|(c, w)| metric(c) * w).sum::<f64>() / norm
        }
    };
    ClassMetrics {
        precision: avg(|c| c.precision),
        recall: avg(|c| c.recall),
        f1: avg(|c| c.f1),
        support,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class precision, recall and F1 with accuracy and averages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Indexed by label: 0 then 1
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn from_confusion(cm: &ConfusionMatrix) -> Self {
        let negative = {
            let precision = ratio(cm.true_negatives, cm.true_negatives + cm.false_negatives);
            let recall = ratio(cm.true_negatives, cm.true_negatives + cm.false_positives);
            ClassMetrics {
                precision,
                recall,
                f1: f1(precision, recall),
                support: cm.true_negatives + cm.false_positives,
            }
        };
        let positive = {
            let precision = ratio(cm.true_positives, cm.true_positives + cm.false_positives);
            let recall = ratio(cm.true_positives, cm.true_positives + cm.false_negatives);
            ClassMetrics {
                precision,
                recall,
                f1: f1(precision, recall),
                support: cm.true_positives + cm.false_negatives,
            }
        };
        let classes = [negative, positive];
        let total = cm.total();

        Self {
            classes,
            accuracy: cm.accuracy(),
            macro_avg: weighted_average(&classes, [1.0, 1.0], total),
            weighted_avg: weighted_average(
                &classes,
                [classes[0].support as f64, classes[1].support as f64],
                total,
            ),
        }
    }

    pub fn positive(&self) -> &ClassMetrics {
        &self.classes[1]
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, label: &str, m: &ClassMetrics) -> fmt::Result {
    writeln!(
        f,
        "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
        label, m.precision, m.recall, m.f1, m.support
    )
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        write_row(f, "0", &self.classes[0])?;
        write_row(f, "1", &self.classes[1])?;
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        write_row(f, "macro avg", &self.macro_avg)?;
        write_row(f, "weighted avg", &self.weighted_avg)
    }
}

/// Confusion matrix and report for one partition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub confusion: ConfusionMatrix,
    pub report: ClassificationReport,
}

impl Evaluation {
    pub fn new(actual: &[u8], predicted: &[u8]) -> Result<Self> {
        let confusion = ConfusionMatrix::from_predictions(actual, predicted)?;
        Ok(Self {
            report: ClassificationReport::from_confusion(&confusion),
            confusion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_confusion_counts() {
        let actual = [0, 0, 0, 1, 1, 1, 1, 0];
        let predicted = [0, 1, 0, 1, 0, 1, 1, 0];
        let cm = ConfusionMatrix::from_predictions(&actual, &predicted).unwrap();
        assert_eq!(cm.true_negatives, 3);
        assert_eq!(cm.false_positives, 1);
        assert_eq!(cm.false_negatives, 1);
        assert_eq!(cm.true_positives, 3);
        assert!(approx(cm.accuracy(), 0.75));
        assert_eq!(cm.to_string(), "[[3 1]\n [1 3]]");
    }

    #[test]
    fn test_report_arithmetic() {
        let cm = ConfusionMatrix {
            true_negatives: 50,
            false_positives: 10,
            false_negatives: 5,
            true_positives: 35,
        };
        let report = ClassificationReport::from_confusion(&cm);

        let pos = report.positive();
        assert!(approx(pos.precision, 35.0 / 45.0));
        assert!(approx(pos.recall, 35.0 / 40.0));
        assert_eq!(pos.support, 40);
        assert!(approx(
            pos.f1,
            2.0 * pos.precision * pos.recall / (pos.precision + pos.recall)
        ));

        let neg = &report.classes[0];
        assert!(approx(neg.precision, 50.0 / 55.0));
        assert!(approx(neg.recall, 50.0 / 60.0));

        assert!(approx(report.accuracy, 0.85));
        assert!(approx(report.macro_avg.recall, (50.0 / 60.0 + 35.0 / 40.0) / 2.0));
        assert!(approx(
            report.weighted_avg.recall,
            (60.0 * (50.0 / 60.0) + 40.0 * (35.0 / 40.0)) / 100.0
        ));
        assert_eq!(report.weighted_avg.support, 100);
    }

    #[test]
    fn test_zero_division_is_zero() {
        let report = ClassificationReport::from_confusion(&ConfusionMatrix {
            true_negatives: 4,
            ..Default::default()
        });
        assert_eq!(report.positive().precision, 0.0);
        assert_eq!(report.positive().recall, 0.0);
        assert_eq!(report.positive().f1, 0.0);
        assert!(approx(report.accuracy, 1.0));
    }

    #[test]
    fn test_report_rendering() {
        let evaluation = Evaluation::new(&[0, 1, 1, 0], &[0, 1, 0, 0]).unwrap();
        let text = evaluation.report.to_string();
        assert!(text.contains("precision"));
        assert!(text.contains("macro avg"));
        assert!(text.contains("weighted avg"));
        assert!(text.lines().any(|l| l.trim_start().starts_with("accuracy")));
    }
}
