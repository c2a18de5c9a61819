//! Predictive models over case features.
//!
//! Two small native models: an ordinary-least-squares regressor for case
//! duration and a logistic classifier for reopen risk. Both train on the
//! features from [`super::features`] and serialize to JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::features::{CaseFeatures, FEATURE_COUNT};
use crate::error::ModelError;

/// Minimum cases needed to fit either model.
pub const MIN_TRAINING_CASES: usize = FEATURE_COUNT + 2;

/// Every `HOLDOUT_STRIDE`-th case (by case id) is held out for evaluation.
const HOLDOUT_STRIDE: usize = 5;

const LEARNING_RATE: f64 = 0.1;
const EPOCHS: usize = 2_000;
const L2: f64 = 1e-4;

/// Hold-out evaluation of a fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub train_cases: usize,
    pub test_cases: usize,
    /// Mean absolute error (hours) for regression, error rate for classification.
    pub error: f64,
    /// Coefficient of determination for regression, accuracy for classification.
    pub score: f64,
}

/// Linear regression predicting case duration in hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationModel {
    /// Intercept followed by one weight per feature.
    pub coefficients: [f64; FEATURE_COUNT + 1],
    pub trained_at: DateTime<Utc>,
    pub evaluation: Evaluation,
}

impl DurationModel {
    /// Fit on all cases after evaluating on a deterministic hold-out split.
    ///
    /// # Errors
    ///
    /// [`ModelError::InsufficientData`] below [`MIN_TRAINING_CASES`] cases.
    pub fn train(cases: &[CaseFeatures]) -> Result<Self, ModelError> {
        ensure_enough(cases)?;
        let (train, test) = split(cases);

        let holdout = fit_least_squares(&train);
        let eval_set = if test.is_empty() { &train } else { &test };
        let predictions: Vec<f64> = eval_set.iter().map(|c| linear(&holdout, c)).collect();
        let actual: Vec<f64> = eval_set.iter().map(|c| c.duration_hours).collect();

        let evaluation = Evaluation {
            train_cases: train.len(),
            test_cases: test.len(),
            error: mean_absolute_error(&actual, &predictions),
            score: r_squared(&actual, &predictions),
        };

        let all: Vec<&CaseFeatures> = cases.iter().collect();
        Ok(Self {
            coefficients: fit_least_squares(&all),
            trained_at: Utc::now(),
            evaluation,
        })
    }

    /// Predicted duration in hours, never negative.
    #[must_use]
    pub fn predict(&self, features: &CaseFeatures) -> f64 {
        linear(&self.coefficients, features).max(0.0)
    }
}

/// Logistic regression estimating the probability that a case reopens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReopenRiskModel {
    pub kind: ReopenRiskKind,
    pub trained_at: DateTime<Utc>,
    pub evaluation: Evaluation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReopenRiskKind {
    /// Standardized logistic regression.
    Logistic {
        means: [f64; FEATURE_COUNT],
        scales: [f64; FEATURE_COUNT],
        bias: f64,
        weights: [f64; FEATURE_COUNT],
    },
    /// Training data held a single class; every case gets its rate.
    Constant { probability: f64 },
}

/// Reopen probability of one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    pub case_id: String,
    pub reopen_risk_prob: f64,
}

impl ReopenRiskModel {
    /// # Errors
    ///
    /// [`ModelError::InsufficientData`] below [`MIN_TRAINING_CASES`] cases.
    pub fn train(cases: &[CaseFeatures]) -> Result<Self, ModelError> {
        ensure_enough(cases)?;
        let (train, test) = split(cases);

        let holdout = fit_logistic(&train);
        let eval_set = if test.is_empty() { &train } else { &test };
        let correct = eval_set
            .iter()
            .filter(|c| (probability(&holdout, c) >= 0.5) == c.will_reopen())
            .count();
        let accuracy = correct as f64 / eval_set.len() as f64;

        let all: Vec<&CaseFeatures> = cases.iter().collect();
        Ok(Self {
            kind: fit_logistic(&all),
            trained_at: Utc::now(),
            evaluation: Evaluation {
                train_cases: train.len(),
                test_cases: test.len(),
                error: 1.0 - accuracy,
                score: accuracy,
            },
        })
    }

    #[must_use]
    pub fn predict(&self, features: &CaseFeatures) -> f64 {
        probability(&self.kind, features)
    }

    /// Highest-risk cases first, ties by case id, truncated to `top`.
    #[must_use]
    pub fn rank(&self, cases: &[CaseFeatures], top: usize) -> Vec<RiskScore> {
        let mut scores: Vec<RiskScore> = cases
            .iter()
            .map(|c| RiskScore {
                case_id: c.case_id.clone(),
                reopen_risk_prob: self.predict(c),
            })
            .collect();
        scores.sort_by(|a, b| {
            b.reopen_risk_prob
                .total_cmp(&a.reopen_risk_prob)
                .then_with(|| a.case_id.cmp(&b.case_id))
        });
        scores.truncate(top);
        scores
    }
}

fn ensure_enough(cases: &[CaseFeatures]) -> Result<(), ModelError> {
    if cases.len() < MIN_TRAINING_CASES {
        return Err(ModelError::InsufficientData {
            needed: MIN_TRAINING_CASES,
            have: cases.len(),
        });
    }
    Ok(())
}

fn split(cases: &[CaseFeatures]) -> (Vec<&CaseFeatures>, Vec<&CaseFeatures>) {
    let mut sorted: Vec<&CaseFeatures> = cases.iter().collect();
    sorted.sort_by(|a, b| a.case_id.cmp(&b.case_id));

    let (mut train, mut test) = (Vec::new(), Vec::new());
    for (idx, case) in sorted.into_iter().enumerate() {
        if idx % HOLDOUT_STRIDE == HOLDOUT_STRIDE - 1 {
            test.push(case);
        } else {
            train.push(case);
        }
    }
    (train, test)
}

fn linear(coefficients: &[f64; FEATURE_COUNT + 1], features: &CaseFeatures) -> f64 {
    let x = features.vector();
    coefficients[0]
        + x.iter()
            .zip(&coefficients[1..])
            .map(|(xi, wi)| xi * wi)
            .sum::<f64>()
}

/// Least squares on mean-centered features; the intercept is recovered
/// from the means. A feature that never varies, or that is a linear
/// combination of earlier ones, gets a zero weight.
fn fit_least_squares(cases: &[&CaseFeatures]) -> [f64; FEATURE_COUNT + 1] {
    let n = cases.len() as f64;
    let xs: Vec<[f64; FEATURE_COUNT]> = cases.iter().map(|c| c.vector()).collect();
    let y_mean = cases.iter().map(|c| c.duration_hours).sum::<f64>() / n;
    let mut means = [0.0f64; FEATURE_COUNT];
    for (j, m) in means.iter_mut().enumerate() {
        *m = xs.iter().map(|x| x[j]).sum::<f64>() / n;
    }

    let mut xtx = [[0.0f64; FEATURE_COUNT]; FEATURE_COUNT];
    let mut xty = [0.0f64; FEATURE_COUNT];
    for (x, case) in xs.iter().zip(cases) {
        let y = case.duration_hours - y_mean;
        for i in 0..FEATURE_COUNT {
            let di = x[i] - means[i];
            xty[i] += di * y;
            for j in 0..FEATURE_COUNT {
                xtx[i][j] += di * (x[j] - means[j]);
            }
        }
    }

    let weights = solve(xtx, xty);
    let intercept = y_mean - dot(&weights, &means);
    [intercept, weights[0], weights[1], weights[2]]
}

/// Gaussian elimination with partial pivoting to row echelon form.
///
/// A column without a usable pivot is free and its unknown is set to zero,
/// which still solves the consistent normal equations of a rank-deficient
/// design.
fn solve<const N: usize>(mut a: [[f64; N]; N], mut b: [f64; N]) -> [f64; N] {
    let scale = (0..N).map(|i| a[i][i].abs()).fold(0.0, f64::max);
    let tolerance = scale * 1e-10;
    let mut pivot_rows = [None; N];
    let mut row = 0;
    for col in 0..N {
        if row == N {
            break;
        }
        let pivot = (row..N)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(row);
        if a[pivot][col].abs() <= tolerance {
            continue;
        }
        a.swap(row, pivot);
        b.swap(row, pivot);

        for below in (row + 1)..N {
            let factor = a[below][col] / a[row][col];
            for k in col..N {
                a[below][k] -= factor * a[row][k];
            }
            b[below] -= factor * b[row];
        }
        pivot_rows[col] = Some(row);
        row += 1;
    }

    let mut x = [0.0f64; N];
    for col in (0..N).rev() {
        if let Some(r) = pivot_rows[col] {
            let tail: f64 = ((col + 1)..N).map(|k| a[r][k] * x[k]).sum();
            x[col] = (b[r] - tail) / a[r][col];
        }
    }
    x
}

fn fit_logistic(cases: &[&CaseFeatures]) -> ReopenRiskKind {
    let positives = cases.iter().filter(|c| c.will_reopen()).count();
    if positives == 0 || positives == cases.len() {
        return ReopenRiskKind::Constant {
            probability: if positives == 0 { 0.0 } else { 1.0 },
        };
    }

    let n = cases.len() as f64;
    let mut means = [0.0f64; FEATURE_COUNT];
    for case in cases {
        for (m, x) in means.iter_mut().zip(case.vector()) {
            *m += x / n;
        }
    }
    let mut scales = [0.0f64; FEATURE_COUNT];
    for case in cases {
        for ((s, x), m) in scales.iter_mut().zip(case.vector()).zip(means) {
            *s += (x - m).powi(2) / n;
        }
    }
    for s in &mut scales {
        *s = if *s > 0.0 { s.sqrt() } else { 1.0 };
    }

    let inputs: Vec<([f64; FEATURE_COUNT], f64)> = cases
        .iter()
        .map(|c| (standardize(&c.vector(), &means, &scales), f64::from(u8::from(c.will_reopen()))))
        .collect();

    let mut bias = 0.0;
    let mut weights = [0.0f64; FEATURE_COUNT];
    for _ in 0..EPOCHS {
        let mut grad_b = 0.0;
        let mut grad_w = [0.0f64; FEATURE_COUNT];
        for (z, y) in &inputs {
            let err = sigmoid(bias + dot(&weights, z)) - y;
            grad_b += err / n;
            for (g, zi) in grad_w.iter_mut().zip(z) {
                *g += err * zi / n;
            }
        }
        bias -= LEARNING_RATE * grad_b;
        for (w, g) in weights.iter_mut().zip(grad_w) {
            *w -= LEARNING_RATE * (g + L2 * *w);
        }
    }

    ReopenRiskKind::Logistic {
        means,
        scales,
        bias,
        weights,
    }
}

fn probability(kind: &ReopenRiskKind, features: &CaseFeatures) -> f64 {
    match kind {
        ReopenRiskKind::Constant { probability } => *probability,
        ReopenRiskKind::Logistic {
            means,
            scales,
            bias,
            weights,
        } => {
            let z = standardize(&features.vector(), means, scales);
            sigmoid(bias + dot(weights, &z))
        }
    }
}

fn standardize(
    x: &[f64; FEATURE_COUNT],
    means: &[f64; FEATURE_COUNT],
    scales: &[f64; FEATURE_COUNT],
) -> [f64; FEATURE_COUNT] {
    let mut z = [0.0; FEATURE_COUNT];
    for i in 0..FEATURE_COUNT {
        z[i] = (x[i] - means[i]) / scales[i];
    }
    z
}

fn dot(a: &[f64; FEATURE_COUNT], b: &[f64; FEATURE_COUNT]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}
