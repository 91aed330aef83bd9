//! Small deterministic estimators backing the metrics engine: a
//! gradient-boosted ensemble of depth-1 regression trees and a logistic
//! classifier trained by batch gradient descent.
//!
//! Both models train in-process on the rows they later score. That is a
//! deliberate single-snapshot simplification, not a forecasting
//! guarantee; see DESIGN.md. Determinism is a hard requirement for the
//! surrounding engine, so neither model uses any randomness.

use std::cmp::Ordering;

/// Gradient-boosted regression stumps (depth-1 trees).
#[derive(Debug, Clone)]
pub struct GradientBoostedStumps {
    base: f64,
    shrinkage: f64,
    stumps: Vec<Stump>,
}

#[derive(Debug, Clone)]
struct Stump {
    feature: usize,
    threshold: f64,
    left: f64,
    right: f64,
}

impl Stump {
    fn response(&self, row: &[f64]) -> f64 {
        let value = row.get(self.feature).copied().unwrap_or(0.0);
        if value <= self.threshold {
            self.left
        } else {
            self.right
        }
    }
}

impl GradientBoostedStumps {
    /// Fits `rounds` stumps against the residuals of the running
    /// prediction. Boosting stops early when no feature offers a split
    /// that reduces squared error, so a constant target yields a pure
    /// mean predictor.
    pub fn fit(rows: &[Vec<f64>], targets: &[f64], rounds: usize, shrinkage: f64) -> Self {
        let base = mean(targets);
        let mut predictions = vec![base; targets.len()];
        let mut stumps = Vec::new();

        for _ in 0..rounds {
            let residuals: Vec<f64> = targets
                .iter()
                .zip(&predictions)
                .map(|(y, p)| y - p)
                .collect();
            let Some(stump) = best_stump(rows, &residuals) else {
                break;
            };
            for (prediction, row) in predictions.iter_mut().zip(rows) {
                *prediction += shrinkage * stump.response(row);
            }
            stumps.push(stump);
        }

        Self {
            base,
            shrinkage,
            stumps,
        }
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        self.base
            + self
                .stumps
                .iter()
                .map(|s| self.shrinkage * s.response(row))
                .sum::<f64>()
    }
}

/// Finds the single split with the largest squared-error reduction over
/// all features, or `None` when no split improves on the mean.
fn best_stump(rows: &[Vec<f64>], residuals: &[f64]) -> Option<Stump> {
    let n = rows.len();
    if n < 2 {
        return None;
    }
    let n_features = rows[0].len();
    let total: f64 = residuals.iter().sum();
    let base_score = total * total / n as f64;

    let mut best_gain = 1e-12;
    let mut best: Option<Stump> = None;

    for feature in 0..n_features {
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            rows[a][feature]
                .partial_cmp(&rows[b][feature])
                .unwrap_or(Ordering::Equal)
        });

        let mut left_sum = 0.0;
        for (position, &idx) in order.iter().take(n - 1).enumerate() {
            left_sum += residuals[idx];
            let value = rows[idx][feature];
            let next = rows[order[position + 1]][feature];
            if next <= value {
                // no boundary between equal values
                continue;
            }

            let left_n = (position + 1) as f64;
            let right_n = (n - position - 1) as f64;
            let right_sum = total - left_sum;
            let gain =
                left_sum * left_sum / left_n + right_sum * right_sum / right_n - base_score;

            if gain.is_finite() && gain > best_gain {
                best_gain = gain;
                best = Some(Stump {
                    feature,
                    threshold: (value + next) / 2.0,
                    left: left_sum / left_n,
                    right: right_sum / right_n,
                });
            }
        }
    }

    best
}

/// Logistic classifier over standardized features.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    weights: Vec<f64>,
    bias: f64,
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl LogisticModel {
    /// Batch gradient descent on log-loss. `labels` must be 0.0 or 1.0;
    /// the caller is responsible for not fitting a single-class target.
    pub fn fit(rows: &[Vec<f64>], labels: &[f64], epochs: usize, learning_rate: f64) -> Self {
        let n = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);

        let mut means = vec![0.0; width];
        let mut stds = vec![1.0; width];
        for j in 0..width {
            let column: Vec<f64> = rows.iter().map(|r| r[j]).collect();
            means[j] = mean(&column);
            let var =
                column.iter().map(|v| (v - means[j]).powi(2)).sum::<f64>() / n.max(1) as f64;
            let sd = var.sqrt();
            if sd > 1e-12 {
                stds[j] = sd;
            }
        }

        let scaled: Vec<Vec<f64>> = rows
            .iter()
            .map(|r| {
                r.iter()
                    .enumerate()
                    .map(|(j, v)| (v - means[j]) / stds[j])
                    .collect()
            })
            .collect();

        let mut weights = vec![0.0; width];
        let mut bias = 0.0;
        for _ in 0..epochs {
            let mut grad_w = vec![0.0; width];
            let mut grad_b = 0.0;
            for (row, &label) in scaled.iter().zip(labels) {
                let error = sigmoid(dot(&weights, row) + bias) - label;
                for (g, v) in grad_w.iter_mut().zip(row) {
                    *g += error * v;
                }
                grad_b += error;
            }
            let scale = learning_rate / n.max(1) as f64;
            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= scale * g;
            }
            bias -= scale * grad_b;
        }

        Self {
            weights,
            bias,
            means,
            stds,
        }
    }

    /// Probability of class 1 for one row.
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        let z = self
            .weights
            .iter()
            .zip(self.means.iter().zip(&self.stds))
            .zip(row)
            .map(|((w, (m, s)), v)| w * (v - m) / s)
            .sum::<f64>()
            + self.bias;
        sigmoid(z)
    }
}

fn sigmoid(z: f64) -> f64 {
    let z = z.clamp(-30.0, 30.0);
    1.0 / (1.0 + (-z).exp())
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_feature(values: &[f64]) -> Vec<Vec<f64>> {
        values.iter().map(|&v| vec![v]).collect()
    }

    #[test]
    fn test_stumps_learn_step_function() {
        let rows = single_feature(&[0.0, 1.0, 2.0, 3.0, 6.0, 7.0, 8.0, 9.0]);
        let targets = vec![1.0, 1.0, 1.0, 1.0, 9.0, 9.0, 9.0, 9.0];
        let model = GradientBoostedStumps::fit(&rows, &targets, 60, 0.08);

        assert!((model.predict(&[2.0]) - 1.0).abs() < 0.2);
        assert!((model.predict(&[8.0]) - 9.0).abs() < 0.2);
    }

    #[test]
    fn test_stumps_constant_target_predicts_mean() {
        let rows = single_feature(&[1.0, 2.0, 3.0, 4.0]);
        let targets = vec![5.0; 4];
        let model = GradientBoostedStumps::fit(&rows, &targets, 60, 0.08);
        assert_eq!(model.predict(&[100.0]), 5.0);
    }

    #[test]
    fn test_stumps_single_row_falls_back_to_base() {
        let model = GradientBoostedStumps::fit(&[vec![3.0]], &[42.0], 60, 0.08);
        assert_eq!(model.predict(&[3.0]), 42.0);
    }

    #[test]
    fn test_stumps_are_deterministic() {
        let rows = single_feature(&[1.0, 4.0, 2.0, 8.0, 5.0]);
        let targets = vec![2.0, 8.0, 4.0, 16.0, 10.0];
        let a = GradientBoostedStumps::fit(&rows, &targets, 60, 0.08);
        let b = GradientBoostedStumps::fit(&rows, &targets, 60, 0.08);
        assert_eq!(a.predict(&[6.0]), b.predict(&[6.0]));
    }

    #[test]
    fn test_logistic_separates_two_clusters() {
        let rows = single_feature(&[0.0, 1.0, 2.0, 3.0, 10.0, 11.0, 12.0, 13.0]);
        let labels = vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        let model = LogisticModel::fit(&rows, &labels, 500, 0.1);

        assert!(model.predict_proba(&[1.0]) > 0.7);
        assert!(model.predict_proba(&[12.0]) < 0.3);
    }

    #[test]
    fn test_logistic_probability_in_unit_interval() {
        let rows = single_feature(&[1.0, 2.0, 3.0, 4.0]);
        let labels = vec![0.0, 1.0, 0.0, 1.0];
        let model = LogisticModel::fit(&rows, &labels, 500, 0.1);
        for v in [-1e9, -1.0, 0.0, 2.5, 1e9] {
            let p = model.predict_proba(&[v]);
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_logistic_handles_constant_feature() {
        // zero variance column must not divide by zero
        let rows = vec![vec![5.0, 1.0], vec![5.0, 2.0], vec![5.0, 3.0], vec![5.0, 4.0]];
        let labels = vec![1.0, 1.0, 0.0, 0.0];
        let model = LogisticModel::fit(&rows, &labels, 500, 0.1);
        let p = model.predict_proba(&[5.0, 1.5]);
        assert!(p.is_finite());
        assert!(p > 0.5);
    }
}
