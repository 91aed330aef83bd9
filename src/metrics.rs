//! Snapshot computation: turns a numeric feature table into the fixed
//! business-health record consumed by the decision layer.
//!
//! Both estimators train on the same rows they score. For a
//! single-dataset snapshot service that is the intended behavior (there
//! is no future-labeled data to hold out); it is documented here and in
//! DESIGN.md rather than hidden.

use chrono::Utc;
use statrs::statistics::{Data, OrderStatistics, Statistics};
use tracing::debug;

use crate::model::{GradientBoostedStumps, LogisticModel};
use crate::models::MetricsSnapshot;
use crate::table::DataTable;
use crate::{finite_or_zero, round2, round4};

/// Scale applied to the raw regression prediction to bring it into a
/// profit-like range. Tunable, not a law.
const FORECAST_SCALE: f64 = 0.12;
/// Cost proxy when no explicit `cost` column exists.
const COST_PROXY_RATIO: f64 = 0.6;
const BOOST_ROUNDS: usize = 60;
const BOOST_SHRINKAGE: f64 = 0.08;
const LOGISTIC_EPOCHS: usize = 500;
const LOGISTIC_LEARNING_RATE: f64 = 0.1;

/// Computes a fresh [`MetricsSnapshot`] from the numeric projection of
/// `table`. An empty projection is the defined degenerate case and
/// yields the all-zero snapshot, never an error.
pub fn compute(table: &DataTable) -> MetricsSnapshot {
    let rows = table.numeric_rows();
    let Some(last) = rows.last() else {
        return MetricsSnapshot::zeroed();
    };
    if last.is_empty() {
        return MetricsSnapshot::zeroed();
    }

    let row_sums: Vec<f64> = rows.iter().map(|r| r.iter().sum()).collect();
    let row_means: Vec<f64> = rows
        .iter()
        .map(|r| r.iter().sum::<f64>() / r.len() as f64)
        .collect();

    let revenue = finite_or_zero(
        table
            .numeric("revenue")
            .map(|v| v.iter().mean())
            .unwrap_or_else(|| row_sums.iter().mean()),
    );
    let cost = finite_or_zero(
        table
            .numeric("cost")
            .map(|v| v.iter().mean())
            .unwrap_or_else(|| row_means.iter().mean() * COST_PROXY_RATIO),
    );
    let profit = revenue - cost;

    // Regression target is the row-wise sum: a heuristic proxy, kept as
    // contract. Fewer than 2 rows cannot support a split, so the
    // forecast degrades to the last row's target value.
    let forecast_raw = if rows.len() < 2 {
        row_sums.last().copied().unwrap_or(0.0)
    } else {
        GradientBoostedStumps::fit(&rows, &row_sums, BOOST_ROUNDS, BOOST_SHRINKAGE).predict(last)
    };
    let forecast_profit = finite_or_zero(forecast_raw * FORECAST_SCALE);

    // Churn proxy label: rows below the median target are class 1. A
    // single-class label would make the fit degenerate, so it falls
    // back to probability 0.
    let median = Data::new(row_sums.clone()).median();
    let labels: Vec<f64> = row_sums
        .iter()
        .map(|y| if *y < median { 1.0 } else { 0.0 })
        .collect();
    let single_class = labels.windows(2).all(|w| w[0] == w[1]);
    let churn_probability = if single_class {
        debug!("churn label is single-class, using fallback probability 0");
        0.0
    } else {
        finite_or_zero(
            LogisticModel::fit(&rows, &labels, LOGISTIC_EPOCHS, LOGISTIC_LEARNING_RATE)
                .predict_proba(last),
        )
    };

    let employee_score =
        finite_or_zero(100.0 - churn_probability * 70.0 + profit / (revenue + 1.0) * 20.0)
            .clamp(0.0, 100.0);
    let risk_score =
        finite_or_zero(churn_probability * 100.0 + (-profit).max(0.0)).clamp(0.0, 100.0);

    MetricsSnapshot {
        revenue: round2(revenue),
        cost: round2(cost),
        profit: round2(profit),
        forecast_profit: round2(forecast_profit),
        churn_probability: round4(churn_probability.clamp(0.0, 1.0)),
        employee_score: round2(employee_score),
        risk_score: round2(risk_score),
        generated_at: Utc::now(),
    }
}
