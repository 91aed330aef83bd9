use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time business-health snapshot computed from the latest
/// feature table. Monetary fields are rounded to 2 decimal places,
/// `churn_probability` to 4; the two scores live in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
    pub forecast_profit: f64,
    pub churn_probability: f64,
    pub employee_score: f64,
    pub risk_score: f64,
    pub generated_at: DateTime<Utc>,
}

impl MetricsSnapshot {
    /// The defined degenerate snapshot: every figure zero, timestamp now.
    pub fn zeroed() -> Self {
        Self {
            revenue: 0.0,
            cost: 0.0,
            profit: 0.0,
            forecast_profit: 0.0,
            churn_probability: 0.0,
            employee_score: 0.0,
            risk_score: 0.0,
            generated_at: Utc::now(),
        }
    }
}

/// Market trend label derived from the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketTrend {
    Bullish,
    Volatile,
    Bearish,
}

impl fmt::Display for MarketTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MarketTrend::Bullish => "bullish",
            MarketTrend::Volatile => "volatile",
            MarketTrend::Bearish => "bearish",
        };
        f.write_str(label)
    }
}

/// Rule-based advisory output for a snapshot. `recommendations` always
/// holds at least one entry; `scenario_impact` maps the three fixed
/// what-if scenarios to point profit estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionAdvice {
    pub risk_score: f64,
    pub market_trend: MarketTrend,
    pub recommendations: Vec<String>,
    pub scenario_impact: BTreeMap<String, f64>,
}

/// Inputs to the Monte Carlo scenario simulator, as percentage deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParams {
    #[serde(default)]
    pub budget_change_pct: f64,
    #[serde(default)]
    pub demand_change_pct: f64,
    #[serde(default)]
    pub hiring_change_pct: f64,
    /// Trial count; values below 50 are raised to 50.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            budget_change_pct: 0.0,
            demand_change_pct: 0.0,
            hiring_change_pct: 0.0,
            iterations: default_iterations(),
        }
    }
}

fn default_iterations() -> usize {
    600
}

/// One simulation run: closed-form expected revenue plus the mean, 10th
/// and 90th percentile of the sampled profit distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub expected_revenue: f64,
    pub expected_profit: f64,
    pub downside_risk: f64,
    pub upside_potential: f64,
}

/// Column metadata emitted alongside the dataset digest, consumed by
/// the external persistence and report layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub numeric_features: Vec<String>,
    pub categorical_features: Vec<String>,
    /// UTC generation time, ISO-8601.
    pub generated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_trend_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&MarketTrend::Bearish).unwrap(),
            "\"bearish\""
        );
        assert_eq!(MarketTrend::Volatile.to_string(), "volatile");
    }

    #[test]
    fn test_scenario_params_defaults() {
        let params: ScenarioParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.iterations, 600);
        assert_eq!(params.budget_change_pct, 0.0);
    }

    #[test]
    fn test_zeroed_snapshot() {
        let snap = MetricsSnapshot::zeroed();
        assert_eq!(snap.revenue, 0.0);
        assert_eq!(snap.risk_score, 0.0);
    }
}
