//! biz_pulse — the analytics core behind the business-health dashboard.
//!
//! Takes a raw tabular upload (CSV or XLSX bytes) and turns it into
//! decision-ready numbers: a cleaned and feature-engineered table, a
//! metrics snapshot (profit, forecast, churn probability, composite
//! scores), rule-based advice, and Monte Carlo what-if scenarios.
//!
//! The flow is strictly forward:
//! bytes -> `RawTable` -> cleaned `DataTable` -> `MetricsSnapshot` ->
//! advice / scenarios. Every call is synchronous and stateless; the
//! surrounding HTTP, persistence and rendering layers are external
//! collaborators and live elsewhere.

pub mod decision;
pub mod error;
pub mod features;
pub mod ingest;
pub mod metrics;
pub mod model;
pub mod models;
pub mod table;

pub use error::IngestError;
pub use features::DatasetSummary;
pub use models::{
    DatasetMetadata, DecisionAdvice, MarketTrend, MetricsSnapshot, ScenarioParams, ScenarioResult,
};

/// Rounds to 2 decimal places (monetary fields and scores).
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Rounds to 4 decimal places (probabilities).
pub(crate) fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Every published figure must be finite; anything else collapses to 0.
pub(crate) fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_helpers() {
        assert_eq!(round2(0.41666), 0.42);
        assert_eq!(round4(0.41666), 0.4167);
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(f64::INFINITY), 0.0);
        assert_eq!(finite_or_zero(-3.5), -3.5);
    }

    #[test]
    fn test_upload_to_advice_pipeline() {
        let csv = b"Revenue,Cost,Region\n100,60,US\n120,70,EU\n90,95,\n110,64,US\n";
        let summary = features::summarize(csv, "quarter.csv").unwrap();

        // cleaning left no gaps and engineering added the ratio columns
        assert!(summary.table.has_column("profit"));
        let (_, regions) = summary.table.text_columns().next().unwrap();
        assert!(regions.contains(&"unknown".to_string()));

        let snapshot = metrics::compute(&summary.table);
        assert!(snapshot.revenue > 0.0);
        assert!((0.0..=1.0).contains(&snapshot.churn_probability));

        let advice = decision::advise(&snapshot);
        assert!(!advice.recommendations.is_empty());
        assert_eq!(advice.scenario_impact.len(), 3);

        let result = decision::simulate(&snapshot, &ScenarioParams::default());
        assert!(result.downside_risk <= result.upside_potential);
    }
}
