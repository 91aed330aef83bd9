//! Feature engineering and dataset summarization.
//!
//! Derivation is pure and idempotent: running it twice over the same
//! table produces the same columns, and source columns are never
//! overwritten. A table without the expected source columns simply
//! gains nothing.

use chrono::Utc;
use statrs::statistics::Statistics;

use crate::error::IngestError;
use crate::ingest;
use crate::models::DatasetMetadata;
use crate::table::DataTable;
use crate::{finite_or_zero, round2};

/// Cleaned table plus the human-readable digest and column metadata
/// handed to the persistence/report collaborators.
#[derive(Debug, Clone)]
pub struct DatasetSummary {
    pub table: DataTable,
    pub digest: String,
    pub metadata: DatasetMetadata,
}

/// Derives business ratio columns where their sources exist:
/// `profit = revenue - cost`, `margin_pct = profit / revenue` (0 when
/// revenue is 0) and `employee_efficiency = employee_output /
/// employee_hours` (0 when hours is 0).
pub fn engineer(mut table: DataTable) -> DataTable {
    let revenue_cost = match (table.numeric("revenue"), table.numeric("cost")) {
        (Some(revenue), Some(cost)) => Some((revenue.to_vec(), cost.to_vec())),
        _ => None,
    };
    if let Some((revenue, cost)) = revenue_cost {
        let profit: Vec<f64> = revenue.iter().zip(&cost).map(|(r, c)| r - c).collect();
        let margin: Vec<f64> = profit
            .iter()
            .zip(&revenue)
            .map(|(p, r)| if *r != 0.0 { p / r } else { 0.0 })
            .collect();
        table.set_numeric("profit", profit);
        table.set_numeric("margin_pct", margin);
    }

    let output_hours = match (
        table.numeric("employee_output"),
        table.numeric("employee_hours"),
    ) {
        (Some(output), Some(hours)) => Some((output.to_vec(), hours.to_vec())),
        _ => None,
    };
    if let Some((output, hours)) = output_hours {
        let efficiency: Vec<f64> = output
            .iter()
            .zip(&hours)
            .map(|(o, h)| if *h != 0.0 { o / h } else { 0.0 })
            .collect();
        table.set_numeric("employee_efficiency", efficiency);
    }

    table
}

/// Full upload path: parse, clean, engineer, then summarize.
pub fn summarize(content: &[u8], filename: &str) -> Result<DatasetSummary, IngestError> {
    let table = engineer(ingest::load_table(content, filename)?.clean());
    Ok(summarize_table(table))
}

/// Builds the digest and metadata for an already-engineered table.
///
/// The digest lists row/column counts, the numeric column names, and
/// `mean`/`std`/`max` (sample std, 2 decimals) for up to the first six
/// numeric columns.
pub fn summarize_table(table: DataTable) -> DatasetSummary {
    let numeric: Vec<String> = table.numeric_columns().map(|(n, _)| n.to_string()).collect();
    let categorical: Vec<String> = table.text_columns().map(|(n, _)| n.to_string()).collect();

    let mut lines = vec![
        format!("Rows: {}", table.row_count()),
        format!("Columns: {}", table.column_count()),
        format!(
            "Numeric columns: {}",
            if numeric.is_empty() {
                "None".to_string()
            } else {
                numeric.join(", ")
            }
        ),
    ];

    if numeric.is_empty() {
        lines.push("No numeric data available for analysis.".to_string());
    } else {
        for (name, values) in table.numeric_columns().take(6) {
            let mean = round2(finite_or_zero(values.iter().mean()));
            let std = round2(finite_or_zero(values.iter().std_dev()));
            let max = round2(finite_or_zero(values.iter().fold(f64::NEG_INFINITY, |a, b| a.max(*b))));
            lines.push(format!(
                "{}: mean={:.2}, std={:.2}, max={:.2}",
                name, mean, std, max
            ));
        }
    }

    DatasetSummary {
        digest: lines.join("\n"),
        metadata: DatasetMetadata {
            numeric_features: numeric,
            categorical_features: categorical,
            generated_at: Utc::now().to_rfc3339(),
        },
        table,
    }
}
