//! Business dataset analysis report
//! Parses an uploaded CSV/XLSX file, prints the dataset digest, the
//! metrics snapshot and the rule-based decision advice.
//!
//! Run: cargo run --release --bin analyze -- --input data/quarter.csv

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use biz_pulse::{decision, features, metrics};
use clap::Parser;
use tracing::info;

/// Analyze a business dataset and print health metrics
#[derive(Parser, Debug)]
#[command(name = "analyze")]
#[command(about = "Analyze a business dataset and print health metrics")]
struct Args {
    /// Input file (.csv or .xlsx)
    #[arg(long)]
    input: PathBuf,

    /// Emit machine-readable JSON instead of the console report
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let args = Args::parse();

    let bytes = fs::read(&args.input).with_context(|| format!("reading {:?}", args.input))?;
    let filename = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.csv")
        .to_string();

    info!("Analyzing {} ({} bytes)", filename, bytes.len());

    let summary = features::summarize(&bytes, &filename)?;
    let snapshot = metrics::compute(&summary.table);
    let advice = decision::advise(&snapshot);

    if args.json {
        let out = serde_json::json!({
            "digest": summary.digest,
            "metadata": summary.metadata,
            "metrics": snapshot,
            "advice": advice,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("\n{}", "=".repeat(60));
    println!("                 BUSINESS HEALTH ANALYSIS");
    println!("{}\n", "=".repeat(60));

    println!("DATASET");
    println!("{}", "-".repeat(40));
    for line in summary.digest.lines() {
        println!("  {}", line);
    }

    println!("\nMETRICS SNAPSHOT");
    println!("{}", "-".repeat(40));
    println!("  Revenue:           {:>12.2}", snapshot.revenue);
    println!("  Cost:              {:>12.2}", snapshot.cost);
    println!("  Profit:            {:>12.2}", snapshot.profit);
    println!("  Forecast profit:   {:>12.2}", snapshot.forecast_profit);
    println!("  Churn probability: {:>12.4}", snapshot.churn_probability);
    println!("  Employee score:    {:>12.2}", snapshot.employee_score);
    println!("  Risk score:        {:>12.2}", snapshot.risk_score);

    println!("\nDECISION ADVICE");
    println!("{}", "-".repeat(40));
    println!("  Market trend: {}", advice.market_trend);
    for recommendation in &advice.recommendations {
        println!("  - {}", recommendation);
    }

    println!("\nSCENARIO IMPACT");
    println!("{}", "-".repeat(40));
    for (scenario, estimate) in &advice.scenario_impact {
        println!("  {:<24} {:>12.2}", scenario, estimate);
    }
    println!();

    Ok(())
}
