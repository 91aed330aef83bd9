//! Monte Carlo what-if simulation
//! Computes the metrics snapshot for a dataset, then simulates revenue
//! and profit under budget/demand/hiring percentage changes.
//!
//! Run: cargo run --release --bin simulate -- --input data/quarter.csv \
//!        --budget 5 --demand 10 --hiring 2

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use biz_pulse::{decision, features, metrics, ScenarioParams};
use clap::Parser;

/// Simulate budget/demand/hiring scenarios against a dataset
#[derive(Parser, Debug)]
#[command(name = "simulate")]
#[command(about = "Simulate budget/demand/hiring scenarios against a dataset")]
struct Args {
    /// Input file (.csv or .xlsx)
    #[arg(long)]
    input: PathBuf,

    /// Budget change in percent
    #[arg(long, default_value = "0.0")]
    budget: f64,

    /// Demand change in percent
    #[arg(long, default_value = "0.0")]
    demand: f64,

    /// Hiring change in percent
    #[arg(long, default_value = "0.0")]
    hiring: f64,

    /// Simulation trials (values below 50 are raised to 50)
    #[arg(long, default_value = "600")]
    iterations: usize,

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

    let summary = features::summarize(&bytes, &filename)?;
    let snapshot = metrics::compute(&summary.table);

    let params = ScenarioParams {
        budget_change_pct: args.budget,
        demand_change_pct: args.demand,
        hiring_change_pct: args.hiring,
        iterations: args.iterations,
    };
    let result = decision::simulate(&snapshot, &params);

    if args.json {
        let out = serde_json::json!({
            "snapshot": snapshot,
            "params": params,
            "result": result,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("\n{}", "=".repeat(60));
    println!("                 SCENARIO SIMULATION");
    println!("{}\n", "=".repeat(60));

    println!("BASELINE");
    println!("{}", "-".repeat(40));
    println!("  Revenue:           {:>12.2}", snapshot.revenue);
    println!("  Cost:              {:>12.2}", snapshot.cost);
    println!("  Profit:            {:>12.2}", snapshot.profit);

    println!("\nSCENARIO (+{}% budget, +{}% demand, +{}% hiring)",
        args.budget, args.demand, args.hiring);
    println!("{}", "-".repeat(40));
    println!("  Expected revenue:  {:>12.2}", result.expected_revenue);
    println!("  Expected profit:   {:>12.2}", result.expected_profit);
    println!("  Downside risk:     {:>12.2}", result.downside_risk);
    println!("  Upside potential:  {:>12.2}", result.upside_potential);
    println!();

    Ok(())
}
