//! Rule-based decision advisory and the Monte Carlo what-if simulator.
//!
//! The advisory is pure and deterministic. The simulator seeds its own
//! generator per call, so two calls with identical snapshot and
//! parameters produce bit-for-bit identical quantiles even under
//! concurrent use.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use statrs::statistics::{Data, OrderStatistics, Statistics};

use crate::models::{DecisionAdvice, MarketTrend, MetricsSnapshot, ScenarioParams, ScenarioResult};
use crate::{finite_or_zero, round2};

const SIMULATION_SEED: u64 = 42;
const MIN_ITERATIONS: usize = 50;

const DEMAND_NOISE_STD: f64 = 0.05;
const BUDGET_NOISE_STD: f64 = 0.03;
const HIRING_NOISE_STD: f64 = 0.04;

/// Derives the trend label and advisory list from a snapshot.
///
/// Recommendations are evaluated in a fixed order (risk, churn,
/// negative profit) with at most one of each; when none triggers, a
/// single growth-continuation advisory is returned instead.
pub fn advise(metrics: &MetricsSnapshot) -> DecisionAdvice {
    let risk = metrics.risk_score;
    let profit = metrics.profit;
    let churn = metrics.churn_probability;

    let market_trend = if profit > 0.0 && churn < 0.35 {
        MarketTrend::Bullish
    } else if risk < 65.0 {
        MarketTrend::Volatile
    } else {
        MarketTrend::Bearish
    };

    let mut recommendations = Vec::new();
    if risk > 70.0 {
        recommendations
            .push("Activate risk response playbook and freeze non-critical spend.".to_string());
    }
    if churn > 0.4 {
        recommendations
            .push("Prioritize retention campaigns for high-value customer cohorts.".to_string());
    }
    if profit < 0.0 {
        recommendations.push("Optimize COGS and renegotiate supplier contracts.".to_string());
    }
    if recommendations.is_empty() {
        recommendations
            .push("Maintain growth plan with phased hiring and market expansion.".to_string());
    }

    let mut scenario_impact = BTreeMap::new();
    scenario_impact.insert("price_increase_3pct".to_string(), round2(profit * 1.03));
    scenario_impact.insert(
        "marketing_boost_10pct".to_string(),
        round2(profit * 1.1 - 0.05 * risk),
    );
    scenario_impact.insert(
        "cost_reduction_5pct".to_string(),
        round2(profit + metrics.cost.abs() * 0.05),
    );

    DecisionAdvice {
        risk_score: risk,
        market_trend,
        recommendations,
        scenario_impact,
    }
}

/// Runs the Monte Carlo scenario simulation for the given percentage
/// deltas. Iteration counts below 50 are silently raised to 50.
pub fn simulate(metrics: &MetricsSnapshot, params: &ScenarioParams) -> ScenarioResult {
    let base_revenue = finite_or_zero(metrics.revenue);
    let base_cost = finite_or_zero(metrics.cost);
    let demand_mu = finite_or_zero(params.demand_change_pct) / 100.0;
    let budget_mu = finite_or_zero(params.budget_change_pct) / 100.0;
    let hiring_mu = finite_or_zero(params.hiring_change_pct) / 100.0;

    let mut rng = StdRng::seed_from_u64(SIMULATION_SEED);
    let trials = params.iterations.max(MIN_ITERATIONS);

    let mut profits = Vec::with_capacity(trials);
    for _ in 0..trials {
        let demand_noise = demand_mu + DEMAND_NOISE_STD * rng.sample::<f64, _>(StandardNormal);
        let budget_noise = budget_mu + BUDGET_NOISE_STD * rng.sample::<f64, _>(StandardNormal);
        let hiring_noise = hiring_mu + HIRING_NOISE_STD * rng.sample::<f64, _>(StandardNormal);

        let revenue = base_revenue * (1.0 + demand_noise + 0.4 * budget_noise);
        let cost = base_cost * (1.0 + 0.5 * budget_noise + 0.6 * hiring_noise);
        profits.push(revenue - cost);
    }

    let expected_profit = finite_or_zero(profits.iter().mean());
    let mut samples = Data::new(profits);
    ScenarioResult {
        expected_revenue: round2(finite_or_zero(base_revenue * (1.0 + demand_mu))),
        expected_profit: round2(expected_profit),
        downside_risk: round2(finite_or_zero(samples.percentile(10))),
        upside_potential: round2(finite_or_zero(samples.percentile(90))),
    }
}
