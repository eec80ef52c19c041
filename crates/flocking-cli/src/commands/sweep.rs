//! Parameter sweep: how often does the flock converge, and how good is the tour?

use anyhow::{bail, Context, Result};
use colored::Colorize;
use flocking::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{Config, VariantKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SweepParam {
    DistanceWeight,
    OccupancyWeight,
    SpawnRate,
    DensityThreshold,
    VisionRange,
    Speed,
}

impl SweepParam {
    fn apply(self, params: &mut SolveParams, value: f64) {
        match self {
            SweepParam::DistanceWeight => params.distance_weight = value,
            SweepParam::OccupancyWeight => params.occupancy_weight = value,
            SweepParam::SpawnRate => params.spawn_rate = value,
            SweepParam::DensityThreshold => params.density_threshold = value,
            SweepParam::VisionRange => params.vision_range = value,
            SweepParam::Speed => params.speed = value,
        }
    }
}

/// `from`, `from + step`, ... up to and including `to`.
fn sweep_values(from: f64, to: f64, step: f64) -> Vec<f64> {
    let count = ((to - from) / step + 1e-9).floor();
    if count < 0.0 {
        return Vec::new();
    }
    (0..=count as usize).map(|i| from + i as f64 * step).collect()
}

#[derive(Debug, Default)]
struct SweepRow {
    value: f64,
    converged: u32,
    failed: u32,
    total_cost: u64,
    best_cost: Option<u64>,
}

impl SweepRow {
    fn record(&mut self, cost: Option<u64>) {
        match cost {
            Some(cost) => {
                self.converged += 1;
                self.total_cost += cost;
                self.best_cost = Some(self.best_cost.map_or(cost, |best| best.min(cost)));
            }
            None => self.failed += 1,
        }
    }

    fn average_cost(&self) -> Option<f64> {
        (self.converged > 0).then(|| self.total_cost as f64 / self.converged as f64)
    }
}

pub fn run(param: SweepParam, from: f64, to: f64, step: f64, runs: u32) -> Result<()> {
    if step <= 0.0 {
        bail!("--step must be positive, got {}", step);
    }
    let values = sweep_values(from, to, step);
    if values.is_empty() {
        bail!("Empty sweep range {}..={}", from, to);
    }

    let config = Config::load()?;
    let graph = config.instance.build_graph()?;
    let goal = config.instance.goal.build();
    let problem = Problem::new(graph, config.graph.clone()).with_config(config.simulation.clone());
    let base_seed = config.solve.seed.unwrap_or(0);

    println!(
        "{} Sweeping {} over {} values, {} runs each ({})",
        "→".blue(),
        format!("{:?}", param).cyan(),
        values.len(),
        runs,
        goal.describe()
    );

    let bar = ProgressBar::new(values.len() as u64 * u64::from(runs));
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} runs {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let mut rows = Vec::with_capacity(values.len());
    for value in values {
        let mut row = SweepRow { value, ..SweepRow::default() };
        bar.set_message(format!("{:?} = {:.2}", param, value));
        for run in 0..runs {
            let mut params = config.solve.clone().with_seed(base_seed.wrapping_add(u64::from(run)));
            param.apply(&mut params, value);
            let observer = Box::new(NullObserver);
            let outcome = match config.instance.variant {
                VariantKind::Consensus => problem.solve_with_stats(params, goal.as_ref(), observer),
                VariantKind::ChainTracing => problem.solve_chain_tracing_with_stats(params, goal.as_ref(), observer),
            }
            .with_context(|| format!("Run {} at {:?} = {} failed", run, param, value))?;
            row.record(outcome.tour.and_then(|tour| tour.last_calculated_cost()));
            bar.inc(1);
        }
        rows.push(row);
    }
    bar.finish_and_clear();

    println!();
    println!("{:>10}  {:>9}  {:>10}  {:>6}", "value", "success", "avg cost", "best");
    for row in &rows {
        let rate = f64::from(row.converged) / f64::from(row.converged + row.failed).max(1.0);
        let rate_text = format!("{:>8.0}%", rate * 100.0);
        let rate_text = if rate >= 0.5 { rate_text.green() } else { rate_text.red() };
        let avg = row.average_cost().map_or("-".to_string(), |avg| format!("{:.1}", avg));
        let best = row.best_cost.map_or("-".to_string(), |best| best.to_string());
        println!("{:>10.3}  {}  {:>10}  {:>6}", row.value, rate_text, avg, best);
    }

    Ok(())
}
