//! Run one solve.

use anyhow::{Context, Result};
use colored::Colorize;
use flocking::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{Config, InstanceKind, VariantKind};

/// Command-line values that take precedence over flocking.toml.
#[derive(Debug, Default)]
pub struct Overrides {
    pub instance: Option<InstanceKind>,
    pub cities: Option<usize>,
    pub end_node: Option<usize>,
    pub seed: Option<u64>,
    pub max_iterations: Option<u64>,
    pub variant: Option<VariantKind>,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        if let Some(kind) = self.instance {
            config.instance.kind = kind;
        }
        if let Some(cities) = self.cities {
            config.instance.cities = cities;
        }
        if let Some(node) = self.end_node {
            config.instance.goal = GoalKind::EndNode { node };
        }
        if let Some(seed) = self.seed {
            config.solve.seed = Some(seed);
        }
        if let Some(max_iterations) = self.max_iterations {
            config.solve.max_iterations = max_iterations;
        }
        if let Some(variant) = self.variant {
            config.instance.variant = variant;
        }
    }
}

/// Drives a progress bar from tick events and forwards the rest to the
/// tracing observer.
struct ProgressObserver {
    bar: ProgressBar,
    inner: TracingObserver,
    verbose: bool,
}

impl SimulationObserver for ProgressObserver {
    fn on_spawn_skipped(&mut self, tick: Tick, start_node: usize) {
        self.inner.on_spawn_skipped(tick, start_node);
    }

    fn on_promoted(&mut self, tick: Tick, id: AgentId, tour: &Tour) {
        if self.verbose {
            self.bar.println(format!("  {} tick {}: new tour {}", "+".green(), tick, tour));
        }
        self.inner.on_promoted(tick, id, tour);
    }

    fn on_died(&mut self, tick: Tick, id: AgentId, position: &Position) {
        self.inner.on_died(tick, id, position);
    }

    fn on_tick(&mut self, tick: Tick, population: usize, frames: &[AgentFrame]) {
        self.bar.set_position(tick);
        self.bar.set_message(format!("{} agents", population));
        self.inner.on_tick(tick, population, frames);
    }

    fn on_converged(&mut self, tick: Tick, tour: &Tour, density: Option<f64>) {
        self.inner.on_converged(tick, tour, density);
    }

    fn on_invariant_violation(&mut self, tick: Tick, error: &FlockError) {
        self.inner.on_invariant_violation(tick, error);
    }
}

pub fn run(overrides: Overrides, json: bool, verbose: bool) -> Result<()> {
    let mut config = Config::load()?;
    overrides.apply(&mut config);

    let graph = config.instance.build_graph()?;
    let goal = config.instance.goal.build();
    let problem = Problem::new(graph, config.graph.clone()).with_config(config.simulation.clone());
    let params = config.solve.clone();

    if !json {
        println!(
            "{} Solving {} ({} nodes, {} edges) for {}...",
            "→".blue(),
            format!("{:?}", config.instance.kind).to_lowercase().cyan(),
            problem.graph().node_count().to_string().cyan(),
            problem.graph().edge_count().to_string().cyan(),
            goal.describe().cyan()
        );
    }

    let bar = if json { ProgressBar::hidden() } else { ProgressBar::new(params.max_iterations) };
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ticks {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );
    let observer = Box::new(ProgressObserver { bar: bar.clone(), inner: TracingObserver, verbose });

    let outcome = match config.instance.variant {
        VariantKind::Consensus => problem.solve_with_stats(params, goal.as_ref(), observer),
        VariantKind::ChainTracing => problem.solve_chain_tracing_with_stats(params, goal.as_ref(), observer),
    }
    .context("Simulation failed")?;
    bar.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!();
    match &outcome.tour {
        Some(tour) => {
            println!("{} Converged after {} ticks", "✓".green().bold(), outcome.stats.ticks.to_string().green());
            println!("  Tour:   {}", tour.to_string().green());
            if let Some(cost) = tour.last_calculated_cost() {
                println!("  Cost:   {}", cost.to_string().green());
            }
        }
        None => {
            println!(
                "{} No convergence within {} ticks",
                "✗".red().bold(),
                outcome.stats.ticks.to_string().yellow()
            );
        }
    }
    println!("  Spawned: {}", outcome.stats.spawned.to_string().cyan());
    println!("  Promoted: {}", outcome.stats.promoted.to_string().cyan());
    println!("  Died: {}", outcome.stats.died.to_string().cyan());
    println!("  Adoptions: {}", outcome.stats.adoptions.to_string().cyan());
    println!("  Peak population: {}", outcome.stats.peak_population.to_string().cyan());

    Ok(())
}
