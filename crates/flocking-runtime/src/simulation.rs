//! The tick loop.

use crate::config::{SimulationConfig, SolveParams};
use crate::observer::{SimulationObserver, TracingObserver};
use crate::population::{AgentId, Population, StepReport};
use crate::spawn::{SpawnPolicy, StartNodeSpawn};
use crate::stats::RunStats;
use crate::variant::{Consensus, Variant};
use flocking_agents::agent::StepOutcome;
use flocking_agents::traits::AgentTraits;
use flocking_core::error::Result;
use flocking_core::goal::GoalEvaluator;
use flocking_core::segmented::SegmentedGraph;
use flocking_core::tour::Tour;
use flocking_core::types::Tick;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// One run of the flock over a segmented graph.
///
/// The simulation owns the graph's occupancy and the population; the goal
/// is borrowed. A fresh simulation is needed per attempt.
pub struct Simulation<'a, V: Variant = Consensus> {
    graph: SegmentedGraph,
    population: Population,
    params: SolveParams,
    config: SimulationConfig,
    traits: AgentTraits,
    goal: &'a dyn GoalEvaluator,
    variant: V,
    spawner: Box<dyn SpawnPolicy + 'a>,
    observer: Box<dyn SimulationObserver + 'a>,
    rng: SmallRng,
    tick: Tick,
    spawn_credit: f64,
    stats: RunStats,
}

impl<'a, V: Variant> Simulation<'a, V> {
    /// Validate the parameters and clear any leftover occupancy.
    pub fn new(
        mut graph: SegmentedGraph,
        params: SolveParams,
        config: SimulationConfig,
        goal: &'a dyn GoalEvaluator,
        variant: V,
    ) -> Result<Self> {
        params.validate()?;
        config.validate(graph.graph())?;
        graph.reset();

        let rng = match params.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let spawner = Box::new(StartNodeSpawn::new(config.start_node, config.spawn_attempts));

        Ok(Self {
            graph,
            population: Population::new(),
            traits: params.traits(),
            params,
            config,
            goal,
            variant,
            spawner,
            observer: Box::new(TracingObserver),
            rng,
            tick: 0,
            spawn_credit: 0.0,
            stats: RunStats::default(),
        })
    }

    pub fn with_observer(mut self, observer: Box<dyn SimulationObserver + 'a>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_spawn_policy(mut self, spawner: Box<dyn SpawnPolicy + 'a>) -> Self {
        self.spawner = spawner;
        self
    }

    pub fn graph(&self) -> &SegmentedGraph {
        &self.graph
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn params(&self) -> &SolveParams {
        &self.params
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn variant_name(&self) -> &'static str {
        self.variant.name()
    }

    pub fn into_stats(self) -> RunStats {
        self.stats
    }

    /// Run until convergence or until `max_iterations` ticks have passed.
    pub fn run(&mut self) -> Result<Option<Tour>> {
        while self.tick < self.params.max_iterations {
            if let Some(tour) = self.tick()? {
                return Ok(Some(tour));
            }
        }
        Ok(None)
    }

    /// Advance one tick: spawn, step every agent, check for convergence.
    pub fn tick(&mut self) -> Result<Option<Tour>> {
        self.tick += 1;
        self.stats.ticks = self.tick;

        self.spawn_phase()?;
        self.move_phase()?;

        self.stats.peak_population = self.stats.peak_population.max(self.population.len());
        let frames = if self.observer.wants_frames() { self.population.frames() } else { Vec::new() };
        self.observer.on_tick(self.tick, self.population.len(), &frames);

        let converged = self.variant.check_termination(
            &self.graph,
            &self.population,
            self.goal,
            &self.params,
            &self.config,
        )?;
        let Some(convergence) = converged else {
            return Ok(None);
        };
        let mut tour = convergence.tour;
        tour.calculate_cost(self.graph.graph())?;
        self.stats.converged = true;
        self.observer.on_converged(self.tick, &tour, convergence.density);
        Ok(Some(tour))
    }

    /// Spawn while there is room and achievers are at most a
    /// `1 / achiever_ratio` share of the population. Fractional spawn rates
    /// accumulate across ticks.
    fn spawn_phase(&mut self) -> Result<()> {
        let live = self.population.len();
        if live >= self.params.max_agents || self.population.achiever_count() > live / self.config.achiever_ratio {
            return Ok(());
        }

        self.spawn_credit += self.params.spawn_rate;
        while self.spawn_credit >= 1.0 {
            self.spawn_credit -= 1.0;
            if self.population.len() >= self.params.max_agents {
                continue;
            }
            let Some(position) = self.spawner.spawn_position(&self.graph, &mut self.rng)? else {
                self.stats.skipped_spawns += 1;
                self.observer.on_spawn_skipped(self.tick, self.config.start_node);
                continue;
            };
            let traits = self.traits.jittered(self.config.speed_jitter, &mut self.rng);
            let agent = self.variant.create_agent(position, traits);
            let id = self.population.spawn(agent, &mut self.graph)?;
            self.stats.spawned += 1;
            self.observer.on_spawn(self.tick, id, &position);
        }
        Ok(())
    }

    /// Step every agent alive at the start of the phase.
    fn move_phase(&mut self) -> Result<()> {
        for id in self.population.ids() {
            let stepped =
                self.population
                    .step(id, &mut self.graph, self.goal, &mut self.rng, self.config.movement_margin);
            let report = match stepped {
                Ok(Some(report)) => report,
                Ok(None) => continue,
                Err(err) => {
                    if err.is_invariant_violation() {
                        self.observer.on_invariant_violation(self.tick, &err);
                    }
                    return Err(err);
                }
            };
            self.record(id, report);
        }
        Ok(())
    }

    fn record(&mut self, id: AgentId, report: StepReport) {
        match report.outcome {
            StepOutcome::Died => {
                self.stats.died += 1;
                self.observer.on_died(self.tick, id, &report.position);
            }
            StepOutcome::Promote => {
                self.stats.promoted += 1;
                if let Some(tour) = &report.tour {
                    self.observer.on_promoted(self.tick, id, tour);
                }
            }
            StepOutcome::Moved | StepOutcome::Waiting | StepOutcome::Respawned => {}
        }
        if report.adoptions > 0 {
            self.stats.adoptions += report.adoptions as u64;
            if let Some(tour) = &report.tour {
                self.observer.on_tour_adopted(self.tick, id, tour);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{ObserverEvent, RecordingObserver};
    use flocking_core::goal::EndNodeGoal;
    use flocking_core::instances;
    use flocking_core::segmented::GraphSettings;

    fn basic_graph() -> SegmentedGraph {
        SegmentedGraph::new(instances::basic(), GraphSettings::default()).unwrap()
    }

    #[test]
    fn first_tick_spawns_one_explorer() {
        let goal = EndNodeGoal::new(3);
        let params = SolveParams::default().with_seed(1);
        let mut sim = Simulation::new(basic_graph(), params, SimulationConfig::default(), &goal, Consensus).unwrap();
        assert!(sim.tick().unwrap().is_none());
        assert_eq!(sim.current_tick(), 1);
        assert_eq!(sim.population().len(), 1);
        assert_eq!(sim.stats().spawned, 1);
        assert_eq!(sim.graph().total_occupancy(), 1);
    }

    #[test]
    fn fractional_spawn_rate_accumulates() {
        let goal = EndNodeGoal::new(3);
        let params = SolveParams { spawn_rate: 0.5, ..SolveParams::default() }.with_seed(2);
        let mut sim = Simulation::new(basic_graph(), params, SimulationConfig::default(), &goal, Consensus).unwrap();
        sim.tick().unwrap();
        assert_eq!(sim.population().len(), 0);
        sim.tick().unwrap();
        assert_eq!(sim.population().len(), 1);
    }

    #[test]
    fn population_cap_is_respected() {
        let goal = EndNodeGoal::new(3);
        let params = SolveParams { spawn_rate: 5.0, ..SolveParams::default() }.with_seed(3).with_max_agents(4);
        let mut sim = Simulation::new(basic_graph(), params, SimulationConfig::default(), &goal, Consensus).unwrap();
        for _ in 0..3 {
            sim.tick().unwrap();
            assert!(sim.population().len() <= 4);
        }
    }

    #[test]
    fn zero_iterations_returns_nothing() {
        let goal = EndNodeGoal::new(3);
        let params = SolveParams::default().with_seed(4).with_max_iterations(0);
        let mut sim = Simulation::new(basic_graph(), params, SimulationConfig::default(), &goal, Consensus).unwrap();
        assert!(sim.run().unwrap().is_none());
        assert_eq!(sim.current_tick(), 0);
    }

    #[test]
    fn invalid_params_are_rejected() {
        let goal = EndNodeGoal::new(3);
        let params = SolveParams { speed: 0.0, ..SolveParams::default() };
        let result = Simulation::new(basic_graph(), params, SimulationConfig::default(), &goal, Consensus);
        assert!(result.is_err());
    }

    #[test]
    fn observer_sees_every_tick() {
        let goal = EndNodeGoal::new(3);
        let recorder = RecordingObserver::with_frames();
        let params = SolveParams::default().with_seed(5);
        let mut sim = Simulation::new(basic_graph(), params, SimulationConfig::default(), &goal, Consensus)
            .unwrap()
            .with_observer(Box::new(recorder.clone()));
        for _ in 0..3 {
            sim.tick().unwrap();
        }
        let ticks: Vec<_> = recorder
            .events()
            .into_iter()
            .filter_map(|e| match e {
                ObserverEvent::Tick { tick, population, frames } => Some((tick, population, frames)),
                _ => None,
            })
            .collect();
        assert_eq!(ticks, vec![(1, 1, 1), (2, 2, 2), (3, 3, 3)]);
    }
}
