use crate::config::RunConfig;
use crate::dispatch::controller::DispatchController;
use crate::engine::evaluation::{evaluate_slice, SampleSet};
use crate::engine::individual::Individual;
use crate::engine::population::{Population, MAX_DEPTH, MIN_DEPTH};
use crate::error::Result;
use crate::function::TargetFunction;
use crate::logger::RunLogger;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// Sequences one evolution run: per generation it draws the shared sample
/// seed, evaluates the population (locally or across the process group),
/// logs the results, and breeds the next generation. All population
/// mutation happens here on the master, strictly between evaluations.
pub struct Driver {
    config: RunConfig,
    function: TargetFunction,
    logger: RunLogger,
    root_rng: StdRng,
}

impl Driver {
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        let function = config.function()?;
        let logger = RunLogger::new(&config)?;
        let root_rng = StdRng::seed_from_u64(config.seed);

        Ok(Self {
            config,
            function,
            logger,
            root_rng,
        })
    }

    /// Runs the configured number of generations and returns the best
    /// individual of the final one. With a single worker the process
    /// group is skipped entirely; both paths share the same sample
    /// synthesis, evaluation, and reproduction code, so a run is
    /// reproducible for a given seed regardless of worker count.
    pub fn run(&mut self) -> Result<Individual> {
        info!(
            "Starting run: {:?}, population {}, {} generations, {} worker(s)",
            self.function, self.config.population_size, self.config.generations, self.config.workers
        );

        if self.config.workers > 1 {
            self.evolve_distributed()
        } else {
            self.evolve_local()
        }
    }

    fn evolve_local(&mut self) -> Result<Individual> {
        let mut population = Population::initialize(
            self.config.population_size,
            MIN_DEPTH,
            MAX_DEPTH,
            &mut self.root_rng,
        );

        for generation in 0..=self.config.generations {
            let seed: u32 = self.root_rng.gen();
            let samples = SampleSet::generate(seed, self.function);

            let start = Instant::now();
            let rpns = population.rpn_strings(0, population.len());
            let fitness = evaluate_slice(&rpns, &samples)?;
            for (i, value) in fitness.into_iter().enumerate() {
                population.get_mut(i).set_fitness(value);
            }
            let elapsed = start.elapsed().as_secs_f64();

            self.logger.log(&mut population, generation, elapsed)?;
            if generation < self.config.generations {
                population.update(
                    self.config.crossover_rate,
                    self.config.mutation_rate,
                    &mut self.root_rng,
                );
            }
        }

        Ok(take_best(&mut population))
    }

    fn evolve_distributed(&mut self) -> Result<Individual> {
        let controller = DispatchController::new(self.config.workers, self.function)?;

        let mut population = Population::initialize(
            self.config.population_size,
            MIN_DEPTH,
            MAX_DEPTH,
            &mut self.root_rng,
        );

        for generation in 0..=self.config.generations {
            let seed: u32 = self.root_rng.gen();

            let start = Instant::now();
            controller.evaluate_generation(&mut population, seed)?;
            let elapsed = start.elapsed().as_secs_f64();

            self.logger.log(&mut population, generation, elapsed)?;
            if generation < self.config.generations {
                population.update(
                    self.config.crossover_rate,
                    self.config.mutation_rate,
                    &mut self.root_rng,
                );
            }
        }

        controller.shutdown()?;
        Ok(take_best(&mut population))
    }
}

/// Copies out the best individual, keeping its measured fitness.
fn take_best(population: &mut Population) -> Individual {
    population.sort();
    let mut best = population.get(0).clone();
    best.set_fitness(population.get(0).fitness());
    best
}
