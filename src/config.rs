use crate::error::{Result, TreegpError};
use crate::function::TargetFunction;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Parameters for one evolution run, collected from the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    pub seed: u64,
    pub function_id: u32,
    pub population_size: usize,
    pub generations: usize,
    /// Size of the process group; 1 selects the single-process path.
    pub workers: usize,
    pub output_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mutation_rate: 0.01,
            crossover_rate: 0.75,
            seed: 0,
            function_id: 4,
            population_size: 250,
            generations: 100,
            workers: 1,
            output_dir: PathBuf::from("./output"),
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if self.mutation_rate < 0.0 || self.mutation_rate > 1.0 {
            return Err(TreegpError::Configuration(format!(
                "Mutation rate must be between 0 and 1, got {}",
                self.mutation_rate
            )));
        }
        if self.crossover_rate < 0.0 || self.crossover_rate > 1.0 {
            return Err(TreegpError::Configuration(format!(
                "Crossover rate must be between 0 and 1, got {}",
                self.crossover_rate
            )));
        }
        if self.population_size <= 2 {
            return Err(TreegpError::Configuration(format!(
                "Population size must be greater than 2, got {}",
                self.population_size
            )));
        }
        if self.generations < 1 {
            return Err(TreegpError::Configuration(
                "Number of generations must be at least 1".to_string(),
            ));
        }
        if self.workers < 1 {
            return Err(TreegpError::Configuration(
                "Worker count must be at least 1".to_string(),
            ));
        }

        // Fails on unknown function ids.
        TargetFunction::from_id(self.function_id)?;

        Ok(())
    }

    pub fn function(&self) -> Result<TargetFunction> {
        TargetFunction::from_id(self.function_id)
    }
}
