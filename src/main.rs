use clap::Parser;
use log::info;
use std::path::PathBuf;
use treegp::{Driver, RunConfig};

/// Distributed genetic programming for symbolic regression.
#[derive(Parser, Debug)]
#[command(name = "treegp", version, about)]
struct Args {
    /// Mutation probability, in [0, 1]
    #[arg(short = 'm', long)]
    mutation_rate: f64,

    /// Crossover probability, in [0, 1]
    #[arg(short = 'c', long)]
    crossover_rate: f64,

    /// Root random seed
    #[arg(short = 's', long)]
    seed: u64,

    /// Target function id: 1 = log, 2 = exp, 3 = sin, 4 = parabola
    #[arg(short = 'f', long)]
    function: u32,

    /// Population size (> 2)
    #[arg(short = 'p', long)]
    population_size: usize,

    /// Number of generations
    #[arg(short = 'g', long)]
    generations: usize,

    /// Worker count; 1 runs without the process group
    #[arg(short = 'w', long, default_value_t = 1)]
    workers: usize,

    /// Directory for the run log and genome archive
    #[arg(short = 'o', long, default_value = "./output")]
    output_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = RunConfig {
        mutation_rate: args.mutation_rate,
        crossover_rate: args.crossover_rate,
        seed: args.seed,
        function_id: args.function,
        population_size: args.population_size,
        generations: args.generations,
        workers: args.workers,
        output_dir: args.output_dir,
    };

    let mut driver = Driver::new(config)?;
    let best = driver.run()?;

    info!("Best fitness: {}", best.fitness());
    println!("{best}");
    Ok(())
}
