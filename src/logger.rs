use crate::config::RunConfig;
use crate::engine::population::Population;
use crate::error::Result;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

const LOG_HEADER: [&str; 13] = [
    "generation",
    "best_fitness",
    "worst_fitness",
    "mean_fitness",
    "fitness_std",
    "median_fitness",
    "max_nodes",
    "min_nodes",
    "mean_nodes",
    "nodes_std",
    "median_nodes",
    "total_nodes",
    "evaluation_time",
];

const ARCHIVE_HEADER: [&str; 4] = ["generation", "best_nodes", "best_genome_rpn", "best_genome_infix"];

/// Writes one summary row per generation to the run log and one row per
/// generation to the best-genome archive. Output names are de-duplicated
/// against earlier runs in the same directory (`log.csv`, then `log1.csv`,
/// and so on); headers are written once at startup, along with a JSON dump
/// of the run configuration.
pub struct RunLogger {
    log_writer: csv::Writer<File>,
    archive_writer: csv::Writer<File>,
}

impl RunLogger {
    pub fn new(config: &RunConfig) -> Result<Self> {
        fs::create_dir_all(&config.output_dir)?;

        let (log_path, archive_path) = unique_output_names(&config.output_dir);
        log::info!("Logging run to {}", log_path.display());

        serde_json::to_writer_pretty(
            File::create(config.output_dir.join("run_config.json"))?,
            config,
        )?;

        let mut log_writer = csv::Writer::from_path(&log_path)?;
        log_writer.write_record(LOG_HEADER)?;
        log_writer.flush()?;

        let mut archive_writer = csv::Writer::from_path(&archive_path)?;
        archive_writer.write_record(ARCHIVE_HEADER)?;
        archive_writer.flush()?;

        Ok(Self {
            log_writer,
            archive_writer,
        })
    }

    /// Appends this generation's summary statistics and archives the best
    /// genome. Sorts the population best-first as a side effect.
    pub fn log(
        &mut self,
        population: &mut Population,
        generation: usize,
        evaluation_time: f64,
    ) -> Result<()> {
        let n = population.len();

        let mut fit_sum = 0.0_f64;
        let mut fit_sumsq = 0.0_f64;
        let mut node_sum = 0_usize;
        let mut node_sumsq = 0_usize;
        let mut nodes = Vec::with_capacity(n);

        for indv in population.iter() {
            let fitness = f64::from(indv.fitness());
            fit_sum += fitness;
            fit_sumsq += fitness * fitness;

            let count = indv.num_nodes();
            nodes.push(count);
            node_sum += count;
            node_sumsq += count * count;
        }

        let fit_std = sample_std(fit_sum, fit_sumsq, n);
        let nodes_std = sample_std(node_sum as f64, node_sumsq as f64, n);

        population.sort();
        nodes.sort_unstable();

        let fit_median = if n % 2 == 0 {
            f64::from(population.get(n / 2).fitness())
        } else {
            f64::from(population.get(n / 2).fitness() + population.get((n + 1) / 2).fitness()) / 2.0
        };
        let nodes_median = if n % 2 == 0 {
            nodes[n / 2] as f64
        } else {
            (nodes[n / 2] + nodes[(n + 1) / 2]) as f64 / 2.0
        };

        let best = population.get(0);
        let worst = population.get(n - 1);

        self.log_writer.write_record(&[
            generation.to_string(),
            best.fitness().to_string(),
            worst.fitness().to_string(),
            (fit_sum / n as f64).to_string(),
            fit_std.to_string(),
            fit_median.to_string(),
            nodes[n - 1].to_string(),
            nodes[0].to_string(),
            (node_sum as f64 / n as f64).to_string(),
            nodes_std.to_string(),
            nodes_median.to_string(),
            node_sum.to_string(),
            evaluation_time.to_string(),
        ])?;
        self.log_writer.flush()?;

        self.archive_writer.write_record(&[
            generation.to_string(),
            best.num_nodes().to_string(),
            best.rpn_string(),
            best.infix_string(),
        ])?;
        self.archive_writer.flush()?;

        Ok(())
    }
}

/// Sample standard deviation in the n*sum(x^2) - sum(x)^2 form.
fn sample_std(sum: f64, sumsq: f64, n: usize) -> f64 {
    let n = n as f64;
    ((n * sumsq - sum * sum) / (n * (n - 1.0))).sqrt()
}

/// First unused (log, archive) file-name pair in the output directory.
fn unique_output_names(dir: &Path) -> (PathBuf, PathBuf) {
    if !dir.join("log.csv").exists() {
        return (dir.join("log.csv"), dir.join("archive.csv"));
    }

    let mut id = 1;
    while dir.join(format!("log{id}.csv")).exists() {
        id += 1;
    }
    (
        dir.join(format!("log{id}.csv")),
        dir.join(format!("archive{id}.csv")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_names_deduplicate() {
        let dir = std::env::temp_dir().join(format!("treegp-logger-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let (log, archive) = unique_output_names(&dir);
        assert_eq!(log, dir.join("log.csv"));
        assert_eq!(archive, dir.join("archive.csv"));

        File::create(&log).unwrap();
        let (log1, archive1) = unique_output_names(&dir);
        assert_eq!(log1, dir.join("log1.csv"));
        assert_eq!(archive1, dir.join("archive1.csv"));

        File::create(&log1).unwrap();
        let (log2, _) = unique_output_names(&dir);
        assert_eq!(log2, dir.join("log2.csv"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn sample_std_matches_direct_formula() {
        // Values 1, 2, 3, 4: mean 2.5, sample variance 5/3.
        let sum = 10.0;
        let sumsq = 30.0;
        let expected = (5.0_f64 / 3.0).sqrt();
        assert!((sample_std(sum, sumsq, 4) - expected).abs() < 1e-12);
    }
}
