use crate::engine::evolution::{crossover, full, grow, mutation, tournament_selection};
use crate::engine::individual::Individual;
use rand::Rng;

/// Number of contenders per tournament draw.
pub const TOURNAMENT_SIZE: usize = 2;

/// Depth range for ramped half-and-half initialization.
pub const MIN_DEPTH: usize = 2;
pub const MAX_DEPTH: usize = 6;

/// A fixed-length, ordered collection of individuals. The length never
/// changes over a run; generational replacement swaps in a fully built
/// successor population.
#[derive(Debug)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Ramped half-and-half initialization: individuals are spread evenly
    /// over the depth levels `min_depth..=max_depth` (the remainder goes
    /// one-per-level to the earliest depths), and within each depth split
    /// between `grow` and `full`, with any odd leftover going to `full`.
    pub fn initialize<R: Rng>(
        size: usize,
        min_depth: usize,
        max_depth: usize,
        rng: &mut R,
    ) -> Self {
        let num_depths = max_depth - min_depth + 1;
        let mut remainder = size % num_depths;
        let mut individuals = Vec::with_capacity(size);

        for depth in min_depth..=max_depth {
            let mut count = size / num_depths;
            if remainder > 0 {
                count += 1;
                remainder -= 1;
            }

            for _ in 0..count / 2 {
                individuals.push(grow(depth, rng));
            }
            for _ in 0..count / 2 + count % 2 {
                individuals.push(full(depth, rng));
            }
        }

        Self { individuals }
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn get(&self, idx: usize) -> &Individual {
        &self.individuals[idx]
    }

    pub fn get_mut(&mut self, idx: usize) -> &mut Individual {
        &mut self.individuals[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.iter()
    }

    /// RPN strings of a contiguous slice of the population, the form
    /// shipped to workers for evaluation.
    pub fn rpn_strings(&self, start: usize, len: usize) -> Vec<String> {
        self.individuals[start..start + len]
            .iter()
            .map(|indv| indv.rpn_string())
            .collect()
    }

    /// Sorts best-first: index 0 holds the numerically smallest (best)
    /// fitness afterwards.
    pub fn sort(&mut self) {
        self.individuals
            .sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));
    }

    /// Index of the individual with the smallest fitness.
    pub fn best_index(&self) -> usize {
        let mut best = 0;
        for (i, indv) in self.individuals.iter().enumerate() {
            if indv.fitness() < self.individuals[best].fitness() {
                best = i;
            }
        }
        best
    }

    /// Generational replacement with elitism of one. The best individual
    /// is copied unchanged into slot 0; every other slot is filled by
    /// tournament-selected parents from the current generation, crossed
    /// over with probability `crossover_rate` and mutated with probability
    /// `mutation_rate`. The new generation is swapped in only once fully
    /// built.
    pub fn update<R: Rng>(&mut self, crossover_rate: f64, mutation_rate: f64, rng: &mut R) {
        let mut next = Vec::with_capacity(self.len());
        next.push(self.individuals[self.best_index()].clone());

        for _ in 0..self.len() - 1 {
            let parent_a = tournament_selection(self, TOURNAMENT_SIZE, rng);
            let mut parent_b = tournament_selection(self, TOURNAMENT_SIZE, rng);
            while parent_b == parent_a {
                parent_b = tournament_selection(self, TOURNAMENT_SIZE, rng);
            }

            let mut child = if rng.gen::<f64>() < crossover_rate {
                crossover(
                    &self.individuals[parent_a],
                    &self.individuals[parent_b],
                    rng,
                )
            } else {
                self.individuals[parent_a].clone()
            };

            if rng.gen::<f64>() < mutation_rate {
                mutation(&mut child, rng);
            }

            next.push(child);
        }

        self.individuals = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn initialization_fills_every_slot() {
        let mut rng = StdRng::seed_from_u64(0);
        // 13 does not divide evenly over 5 depth levels.
        let population = Population::initialize(13, MIN_DEPTH, MAX_DEPTH, &mut rng);
        assert_eq!(population.len(), 13);
    }

    #[test]
    fn update_preserves_length_and_best() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut population = Population::initialize(20, MIN_DEPTH, MAX_DEPTH, &mut rng);

        for i in 0..population.len() {
            population.get_mut(i).set_fitness(i as f32 + 1.0);
        }
        let best_rpn = population.get(0).rpn_string();

        population.update(0.75, 0.01, &mut rng);
        assert_eq!(population.len(), 20);
        // Elitism: the best individual survives unchanged in slot 0.
        assert_eq!(population.get(0).rpn_string(), best_rpn);
    }

    #[test]
    fn sort_puts_best_first() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut population = Population::initialize(5, MIN_DEPTH, MAX_DEPTH, &mut rng);
        let fitness = [3.0, 1.0, 5.0, 0.5, 2.0];
        for (i, f) in fitness.iter().enumerate() {
            population.get_mut(i).set_fitness(*f);
        }

        population.sort();
        assert_eq!(population.get(0).fitness(), 0.5);
        assert_eq!(population.get(4).fitness(), 5.0);
    }
}
