pub mod evaluation;
pub mod evolution;
pub mod individual;
pub mod population;
pub mod tree;

pub use evaluation::{assign_rmse, evaluate_rpn, evaluate_slice, SampleSet, NUM_SAMPLES};
pub use evolution::{crossover, full, grow, mutation, tournament_selection, MAX_NUM_NODES};
pub use individual::Individual;
pub use population::{Population, MAX_DEPTH, MIN_DEPTH, TOURNAMENT_SIZE};
pub use tree::{NodeRef, NodeValue, Op, RpnNode, RpnTree};
