//! Tree-based genetic programming for symbolic regression.
//!
//! A population of arithmetic expression trees, serialized as
//! reverse-Polish strings, is evolved against sampled points of a target
//! function. Evaluation is parallel on two levels: a process group of
//! rank-addressed workers splits the population per generation, and each
//! worker fans out over its assigned individuals and their sample points
//! with rayon.

pub mod config;
pub mod dispatch;
pub mod driver;
pub mod engine;
pub mod error;
pub mod function;
pub mod logger;

pub use config::RunConfig;
pub use driver::Driver;
pub use error::{Result, TreegpError};
pub use function::TargetFunction;
