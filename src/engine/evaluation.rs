use crate::engine::tree::{Op, VAR};
use crate::error::{Result, TreegpError};
use crate::function::TargetFunction;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

/// Number of sample points drawn for each generation's evaluation.
pub const NUM_SAMPLES: usize = 100;

/// Input points and ground-truth outputs for one generation. Regenerated
/// from the shared generation seed by every participant, so only the seed
/// ever crosses the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    pub inputs: Vec<f32>,
    pub targets: Vec<f32>,
}

impl SampleSet {
    pub fn generate(seed: u32, function: TargetFunction) -> Self {
        let mut rng = StdRng::seed_from_u64(u64::from(seed));
        let (lo, hi) = function.domain();
        let domain = Uniform::new_inclusive(lo, hi);

        let inputs: Vec<f32> = (0..NUM_SAMPLES).map(|_| domain.sample(&mut rng)).collect();
        let targets = inputs.iter().map(|&x| function.call(x)).collect();
        Self { inputs, targets }
    }
}

/// Evaluates an RPN expression at `x` with a stack machine.
///
/// Operand order for the non-commutative operations: with `a` the popped
/// top of stack and `b` the value below it, subtraction is `b - a` and
/// division is `b / a`. Division by zero is protected and yields 1.
pub fn evaluate_rpn(rpn: &str, x: f32) -> Result<f32> {
    let mut stack: Vec<f32> = Vec::new();

    for token in rpn.split_whitespace() {
        if token == VAR {
            stack.push(x);
        } else if let Some(op) = Op::from_token(token) {
            let (a, b) = match (stack.pop(), stack.pop()) {
                (Some(a), Some(b)) => (a, b),
                _ => {
                    return Err(TreegpError::InvalidRpn(format!(
                        "Operation {token:?} with fewer than two operands in {rpn:?}"
                    )))
                }
            };
            let result = match op {
                Op::Add => a + b,
                Op::Sub => b - a,
                Op::Mul => b * a,
                // Protected division.
                Op::Div => {
                    if a == 0.0 {
                        1.0
                    } else {
                        b / a
                    }
                }
            };
            stack.push(result);
        } else {
            let constant = token.parse::<f32>().map_err(|_| {
                TreegpError::InvalidRpn(format!("Unrecognized token: {token:?}"))
            })?;
            stack.push(constant);
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(value), true) => Ok(value),
        _ => Err(TreegpError::InvalidRpn(format!(
            "Expression does not reduce to a single value: {rpn:?}"
        ))),
    }
}

/// Root mean squared error of an expression over a sample set. The
/// per-sample evaluations are independent and fan out in parallel; the
/// squared errors are summed in sample order afterwards, so the score is
/// bit-identical no matter how the work was scheduled.
pub fn assign_rmse(rpn: &str, samples: &[f32], ground_truth: &[f32]) -> Result<f32> {
    let squared_errors = samples
        .par_iter()
        .zip(ground_truth.par_iter())
        .map(|(&x, &truth)| {
            evaluate_rpn(rpn, x).map(|predicted| {
                let diff = truth - predicted;
                diff * diff
            })
        })
        .collect::<Result<Vec<f32>>>()?;

    let sum_sq: f32 = squared_errors.iter().sum();
    Ok((sum_sq / samples.len() as f32).sqrt())
}

/// Scores a slice of RPN expressions against one sample set, fanning out
/// across the expressions. The stored fitness is RMSE weighted by node
/// count (one RPN token per node), which penalizes bloat.
///
/// This is the one local-evaluation path: each distributed worker and the
/// single-process fallback both go through here.
pub fn evaluate_slice(rpns: &[String], samples: &SampleSet) -> Result<Vec<f32>> {
    rpns.par_iter()
        .map(|rpn| {
            let rmse = assign_rmse(rpn, &samples.inputs, &samples.targets)?;
            let num_nodes = rpn.split_whitespace().count();
            Ok(rmse * num_nodes as f32)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operand_order_for_non_commutative_ops() {
        // (x + 3) * x at x = 1, -1, 0.
        assert_eq!(evaluate_rpn("x 3 + x *", 1.0).unwrap(), 4.0);
        assert_eq!(evaluate_rpn("x 3 + x *", -1.0).unwrap(), -2.0);
        assert_eq!(evaluate_rpn("x 3 + x *", 0.0).unwrap(), 0.0);
    }

    #[test]
    fn division_is_protected() {
        // 1 / x: protected at x = 0.
        assert_eq!(evaluate_rpn("1 x /", 0.0).unwrap(), 1.0);
        assert_eq!(evaluate_rpn("1 x /", 1.0).unwrap(), 1.0);
        assert_eq!(evaluate_rpn("1 x /", 5.0).unwrap(), 0.2);
    }

    #[test]
    fn malformed_expressions_error() {
        assert!(evaluate_rpn("x +", 1.0).is_err());
        assert!(evaluate_rpn("x x", 1.0).is_err());
        assert!(evaluate_rpn("frog", 1.0).is_err());
    }

    #[test]
    fn same_seed_same_samples() {
        let a = SampleSet::generate(42, TargetFunction::Sin);
        let b = SampleSet::generate(42, TargetFunction::Sin);
        assert_eq!(a, b);

        let c = SampleSet::generate(43, TargetFunction::Sin);
        assert_ne!(a, c);
    }
}
