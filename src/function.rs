use crate::error::{Result, TreegpError};

/// Catalog of target functions the engine can regress against.
///
/// Each function exposes a pure evaluation and the domain interval samples
/// are drawn from. Functions are selected by numeric id on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFunction {
    /// ln(1 + x)
    Log,
    /// e^x
    Exp,
    /// sin(x)
    Sin,
    /// (x + 1)^2 - 3
    Parabola,
}

impl TargetFunction {
    pub fn from_id(id: u32) -> Result<Self> {
        match id {
            1 => Ok(TargetFunction::Log),
            2 => Ok(TargetFunction::Exp),
            3 => Ok(TargetFunction::Sin),
            4 => Ok(TargetFunction::Parabola),
            other => Err(TreegpError::Configuration(format!(
                "Invalid function id: {other}"
            ))),
        }
    }

    pub fn call(&self, x: f32) -> f32 {
        match self {
            TargetFunction::Log => (1.0 + x).ln(),
            TargetFunction::Exp => x.exp(),
            TargetFunction::Sin => x.sin(),
            TargetFunction::Parabola => (x + 1.0) * (x + 1.0) - 3.0,
        }
    }

    /// Sampling interval [lo, hi] for this function.
    pub fn domain(&self) -> (f32, f32) {
        match self {
            TargetFunction::Log => (-0.99999, 1.0),
            TargetFunction::Exp => (-10.0, 10.0),
            TargetFunction::Sin => (-10.0, 10.0),
            TargetFunction::Parabola => (-100.0, 100.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        assert_eq!(TargetFunction::from_id(1).unwrap(), TargetFunction::Log);
        assert_eq!(TargetFunction::from_id(4).unwrap(), TargetFunction::Parabola);
        assert!(TargetFunction::from_id(0).is_err());
        assert!(TargetFunction::from_id(5).is_err());
    }

    #[test]
    fn parabola_values() {
        let f = TargetFunction::Parabola;
        assert_eq!(f.call(0.0), -2.0);
        assert_eq!(f.call(-1.0), -3.0);
        assert_eq!(f.call(1.0), 1.0);
    }
}
