use crate::engine::tree::RpnTree;
use crate::error::Result;
use std::fmt;

/// One candidate solution: an expression tree plus its last measured
/// fitness. Lower fitness is better; unevaluated individuals carry the
/// +infinity sentinel, which loses every comparison against a real score.
#[derive(Debug)]
pub struct Individual {
    tree: RpnTree,
    fitness: f32,
}

impl Individual {
    pub fn from_rpn(rpn: &str) -> Result<Self> {
        Ok(Self::from_tree(RpnTree::build(rpn)?))
    }

    pub fn from_tree(tree: RpnTree) -> Self {
        Self {
            tree,
            fitness: f32::INFINITY,
        }
    }

    pub fn tree(&self) -> &RpnTree {
        &self.tree
    }

    pub fn rpn_string(&self) -> String {
        self.tree.post_order()
    }

    pub fn infix_string(&self) -> String {
        self.tree.in_order()
    }

    pub fn num_nodes(&self) -> usize {
        self.tree.num_nodes()
    }

    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }
}

impl Clone for Individual {
    /// Deep-copies the tree; fitness is not carried over and resets to the
    /// unevaluated sentinel.
    fn clone(&self) -> Self {
        Self::from_tree(self.tree.clone())
    }
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RPN: {}\nInfix: {}", self.rpn_string(), self.infix_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unevaluated() {
        let indv = Individual::from_rpn("x 1 +").unwrap();
        assert!(indv.fitness().is_infinite());
    }

    #[test]
    fn clone_resets_fitness_and_copies_tree() {
        let mut indv = Individual::from_rpn("x 1 +").unwrap();
        indv.set_fitness(0.5);

        let copy = indv.clone();
        assert!(copy.fitness().is_infinite());
        assert_eq!(copy.rpn_string(), indv.rpn_string());
    }
}
