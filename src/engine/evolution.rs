use crate::engine::individual::Individual;
use crate::engine::tree::{NodeRef, NodeValue, Op, RpnNode, RpnTree};
use crate::engine::population::Population;
use rand::Rng;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Hard ceiling on tree size after crossover; 2^12.
pub const MAX_NUM_NODES: usize = 4096;

/// Probability of emitting an operation node while growing below max depth.
/// Four operations against two terminal kinds.
const OPERATION_PROB: f64 = 2.0 / 3.0;

fn ephemeral_constant<R: Rng>(rng: &mut R) -> f32 {
    rng.gen_range(-10.0..10.0)
}

fn make_terminal<R: Rng>(rng: &mut R, parent: Weak<RefCell<RpnNode>>) -> NodeRef {
    let value = if rng.gen_bool(0.5) {
        NodeValue::Variable
    } else {
        NodeValue::Constant(ephemeral_constant(rng))
    };
    let node = RpnNode::leaf(value);
    node.borrow_mut().parent = parent;
    node
}

fn make_operation<R: Rng>(rng: &mut R, parent: Weak<RefCell<RpnNode>>) -> NodeRef {
    let op = Op::ALL[rng.gen_range(0..Op::ALL.len())];
    let node = RpnNode::leaf(NodeValue::Operation(op));
    node.borrow_mut().parent = parent;
    node
}

/// Creates an individual with the "grow" method: below `max_depth` each
/// node is an operation with probability 2/3, otherwise a terminal; at
/// `max_depth` always a terminal. The root counts as depth 1.
pub fn grow<R: Rng>(max_depth: usize, rng: &mut R) -> Individual {
    Individual::from_tree(RpnTree::from_root(grow_recursion(
        max_depth,
        rng,
        1,
        Weak::new(),
    )))
}

fn grow_recursion<R: Rng>(
    max_depth: usize,
    rng: &mut R,
    current_depth: usize,
    parent: Weak<RefCell<RpnNode>>,
) -> NodeRef {
    if current_depth < max_depth && rng.gen::<f64>() < OPERATION_PROB {
        let node = make_operation(rng, parent);
        let left = grow_recursion(max_depth, rng, current_depth + 1, Rc::downgrade(&node));
        let right = grow_recursion(max_depth, rng, current_depth + 1, Rc::downgrade(&node));
        let mut n = node.borrow_mut();
        n.left = Some(left);
        n.right = Some(right);
        drop(n);
        node
    } else {
        make_terminal(rng, parent)
    }
}

/// Creates an individual with the "full" method: operations all the way
/// down to `max_depth`, yielding a complete tree of 2^max_depth - 1 nodes.
pub fn full<R: Rng>(max_depth: usize, rng: &mut R) -> Individual {
    Individual::from_tree(RpnTree::from_root(full_recursion(
        max_depth,
        rng,
        1,
        Weak::new(),
    )))
}

fn full_recursion<R: Rng>(
    max_depth: usize,
    rng: &mut R,
    current_depth: usize,
    parent: Weak<RefCell<RpnNode>>,
) -> NodeRef {
    if current_depth < max_depth {
        let node = make_operation(rng, parent);
        let left = full_recursion(max_depth, rng, current_depth + 1, Rc::downgrade(&node));
        let right = full_recursion(max_depth, rng, current_depth + 1, Rc::downgrade(&node));
        let mut n = node.borrow_mut();
        n.left = Some(left);
        n.right = Some(right);
        drop(n);
        node
    } else {
        make_terminal(rng, parent)
    }
}

/// Subtree crossover. Both parents are deep-copied; a random non-root node
/// of copy A is replaced by a random subtree of copy B. If the result
/// exceeds [`MAX_NUM_NODES`], an unmodified copy of parent A is returned
/// instead. The child is always a fresh, unevaluated individual.
pub fn crossover<R: Rng>(parent_a: &Individual, parent_b: &Individual, rng: &mut R) -> Individual {
    let size_a = parent_a.num_nodes();
    let size_b = parent_b.num_nodes();

    // A single-terminal parent A has no non-root crossover point.
    if size_a < 2 {
        return parent_a.clone();
    }

    let copy_a = parent_a.clone();
    let copy_b = parent_b.clone();

    // The root of copy A is excluded so the splice always has a parent to
    // attach under.
    let idx_a = rng.gen_range(0..size_a - 1);
    let idx_b = rng.gen_range(0..size_b);

    let cx_point_a = copy_a
        .tree()
        .node_at(idx_a)
        .expect("crossover index within tree");
    let cx_point_b = copy_b
        .tree()
        .node_at(idx_b)
        .expect("crossover index within tree");

    let splice_parent = cx_point_a
        .borrow()
        .parent
        .upgrade()
        .expect("non-root node has a parent");

    cx_point_b.borrow_mut().parent = Rc::downgrade(&splice_parent);

    let replaces_right = splice_parent
        .borrow()
        .right
        .as_ref()
        .map_or(false, |r| Rc::ptr_eq(r, &cx_point_a));
    if replaces_right {
        splice_parent.borrow_mut().right = Some(cx_point_b);
    } else {
        splice_parent.borrow_mut().left = Some(cx_point_b);
    }

    if copy_a.num_nodes() > MAX_NUM_NODES {
        parent_a.clone()
    } else {
        copy_a
    }
}

/// Point mutation, in place. An operation node is replaced by a different
/// operation; a terminal becomes the variable or a fresh ephemeral
/// constant with equal probability. Tree shape and size are unchanged.
pub fn mutation<R: Rng>(indv: &mut Individual, rng: &mut R) {
    let size = indv.num_nodes();
    let point = indv
        .tree()
        .node_at(rng.gen_range(0..size))
        .expect("mutation index within tree");

    let mut node = point.borrow_mut();
    node.value = match node.value {
        NodeValue::Operation(current) => {
            let others: Vec<Op> = Op::ALL.iter().copied().filter(|&op| op != current).collect();
            NodeValue::Operation(others[rng.gen_range(0..others.len())])
        }
        NodeValue::Variable | NodeValue::Constant(_) => {
            if rng.gen_bool(0.5) {
                NodeValue::Variable
            } else {
                NodeValue::Constant(ephemeral_constant(rng))
            }
        }
    };
}

/// Tournament selection: draws `tournament_size` distinct indices without
/// replacement and returns the index of the individual with the smallest
/// fitness among them (ties go to the first seen).
pub fn tournament_selection<R: Rng>(
    population: &Population,
    tournament_size: usize,
    rng: &mut R,
) -> usize {
    let candidates = rand::seq::index::sample(rng, population.len(), tournament_size);

    let mut winner = None;
    let mut best_fitness = f32::INFINITY;
    for idx in candidates {
        let fitness = population.get(idx).fitness();
        if winner.is_none() || fitness < best_fitness {
            best_fitness = fitness;
            winner = Some(idx);
        }
    }

    winner.expect("tournament size is at least one")
}
