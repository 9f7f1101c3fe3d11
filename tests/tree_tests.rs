use treegp::engine::tree::{NodeValue, RpnTree};
use treegp::engine::Individual;

#[test]
fn build_round_trips_postorder() {
    // build(postorder()) must reproduce an isomorphic tree for any
    // well-formed RPN string.
    let cases = [
        "x",
        "3.5",
        "x 3 +",
        "x 3 + x *",
        "x 4 5 + * x 8 / +",
        "5 x 7 - *",
        "-2.25 x / 1 -",
    ];

    for rpn in cases {
        let tree = RpnTree::build(rpn).unwrap();
        let rebuilt = RpnTree::build(&tree.post_order()).unwrap();
        assert_eq!(tree.post_order(), rebuilt.post_order(), "case {rpn:?}");
    }
}

#[test]
fn node_count_matches_token_count() {
    let rpn = "x 4 5 + * x 8 / +";
    let tree = RpnTree::build(rpn).unwrap();
    assert_eq!(tree.num_nodes(), rpn.split_whitespace().count());
}

#[test]
fn parent_links_reach_the_root() {
    let tree = RpnTree::build("x 4 5 + * x 8 / +").unwrap();
    let n = tree.num_nodes();

    // Every node except the last postorder one (the root) has a parent.
    for i in 0..n - 1 {
        let node = tree.node_at(i).unwrap();
        assert!(!node.borrow().is_root(), "node {i} should not be root");
    }
    assert!(tree.node_at(n - 1).unwrap().borrow().is_root());
}

#[test]
fn leaves_have_no_children_and_internals_have_two() {
    let tree = RpnTree::build("x 4 5 + * x 8 / +").unwrap();
    for i in 0..tree.num_nodes() {
        let node = tree.node_at(i).unwrap();
        let node = node.borrow();
        if node.value.is_operation() {
            assert!(node.left.is_some() && node.right.is_some());
        } else {
            assert!(node.is_leaf());
        }
    }
}

#[test]
fn deep_copy_is_independent_of_source() {
    let original = Individual::from_rpn("x 4 5 + * x 8 / +").unwrap();
    let before = original.rpn_string();

    // Overwrite every node value in the copy; the original must not move.
    let copy = original.clone();
    for i in 0..copy.num_nodes() {
        let node = copy.tree().node_at(i).unwrap();
        node.borrow_mut().value = NodeValue::Constant(9.0);
    }

    assert_eq!(original.rpn_string(), before);
    assert_ne!(copy.rpn_string(), before);
}

#[test]
fn infix_rendering() {
    let tree = RpnTree::build("x 4 5 + * x 8 / +").unwrap();
    // Root + is unparenthesized; both operator operands get one pair.
    assert_eq!(tree.in_order(), "( x * ( 4 + 5 ) ) + ( x / 8 )");
}
