use crate::error::{Result, TreegpError};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Handle to a tree node. Child links are the owning references; parent
/// links are weak and exist only so crossover can splice subtrees.
pub type NodeRef = Rc<RefCell<RpnNode>>;

/// The four arithmetic operations in the primitive set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    pub const ALL: [Op; 4] = [Op::Add, Op::Sub, Op::Mul, Op::Div];

    pub fn symbol(&self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
        }
    }

    pub fn from_token(token: &str) -> Option<Op> {
        match token {
            "+" => Some(Op::Add),
            "-" => Some(Op::Sub),
            "*" => Some(Op::Mul),
            "/" => Some(Op::Div),
            _ => None,
        }
    }
}

/// Value stored at a node: an operation, the input variable, or an
/// ephemeral random constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeValue {
    Operation(Op),
    Variable,
    Constant(f32),
}

impl NodeValue {
    /// Parses a single whitespace-delimited RPN token. Anything that is not
    /// an operation or the variable must parse as a constant.
    pub fn from_token(token: &str) -> Result<NodeValue> {
        if let Some(op) = Op::from_token(token) {
            return Ok(NodeValue::Operation(op));
        }
        if token == VAR {
            return Ok(NodeValue::Variable);
        }
        token
            .parse::<f32>()
            .map(NodeValue::Constant)
            .map_err(|_| TreegpError::InvalidRpn(format!("Unrecognized token: {token:?}")))
    }

    pub fn is_operation(&self) -> bool {
        matches!(self, NodeValue::Operation(_))
    }
}

impl fmt::Display for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeValue::Operation(op) => write!(f, "{}", op.symbol()),
            NodeValue::Variable => write!(f, "{VAR}"),
            NodeValue::Constant(c) => write!(f, "{c}"),
        }
    }
}

/// Token for the single input variable.
pub const VAR: &str = "x";

#[derive(Debug)]
pub struct RpnNode {
    pub value: NodeValue,
    pub left: Option<NodeRef>,
    pub right: Option<NodeRef>,
    pub parent: Weak<RefCell<RpnNode>>,
}

impl RpnNode {
    pub fn leaf(value: NodeValue) -> NodeRef {
        Rc::new(RefCell::new(RpnNode {
            value,
            left: None,
            right: None,
            parent: Weak::new(),
        }))
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn is_root(&self) -> bool {
        self.parent.upgrade().is_none()
    }
}

/// An arithmetic expression tree, built from and serialized to reverse
/// Polish notation. The postorder traversal is the canonical RPN form.
#[derive(Debug)]
pub struct RpnTree {
    root: NodeRef,
}

impl RpnTree {
    pub fn from_root(root: NodeRef) -> Self {
        Self { root }
    }

    /// Builds a tree from a whitespace-delimited RPN string. Each operation
    /// token pops two operands: the top of the stack becomes the right
    /// child, the one below it the left child.
    pub fn build(rpn: &str) -> Result<Self> {
        let mut stack: Vec<NodeRef> = Vec::new();

        for token in rpn.split_whitespace() {
            let value = NodeValue::from_token(token)?;
            if value.is_operation() {
                let right = stack.pop();
                let left = stack.pop();
                let (left, right) = match (left, right) {
                    (Some(l), Some(r)) => (l, r),
                    _ => {
                        return Err(TreegpError::InvalidRpn(format!(
                            "Operation {token:?} with fewer than two operands in {rpn:?}"
                        )))
                    }
                };

                let parent = Rc::new(RefCell::new(RpnNode {
                    value,
                    left: Some(left.clone()),
                    right: Some(right.clone()),
                    parent: Weak::new(),
                }));
                left.borrow_mut().parent = Rc::downgrade(&parent);
                right.borrow_mut().parent = Rc::downgrade(&parent);
                stack.push(parent);
            } else {
                stack.push(RpnNode::leaf(value));
            }
        }

        match (stack.pop(), stack.is_empty()) {
            (Some(root), true) => Ok(Self { root }),
            _ => Err(TreegpError::InvalidRpn(format!(
                "Expression does not reduce to a single tree: {rpn:?}"
            ))),
        }
    }

    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    /// Postorder traversal; this is the canonical RPN serialization.
    pub fn post_order(&self) -> String {
        let mut tokens = Vec::new();
        post_order_tokens(&self.root, &mut tokens);
        tokens.join(" ")
    }

    /// Inorder (infix) traversal. Every non-root operation subtree is
    /// wrapped in one pair of parentheses. Display-only, never re-parsed.
    pub fn in_order(&self) -> String {
        let mut tokens = Vec::new();
        in_order_tokens(&self.root, &mut tokens);
        tokens.join(" ")
    }

    pub fn num_nodes(&self) -> usize {
        count_nodes(&self.root)
    }

    /// Depth of the tree, counting the root as level 1.
    pub fn depth(&self) -> usize {
        node_depth(&self.root)
    }

    /// Returns the `idx`-th node of an iterative postorder traversal, the
    /// same ordering as the tokens of the RPN string. `None` when out of
    /// range.
    pub fn node_at(&self, idx: usize) -> Option<NodeRef> {
        let mut count = 0;
        let mut stack: Vec<(NodeRef, bool)> = vec![(self.root.clone(), false)];

        while let Some((node, children_done)) = stack.pop() {
            if children_done {
                if count == idx {
                    return Some(node);
                }
                count += 1;
            } else {
                let (left, right) = {
                    let n = node.borrow();
                    (n.left.clone(), n.right.clone())
                };
                stack.push((node, true));
                if let Some(r) = right {
                    stack.push((r, false));
                }
                if let Some(l) = left {
                    stack.push((l, false));
                }
            }
        }

        None
    }
}

impl Clone for RpnTree {
    /// Deep copy: every node is freshly allocated and parent links are
    /// re-derived, so no node is shared with the source tree.
    fn clone(&self) -> Self {
        Self {
            root: copy_of(&self.root, Weak::new()),
        }
    }
}

fn copy_of(current: &NodeRef, parent: Weak<RefCell<RpnNode>>) -> NodeRef {
    let node = current.borrow();
    let copy = Rc::new(RefCell::new(RpnNode {
        value: node.value,
        left: None,
        right: None,
        parent,
    }));

    let left = node.left.as_ref().map(|l| copy_of(l, Rc::downgrade(&copy)));
    let right = node.right.as_ref().map(|r| copy_of(r, Rc::downgrade(&copy)));
    drop(node);

    {
        let mut c = copy.borrow_mut();
        c.left = left;
        c.right = right;
    }
    copy
}

fn post_order_tokens(node: &NodeRef, out: &mut Vec<String>) {
    let (left, right, value) = {
        let n = node.borrow();
        (n.left.clone(), n.right.clone(), n.value)
    };
    if let Some(l) = left {
        post_order_tokens(&l, out);
    }
    if let Some(r) = right {
        post_order_tokens(&r, out);
    }
    out.push(value.to_string());
}

fn in_order_tokens(node: &NodeRef, out: &mut Vec<String>) {
    let (left, right, value, wrap) = {
        let n = node.borrow();
        let wrap = !n.is_root() && n.value.is_operation();
        (n.left.clone(), n.right.clone(), n.value, wrap)
    };

    if wrap {
        out.push("(".to_string());
    }
    if let Some(l) = left {
        in_order_tokens(&l, out);
    }
    out.push(value.to_string());
    if let Some(r) = right {
        in_order_tokens(&r, out);
    }
    if wrap {
        out.push(")".to_string());
    }
}

fn count_nodes(node: &NodeRef) -> usize {
    let n = node.borrow();
    let mut count = 1;
    if let Some(l) = &n.left {
        count += count_nodes(l);
    }
    if let Some(r) = &n.right {
        count += count_nodes(r);
    }
    count
}

fn node_depth(node: &NodeRef) -> usize {
    let n = node.borrow();
    let left = n.left.as_ref().map_or(0, node_depth);
    let right = n.right.as_ref().map_or(0, node_depth);
    1 + left.max(right)
}
