//! Reverse mode automatic differentiation on a computation graph.
//!
//! Every operation on [`Node`]s evaluates eagerly and records its operands together with
//! the local partial derivatives. [`Node::backprop`] then visits the graph once in reverse
//! topological order and returns the accumulated derivatives as a [`Gradients`] table.

use std::{
    collections::{HashMap, HashSet},
    fmt::Display,
    hash::{Hash, Hasher},
    io::Write,
    ops::{Add, Div, Mul, Neg, Sub},
    rc::Rc,
};

use crate::{
    elementary::{check_pow, Differentiable},
    error::{Error, Result},
    unary_fn::{Elementary, UnaryFn},
};

#[derive(Debug)]
struct NodePayload {
    name: String,
    val: f64,
    /// Adjoint assigned to this node when it is the output of a sweep
    seed: f64,
    inputs: Vec<Node>,
    /// `gradients[i]` is the partial derivative of this node by `inputs[i]`
    gradients: Vec<f64>,
}

/// A shared handle to a node of the computation graph.
///
/// Cloning is cheap and yields the same node. Equality and hashing use node identity,
/// not value.
#[derive(Clone, Debug)]
pub struct Node(Rc<NodePayload>);

impl Node {
    /// A leaf variable.
    pub fn new(name: impl Into<String>, val: f64) -> Self {
        Self::with_seed(name, val, 1.)
    }

    /// A leaf variable whose adjoint starts at `seed` when it is the output of a sweep.
    pub fn with_seed(name: impl Into<String>, val: f64, seed: f64) -> Self {
        Self::new_payload(NodePayload {
            name: name.into(),
            val,
            seed,
            inputs: vec![],
            gradients: vec![],
        })
    }

    /// A leaf that stands for a plain number.
    pub fn constant(val: f64) -> Self {
        Self::new(format!("{val}"), val)
    }

    /// Build an intermediate node from its operands and the local partial derivatives.
    pub fn from_parts(
        name: impl Into<String>,
        val: f64,
        inputs: Vec<Node>,
        gradients: Vec<f64>,
    ) -> Result<Self> {
        if inputs.len() != gradients.len() {
            return Err(Error::ShapeMismatch {
                expected: inputs.len(),
                got: gradients.len(),
            });
        }
        Ok(Self::new_payload(NodePayload {
            name: name.into(),
            val,
            seed: 1.,
            inputs,
            gradients,
        }))
    }

    fn new_payload(payload: NodePayload) -> Self {
        Self(Rc::new(payload))
    }

    fn binary(name: String, lhs: &Node, rhs: &Node, val: f64, gradients: [f64; 2]) -> Self {
        Self::new_payload(NodePayload {
            name,
            val,
            seed: 1.,
            inputs: vec![lhs.clone(), rhs.clone()],
            gradients: gradients.to_vec(),
        })
    }

    fn unary(name: String, arg: &Node, val: f64, gradient: f64) -> Self {
        Self::new_payload(NodePayload {
            name,
            val,
            seed: 1.,
            inputs: vec![arg.clone()],
            gradients: vec![gradient],
        })
    }

    pub fn val(&self) -> f64 {
        self.0.val
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn seed(&self) -> f64 {
        self.0.seed
    }

    pub fn inputs(&self) -> &[Node] {
        &self.0.inputs
    }

    pub fn gradients(&self) -> &[f64] {
        &self.0.gradients
    }

    pub fn is_leaf(&self) -> bool {
        self.0.inputs.is_empty()
    }

    fn id(&self) -> usize {
        let payload = &*self.0;
        payload as *const _ as usize
    }

    /// `self ^ rhs` where both sides are graph nodes.
    pub fn pow(&self, rhs: &Node) -> Result<Node> {
        let (u, v) = (self.val(), rhs.val());
        check_pow(u, v)?;
        let val = u.powf(v);
        // u^v ln(u) vanishes as u goes to zero
        let log_grad = if u == 0. { 0. } else { val * u.ln() };
        Ok(Self::binary(
            binary_name("^", self, rhs),
            self,
            rhs,
            val,
            [v * u.powf(v - 1.), log_grad],
        ))
    }

    /// `self ^ n` for a constant exponent. The exponent does not become a node.
    pub fn powf(&self, n: f64) -> Result<Node> {
        let u = self.val();
        check_pow(u, n)?;
        Ok(Self::unary(
            powf_name(self, n),
            self,
            u.powf(n),
            n * u.powf(n - 1.),
        ))
    }

    /// Apply a function with a known derivative, checking its domain first.
    pub fn apply_fn(&self, f: &impl UnaryFn) -> Result<Node> {
        let val = f.eval(self.val())?;
        Ok(Self::unary(
            unary_name(&f.name(), self),
            self,
            val,
            f.grad(self.val()),
        ))
    }

    /// Reverse sweep from this node.
    ///
    /// The adjoint of this node starts at its seed. Each node passes
    /// `local gradient * adjoint` down to every input, after all the nodes depending on it
    /// have done the same.
    pub fn backprop(&self) -> Gradients {
        let order = topological_order(std::slice::from_ref(self));
        let mut adjoints = HashMap::new();
        adjoints.insert(self.id(), self.seed());
        for node in order.iter().rev() {
            let adjoint = adjoints.get(&node.id()).copied().unwrap_or(0.);
            for (input, gradient) in node.inputs().iter().zip(node.gradients()) {
                *adjoints.entry(input.id()).or_insert(0.) += gradient * adjoint;
            }
        }
        Gradients { order, adjoints }
    }

    /// One-time derivation by forward accumulation. Does not need a sweep.
    pub fn derive(&self, var: &Self) -> f64 {
        if self == var {
            1.
        } else {
            self.inputs()
                .iter()
                .zip(self.gradients())
                .map(|(input, gradient)| gradient * input.derive(var))
                .sum()
        }
    }

    /// Write graphviz dot file to the given writer.
    ///
    /// Gradients from a sweep are shown in the labels if given.
    pub fn dot(&self, writer: &mut impl Write, grads: Option<&Gradients>) -> std::io::Result<()> {
        let order = topological_order(std::slice::from_ref(self));
        let index: HashMap<usize, usize> = order
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id(), i))
            .collect();
        writeln!(writer, "digraph G {{\nrankdir=\"LR\";")?;
        for (i, node) in order.iter().enumerate() {
            write!(
                writer,
                "a{} [label=\"{} \\ndata:{}",
                i,
                node.name().replace('"', "\\\""),
                node.val()
            )?;
            if let Some(grads) = grads {
                write!(writer, ", grad:{}", grads.get(node))?;
            }
            writeln!(writer, "\"];")?;
        }
        for (i, node) in order.iter().enumerate() {
            for input in node.inputs() {
                writeln!(writer, "a{} -> a{};", index[&input.id()], i)?;
            }
        }
        writeln!(writer, "}}")?;
        Ok(())
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node(name={}, value={})", self.name(), self.val())
    }
}

impl From<f64> for Node {
    fn from(val: f64) -> Self {
        Self::constant(val)
    }
}

impl Differentiable for Node {
    fn apply(&self, func: Elementary) -> Result<Self> {
        self.apply_fn(&func)
    }

    fn pow(&self, exponent: &Self) -> Result<Self> {
        Node::pow(self, exponent)
    }

    fn powf(&self, exponent: f64) -> Result<Self> {
        Node::powf(self, exponent)
    }
}

#[cfg(feature = "expr_name")]
fn binary_name(op: &str, lhs: &Node, rhs: &Node) -> String {
    format!("({} {op} {})", lhs.name(), rhs.name())
}

#[cfg(not(feature = "expr_name"))]
fn binary_name(op: &str, _lhs: &Node, _rhs: &Node) -> String {
    op.to_string()
}

#[cfg(feature = "expr_name")]
fn unary_name(func: &str, arg: &Node) -> String {
    format!("{func}({})", arg.name())
}

#[cfg(not(feature = "expr_name"))]
fn unary_name(func: &str, _arg: &Node) -> String {
    func.to_string()
}

#[cfg(feature = "expr_name")]
fn powf_name(base: &Node, n: f64) -> String {
    format!("({} ^ {n})", base.name())
}

#[cfg(not(feature = "expr_name"))]
fn powf_name(_base: &Node, _n: f64) -> String {
    "^".to_string()
}

/// Nodes reachable from `outputs`, each one after all of its inputs.
pub fn topological_order(outputs: &[Node]) -> Vec<Node> {
    fn visit(node: &Node, visited: &mut HashSet<usize>, order: &mut Vec<Node>) {
        if !visited.insert(node.id()) {
            return;
        }
        for input in node.inputs() {
            visit(input, visited, order);
        }
        order.push(node.clone());
    }

    let mut visited = HashSet::new();
    let mut order = vec![];
    for output in outputs {
        visit(output, &mut visited, &mut order);
    }
    order
}

/// Result of a reverse sweep.
///
/// Holds the swept nodes, so a node identity cannot be reused by another allocation while
/// the table is alive.
#[derive(Clone, Debug, Default)]
pub struct Gradients {
    order: Vec<Node>,
    adjoints: HashMap<usize, f64>,
}

impl Gradients {
    /// Total derivative of the swept output by `node`. Nodes that the output does not
    /// depend on read as zero.
    pub fn get(&self, node: &Node) -> f64 {
        self.adjoints.get(&node.id()).copied().unwrap_or(0.)
    }

    /// The swept nodes in topological order.
    pub fn order(&self) -> &[Node] {
        &self.order
    }
}

impl Add<&Node> for &Node {
    type Output = Node;
    fn add(self, rhs: &Node) -> Node {
        Node::binary(
            binary_name("+", self, rhs),
            self,
            rhs,
            self.val() + rhs.val(),
            [1., 1.],
        )
    }
}

impl Sub<&Node> for &Node {
    type Output = Node;
    fn sub(self, rhs: &Node) -> Node {
        Node::binary(
            binary_name("-", self, rhs),
            self,
            rhs,
            self.val() - rhs.val(),
            [1., -1.],
        )
    }
}

impl Mul<&Node> for &Node {
    type Output = Node;
    fn mul(self, rhs: &Node) -> Node {
        let (a, b) = (self.val(), rhs.val());
        Node::binary(binary_name("*", self, rhs), self, rhs, a * b, [b, a])
    }
}

impl Div<&Node> for &Node {
    type Output = Node;
    fn div(self, rhs: &Node) -> Node {
        let (a, b) = (self.val(), rhs.val());
        Node::binary(
            binary_name("/", self, rhs),
            self,
            rhs,
            a / b,
            [1. / b, -a / (b * b)],
        )
    }
}

impl Neg for &Node {
    type Output = Node;
    fn neg(self) -> Node {
        Node::unary(unary_name("-", self), self, -self.val(), -1.)
    }
}

impl Neg for Node {
    type Output = Node;
    fn neg(self) -> Node {
        -&self
    }
}

/// Owned operands and plain numbers, which become constant leaves.
macro_rules! forward_binop {
    ($trait:ident, $method:ident) => {
        impl $trait<Node> for Node {
            type Output = Node;
            fn $method(self, rhs: Node) -> Node {
                (&self).$method(&rhs)
            }
        }

        impl $trait<&Node> for Node {
            type Output = Node;
            fn $method(self, rhs: &Node) -> Node {
                (&self).$method(rhs)
            }
        }

        impl $trait<Node> for &Node {
            type Output = Node;
            fn $method(self, rhs: Node) -> Node {
                self.$method(&rhs)
            }
        }

        impl $trait<f64> for &Node {
            type Output = Node;
            fn $method(self, rhs: f64) -> Node {
                self.$method(&Node::constant(rhs))
            }
        }

        impl $trait<f64> for Node {
            type Output = Node;
            fn $method(self, rhs: f64) -> Node {
                (&self).$method(&Node::constant(rhs))
            }
        }

        impl $trait<&Node> for f64 {
            type Output = Node;
            fn $method(self, rhs: &Node) -> Node {
                (&Node::constant(self)).$method(rhs)
            }
        }

        impl $trait<Node> for f64 {
            type Output = Node;
            fn $method(self, rhs: Node) -> Node {
                (&Node::constant(self)).$method(&rhs)
            }
        }
    };
}

forward_binop!(Add, add);
forward_binop!(Sub, sub);
forward_binop!(Mul, mul);
forward_binop!(Div, div);
