//! Automatic differentiation in three flavors.
//!
//! * Forward mode with [`Dual`] numbers, collected by [`Forward`].
//! * Reverse mode on a computation graph of [`Node`]s, collected by [`Reverse`].
//! * Symbolic differentiation of [`Expr`] trees with [`diff`].
//!
//! The elementary functions ([`sin`], [`exp`], [`logb`], ...) accept any of the three
//! representations as well as plain `f64`.
//!
//! ```
//! use autodiff::{sin, AutoDiff, Dual, Forward, Node, Reverse};
//!
//! let x = Dual::variable(1., 0, 1).unwrap();
//! let f = Forward::from(sin(&x).unwrap() * &x);
//!
//! let x = Node::new("x", 1.);
//! let r = Reverse::new(vec![sin(&x).unwrap() * &x], vec![x]);
//!
//! assert_eq!(f.jacobian().unwrap(), r.jacobian().unwrap());
//! ```

mod driver;
mod dual;
pub mod elementary;
pub mod error;
mod node;
pub mod symbolic;
mod unary_fn;

pub use driver::{AutoDiff, Forward, Reverse};
pub use dual::{Derivative, Dual};
pub use elementary::{
    arccos, arcsin, arctan, cos, cosh, exp, log, logb, logistic, sin, sinh, sqrt, tan, tanh,
    Differentiable,
};
pub use error::{Error, Result};
pub use node::{topological_order, Gradients, Node};
pub use symbolic::{
    diff, jacobian_expression, jacobian_value, symbols, Bindings, Expr, ExprKind, Func, Symbol,
};
pub use unary_fn::{CustomFn, Elementary, Logistic, UnaryFn};
