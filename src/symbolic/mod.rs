//! Symbolic differentiation on expression trees.
//!
//! Expressions are built from [`Symbol`]s with the usual operators and the elementary
//! functions, differentiated into new trees with [`diff`] and evaluated at a set of
//! [`Bindings`].

mod diff;
mod expr;
mod symbol;

pub use self::{
    diff::{diff, jacobian_expression, jacobian_value},
    expr::{Bindings, Expr, ExprKind, Func},
    symbol::{symbols, Symbol},
};
