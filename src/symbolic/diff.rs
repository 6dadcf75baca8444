use ndarray::Array2;

use super::{
    expr::{Bindings, Expr, ExprKind, Func},
    symbol::Symbol,
};
use crate::error::Result;

impl Expr {
    /// Derivative tree by `var`. No simplification is done apart from the constant folding
    /// in [`Expr::pow`].
    pub fn differentiate(&self, var: &Symbol) -> Expr {
        match self.kind() {
            ExprKind::Constant(_) => Expr::constant(0.),
            ExprKind::Symbol(symbol) => Expr::constant(if symbol == var { 1. } else { 0. }),
            ExprKind::Sum(operands) => {
                Expr::sum(operands.iter().map(|op| op.differentiate(var)).collect())
            }
            ExprKind::Product(operands) => {
                let derivatives: Vec<Expr> =
                    operands.iter().map(|op| op.differentiate(var)).collect();
                Expr::sum(
                    (0..operands.len())
                        .map(|i| {
                            Expr::product(
                                operands
                                    .iter()
                                    .zip(&derivatives)
                                    .enumerate()
                                    .map(|(j, (op, der))| if i == j { der } else { op })
                                    .cloned()
                                    .collect(),
                            )
                        })
                        .collect(),
                )
            }
            ExprKind::Division(numerator, denominator) => {
                (numerator.differentiate(var) * denominator
                    - numerator * denominator.differentiate(var))
                    / (denominator * denominator)
            }
            ExprKind::Power(base, exponent) => {
                match (base.is_constant(), exponent.is_constant()) {
                    (true, true) => Expr::constant(0.),
                    (false, true) => {
                        base.differentiate(var) * exponent * base.pow(exponent - 1.)
                    }
                    (true, false) => exponent.differentiate(var) * base.ln() * self,
                    (false, false) => {
                        self * (exponent.differentiate(var) * base.ln()
                            + exponent * base.differentiate(var) / base)
                    }
                }
            }
            ExprKind::Function(func, arg) => {
                let der = arg.differentiate(var);
                match func {
                    Func::Ln => der / arg,
                    Func::Sin => der * arg.cos(),
                    Func::Cos => der * arg.sin() * -1.,
                    Func::Tan => der / (arg.cos() * arg.cos()),
                    Func::Arcsin => der * (1. / (1. - arg * arg).pow(0.5)),
                    Func::Arccos => der * (1. / (1. - arg * arg).pow(0.5)) * -1.,
                    Func::Arctan => der * (1. / (arg * arg + 1.)),
                    Func::Sinh => der * arg.cosh(),
                    Func::Cosh => der * arg.sinh(),
                    Func::Tanh => der / (arg.cosh() * arg.cosh()),
                }
            }
        }
    }
}

/// Differentiate by each variable in turn, so `diff(f, &[&x, &y])` is the mixed second
/// derivative. An empty list gives back the expression.
pub fn diff(expr: &Expr, vars: &[&Symbol]) -> Expr {
    vars.iter()
        .fold(expr.clone(), |expr, var| expr.differentiate(var))
}

/// Jacobian as expression trees, one row per expression and one column per variable.
pub fn jacobian_expression(exprs: &[Expr], vars: &[&Symbol]) -> Vec<Vec<Expr>> {
    exprs
        .iter()
        .map(|expr| vars.iter().map(|var| expr.differentiate(var)).collect())
        .collect()
}

/// Jacobian evaluated at `bindings`.
pub fn jacobian_value(exprs: &[Expr], vars: &[&Symbol], bindings: &Bindings) -> Result<Array2<f64>> {
    let mut jacobian = Array2::zeros((exprs.len(), vars.len()));
    for (i, expr) in exprs.iter().enumerate() {
        for (j, var) in vars.iter().enumerate() {
            jacobian[[i, j]] = expr.differentiate(var).evaluate(bindings)?;
        }
    }
    Ok(jacobian)
}
