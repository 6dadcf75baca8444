use std::{
    collections::HashMap,
    f64::consts::E,
    fmt::Display,
    ops::{Add, Div, Mul, Neg, Sub},
    rc::Rc,
};

use super::symbol::Symbol;
use crate::{
    elementary::{check_pow, Differentiable},
    error::{Error, Result},
    unary_fn::{Elementary, UnaryFn},
};

/// Values of the symbols an expression is evaluated at.
pub type Bindings = HashMap<Symbol, f64>;

/// Functions that appear as nodes of an expression tree.
///
/// The exponential, square root and general logarithms are expressed with [`Func::Ln`]
/// and powers, so they have no variant of their own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Func {
    Ln,
    Sin,
    Cos,
    Tan,
    Arcsin,
    Arccos,
    Arctan,
    Sinh,
    Cosh,
    Tanh,
}

impl Func {
    pub fn name(&self) -> &'static str {
        use Func::*;
        match self {
            Ln => "ln",
            Sin => "sin",
            Cos => "cos",
            Tan => "tan",
            Arcsin => "arcsin",
            Arccos => "arccos",
            Arctan => "arctan",
            Sinh => "sinh",
            Cosh => "cosh",
            Tanh => "tanh",
        }
    }

    /// The numeric function used for evaluation.
    fn elementary(&self) -> Elementary {
        use Func::*;
        match self {
            Ln => Elementary::Log,
            Sin => Elementary::Sin,
            Cos => Elementary::Cos,
            Tan => Elementary::Tan,
            Arcsin => Elementary::Arcsin,
            Arccos => Elementary::Arccos,
            Arctan => Elementary::Arctan,
            Sinh => Elementary::Sinh,
            Cosh => Elementary::Cosh,
            Tanh => Elementary::Tanh,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Constant(f64),
    Symbol(Symbol),
    Sum(Vec<Expr>),
    Product(Vec<Expr>),
    Division(Expr, Expr),
    Power(Expr, Expr),
    Function(Func, Expr),
}

/// An immutable expression tree. Subtrees are shared, so cloning is cheap.
///
/// ```
/// use autodiff::{symbols, Bindings, Expr};
///
/// let vars = symbols("x y");
/// let (x, y) = (&vars[0], &vars[1]);
/// let f = x * y + Expr::from(x).sin();
/// let bindings = Bindings::from([(x.clone(), 0.), (y.clone(), 3.)]);
/// assert_eq!(f.evaluate(&bindings).unwrap(), 0.);
/// assert_eq!(f.to_string(), "((x)*(y))+(sin(x))");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Expr(Rc<ExprKind>);

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self(Rc::new(kind))
    }

    pub fn constant(val: f64) -> Self {
        Self::new(ExprKind::Constant(val))
    }

    pub fn symbol(symbol: &Symbol) -> Self {
        Self::new(ExprKind::Symbol(symbol.clone()))
    }

    pub fn sum(operands: Vec<Expr>) -> Self {
        Self::new(ExprKind::Sum(operands))
    }

    pub fn product(operands: Vec<Expr>) -> Self {
        Self::new(ExprKind::Product(operands))
    }

    pub fn division(numerator: Expr, denominator: Expr) -> Self {
        Self::new(ExprKind::Division(numerator, denominator))
    }

    pub fn function(func: Func, arg: Expr) -> Self {
        Self::new(ExprKind::Function(func, arg))
    }

    pub fn kind(&self) -> &ExprKind {
        &self.0
    }

    /// Power expression. A side that does not contain any symbol is folded into a
    /// constant when it can be evaluated.
    pub fn pow(&self, exponent: impl Into<Expr>) -> Expr {
        Self::new(ExprKind::Power(
            self.fold_constant(),
            exponent.into().fold_constant(),
        ))
    }

    fn fold_constant(&self) -> Expr {
        match self.kind() {
            ExprKind::Constant(_) => self.clone(),
            _ if self.is_constant() => match self.evaluate(&Bindings::new()) {
                Ok(val) => Expr::constant(val),
                Err(_) => self.clone(),
            },
            _ => self.clone(),
        }
    }

    /// Whether the tree contains no symbol.
    pub fn is_constant(&self) -> bool {
        match self.kind() {
            ExprKind::Constant(_) => true,
            ExprKind::Symbol(_) => false,
            ExprKind::Sum(operands) | ExprKind::Product(operands) => {
                operands.iter().all(Expr::is_constant)
            }
            ExprKind::Division(lhs, rhs) | ExprKind::Power(lhs, rhs) => {
                lhs.is_constant() && rhs.is_constant()
            }
            ExprKind::Function(_, arg) => arg.is_constant(),
        }
    }

    pub fn evaluate(&self, bindings: &Bindings) -> Result<f64> {
        match self.kind() {
            ExprKind::Constant(val) => Ok(*val),
            ExprKind::Symbol(symbol) => {
                bindings
                    .get(symbol)
                    .copied()
                    .ok_or_else(|| Error::UnboundVariable {
                        name: symbol.name().to_string(),
                    })
            }
            ExprKind::Sum(operands) => operands.iter().map(|op| op.evaluate(bindings)).sum(),
            ExprKind::Product(operands) => {
                operands.iter().map(|op| op.evaluate(bindings)).product()
            }
            ExprKind::Division(numerator, denominator) => {
                Ok(numerator.evaluate(bindings)? / denominator.evaluate(bindings)?)
            }
            ExprKind::Power(base, exponent) => {
                let base = base.evaluate(bindings)?;
                let exponent = exponent.evaluate(bindings)?;
                check_pow(base, exponent)?;
                Ok(base.powf(exponent))
            }
            ExprKind::Function(func, arg) => func.elementary().eval(arg.evaluate(bindings)?),
        }
    }

    pub fn exp(&self) -> Expr {
        Expr::constant(E).pow(self)
    }

    /// Natural logarithm
    pub fn ln(&self) -> Expr {
        Expr::function(Func::Ln, self.clone())
    }

    pub fn sqrt(&self) -> Expr {
        self.pow(0.5)
    }

    pub fn sin(&self) -> Expr {
        Expr::function(Func::Sin, self.clone())
    }

    pub fn cos(&self) -> Expr {
        Expr::function(Func::Cos, self.clone())
    }

    pub fn tan(&self) -> Expr {
        Expr::function(Func::Tan, self.clone())
    }

    pub fn arcsin(&self) -> Expr {
        Expr::function(Func::Arcsin, self.clone())
    }

    pub fn arccos(&self) -> Expr {
        Expr::function(Func::Arccos, self.clone())
    }

    pub fn arctan(&self) -> Expr {
        Expr::function(Func::Arctan, self.clone())
    }

    pub fn sinh(&self) -> Expr {
        Expr::function(Func::Sinh, self.clone())
    }

    pub fn cosh(&self) -> Expr {
        Expr::function(Func::Cosh, self.clone())
    }

    pub fn tanh(&self) -> Expr {
        Expr::function(Func::Tanh, self.clone())
    }
}

impl Differentiable for Expr {
    fn apply(&self, func: Elementary) -> Result<Self> {
        use Elementary::*;
        Ok(match func {
            Exp => self.exp(),
            Log => self.ln(),
            Logb(base) => {
                if !(base > 0.) || base == 1. {
                    return Err(Error::domain("logb base", base));
                }
                self.ln() / base.ln()
            }
            Sqrt => self.sqrt(),
            Sin => self.sin(),
            Cos => self.cos(),
            Tan => self.tan(),
            Arcsin => self.arcsin(),
            Arccos => self.arccos(),
            Arctan => self.arctan(),
            Sinh => self.sinh(),
            Cosh => self.cosh(),
            Tanh => self.tanh(),
            Elementary::Logistic(p) => p.l / (1. + (-p.k * (self - p.x0)).exp()),
        })
    }

    /// Builds the tree. The domain is checked when it is evaluated.
    fn pow(&self, exponent: &Self) -> Result<Self> {
        Ok(Expr::pow(self, exponent))
    }

    fn powf(&self, exponent: f64) -> Result<Self> {
        Ok(Expr::pow(self, exponent))
    }
}

impl From<f64> for Expr {
    fn from(val: f64) -> Self {
        Self::constant(val)
    }
}

impl From<&Expr> for Expr {
    fn from(expr: &Expr) -> Self {
        expr.clone()
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Self::new(ExprKind::Symbol(symbol))
    }
}

impl From<&Symbol> for Expr {
    fn from(symbol: &Symbol) -> Self {
        Self::symbol(symbol)
    }
}

fn write_joined(f: &mut std::fmt::Formatter<'_>, operands: &[Expr], sep: &str) -> std::fmt::Result {
    for (i, op) in operands.iter().enumerate() {
        if i != 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "({op})")?;
    }
    Ok(())
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind() {
            ExprKind::Constant(val) => write!(f, "{val}"),
            ExprKind::Symbol(symbol) => write!(f, "{symbol}"),
            ExprKind::Sum(operands) => write_joined(f, operands, "+"),
            ExprKind::Product(operands) => write_joined(f, operands, "*"),
            ExprKind::Division(numerator, denominator) => {
                write!(f, "({numerator})/({denominator})")
            }
            ExprKind::Power(base, exponent) => write!(f, "({base})^({exponent})"),
            ExprKind::Function(func, arg) => write!(f, "{}({arg})", func.name()),
        }
    }
}

fn add_exprs(lhs: Expr, rhs: Expr) -> Expr {
    Expr::sum(vec![lhs, rhs])
}

fn sub_exprs(lhs: Expr, rhs: Expr) -> Expr {
    Expr::sum(vec![lhs, Expr::product(vec![Expr::constant(-1.), rhs])])
}

fn mul_exprs(lhs: Expr, rhs: Expr) -> Expr {
    Expr::product(vec![lhs, rhs])
}

fn div_exprs(lhs: Expr, rhs: Expr) -> Expr {
    Expr::division(lhs, rhs)
}

/// Operators between any two operand types that convert into an [`Expr`].
macro_rules! impl_binops {
    ($($lhs:ty, $rhs:ty;)*) => {
        $(
            impl Add<$rhs> for $lhs {
                type Output = Expr;
                fn add(self, rhs: $rhs) -> Expr {
                    add_exprs(Expr::from(self), Expr::from(rhs))
                }
            }

            impl Sub<$rhs> for $lhs {
                type Output = Expr;
                fn sub(self, rhs: $rhs) -> Expr {
                    sub_exprs(Expr::from(self), Expr::from(rhs))
                }
            }

            impl Mul<$rhs> for $lhs {
                type Output = Expr;
                fn mul(self, rhs: $rhs) -> Expr {
                    mul_exprs(Expr::from(self), Expr::from(rhs))
                }
            }

            impl Div<$rhs> for $lhs {
                type Output = Expr;
                fn div(self, rhs: $rhs) -> Expr {
                    div_exprs(Expr::from(self), Expr::from(rhs))
                }
            }
        )*
    };
}

impl_binops! {
    Expr, Expr;
    Expr, &Expr;
    &Expr, Expr;
    &Expr, &Expr;
    Expr, f64;
    &Expr, f64;
    f64, Expr;
    f64, &Expr;
    Expr, &Symbol;
    &Expr, &Symbol;
    &Symbol, Expr;
    &Symbol, &Expr;
    &Symbol, &Symbol;
    &Symbol, f64;
    f64, &Symbol;
}

macro_rules! impl_neg {
    ($($operand:ty),*) => {
        $(
            impl Neg for $operand {
                type Output = Expr;
                fn neg(self) -> Expr {
                    Expr::product(vec![Expr::from(self), Expr::constant(-1.)])
                }
            }
        )*
    };
}

impl_neg!(Expr, &Expr, &Symbol);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::symbols;

    #[test]
    fn test_display() {
        let x = Symbol::new("x");
        let two_cos = Expr::from(2.).pow(Expr::from(&x).cos());
        assert_eq!(two_cos.to_string(), "(2)^(cos(x))");
        assert_eq!((&x - 1.).to_string(), "(x)+((-1)*(1))");
        assert_eq!((-&x).to_string(), "(x)*(-1)");
        assert_eq!((1. / &x).to_string(), "(1)/(x)");
        assert_eq!(Expr::from(&x).ln().to_string(), "ln(x)");
        assert_eq!(Expr::from(&x).exp().to_string(), format!("({E})^(x)"));
        assert_eq!(Expr::from(&x).sqrt().to_string(), "(x)^(0.5)");
    }

    #[test]
    fn test_evaluate() {
        let vars = symbols("x y");
        let (x, y) = (&vars[0], &vars[1]);
        let f = x * y - x / y;
        let bindings = Bindings::from([(x.clone(), 3.), (y.clone(), 2.)]);
        assert_eq!(f.evaluate(&bindings), Ok(4.5));
        assert_eq!(
            f.evaluate(&Bindings::from([(x.clone(), 3.)])),
            Err(Error::UnboundVariable { name: "y".into() })
        );
    }

    #[test]
    fn test_evaluate_domain() {
        let x = Symbol::new("x");
        let bindings = Bindings::from([(x.clone(), -8.)]);
        let root = Expr::from(&x).pow(1. / 3.);
        assert!(matches!(
            root.evaluate(&bindings),
            Err(Error::Domain { .. })
        ));
        assert_eq!(Expr::from(&x).pow(2.).evaluate(&bindings), Ok(64.));
        assert!(Expr::from(&x).ln().evaluate(&bindings).is_err());
    }

    #[test]
    fn test_pow_folds_constants() {
        let x = Symbol::new("x");
        let e = Expr::from(&x).pow(Expr::from(2.) - 1.);
        assert_eq!(e.to_string(), "(x)^(1)");
        assert!(!e.is_constant());
        assert!((Expr::from(2.) * 3.).is_constant());
        let c = Expr::from(2.).pow(3.);
        assert!(c.is_constant());
        assert_eq!(c.evaluate(&Bindings::new()), Ok(8.));
    }

    #[test]
    fn test_logistic() {
        let x = Symbol::new("x");
        let params = crate::Logistic::new(2., 3., 4.);
        let f = crate::logistic(&Expr::from(&x), params).unwrap();
        let bindings = Bindings::from([(x.clone(), 4.)]);
        approx::assert_relative_eq!(f.evaluate(&bindings).unwrap(), 1.);
        assert!(crate::logb(&Expr::from(&x), 1.).is_err());
    }
}
