//! Elementary functions that work on every representation.
//!
//! Each function has one name and dispatches statically on the operand type through
//! [`Differentiable`]. Raw `f64` is the base case without derivative tracking; [`Dual`],
//! [`Node`] and [`Expr`] attach derivative information the way their engine needs it.
//!
//! ```
//! use autodiff::{sin, Dual, Node, Expr, Symbol};
//!
//! let a: f64 = sin(&0.5).unwrap();
//! let b = sin(&Dual::new(0.5, 1.)).unwrap();
//! let c = sin(&Node::new("x", 0.5)).unwrap();
//! let d = sin(&Expr::from(&Symbol::new("x"))).unwrap();
//! assert_eq!(a, b.val);
//! assert_eq!(a, c.val());
//! assert_eq!(d.to_string(), "sin(x)");
//! ```
//!
//! [`Dual`]: crate::Dual
//! [`Node`]: crate::Node
//! [`Expr`]: crate::Expr

use crate::{
    error::{Error, Result},
    unary_fn::{Elementary, Logistic, UnaryFn},
};

/// A value representation that the elementary functions can be applied to.
///
/// Domain violations are reported as [`Error::Domain`](crate::Error::Domain) by every
/// numeric representation. Symbolic expressions defer the check to evaluation.
pub trait Differentiable: Clone + From<f64> {
    /// Apply an elementary function, attaching the local derivative.
    fn apply(&self, func: Elementary) -> Result<Self>;

    /// `self ^ exponent` where both sides may depend on the variables.
    ///
    /// A negative base with a non-integer exponent is a domain error.
    fn pow(&self, exponent: &Self) -> Result<Self>;

    /// `self ^ exponent` for a constant exponent.
    fn powf(&self, exponent: f64) -> Result<Self>;
}

/// A negative base has a real power only for an integer exponent.
pub(crate) fn check_pow(base: f64, exponent: f64) -> Result<()> {
    if base < 0. && exponent.fract() != 0. {
        return Err(Error::domain("pow", base));
    }
    Ok(())
}

impl Differentiable for f64 {
    fn apply(&self, func: Elementary) -> Result<Self> {
        func.eval(*self)
    }

    fn pow(&self, exponent: &Self) -> Result<Self> {
        Differentiable::powf(self, *exponent)
    }

    fn powf(&self, exponent: f64) -> Result<Self> {
        check_pow(*self, exponent)?;
        Ok(f64::powf(*self, exponent))
    }
}

pub fn exp<T: Differentiable>(x: &T) -> Result<T> {
    x.apply(Elementary::Exp)
}

/// Natural logarithm
pub fn log<T: Differentiable>(x: &T) -> Result<T> {
    x.apply(Elementary::Log)
}

/// Logarithm with an arbitrary base, which must be positive and not 1.
pub fn logb<T: Differentiable>(x: &T, base: f64) -> Result<T> {
    x.apply(Elementary::Logb(base))
}

pub fn sqrt<T: Differentiable>(x: &T) -> Result<T> {
    x.apply(Elementary::Sqrt)
}

pub fn sin<T: Differentiable>(x: &T) -> Result<T> {
    x.apply(Elementary::Sin)
}

pub fn cos<T: Differentiable>(x: &T) -> Result<T> {
    x.apply(Elementary::Cos)
}

pub fn tan<T: Differentiable>(x: &T) -> Result<T> {
    x.apply(Elementary::Tan)
}

pub fn arcsin<T: Differentiable>(x: &T) -> Result<T> {
    x.apply(Elementary::Arcsin)
}

pub fn arccos<T: Differentiable>(x: &T) -> Result<T> {
    x.apply(Elementary::Arccos)
}

pub fn arctan<T: Differentiable>(x: &T) -> Result<T> {
    x.apply(Elementary::Arctan)
}

pub fn sinh<T: Differentiable>(x: &T) -> Result<T> {
    x.apply(Elementary::Sinh)
}

pub fn cosh<T: Differentiable>(x: &T) -> Result<T> {
    x.apply(Elementary::Cosh)
}

pub fn tanh<T: Differentiable>(x: &T) -> Result<T> {
    x.apply(Elementary::Tanh)
}

/// Generalized logistic function `L / (1 + exp(-k (x - x0)))`.
///
/// Use `Logistic::default()` for the standard sigmoid.
pub fn logistic<T: Differentiable>(x: &T, params: Logistic) -> Result<T> {
    x.apply(Elementary::Logistic(params))
}

#[test]
fn test_raw_numbers() {
    use std::f64::consts::PI;
    assert_eq!(exp(&0.), Ok(1.));
    assert_eq!(log(&1.), Ok(0.));
    assert_eq!(logb(&8., 2.), Ok(3.));
    assert_eq!(sqrt(&4.), Ok(2.));
    assert_eq!(sin(&0.), Ok(0.));
    assert_eq!(cos(&0.), Ok(1.));
    approx::assert_relative_eq!(arcsin(&1.).unwrap(), PI / 2.);
    assert_eq!(logistic(&0., Logistic::default()), Ok(0.5));
    assert_eq!(logistic(&4., Logistic::new(2., 3., 4.)), Ok(1.));
    assert!(arcsin(&1.0000001).is_err());
    assert!(log(&-1.).is_err());
    assert_eq!(Differentiable::pow(&2., &3.), Ok(8.));
    assert_eq!(Differentiable::pow(&-8., &2.), Ok(64.));
    assert!(Differentiable::powf(&-8., 1. / 3.).is_err());
}
