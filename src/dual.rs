//! Forward mode automatic differentiation with dual numbers.
//!
//! A [`Dual`] carries a value and its derivative along every operation. The derivative is
//! either a single number, for functions of one variable, or a vector with one component
//! per independent variable.

use std::{
    cmp::Ordering,
    fmt::Display,
    ops::{Add, Div, Mul, Neg, Sub},
};

use crate::{
    elementary::{check_pow, Differentiable},
    error::{Error, Result},
    unary_fn::{Elementary, UnaryFn},
};

/// Derivative part of a [`Dual`].
#[derive(Clone, Debug, PartialEq)]
pub enum Derivative {
    Scalar(f64),
    /// One component per independent variable
    Vector(Vec<f64>),
}

impl Derivative {
    /// One-hot vector of length `total` with `der` at `index`.
    pub fn one_hot(der: f64, index: usize, total: usize) -> Result<Self> {
        if total <= index {
            return Err(Error::IndexOutOfBounds { index, size: total });
        }
        let mut v = vec![0.; total];
        v[index] = der;
        Ok(Self::Vector(v))
    }

    /// Number of components. A scalar counts as one.
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Vector(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Self::Scalar(d) => *d == 0.,
            Self::Vector(v) => v.iter().all(|d| *d == 0.),
        }
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        match self {
            Self::Scalar(d) => (index == 0).then_some(*d),
            Self::Vector(v) => v.get(index).copied(),
        }
    }

    pub fn to_vec(&self) -> Vec<f64> {
        match self {
            Self::Scalar(d) => vec![*d],
            Self::Vector(v) => v.clone(),
        }
    }

    pub(crate) fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        match self {
            Self::Scalar(d) => Self::Scalar(f(*d)),
            Self::Vector(v) => Self::Vector(v.iter().copied().map(f).collect()),
        }
    }

    pub(crate) fn scale(&self, factor: f64) -> Self {
        self.map(|d| factor * d)
    }

    /// `a * self + b * rhs`, broadcasting a scalar against a vector.
    ///
    /// # Panics
    ///
    /// Panics if both sides are vectors of different lengths.
    pub(crate) fn lincomb(&self, a: f64, rhs: &Self, b: f64) -> Self {
        use Derivative::*;
        match (self, rhs) {
            (Scalar(lhs), Scalar(rhs)) => Scalar(a * lhs + b * rhs),
            (Scalar(lhs), Vector(rhs)) => Vector(rhs.iter().map(|rhs| a * lhs + b * rhs).collect()),
            (Vector(lhs), Scalar(rhs)) => Vector(lhs.iter().map(|lhs| a * lhs + b * rhs).collect()),
            (Vector(lhs), Vector(rhs)) => {
                assert_eq!(
                    lhs.len(),
                    rhs.len(),
                    "Derivative vectors of different lengths cannot be combined"
                );
                Vector(
                    lhs.iter()
                        .zip(rhs.iter())
                        .map(|(lhs, rhs)| a * lhs + b * rhs)
                        .collect(),
                )
            }
        }
    }
}

impl Display for Derivative {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar(d) => write!(f, "{d}"),
            Self::Vector(v) => {
                write!(f, "[")?;
                for (i, d) in v.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{d}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A dual number: a value and the derivative of that value.
///
/// ```
/// use autodiff::Dual;
///
/// let x = Dual::variable(2., 0, 2).unwrap();
/// let y = Dual::variable(1., 1, 2).unwrap();
/// let f = (&x + &y) * &x;
/// assert_eq!(f.val, 6.);
/// assert_eq!(f.der.to_vec(), vec![5., 2.]);
/// ```
#[derive(Clone, Debug)]
pub struct Dual {
    pub val: f64,
    pub der: Derivative,
    seed: Option<usize>,
}

impl Dual {
    /// A dual number with a scalar derivative.
    pub fn new(val: f64, der: f64) -> Self {
        Self::with_der(val, Derivative::Scalar(der))
    }

    pub fn with_der(val: f64, der: Derivative) -> Self {
        Self {
            val,
            der,
            seed: None,
        }
    }

    /// A number that does not depend on any variable.
    pub fn constant(val: f64) -> Self {
        Self::new(val, 0.)
    }

    /// Independent variable number `index` out of `total`, whose derivative is `der` in its
    /// own direction and zero in the others.
    ///
    /// All variables of one function must share the same `total`. Combining numbers seeded
    /// with different totals panics.
    pub fn seed(val: f64, der: f64, index: usize, total: usize) -> Result<Self> {
        Ok(Self {
            val,
            der: Derivative::one_hot(der, index, total)?,
            seed: Some(index),
        })
    }

    /// Same as [`Dual::seed`] with a unit derivative.
    pub fn variable(val: f64, index: usize, total: usize) -> Result<Self> {
        Self::seed(val, 1., index, total)
    }

    /// The variable index if this number was created with [`Dual::seed`].
    pub fn seed_index(&self) -> Option<usize> {
        self.seed
    }

    /// `self ^ rhs` where the exponent may carry a derivative too.
    pub fn pow(&self, rhs: &Dual) -> Result<Dual> {
        if rhs.der.is_zero() {
            return self.powf(rhs.val);
        }
        let u = self.val;
        let v = rhs.val;
        check_pow(u, v)?;
        let factor = u.powf(v - 1.);
        // u^v ln(u) vanishes as u goes to zero
        let log_factor = if u == 0. { 0. } else { factor * u * u.ln() };
        Ok(Dual::with_der(
            u.powf(v),
            self.der.lincomb(factor * v, &rhs.der, log_factor),
        ))
    }

    /// `self ^ n` for a constant exponent.
    pub fn powf(&self, n: f64) -> Result<Dual> {
        let u = self.val;
        check_pow(u, n)?;
        Ok(Dual::with_der(u.powf(n), self.der.scale(n * u.powf(n - 1.))))
    }

    /// Apply a function with a known derivative, checking its domain first.
    pub fn apply_fn(&self, f: &impl UnaryFn) -> Result<Dual> {
        let val = f.eval(self.val)?;
        Ok(Dual::with_der(val, self.der.scale(f.grad(self.val))))
    }
}

impl From<f64> for Dual {
    fn from(val: f64) -> Self {
        Self::constant(val)
    }
}

impl Differentiable for Dual {
    fn apply(&self, func: Elementary) -> Result<Self> {
        self.apply_fn(&func)
    }

    fn pow(&self, exponent: &Self) -> Result<Self> {
        Dual::pow(self, exponent)
    }

    fn powf(&self, exponent: f64) -> Result<Self> {
        Dual::powf(self, exponent)
    }
}

impl Display for Dual {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Dual(value={}, derivative={})", self.val, self.der)
    }
}

impl PartialEq for Dual {
    fn eq(&self, other: &Self) -> bool {
        self.val == other.val
    }
}

impl PartialEq<f64> for Dual {
    fn eq(&self, other: &f64) -> bool {
        self.val == *other
    }
}

impl PartialOrd for Dual {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.val.partial_cmp(&other.val)
    }
}

impl PartialOrd<f64> for Dual {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        self.val.partial_cmp(other)
    }
}

impl Add<&Dual> for &Dual {
    type Output = Dual;
    fn add(self, rhs: &Dual) -> Dual {
        Dual::with_der(self.val + rhs.val, self.der.lincomb(1., &rhs.der, 1.))
    }
}

impl Sub<&Dual> for &Dual {
    type Output = Dual;
    fn sub(self, rhs: &Dual) -> Dual {
        Dual::with_der(self.val - rhs.val, self.der.lincomb(1., &rhs.der, -1.))
    }
}

impl Mul<&Dual> for &Dual {
    type Output = Dual;
    fn mul(self, rhs: &Dual) -> Dual {
        Dual::with_der(
            self.val * rhs.val,
            self.der.lincomb(rhs.val, &rhs.der, self.val),
        )
    }
}

impl Div<&Dual> for &Dual {
    type Output = Dual;
    fn div(self, rhs: &Dual) -> Dual {
        let (u, v) = (self.val, rhs.val);
        Dual::with_der(u / v, self.der.lincomb(1. / v, &rhs.der, -u / (v * v)))
    }
}

impl Add<f64> for &Dual {
    type Output = Dual;
    fn add(self, rhs: f64) -> Dual {
        Dual::with_der(self.val + rhs, self.der.clone())
    }
}

impl Sub<f64> for &Dual {
    type Output = Dual;
    fn sub(self, rhs: f64) -> Dual {
        Dual::with_der(self.val - rhs, self.der.clone())
    }
}

impl Mul<f64> for &Dual {
    type Output = Dual;
    fn mul(self, rhs: f64) -> Dual {
        Dual::with_der(self.val * rhs, self.der.scale(rhs))
    }
}

impl Div<f64> for &Dual {
    type Output = Dual;
    fn div(self, rhs: f64) -> Dual {
        Dual::with_der(self.val / rhs, self.der.map(|d| d / rhs))
    }
}

impl Add<&Dual> for f64 {
    type Output = Dual;
    fn add(self, rhs: &Dual) -> Dual {
        rhs + self
    }
}

impl Sub<&Dual> for f64 {
    type Output = Dual;
    fn sub(self, rhs: &Dual) -> Dual {
        Dual::with_der(self - rhs.val, rhs.der.scale(-1.))
    }
}

impl Mul<&Dual> for f64 {
    type Output = Dual;
    fn mul(self, rhs: &Dual) -> Dual {
        rhs * self
    }
}

impl Div<&Dual> for f64 {
    type Output = Dual;
    fn div(self, rhs: &Dual) -> Dual {
        let v = rhs.val;
        Dual::with_der(self / v, rhs.der.scale(-self / (v * v)))
    }
}

/// Forward the owned variants of a binary operator to the borrowed implementation.
macro_rules! forward_binop {
    ($trait:ident, $method:ident) => {
        impl $trait<Dual> for Dual {
            type Output = Dual;
            fn $method(self, rhs: Dual) -> Dual {
                (&self).$method(&rhs)
            }
        }

        impl $trait<&Dual> for Dual {
            type Output = Dual;
            fn $method(self, rhs: &Dual) -> Dual {
                (&self).$method(rhs)
            }
        }

        impl $trait<Dual> for &Dual {
            type Output = Dual;
            fn $method(self, rhs: Dual) -> Dual {
                self.$method(&rhs)
            }
        }

        impl $trait<f64> for Dual {
            type Output = Dual;
            fn $method(self, rhs: f64) -> Dual {
                (&self).$method(rhs)
            }
        }

        impl $trait<Dual> for f64 {
            type Output = Dual;
            fn $method(self, rhs: Dual) -> Dual {
                self.$method(&rhs)
            }
        }
    };
}

forward_binop!(Add, add);
forward_binop!(Sub, sub);
forward_binop!(Mul, mul);
forward_binop!(Div, div);

impl Neg for &Dual {
    type Output = Dual;
    fn neg(self) -> Dual {
        Dual::with_der(-self.val, self.der.scale(-1.))
    }
}

impl Neg for Dual {
    type Output = Dual;
    fn neg(self) -> Dual {
        -&self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_seed() {
        let x = Dual::seed(1., 2., 1, 3).unwrap();
        assert_eq!(x.der, Derivative::Vector(vec![0., 2., 0.]));
        assert_eq!(x.seed_index(), Some(1));
        assert_eq!(
            Dual::variable(1., 3, 3).unwrap_err(),
            Error::IndexOutOfBounds { index: 3, size: 3 }
        );
        assert_eq!((&x * 2.).seed_index(), None);
    }

    #[test]
    fn test_scalar_rules() {
        let x = Dual::new(2., 1.);
        assert_eq!((&x * &x).der, Derivative::Scalar(4.));
        let q = &x / &x;
        assert_eq!(q.val, 1.);
        assert_eq!(q.der, Derivative::Scalar(0.));
        let p = x.pow(&x).unwrap();
        assert_eq!(p.val, 4.);
        assert_relative_eq!(p.der.to_vec()[0], (2f64.ln() + 1.) * 4.);
    }

    #[test]
    fn test_number_coercion() {
        let x = Dual::new(2., 1.);
        assert_eq!((3. - &x).der, Derivative::Scalar(-1.));
        assert_eq!((1. / &x).der, Derivative::Scalar(-0.25));
        assert_eq!((&x / 4.).der, Derivative::Scalar(0.25));
        assert_eq!((5. + x.clone() * 3.).der, Derivative::Scalar(3.));
        assert_eq!((-&x).val, -2.);
    }

    #[test]
    fn test_vector_rules() {
        let x = Dual::variable(2., 0, 2).unwrap();
        let y = Dual::variable(1., 1, 2).unwrap();

        let f = (&x + &y) * &x;
        assert_eq!(f.val, 6.);
        assert_eq!(f.der.to_vec(), vec![5., 2.]);

        let g = &x / &x + 3. * &y;
        assert_eq!(g.val, 4.);
        assert_eq!(g.der.to_vec(), vec![0., 3.]);

        let h = x.pow(&(2. * &x + 3. * &y)).unwrap();
        assert_eq!(h.val, 2f64.powi(7));
        let der = h.der.to_vec();
        let ln2 = 2f64.ln();
        assert_relative_eq!(der[0], 2f64.powi(7) * (2. * ln2 + 7. / 2.));
        assert_relative_eq!(der[1], 2f64.powi(7) * 3. * ln2);
    }

    #[test]
    fn test_pow_at_zero_base() {
        let x = Dual::variable(0., 0, 2).unwrap();
        let y = Dual::variable(2., 1, 2).unwrap();
        let f = x.pow(&y).unwrap();
        assert_eq!(f.val, 0.);
        assert_eq!(f.der.to_vec(), vec![0., 0.]);
    }

    #[test]
    fn test_pow_domain() {
        let x = Dual::new(-8., 1.);
        assert_eq!(x.powf(1. / 3.).unwrap_err(), Error::domain("pow", -8.));
        assert!(Dual::new(-1., 1.).powf(0.5).is_err());
        let cube = x.powf(3.).unwrap();
        assert_eq!(cube.val, -512.);
        assert_eq!(cube.der, Derivative::Scalar(192.));
        let y = Dual::variable(0.5, 0, 1).unwrap();
        assert!(Dual::constant(-2.).pow(&y).is_err());
    }

    #[test]
    fn test_constant_broadcasts() {
        let x = Dual::variable(2., 0, 3).unwrap();
        let c = Dual::constant(5.);
        assert_eq!((&c * &x).der.to_vec(), vec![5., 0., 0.]);
        assert_eq!((&c + &x).der.to_vec(), vec![1., 0., 0.]);
    }

    #[test]
    #[should_panic]
    fn test_length_mismatch() {
        let x = Dual::variable(2., 0, 2).unwrap();
        let y = Dual::variable(2., 0, 3).unwrap();
        let _ = x + y;
    }

    #[test]
    fn test_comparison() {
        let a = Dual::new(1., 5.);
        let b = Dual::new(1., -3.);
        assert_eq!(a, b);
        assert!(a < Dual::new(2., 0.));
        assert!(a >= 1.);
        assert!(a != 2.);
    }

    #[test]
    fn test_display() {
        let x = Dual::variable(2., 0, 2).unwrap();
        assert_eq!(x.to_string(), "Dual(value=2, derivative=[1, 0])");
        assert_eq!(Dual::new(0.5, 1.).to_string(), "Dual(value=0.5, derivative=1)");
    }

    #[test]
    fn test_elementary() {
        let x = Dual::new(0.5, 2.);
        let y = crate::sin(&x).unwrap();
        assert_eq!(y.val, 0.5f64.sin());
        assert_eq!(y.der, Derivative::Scalar(2. * 0.5f64.cos()));
        assert!(crate::arcsin(&Dual::new(1.0000001, 1.)).is_err());
    }
}
