use crate::error::{Error, Result};

/// A trait that represents an unary operation on a value.
/// It needs to implement a transformation of the value and its local derivative.
///
/// Forward mode multiplies `grad` into the incoming derivative, reverse mode records it
/// as the local gradient of the new node.
pub trait UnaryFn {
    fn name(&self) -> String;
    fn f(&self, data: f64) -> f64;
    fn grad(&self, data: f64) -> f64;

    /// Reject arguments outside of the real-valued domain of the function.
    fn check_domain(&self, _data: f64) -> Result<()> {
        Ok(())
    }

    fn eval(&self, data: f64) -> Result<f64> {
        self.check_domain(data)?;
        Ok(self.f(data))
    }
}

/// A user supplied function given as a pair of function pointers.
///
/// ```
/// use autodiff::{CustomFn, Dual};
///
/// let square = CustomFn::new("square", |x| x * x, |x| 2. * x);
/// let y = Dual::new(3., 1.).apply_fn(&square).unwrap();
/// assert_eq!(y.val, 9.);
/// ```
#[derive(Clone, Debug)]
pub struct CustomFn {
    pub name: String,
    pub f: fn(f64) -> f64,
    pub grad: fn(f64) -> f64,
}

impl CustomFn {
    pub fn new(name: impl Into<String>, f: fn(f64) -> f64, grad: fn(f64) -> f64) -> Self {
        Self {
            name: name.into(),
            f,
            grad,
        }
    }
}

impl UnaryFn for CustomFn {
    fn name(&self) -> String {
        self.name.clone()
    }
    fn f(&self, data: f64) -> f64 {
        (self.f)(data)
    }
    fn grad(&self, data: f64) -> f64 {
        (self.grad)(data)
    }
}

/// Parameters of the generalized logistic curve `L / (1 + exp(-k (x - x0)))`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Logistic {
    /// Supremum of the curve
    pub l: f64,
    /// Steepness
    pub k: f64,
    /// Midpoint
    pub x0: f64,
}

impl Logistic {
    pub fn new(l: f64, k: f64, x0: f64) -> Self {
        Self { l, k, x0 }
    }
}

impl Default for Logistic {
    /// The standard sigmoid.
    fn default() -> Self {
        Self::new(1., 1., 0.)
    }
}

/// The closed set of elementary functions every representation supports.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Elementary {
    Exp,
    /// Natural logarithm
    Log,
    /// Logarithm with the given base
    Logb(f64),
    Sqrt,
    Sin,
    Cos,
    Tan,
    Arcsin,
    Arccos,
    Arctan,
    Sinh,
    Cosh,
    Tanh,
    Logistic(Logistic),
}

impl Elementary {
    pub fn as_str(&self) -> &'static str {
        use Elementary::*;
        match self {
            Exp => "exp",
            Log => "log",
            Logb(_) => "logb",
            Sqrt => "sqrt",
            Sin => "sin",
            Cos => "cos",
            Tan => "tan",
            Arcsin => "arcsin",
            Arccos => "arccos",
            Arctan => "arctan",
            Sinh => "sinh",
            Cosh => "cosh",
            Tanh => "tanh",
            Self::Logistic(_) => "logistic",
        }
    }
}

impl UnaryFn for Elementary {
    fn name(&self) -> String {
        self.as_str().to_string()
    }

    fn f(&self, x: f64) -> f64 {
        use Elementary::*;
        match *self {
            Exp => x.exp(),
            Log => x.ln(),
            Logb(base) => x.ln() / base.ln(),
            Sqrt => x.sqrt(),
            Sin => x.sin(),
            Cos => x.cos(),
            Tan => x.tan(),
            Arcsin => x.asin(),
            Arccos => x.acos(),
            Arctan => x.atan(),
            Sinh => x.sinh(),
            Cosh => x.cosh(),
            Tanh => x.tanh(),
            Self::Logistic(p) => p.l / (1. + (-p.k * (x - p.x0)).exp()),
        }
    }

    fn grad(&self, x: f64) -> f64 {
        use Elementary::*;
        match *self {
            Exp => x.exp(),
            Log => 1. / x,
            Logb(base) => 1. / (x * base.ln()),
            Sqrt => 0.5 / x.sqrt(),
            Sin => x.cos(),
            Cos => -x.sin(),
            Tan => 1. / x.cos().powi(2),
            Arcsin => 1. / (1. - x * x).sqrt(),
            Arccos => -1. / (1. - x * x).sqrt(),
            Arctan => 1. / (1. + x * x),
            Sinh => x.cosh(),
            Cosh => x.sinh(),
            Tanh => 1. - x.tanh().powi(2),
            Self::Logistic(p) => {
                let s = self.f(x);
                p.k * s * (1. - s / p.l)
            }
        }
    }

    fn check_domain(&self, x: f64) -> Result<()> {
        use Elementary::*;
        // Written as negated comparisons so that NaN is rejected as well.
        let ok = match *self {
            Log => x > 0.,
            Logb(base) => {
                if !(base > 0.) || base == 1. {
                    return Err(Error::domain("logb base", base));
                }
                x > 0.
            }
            Sqrt => x >= 0.,
            Arcsin | Arccos => x.abs() <= 1.,
            _ => true,
        };
        if ok {
            Ok(())
        } else {
            Err(Error::domain(self.as_str(), x))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Central difference, only used to sanity check the closed forms.
    fn numeric_grad(func: Elementary, x: f64) -> f64 {
        let h = 1e-6;
        (func.f(x + h) - func.f(x - h)) / (2. * h)
    }

    #[test]
    fn test_grad_matches_difference_quotient() {
        use Elementary::{
            Arccos, Arcsin, Arctan, Cos, Cosh, Exp, Log, Logb, Sin, Sinh, Sqrt, Tan, Tanh,
        };
        let funcs = [
            Exp,
            Log,
            Logb(3.),
            Sqrt,
            Sin,
            Cos,
            Tan,
            Arcsin,
            Arccos,
            Arctan,
            Sinh,
            Cosh,
            Tanh,
            Elementary::Logistic(Logistic::default()),
            Elementary::Logistic(Logistic::new(2., 3., 0.25)),
        ];
        for func in funcs {
            let x = 0.3;
            assert_relative_eq!(func.grad(x), numeric_grad(func, x), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_domain() {
        assert!(Elementary::Arcsin.eval(1.).is_ok());
        assert!(Elementary::Arccos.eval(-1.).is_ok());
        assert_eq!(
            Elementary::Arcsin.eval(1.0000001),
            Err(Error::domain("arcsin", 1.0000001))
        );
        assert!(Elementary::Log.eval(0.).is_err());
        assert!(Elementary::Log.eval(f64::NAN).is_err());
        assert!(Elementary::Sqrt.eval(0.).is_ok());
        assert!(Elementary::Sqrt.eval(-1e-12).is_err());
        assert!(Elementary::Logb(1.).eval(2.).is_err());
        assert!(Elementary::Logb(0.2).eval(2.).is_ok());
        assert!(Elementary::Exp.eval(1e3).is_ok());
    }

    #[test]
    fn test_logistic_scales_with_l_and_k() {
        let p = Logistic::new(2., 3., 4.);
        let func = Elementary::Logistic(p);
        assert_relative_eq!(func.f(4.), 1.);
        // k * s * (1 - s / L) at the midpoint is k * L / 4
        assert_relative_eq!(func.grad(4.), 1.5);
    }

    #[test]
    fn test_custom_fn() {
        let cube = CustomFn::new("cube", |x| x * x * x, |x| 3. * x * x);
        assert_eq!(cube.name(), "cube");
        assert_eq!(cube.eval(2.), Ok(8.));
        assert_eq!(cube.grad(2.), 12.);
    }
}
