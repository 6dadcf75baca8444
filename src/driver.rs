//! Drivers that collect several functions of the same variables and assemble their
//! Jacobian.

use ndarray::{Array2, Axis};

use crate::{
    dual::Dual,
    error::{Error, Result},
    node::{Gradients, Node},
};

/// Common interface of the forward and reverse mode drivers.
pub trait AutoDiff {
    /// Value of each function.
    fn value(&self) -> Vec<f64>;

    /// Jacobian with one row per function and one column per variable.
    fn jacobian(&self) -> Result<Array2<f64>>;
}

/// Forward mode driver over dual numbers.
///
/// ```
/// use autodiff::{AutoDiff, Dual, Forward};
///
/// let x = Dual::variable(1., 0, 2).unwrap();
/// let y = Dual::variable(2., 1, 2).unwrap();
/// let forward = Forward::new(vec![&x * &y, &x + 3.]);
/// assert_eq!(forward.value(), vec![2., 4.]);
/// let der = forward.der(&[&y]).unwrap();
/// assert_eq!(der.column(0).to_vec(), vec![1., 0.]);
/// ```
#[derive(Clone, Debug)]
pub struct Forward {
    functions: Vec<Dual>,
}

impl Forward {
    pub fn new(functions: Vec<Dual>) -> Self {
        Self { functions }
    }

    pub fn functions(&self) -> &[Dual] {
        &self.functions
    }

    /// Columns of the Jacobian for the given seed variables, in the given order.
    /// An empty slice selects every column.
    pub fn der(&self, variables: &[&Dual]) -> Result<Array2<f64>> {
        let jacobian = self.jacobian()?;
        if variables.is_empty() {
            return Ok(jacobian);
        }
        let width = jacobian.ncols();
        let indices = variables
            .iter()
            .map(|var| {
                let index = var.seed_index().ok_or(Error::NotAVariable)?;
                if width <= index {
                    return Err(Error::IndexOutOfBounds { index, size: width });
                }
                Ok(index)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(jacobian.select(Axis(1), &indices))
    }
}

impl From<Dual> for Forward {
    fn from(function: Dual) -> Self {
        Self::new(vec![function])
    }
}

impl AutoDiff for Forward {
    fn value(&self) -> Vec<f64> {
        self.functions.iter().map(|f| f.val).collect()
    }

    fn jacobian(&self) -> Result<Array2<f64>> {
        let rows: Vec<Vec<f64>> = self.functions.iter().map(|f| f.der.to_vec()).collect();
        let width = rows.first().map_or(0, Vec::len);
        if let Some(row) = rows.iter().find(|row| row.len() != width) {
            return Err(Error::ShapeMismatch {
                expected: width,
                got: row.len(),
            });
        }
        Ok(Array2::from_shape_fn((rows.len(), width), |(i, j)| {
            rows[i][j]
        }))
    }
}

/// Reverse mode driver. Sweeps every function once on construction.
///
/// ```
/// use autodiff::{AutoDiff, Node, Reverse};
///
/// let x = Node::new("x", 2.);
/// let y = Node::new("y", 1.);
/// let reverse = Reverse::new(vec![(&x + &y) * &x], vec![x.clone(), y.clone()]);
/// assert_eq!(reverse.value(), vec![6.]);
/// assert_eq!(reverse.jacobian().unwrap().row(0).to_vec(), vec![5., 2.]);
/// ```
#[derive(Clone, Debug)]
pub struct Reverse {
    functions: Vec<Node>,
    variables: Vec<Node>,
    sweeps: Vec<Gradients>,
}

impl Reverse {
    pub fn new(functions: Vec<Node>, variables: Vec<Node>) -> Self {
        let sweeps = functions.iter().map(Node::backprop).collect();
        Self {
            functions,
            variables,
            sweeps,
        }
    }

    pub fn functions(&self) -> &[Node] {
        &self.functions
    }

    pub fn variables(&self) -> &[Node] {
        &self.variables
    }

    /// Sweep results, in the order of the functions.
    pub fn sweeps(&self) -> &[Gradients] {
        &self.sweeps
    }

    /// Derivatives of every function by `variables`, or by the variables given at
    /// construction if `None`. Any node works, not only the ones given at construction.
    pub fn der(&self, variables: Option<&[Node]>) -> Array2<f64> {
        let columns = variables.unwrap_or(&self.variables);
        Array2::from_shape_fn((self.sweeps.len(), columns.len()), |(i, j)| {
            self.sweeps[i].get(&columns[j])
        })
    }
}

impl AutoDiff for Reverse {
    fn value(&self) -> Vec<f64> {
        self.functions.iter().map(Node::val).collect()
    }

    fn jacobian(&self) -> Result<Array2<f64>> {
        Ok(self.der(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn forward_example() -> (Forward, [Dual; 3]) {
        let x = Dual::variable(PI, 0, 3).unwrap();
        let y = Dual::variable(2., 1, 3).unwrap();
        let z = Dual::variable(5., 2, 3).unwrap();
        let f1 = 3. * &x + 4. * &y * 2. - &z;
        let f2 = 3. * crate::sin(&x).unwrap() + 8. * y.powf(3.).unwrap() + z.powf(2.).unwrap();
        (Forward::new(vec![f1, f2]), [x, y, z])
    }

    #[test]
    fn test_forward_jacobian() {
        let (forward, _) = forward_example();
        let value = forward.value();
        assert_relative_eq!(value[0], 3. * PI + 16. - 5.);
        let jac = forward.jacobian().unwrap();
        let expected = [[3., 8., -1.], [-3., 96., 10.]];
        for i in 0..2 {
            for j in 0..3 {
                assert_relative_eq!(jac[[i, j]], expected[i][j], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_forward_at_integer_point() {
        let x = Dual::variable(1., 0, 3).unwrap();
        let y = Dual::variable(PI, 1, 3).unwrap();
        let z = Dual::variable(5., 2, 3).unwrap();
        let forward = Forward::from(3. * &x + 4. * &y * 2. - &z);
        assert_relative_eq!(forward.value()[0], 3. + 8. * PI - 5.);
        assert_eq!(forward.jacobian().unwrap().row(0).to_vec(), vec![3., 8., -1.]);
    }

    #[test]
    fn test_pow_at_zero_base() {
        let x = Dual::variable(0., 0, 2).unwrap();
        let y = Dual::variable(2., 1, 2).unwrap();
        let forward = Forward::from(x.pow(&y).unwrap()).jacobian().unwrap();

        let x = Node::new("x", 0.);
        let y = Node::new("y", 2.);
        let f = x.pow(&y).unwrap();
        let reverse = Reverse::new(vec![f], vec![x, y]).jacobian().unwrap();

        assert_eq!(forward, reverse);
        assert_eq!(forward.row(0).to_vec(), vec![0., 0.]);
    }

    #[test]
    fn test_forward_der() {
        let (forward, [x, _, z]) = forward_example();
        let der = forward.der(&[&z, &x, &z]).unwrap();
        assert_eq!(der.shape(), &[2, 3]);
        assert_eq!(der[[0, 0]], -1.);
        assert_eq!(der[[0, 1]], 3.);
        assert_eq!(der[[1, 2]], 10.);
        assert_eq!(forward.der(&[]).unwrap(), forward.jacobian().unwrap());

        let not_seed = &x * 2.;
        assert_eq!(forward.der(&[&not_seed]), Err(Error::NotAVariable));
        let outside = Dual::variable(0., 5, 6).unwrap();
        assert_eq!(
            forward.der(&[&outside]),
            Err(Error::IndexOutOfBounds { index: 5, size: 3 })
        );
    }

    #[test]
    fn test_forward_ragged() {
        let x = Dual::variable(1., 0, 2).unwrap();
        let forward = Forward::new(vec![x.clone(), Dual::new(1., 1.)]);
        assert_eq!(
            forward.jacobian(),
            Err(Error::ShapeMismatch {
                expected: 2,
                got: 1
            })
        );
        let scalar = Forward::from(Dual::new(3., 2.));
        assert_eq!(scalar.jacobian().unwrap().shape(), &[1, 1]);
    }

    #[test]
    fn test_reverse() {
        let x = Node::new("x", PI);
        let y = Node::new("y", PI / 2.);
        let z = Node::new("z", 0.);
        let f1 = 3. * crate::sin(&x).unwrap() + 4. * crate::cos(&y).unwrap() + crate::exp(&z).unwrap();
        let f2 = 6. * crate::sin(&x).unwrap()
            + crate::cos(&y).unwrap().powf(3.).unwrap()
            + z.powf(2.).unwrap();
        let reverse = Reverse::new(vec![f1, f2], vec![x.clone(), y.clone(), z.clone()]);
        let jac = reverse.jacobian().unwrap();
        let expected = [[-3., -4., 1.], [-6., 0., 0.]];
        for i in 0..2 {
            for j in 0..3 {
                assert_relative_eq!(jac[[i, j]], expected[i][j], epsilon = 1e-12);
            }
        }

        let partial = reverse.der(Some(&[z, x][..]));
        assert_eq!(partial.shape(), &[2, 2]);
        assert_relative_eq!(partial[[0, 0]], 1.);
        assert_relative_eq!(partial[[0, 1]], -3.);
    }

    #[test]
    fn test_reverse_unreached() {
        let x = Node::new("x", 1.);
        let y = Node::new("y", 1.);
        let reverse = Reverse::new(vec![&x * 2.], vec![x, y]);
        assert_eq!(reverse.der(None).row(0).to_vec(), vec![2., 0.]);
    }
}
