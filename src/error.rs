//! Error types shared by the forward, reverse and symbolic engines.

use thiserror::Error;

/// Result type alias using the crate's [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// An elementary function was applied outside of its real-valued domain
    #[error("{function} is not defined at {value}")]
    Domain { function: String, value: f64 },

    /// Symbolic evaluation reached a symbol without a binding
    #[error("Variable `{name}` has no value in the bindings")]
    UnboundVariable { name: String },

    /// Lengths that must agree do not
    #[error("Shape mismatch: expected length {expected}, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    /// An index does not fit in the vector it refers to
    #[error("Index {index} out of bounds for length {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    /// A derivative column was requested for a dual number that is not a seed variable
    #[error("Dual number was not created as a seed variable. Use `Dual::seed()` or `Dual::variable()`.")]
    NotAVariable,
}

impl Error {
    pub(crate) fn domain(function: impl Into<String>, value: f64) -> Self {
        Self::Domain {
            function: function.into(),
            value,
        }
    }
}

#[test]
fn test_display() {
    assert_eq!(
        Error::domain("arcsin", 2.).to_string(),
        "arcsin is not defined at 2"
    );
    assert_eq!(
        Error::UnboundVariable { name: "x".into() }.to_string(),
        "Variable `x` has no value in the bindings"
    );
}
