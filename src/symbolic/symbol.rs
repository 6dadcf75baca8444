use std::{
    fmt::Display,
    hash::{Hash, Hasher},
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

/// A named variable of symbolic expressions.
///
/// Every call to [`Symbol::new`] creates a distinct variable, even with a name that is
/// already in use. Clones refer to the same variable.
#[derive(Clone, Debug)]
pub struct Symbol {
    id: u64,
    name: Rc<str>,
}

impl Symbol {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            name: name.as_ref().into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Create one fresh symbol for each whitespace separated name.
///
/// ```
/// let vars = autodiff::symbols("x y z");
/// assert_eq!(vars.len(), 3);
/// assert_eq!(vars[1].name(), "y");
/// ```
pub fn symbols(names: &str) -> Vec<Symbol> {
    names.split_whitespace().map(Symbol::new).collect()
}

#[test]
fn test_identity() {
    let a = Symbol::new("x");
    let b = Symbol::new("x");
    assert_ne!(a, b);
    assert_eq!(a, a.clone());
    assert_eq!(a.to_string(), "x");
    assert!(symbols("  ").is_empty());
}
