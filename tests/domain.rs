use autodiff::{arcsin, sqrt, Bindings, Differentiable, Dual, Error, Expr, Node, Symbol};

fn is_domain_error<T>(res: autodiff::Result<T>) -> bool {
    matches!(res, Err(Error::Domain { .. }))
}

#[test]
fn arcsin_just_outside_domain() {
    let bad = 1.0000001;
    assert!(is_domain_error(arcsin(&bad)));
    assert!(is_domain_error(arcsin(&Dual::new(bad, 1.))));
    assert!(is_domain_error(arcsin(&Node::new("x", bad))));

    let x = Symbol::new("x");
    // The tree is built regardless of the value it will be evaluated at.
    let expr = arcsin(&Expr::from(&x)).unwrap();
    assert!(is_domain_error(expr.evaluate(&Bindings::from([(x.clone(), bad)]))));
    assert!(expr.evaluate(&Bindings::from([(x, 1.)])).is_ok());
}

#[test]
fn arcsin_on_boundary() {
    assert!(arcsin(&1.).is_ok());
    assert!(arcsin(&Dual::new(1., 1.)).is_ok());
    assert!(arcsin(&Node::new("x", -1.)).is_ok());
}

#[test]
fn fractional_power_of_negative_base() {
    let base = -8.;
    let exponent = 1. / 3.;
    assert!(is_domain_error(Differentiable::powf(&base, exponent)));
    assert!(is_domain_error(Dual::new(base, 1.).powf(exponent)));
    assert!(is_domain_error(Node::new("x", base).powf(exponent)));

    let x = Symbol::new("x");
    let negative = Bindings::from([(x.clone(), base)]);
    let root = Expr::from(&x).pow(exponent);
    assert!(is_domain_error(root.evaluate(&negative)));

    // Integer exponents stay defined for negative bases.
    assert_eq!(Differentiable::powf(&base, 2.), Ok(64.));
    assert_eq!(Dual::new(base, 1.).powf(2.).unwrap().val, 64.);
    assert_eq!(Node::new("x", base).powf(2.).unwrap().val(), 64.);
    assert_eq!(Expr::from(&x).pow(2.).evaluate(&negative), Ok(64.));
}

#[test]
fn square_root_of_negative_number() {
    assert!(is_domain_error(sqrt(&-1.)));
    assert!(is_domain_error(sqrt(&Dual::new(-1., 1.))));
    assert!(is_domain_error(Dual::new(-1., 1.).powf(0.5)));
    assert!(is_domain_error(sqrt(&Node::new("x", -1.))));

    let x = Symbol::new("x");
    let expr = sqrt(&Expr::from(&x)).unwrap();
    assert!(is_domain_error(expr.evaluate(&Bindings::from([(x, -1.)]))));
}
