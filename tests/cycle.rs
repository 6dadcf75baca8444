use autodiff::Node;

#[test]
fn main() {
    let a = Node::new("a", 1.);
    let b = Node::new("b", 3.);
    let c = Node::new("c", 5.);
    let ab = &a + &b;
    let ac = &a + &c;
    let abac = &ab + &ac;

    let grads = abac.backprop();
    println!("abac: {abac:#?}");
    assert_eq!(abac.val(), 10.);
    assert_eq!(grads.get(&a), 2.);
    assert_eq!(grads.get(&b), 1.);
    assert_eq!(grads.get(&c), 1.);
    assert_eq!(grads.order().len(), 6);
    assert_eq!(abac.derive(&a), 2.);
}
