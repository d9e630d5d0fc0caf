#[test]
fn adds() {
    assert_eq!(near_ready::add(2, 2), 4);
}
