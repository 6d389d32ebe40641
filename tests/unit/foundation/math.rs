use super::*;

#[test]
fn fnv_hash_is_stable_across_chunking() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"runon");
    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"ru");
    b.write_bytes(b"non");
    assert_eq!(a.finish(), b.finish());

    let mut c = Fnv1a64::new_default();
    c.write_u32(7);
    assert_ne!(c.finish(), Fnv1a64::new_default().finish());
}

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(1, 127), 0);
    assert_eq!(mul_div255_u16(2, 128), 1);
}
