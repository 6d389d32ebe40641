use super::*;

#[test]
fn zero_radius_copies_input() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    assert_eq!(blur_rgba8_premul(&src, 1, 2, 0, 1.0).unwrap(), src);
    assert_eq!(blur_sigma(&src, 1, 2, 0.0).unwrap(), src);
}

#[test]
fn flat_image_stays_flat() {
    let (w, h) = (4u32, 3u32);
    let src = [10u8, 20, 30, 40].repeat((w * h) as usize);
    assert_eq!(blur_rgba8_premul(&src, w, h, 3, 2.0).unwrap(), src);
}

#[test]
fn single_pixel_spreads_and_conserves_alpha() {
    let (w, h) = (5u32, 5u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((2 * w + 2) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let out = blur_sigma(&src, w, h, 0.8).unwrap();
    assert!(out.chunks_exact(4).filter(|px| px[3] != 0).count() > 1);
    let sum_a: u32 = out.chunks_exact(4).map(|px| u32::from(px[3])).sum();
    assert!((sum_a as i32 - 255).abs() <= 4);
}

#[test]
fn radius_tracks_three_sigma() {
    assert_eq!(radius_for_sigma(1.0), 3);
    assert_eq!(radius_for_sigma(0.5), 2);
    assert_eq!(radius_for_sigma(-1.0), 0);
    assert_eq!(radius_for_sigma(f64::NAN), 0);
}

#[test]
fn bad_lengths_are_rejected() {
    assert!(blur_rgba8_premul(&[0u8; 7], 1, 2, 1, 1.0).is_err());
}
