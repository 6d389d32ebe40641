use super::*;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::new(24, 1).unwrap(),
    }
}

#[test]
fn odd_or_empty_sizes_are_rejected() {
    assert!(check_config(&cfg(0, 10)).is_err());
    assert!(check_config(&cfg(11, 10)).is_err());
    assert!(check_config(&cfg(10, 10)).is_ok());
}

#[test]
fn flatten_alpha_0_returns_bg() {
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg(&mut dst, &[0, 0, 0, 0], [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_half_red_over_black() {
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg(&mut dst, &[128, 0, 0, 128], [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128, 0, 0, 255]);
}

#[test]
fn flatten_rejects_length_mismatch() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_premul_over_bg(&mut dst, &[0, 0, 0, 0], [0, 0, 0, 255]).is_err());
}

#[test]
fn push_before_begin_fails() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("unused.mp4"));
    assert!(
        sink.push_frame(FrameIndex(0), &FrameRGBA::transparent(2, 2))
            .is_err()
    );
    assert!(sink.end().is_err());
}
