use super::*;

fn slot(w: f64, h: f64) -> PreviewSlot {
    PreviewSlot {
        rect: Rect::new(0.0, 0.0, w, h),
        layer: false,
        is_error: false,
    }
}

#[test]
fn rows_stack_one_pixel_apart() {
    let l = calculate_window_size(&[slot(100.0, 50.0), slot(80.0, 30.0)], 1.0, None);
    assert_eq!(l.frame, Rect::new(0.0, 0.0, 100.0, 81.0));
    assert_eq!(l.rects[0], Rect::new(0.0, 0.0, 100.0, 50.0));
    assert_eq!(l.rects[1], Rect::new(0.0, 51.0, 80.0, 81.0));
    assert!(l.changed);
}

#[test]
fn layer_shares_previous_row() {
    let mut layered = slot(100.0, 50.0);
    layered.layer = true;
    let l = calculate_window_size(&[slot(100.0, 50.0), layered, slot(10.0, 10.0)], 1.0, None);
    assert_eq!(l.rects[1].y0, 0.0);
    assert_eq!(l.rects[2].y0, 51.0);
    assert_eq!(l.frame.height(), 61.0);
}

#[test]
fn scale_applies_except_to_errors() {
    let mut err = slot(300.0, 40.0);
    err.is_error = true;
    let l = calculate_window_size(&[slot(100.0, 50.0), err], 0.5, None);
    assert_eq!(l.rects[0].size(), kurbo::Size::new(50.0, 25.0));
    assert_eq!(l.rects[1].size(), kurbo::Size::new(300.0, 40.0));
    assert_eq!(l.frame.width(), 300.0);
    assert_eq!(l.scale, 0.5);
}

#[test]
fn scaled_sizes_are_rounded() {
    let l = calculate_window_size(&[slot(101.0, 51.0)], 0.5, None);
    assert_eq!(l.rects[0].width(), 51.0);
    assert_eq!(l.rects[0].height(), 26.0);
}

#[test]
fn unchanged_frame_is_reported() {
    let first = calculate_window_size(&[slot(10.0, 10.0)], 1.0, None);
    let again = calculate_window_size(&[slot(10.0, 10.0)], 1.0, Some(first.frame));
    assert!(!again.changed);
    let grown = calculate_window_size(&[slot(12.0, 10.0)], 1.0, Some(first.frame));
    assert!(grown.changed);
}

#[test]
fn empty_input_gives_empty_frame() {
    let l = calculate_window_size(&[], 1.0, None);
    assert_eq!(l.frame, Rect::ZERO);
    assert!(l.rects.is_empty());
}

#[test]
fn centring_offsets_narrow_previews() {
    let r = centre_in_frame(Rect::new(0.0, 10.0, 50.0, 20.0), Rect::new(0.0, 0.0, 101.0, 100.0));
    assert_eq!(r, Rect::new(26.0, 10.0, 76.0, 20.0));
}

#[test]
fn window_size_divides_by_content_scale() {
    assert_eq!(window_size(Rect::new(0.0, 0.0, 400.0, 200.0), 2.0), (200, 100));
    assert_eq!(window_size(Rect::new(0.0, 0.0, 400.0, 200.0), 0.0), (400, 200));
}

#[test]
fn pin_places_window_in_work_area_corners() {
    let work = Rect::new(0.0, 25.0, 1000.0, 825.0);
    assert_eq!(
        pin_window(work, (200.0, 100.0), Anchor::NE, (0.0, 0.0)),
        Point::new(800.0, 25.0)
    );
    assert_eq!(
        pin_window(work, (200.0, 100.0), Anchor::SW, (0.0, 0.0)),
        Point::new(0.0, 725.0)
    );
    assert_eq!(
        pin_window(work, (200.0, 100.0), Anchor::NE, (10.0, 5.0)),
        Point::new(790.0, 30.0)
    );
}

#[test]
fn vertically_centred_pin_is_shifted_down() {
    let work = Rect::new(0.0, 0.0, 1000.0, 800.0);
    let p = pin_window(work, (200.0, 100.0), Anchor::W, (0.0, 0.0));
    assert_eq!(p, Point::new(0.0, 380.0));
}
