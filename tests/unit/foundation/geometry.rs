use super::*;

fn r() -> Rect {
    Rect::new(0.0, 0.0, 100.0, 50.0)
}

#[test]
fn compass_points_use_cartesian_y() {
    assert_eq!(r().point_at(Anchor::N), Point::new(50.0, 50.0));
    assert_eq!(r().point_at(Anchor::SW), Point::new(0.0, 0.0));
    assert_eq!(r().point_at(Anchor::E), Point::new(100.0, 25.0));
    assert_eq!(r().point_at(Anchor::C), Point::new(50.0, 25.0));
}

#[test]
fn anchor_parses_case_insensitively() {
    assert_eq!("ne".parse::<Anchor>().unwrap(), Anchor::NE);
    assert_eq!("mdpt".parse::<Anchor>().unwrap(), Anchor::C);
    assert!("up".parse::<Anchor>().is_err());
}

#[test]
fn take_and_divide_partition_the_rect() {
    let (left, rest) = r().divide(30.0, Edge::MinX);
    assert_eq!(left, Rect::new(0.0, 0.0, 30.0, 50.0));
    assert_eq!(rest, Rect::new(30.0, 0.0, 100.0, 50.0));
    assert_eq!(r().take(10.0, Edge::MaxY), Rect::new(0.0, 40.0, 100.0, 50.0));
    assert_eq!(r().take(20.0, Edge::MidX), Rect::new(40.0, 0.0, 60.0, 50.0));
}

#[test]
fn subdivide_from_top_walks_downwards() {
    let rows = r().subdivide(2, Edge::MaxY);
    assert_eq!(rows[0], Rect::new(0.0, 25.0, 100.0, 50.0));
    assert_eq!(rows[1], Rect::new(0.0, 0.0, 100.0, 25.0));
    assert!(r().subdivide(0, Edge::MinX).is_empty());
}

#[test]
fn flip_y_mirrors_inside_frame() {
    let inner = Rect::new(10.0, 0.0, 20.0, 10.0);
    assert_eq!(inner.flip_y(50.0), Rect::new(10.0, 40.0, 20.0, 50.0));
    assert_eq!(inner.flip_y(50.0).flip_y(50.0), inner);
}

#[test]
fn scale_about_keeps_anchor_fixed() {
    let s = r().scale_about(2.0, Anchor::SW);
    assert_eq!(s, Rect::new(0.0, 0.0, 200.0, 100.0));
    let c = r().scale_about(0.5, Anchor::C);
    assert_eq!(c.point_at(Anchor::C), r().point_at(Anchor::C));
}

#[test]
fn round_and_zero() {
    let odd = Rect::new(0.4, 1.6, 10.9, 12.2);
    assert_eq!(odd.round_xywh(), Rect::new(0.0, 2.0, 10.0, 13.0));
    assert_eq!(odd.offset_by(5.0, 5.0).zeroed().origin(), Point::ORIGIN);
    assert_eq!(r().inset_xy(10.0, 5.0), Rect::new(10.0, 5.0, 90.0, 45.0));
}
