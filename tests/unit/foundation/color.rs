use super::*;
use serde_json::json;

#[test]
fn parses_hex_rgb_and_rgba() {
    let c: Color = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, Color::rgb(1.0, 0.0, 0.0));

    let c: Color = serde_json::from_value(json!("#0000ff80")).unwrap();
    assert!((c.b - 1.0).abs() < 1e-9);
    assert!((c.a - (128.0 / 255.0)).abs() < 1e-9);
    assert!(serde_json::from_value::<Color>(json!("#fff")).is_err());
}

#[test]
fn parses_objects_and_arrays() {
    let c: Color = serde_json::from_value(json!({"r": 0.25, "g": 0.5, "b": 0.75})).unwrap();
    assert_eq!(c, Color::rgb(0.25, 0.5, 0.75));

    let c: Color = serde_json::from_value(json!([0.25, 0.5, 0.75, 0.9])).unwrap();
    assert_eq!(c, Color::rgba(0.25, 0.5, 0.75, 0.9));

    let c: Color = serde_json::from_value(json!({"h": 120.0, "s": 1.0, "l": 0.5})).unwrap();
    assert!((c.g - 1.0).abs() < 1e-9);
    assert!(c.r.abs() < 1e-9);
}

#[test]
fn premul_and_hex_agree() {
    let c = Color::rgba(1.0, 0.5, 0.0, 0.5);
    assert_eq!(c.to_rgba8_premul().to_array(), [128, 64, 0, 128]);
    assert_eq!(Color::WHITE.to_hex(), "#ffffffff");
}

#[test]
fn gradients_follow_rect_compass() {
    let r = Rect::new(0.0, 0.0, 100.0, 40.0);
    let g = Gradient::vertical(r, Color::BLACK, Color::WHITE);
    assert_eq!(g.stops[0].point, Point::new(50.0, 0.0));
    assert_eq!(g.stops[1].point, Point::new(50.0, 40.0));
    let mid = g.sample(0.5);
    assert!((mid.r - 0.5).abs() < 1e-9);
}

#[test]
fn fill_deserializes_untagged() {
    let f: Fill = serde_json::from_value(json!("#00ff00")).unwrap();
    assert_eq!(f, Fill::Solid(Color::rgb(0.0, 1.0, 0.0)));
    let f: Fill = serde_json::from_value(json!({"stops": [
        {"color": "#000000", "point": [0.0, 0.0]},
        {"color": "#ffffff", "point": [10.0, 0.0]}
    ]}))
    .unwrap();
    assert!(matches!(f, Fill::Gradient(g) if g.stops.len() == 2));
}
