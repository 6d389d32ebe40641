use super::*;

fn red() -> Fill {
    Fill::Solid(Color::rgb(1.0, 0.0, 0.0))
}

fn blue() -> Fill {
    Fill::Solid(Color::rgb(0.0, 0.0, 1.0))
}

#[test]
fn last_write_wins_within_a_layer() {
    let mut st = StyleStack::new();
    st.push(DEFAULT_LAYER, Attr::Fill { fill: Some(red()) });
    st.push(DEFAULT_LAYER, Attr::Fill { fill: Some(blue()) });
    assert_eq!(st.resolve(None).fill(), Some(&blue()));
}

#[test]
fn named_layer_is_isolated_from_default() {
    let mut st = StyleStack::new();
    st.push("x", Attr::Fill { fill: Some(red()) });
    st.push(DEFAULT_LAYER, Attr::Fill { fill: Some(blue()) });
    assert_eq!(st.resolve(Some("x")).fill(), Some(&red()));
    assert_eq!(st.resolve(None).fill(), Some(&blue()));
    // Unknown layers fall back to the default layer.
    assert_eq!(st.resolve(Some("missing")).fill(), Some(&blue()));
}

#[test]
fn stroke_parts_group_into_one_record() {
    let mut st = StyleStack::new();
    st.push(DEFAULT_LAYER, Attr::StrokeWeight { weight: 4.0 });
    st.push(DEFAULT_LAYER, Attr::Fill { fill: Some(red()) });
    st.push(DEFAULT_LAYER, Attr::StrokeColor { fill: Some(blue()) });
    st.push(DEFAULT_LAYER, Attr::Miter { limit: 2.0 });

    let resolved = st.resolve(None);
    assert_eq!(resolved.entries().len(), 2);
    assert!(matches!(resolved.entries()[0], StyleEntry::Stroke(_)));
    let stroke = resolved.stroke().unwrap();
    assert_eq!(stroke.weight, 4.0);
    assert_eq!(stroke.color, Some(blue()));
    assert_eq!(stroke.miter, Some(2.0));
}

#[test]
fn key_order_follows_first_write() {
    let mut st = StyleStack::new();
    st.push(DEFAULT_LAYER, Attr::Fill { fill: Some(red()) });
    st.push(DEFAULT_LAYER, Attr::Blend { mode: BlendMode::Multiply });
    st.push(DEFAULT_LAYER, Attr::Fill { fill: None });

    let resolved = st.resolve(None);
    assert!(matches!(resolved.entries()[0], StyleEntry::Fill(None)));
    assert_eq!(resolved.fill(), None);
    assert_eq!(resolved.blend(), BlendMode::Multiply);
    assert!(resolved.visible());
}

#[test]
fn raw_paint_merges_and_hides_private_keys() {
    let mut st = StyleStack::new();
    let mut a = BTreeMap::new();
    a.insert("AntiAlias".to_owned(), serde_json::json!(false));
    a.insert("_private".to_owned(), serde_json::json!(1));
    st.push(DEFAULT_LAYER, Attr::RawPaint { paint: a });
    let mut b = BTreeMap::new();
    b.insert("Alpha".to_owned(), serde_json::json!(0.5));
    st.push(DEFAULT_LAYER, Attr::RawPaint { paint: b });

    let raw = st.resolve(None).raw_paint();
    assert_eq!(raw.len(), 2);
    assert!(!raw.contains_key("_private"));
}

#[test]
fn layered_under_lets_top_win() {
    let mut first = StyleStack::new();
    first.push(DEFAULT_LAYER, Attr::Fill { fill: Some(red()) });
    first.push(DEFAULT_LAYER, Attr::StrokeWeight { weight: 3.0 });
    let mut root = StyleStack::new();
    root.push(DEFAULT_LAYER, Attr::Fill { fill: Some(blue()) });

    let merged = first.layered_under(&root).resolve(None);
    assert_eq!(merged.fill(), Some(&blue()));
    assert_eq!(merged.stroke().map(|s| s.weight), Some(3.0));
}

#[test]
fn patches_round_trip_through_json() {
    let mut st = StyleStack::new();
    st.push("x", Attr::Shadow(Shadow::default()));
    st.push(
        DEFAULT_LAYER,
        Attr::Dash(Dash {
            dashes: vec![4.0, 2.0],
            offset: 0.0,
        }),
    );
    let json = serde_json::to_string(&st).unwrap();
    let back: StyleStack = serde_json::from_str(&json).unwrap();
    assert_eq!(back, st);
}
