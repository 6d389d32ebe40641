use super::*;

#[test]
fn escapes_markup() {
    assert_eq!(xml_escape("a<b & 'c'"), "a&lt;b &amp; &apos;c&apos;");
}

#[test]
fn text_element_carries_position_and_colour() {
    let el = text_element("oops", 30.0, 70.0, 50.0, Color::rgb(1.0, 0.0, 0.0));
    assert!(el.contains(r#"x="30""#));
    assert!(el.contains(r#"y="70""#));
    assert!(el.contains("rgb(255,0,0)"));
    assert!(el.ends_with(">oops</text>"));
}

#[test]
fn rasterizes_plain_svg() {
    let tree = parse_svg(
        br##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"><rect width="4" height="4" fill="#00ff00"/></svg>"##,
    )
    .unwrap();
    let frame = rasterize_svg(&tree, 8, 8).unwrap();
    assert_eq!((frame.width, frame.height), (8, 8));
    assert_eq!(frame.pixel(4, 4), Some([0, 255, 0, 255]));
}

#[test]
fn empty_target_renders_nothing() {
    let f = render_text("x", 0.0, 0.0, 10.0, Color::BLACK, 0, 5).unwrap();
    assert!(f.data.is_empty());
}

#[test]
fn malformed_svg_is_an_error() {
    assert!(parse_svg(b"<svg").is_err());
}
