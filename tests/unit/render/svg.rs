use super::*;
use crate::foundation::core::Rect;
use crate::pen::drawing::rect_path;

#[test]
fn empty_document_has_size_and_viewbox() {
    let doc = SvgCanvas::new(40, 30).finish();
    assert!(doc.starts_with("<svg"));
    assert!(doc.contains(r#"width="40" height="30" viewBox="0 0 40 30""#));
    assert!(!doc.contains("<defs>"));
    assert!(doc.trim_end().ends_with("</svg>"));
}

#[test]
fn fill_emits_path_with_color_and_transform() {
    let mut c = SvgCanvas::new(10, 10);
    c.translate(2.0, 3.0);
    c.draw_path(
        &rect_path(Rect::new(0.0, 0.0, 4.0, 4.0)),
        &Paint::fill(Color::rgb(1.0, 0.0, 0.0)),
    )
    .unwrap();
    let doc = c.finish();
    assert!(doc.contains(r#"fill="rgb(255,0,0)""#));
    assert!(doc.contains(r#"transform="matrix(1 0 0 1 2 3)""#));
}

#[test]
fn stroke_carries_width_dash_and_miter() {
    let mut c = SvgCanvas::new(10, 10);
    let mut p = Paint::stroke(Color::BLACK, 2.0);
    p.style = PaintStyle::Stroke(StrokeParams {
        width: 2.0,
        miter: Some(4.0),
        dash: Some(crate::pen::attrs::Dash {
            dashes: vec![3.0, 1.0],
            offset: 0.5,
        }),
    });
    c.draw_path(&rect_path(Rect::new(1.0, 1.0, 9.0, 9.0)), &p)
        .unwrap();
    let doc = c.finish();
    assert!(doc.contains(r#"fill="none""#));
    assert!(doc.contains(r#"stroke-width="2""#));
    assert!(doc.contains(r#"stroke-miterlimit="4""#));
    assert!(doc.contains(r#"stroke-dasharray="3 1" stroke-dashoffset="0.5""#));
}

#[test]
fn zero_width_stroke_is_dropped() {
    let mut c = SvgCanvas::new(10, 10);
    c.draw_path(
        &rect_path(Rect::new(1.0, 1.0, 9.0, 9.0)),
        &Paint::stroke(Color::BLACK, 0.0),
    )
    .unwrap();
    assert!(!c.finish().contains("<path"));
}

#[test]
fn gradient_blur_and_blend_go_through_defs() {
    let mut c = SvgCanvas::new(10, 10);
    let mut p = Paint::with_shader(Shader::Linear {
        start: Point::new(0.0, 0.0),
        end: Point::new(10.0, 0.0),
        colors: vec![Color::BLACK, Color::WHITE],
    });
    p.blur = Some(2.0);
    p.blend = BlendMode::Multiply;
    p.alpha = 0.5;
    c.draw_path(&rect_path(Rect::new(0.0, 0.0, 10.0, 10.0)), &p)
        .unwrap();
    let doc = c.finish();
    assert!(doc.contains("<linearGradient id=\"g1\""));
    assert!(doc.contains(r#"fill="url(#g1)""#));
    assert!(doc.contains(r#"<feGaussianBlur stdDeviation="2"/>"#));
    assert!(doc.contains("mix-blend-mode:multiply"));
    assert!(doc.contains(r#"opacity="0.5""#));
}

#[test]
fn clips_nest_and_restore() {
    let mut c = SvgCanvas::new(10, 10);
    c.save();
    c.clip_rect(Rect::new(0.0, 0.0, 5.0, 5.0));
    c.clip_rect(Rect::new(2.0, 2.0, 8.0, 8.0));
    c.draw_path(&rect_path(Rect::new(0.0, 0.0, 10.0, 10.0)), &Paint::fill(Color::BLACK))
        .unwrap();
    c.restore();
    c.draw_path(&rect_path(Rect::new(0.0, 0.0, 1.0, 1.0)), &Paint::fill(Color::BLACK))
        .unwrap();
    let doc = c.finish();
    assert!(doc.contains(r#"<clipPath id="c2" clip-path="url(#c1)">"#));
    assert!(doc.contains(r#"<g clip-path="url(#c2)"><path"#));
    let last = doc.lines().filter(|l| l.starts_with("<path")).count();
    assert_eq!(last, 1, "unclipped draw after restore");
}

#[test]
fn images_are_embedded_as_png_data() {
    let mut c = SvgCanvas::new(4, 4);
    let img = Arc::new(FrameRGBA::from_premul(1, 1, vec![255, 0, 0, 255]).unwrap());
    c.draw_image(&img, Rect::new(0.0, 0.0, 4.0, 4.0), &Paint::fill(Color::BLACK))
        .unwrap();
    assert!(c.finish().contains("xlink:href=\"data:image/png;base64,"));
}

#[test]
fn clear_replaces_body_and_text_is_escaped() {
    let mut c = SvgCanvas::new(4, 4);
    c.draw_path(&rect_path(Rect::new(0.0, 0.0, 1.0, 1.0)), &Paint::fill(Color::BLACK))
        .unwrap();
    c.clear(Color::WHITE);
    c.draw_text("a<b", Point::new(1.0, 3.0), 12.0, Color::BLACK)
        .unwrap();
    let doc = c.finish();
    assert!(!doc.contains("<path"));
    assert!(doc.contains(r#"fill="rgb(255,255,255)""#));
    assert!(doc.contains("a&lt;b"));
}

#[test]
fn output_parses_as_svg() {
    let mut c = SvgCanvas::new(8, 8);
    c.draw_path(&rect_path(Rect::new(0.0, 0.0, 8.0, 8.0)), &Paint::fill(Color::BLACK))
        .unwrap();
    let tree = crate::render::text::parse_svg(c.finish().as_bytes()).unwrap();
    let frame = crate::render::text::rasterize_svg(&tree, 8, 8).unwrap();
    assert_eq!(frame.pixel(4, 4), Some([0, 0, 0, 255]));
}
