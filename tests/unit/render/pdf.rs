use super::*;
use crate::pen::drawing::rect_path;

fn text(doc: &[u8]) -> String {
    String::from_utf8_lossy(doc).into_owned()
}

#[test]
fn empty_page_is_a_valid_single_page_document() {
    let doc = text(&PdfCanvas::new(100, 50).to_bytes());
    assert!(doc.starts_with("%PDF-"));
    assert!(doc.contains("/Count 1"));
    assert!(doc.contains("/MediaBox [0 0 100 50]"));
    assert!(doc.trim_end().ends_with("%%EOF"));
}

#[test]
fn solid_fill_stays_vector() {
    let mut c = PdfCanvas::new(10, 10);
    c.draw_path(
        &rect_path(Rect::new(1.0, 1.0, 9.0, 9.0)),
        &Paint::fill(Color::rgb(1.0, 0.0, 0.0)),
    )
    .unwrap();
    let doc = text(&c.to_bytes());
    assert!(doc.contains("1 0 0 rg"));
    assert!(doc.contains("\nf\n"));
    assert!(!doc.contains("/XObject"));
}

#[test]
fn alpha_and_blend_register_one_shared_state() {
    let mut c = PdfCanvas::new(10, 10);
    let mut p = Paint::fill(Color::BLACK);
    p.alpha = 0.5;
    p.blend = BlendMode::Multiply;
    let square = rect_path(Rect::new(0.0, 0.0, 5.0, 5.0));
    c.draw_path(&square, &p).unwrap();
    c.draw_path(&square, &p).unwrap();
    let doc = text(&c.to_bytes());
    assert!(doc.contains("/BM /Multiply"));
    assert!(doc.contains("/ca 0.5"));
    assert_eq!(doc.matches("/G1 gs").count(), 2);
    assert!(!doc.contains("/G2"));
}

#[test]
fn gradients_and_blur_are_placed_as_masked_images() {
    let mut c = PdfCanvas::new(20, 20);
    let mut p = Paint::fill(Color::BLACK);
    p.blur = Some(1.0);
    c.draw_path(&rect_path(Rect::new(5.0, 5.0, 15.0, 15.0)), &p)
        .unwrap();
    let doc = text(&c.to_bytes());
    assert!(doc.contains("/Im1 Do"));
    assert!(doc.contains("/SMask"));
    assert!(doc.contains("/DeviceGray"));
}

#[test]
fn zero_width_stroke_draws_nothing() {
    let mut c = PdfCanvas::new(10, 10);
    c.draw_path(
        &rect_path(Rect::new(1.0, 1.0, 9.0, 9.0)),
        &Paint::stroke(Color::BLACK, 0.0),
    )
    .unwrap();
    assert!(!text(&c.to_bytes()).contains("\nS\n"));
}

#[test]
fn text_uses_helvetica() {
    let mut c = PdfCanvas::new(100, 100);
    c.draw_text("hello", Point::new(10.0, 50.0), 12.0, Color::BLACK)
        .unwrap();
    let doc = text(&c.to_bytes());
    assert!(doc.contains("/BaseFont /Helvetica"));
    assert!(doc.contains("(hello) Tj"));
}

#[test]
fn clear_discards_earlier_drawing() {
    let mut c = PdfCanvas::new(10, 10);
    c.draw_path(
        &rect_path(Rect::new(1.0, 1.0, 9.0, 9.0)),
        &Paint::fill(Color::rgb(0.0, 0.0, 1.0)),
    )
    .unwrap();
    c.clear(Color::WHITE);
    let doc = text(&c.to_bytes());
    assert!(!doc.contains("0 0 1 rg"));
    assert!(doc.contains("1 1 1 rg"));
}

#[test]
fn saved_to_nested_path() {
    let dir = std::env::temp_dir().join(format!("runon-pdf-{}", std::process::id()));
    let path = dir.join("a/b/page.pdf");
    PdfCanvas::new(4, 4).write_file(&path).unwrap();
    assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
    let _ = std::fs::remove_dir_all(&dir);
}
