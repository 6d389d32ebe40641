use super::*;
use crate::foundation::core::Rect;
use crate::pen::drawing::rect_path;

fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
    rect_path(Rect::new(x0, y0, x1, y1))
}

#[test]
fn rejects_empty_and_oversized_surfaces() {
    assert!(RasterCanvas::new(0, 4).is_err());
    assert!(RasterCanvas::new(70_000, 4).is_err());
}

#[test]
fn fill_covers_pixel_aligned_rect() {
    let mut c = RasterCanvas::new(8, 8).unwrap();
    c.draw_path(&square(2.0, 2.0, 6.0, 6.0), &Paint::fill(Color::rgb(1.0, 0.0, 0.0)))
        .unwrap();
    let f = c.to_frame();
    assert_eq!(f.pixel(3, 3), Some([255, 0, 0, 255]));
    assert_eq!(f.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(f.pixel(6, 6), Some([0, 0, 0, 0]));
}

#[test]
fn transform_stack_scales_and_restores() {
    let mut c = RasterCanvas::new(8, 8).unwrap();
    c.save();
    c.scale(2.0, 2.0);
    c.draw_path(&square(0.0, 0.0, 2.0, 2.0), &Paint::fill(Color::BLACK))
        .unwrap();
    c.restore();
    assert_eq!(c.transform(), Affine::IDENTITY);
    let f = c.to_frame();
    assert_eq!(f.pixel(3, 3), Some([0, 0, 0, 255]));
    assert_eq!(f.pixel(4, 4), Some([0, 0, 0, 0]));
}

#[test]
fn clip_limits_drawing_until_restore() {
    let mut c = RasterCanvas::new(8, 8).unwrap();
    c.save();
    c.clip_rect(Rect::new(0.0, 0.0, 4.0, 8.0));
    c.draw_path(&square(0.0, 0.0, 8.0, 8.0), &Paint::fill(Color::WHITE))
        .unwrap();
    c.restore();
    let f = c.to_frame();
    assert_eq!(f.pixel(1, 1), Some([255, 255, 255, 255]));
    assert_eq!(f.pixel(6, 1), Some([0, 0, 0, 0]));

    c.draw_path(&square(0.0, 0.0, 8.0, 8.0), &Paint::fill(Color::WHITE))
        .unwrap();
    assert_eq!(c.to_frame().pixel(6, 1), Some([255, 255, 255, 255]));
}

#[test]
fn stroke_paints_outline_only() {
    let mut c = RasterCanvas::new(16, 16).unwrap();
    c.draw_path(&square(4.0, 4.0, 12.0, 12.0), &Paint::stroke(Color::BLACK, 2.0))
        .unwrap();
    let f = c.to_frame();
    assert_eq!(f.pixel(4, 8).map(|p| p[3]), Some(255));
    assert_eq!(f.pixel(8, 8), Some([0, 0, 0, 0]));

    let mut zero = RasterCanvas::new(4, 4).unwrap();
    zero.draw_path(&square(0.0, 0.0, 4.0, 4.0), &Paint::stroke(Color::BLACK, 0.0))
        .unwrap();
    assert!(zero.pixels().iter().all(|&b| b == 0));
}

#[test]
fn alpha_scales_coverage() {
    let mut c = RasterCanvas::new(4, 4).unwrap();
    let mut p = Paint::fill(Color::WHITE);
    p.alpha = 0.5;
    c.draw_path(&square(0.0, 0.0, 4.0, 4.0), &p).unwrap();
    assert_eq!(c.to_frame().pixel(1, 1), Some([128, 128, 128, 128]));
}

#[test]
fn linear_gradient_runs_between_endpoints() {
    let mut c = RasterCanvas::new(10, 1).unwrap();
    let shader = Shader::Linear {
        start: Point::new(0.0, 0.0),
        end: Point::new(10.0, 0.0),
        colors: vec![Color::BLACK, Color::WHITE],
    };
    c.draw_path(&square(0.0, 0.0, 10.0, 1.0), &Paint::with_shader(shader))
        .unwrap();
    let f = c.to_frame();
    let left = f.pixel(0, 0).unwrap();
    let right = f.pixel(9, 0).unwrap();
    assert!(left[0] < 20 && right[0] > 235);
    assert_eq!(left[3], 255);
}

#[test]
fn image_is_stretched_into_destination() {
    let img = Arc::new(
        FrameRGBA::from_premul(1, 1, vec![0, 0, 255, 255]).unwrap(),
    );
    let mut c = RasterCanvas::new(6, 6).unwrap();
    c.draw_image(&img, Rect::new(1.0, 1.0, 5.0, 5.0), &Paint::fill(Color::BLACK))
        .unwrap();
    let f = c.to_frame();
    assert_eq!(f.pixel(2, 2), Some([0, 0, 255, 255]));
    assert_eq!(f.pixel(0, 0), Some([0, 0, 0, 0]));
}

#[test]
fn blur_softens_edges() {
    let mut sharp = RasterCanvas::new(12, 12).unwrap();
    let mut soft = RasterCanvas::new(12, 12).unwrap();
    let mut p = Paint::fill(Color::BLACK);
    sharp.draw_path(&square(4.0, 4.0, 8.0, 8.0), &p).unwrap();
    p.blur = Some(1.5);
    soft.draw_path(&square(4.0, 4.0, 8.0, 8.0), &p).unwrap();
    assert_eq!(sharp.to_frame().pixel(2, 6), Some([0, 0, 0, 0]));
    assert!(soft.to_frame().pixel(2, 6).unwrap()[3] > 0);
}

#[test]
fn clear_fills_every_pixel() {
    let mut c = RasterCanvas::new(2, 2).unwrap();
    c.clear(Color::gray(0.3));
    let expected = Color::gray(0.3).to_rgba8_premul().to_array();
    let f = c.to_frame();
    assert!(f.data.chunks_exact(4).all(|px| px == expected));
}

#[test]
fn multiply_blend_darkens_backdrop() {
    let mut c = RasterCanvas::new(2, 2).unwrap();
    c.clear(Color::rgb(1.0, 1.0, 0.0));
    let mut p = Paint::fill(Color::rgb(0.0, 1.0, 1.0));
    p.blend = BlendMode::Multiply;
    c.draw_path(&square(0.0, 0.0, 2.0, 2.0), &p).unwrap();
    assert_eq!(c.to_frame().pixel(0, 0), Some([0, 255, 0, 255]));
}

fn red_blue() -> Arc<FrameRGBA> {
    Arc::new(FrameRGBA::from_premul(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap())
}

fn is_red(px: [u8; 4]) -> bool {
    px[0] > 200 && px[2] < 55 && px[3] == 255
}

fn is_blue(px: [u8; 4]) -> bool {
    px[2] > 200 && px[0] < 55 && px[3] == 255
}

#[test]
fn repeating_image_tiles_past_its_rect() {
    let mut c = RasterCanvas::new(20, 1).unwrap();
    let shader = Shader::Image {
        image: red_blue(),
        rect: Rect::new(0.0, 0.0, 10.0, 1.0),
        repeat: true,
    };
    c.draw_path(&square(0.0, 0.0, 20.0, 1.0), &Paint::with_shader(shader))
        .unwrap();
    let f = c.to_frame();
    assert!(is_red(f.pixel(2, 0).unwrap()));
    assert!(is_blue(f.pixel(7, 0).unwrap()));
    assert!(is_red(f.pixel(12, 0).unwrap()));
    assert!(is_blue(f.pixel(17, 0).unwrap()));
}

#[test]
fn non_repeating_image_extends_edge_pixels() {
    let mut c = RasterCanvas::new(20, 1).unwrap();
    let shader = Shader::Image {
        image: red_blue(),
        rect: Rect::new(0.0, 0.0, 10.0, 1.0),
        repeat: false,
    };
    c.draw_path(&square(0.0, 0.0, 20.0, 1.0), &Paint::with_shader(shader))
        .unwrap();
    let f = c.to_frame();
    assert!(is_red(f.pixel(2, 0).unwrap()));
    assert!(is_blue(f.pixel(12, 0).unwrap()));
    assert!(is_blue(f.pixel(19, 0).unwrap()));
}

#[test]
fn reading_pixels_keeps_content_and_active_clip() {
    let mut c = RasterCanvas::new(8, 8).unwrap();
    c.draw_path(&square(0.0, 0.0, 8.0, 2.0), &Paint::fill(Color::BLACK))
        .unwrap();
    c.save();
    c.clip_rect(Rect::new(0.0, 0.0, 4.0, 8.0));
    let first = c.to_frame();
    assert_eq!(first.pixel(6, 1), Some([0, 0, 0, 255]));

    c.draw_path(&square(0.0, 4.0, 8.0, 8.0), &Paint::fill(Color::WHITE))
        .unwrap();
    c.restore();
    let f = c.to_frame();
    assert_eq!(f.pixel(6, 1), Some([0, 0, 0, 255]));
    assert_eq!(f.pixel(1, 5), Some([255, 255, 255, 255]));
    assert_eq!(f.pixel(6, 5), Some([0, 0, 0, 0]));
}

#[test]
fn blurred_paint_respects_clip() {
    let mut c = RasterCanvas::new(12, 12).unwrap();
    c.clip_rect(Rect::new(0.0, 0.0, 6.0, 12.0));
    let mut p = Paint::fill(Color::BLACK);
    p.blur = Some(1.5);
    c.draw_path(&square(4.0, 4.0, 8.0, 8.0), &p).unwrap();
    let f = c.to_frame();
    assert!(f.pixel(3, 6).unwrap()[3] > 0);
    assert_eq!(f.pixel(9, 6), Some([0, 0, 0, 0]));
}

#[test]
fn many_small_leaves_accumulate_in_one_scene() {
    let mut c = RasterCanvas::new(64, 64).unwrap();
    for i in 0..16 {
        let x = f64::from(i % 8) * 8.0;
        let y = f64::from(i / 8) * 8.0;
        c.draw_path(&square(x, y, x + 4.0, y + 4.0), &Paint::fill(Color::BLACK))
            .unwrap();
    }
    let f = c.to_frame();
    let covered = f.data.chunks_exact(4).filter(|px| px[3] == 255).count();
    assert_eq!(covered, 16 * 16);
}
