use super::*;
use std::path::PathBuf;

fn tmp_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("runon-composite-{tag}-{}", std::process::id()))
}

fn scene() -> Pen {
    Pen::group([
        Pen::from_rect(Rect::new(0.0, 0.0, 20.0, 10.0)).f(Color::rgb(1.0, 0.0, 0.0)),
        Pen::from_rect(Rect::new(5.0, 5.0, 15.0, 15.0))
            .ssw(Color::BLACK, 2.0)
            .no_fill(),
    ])
}

#[test]
fn precompose_maps_rect_to_scaled_surface() {
    let rect = Rect::new(10.0, 20.0, 14.0, 23.0);
    let pen = Pen::from_rect(rect).f(Color::rgb(0.0, 0.0, 1.0));
    let frame = precompose(&pen, rect, 2.0, None, None).unwrap();
    assert_eq!((frame.width, frame.height), (8, 6));
    assert!(
        frame
            .data
            .chunks_exact(4)
            .all(|px| px == [0, 0, 255, 255])
    );
}

#[test]
fn precompose_keeps_pen_space_bottom_at_image_bottom() {
    let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
    let pen = Pen::from_rect(Rect::new(0.0, 0.0, 10.0, 2.0)).f(Color::BLACK);
    let frame = precompose(&pen, rect, 1.0, None, None).unwrap();
    assert_eq!(frame.pixel(5, 9).map(|p| p[3]), Some(255));
    assert_eq!(frame.pixel(5, 0).map(|p| p[3]), Some(0));
}

#[test]
fn composite_is_deterministic() {
    let rect = Rect::new(0.0, 0.0, 20.0, 20.0);
    let a = precompose(&scene(), rect, 1.5, None, None).unwrap();
    let b = precompose(&scene(), rect, 1.5, None, None).unwrap();
    assert_eq!(a.fingerprint(), b.fingerprint());
}

#[test]
fn precompose_writes_snapshot_to_disk() {
    let dir = tmp_dir("disk");
    let path = dir.join("nested/snap.png");
    let rect = Rect::new(0.0, 0.0, 20.0, 20.0);
    let frame = precompose(&scene(), rect, 1.0, None, Some(&path)).unwrap();
    let back = crate::render::image_io::load_image(&path).unwrap();
    assert_eq!((back.width, back.height), (frame.width, frame.height));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn file_format_follows_extension() {
    assert_eq!(
        OutputFormat::from_path(Path::new("a/b.PNG")).unwrap(),
        OutputFormat::Png
    );
    assert_eq!(
        OutputFormat::from_path(Path::new("x.svg")).unwrap(),
        OutputFormat::Svg
    );
    assert_eq!(
        OutputFormat::from_path(Path::new("x.pdf")).unwrap(),
        OutputFormat::Pdf
    );
    assert!(OutputFormat::from_path(Path::new("x.gif")).is_err());
    assert!(OutputFormat::from_path(Path::new("noext")).is_err());
}

#[test]
fn composite_writes_every_format() {
    let dir = tmp_dir("formats");
    let rect = Rect::new(0.0, 0.0, 20.0, 20.0);
    let opts = CompositeOpts {
        clear: Some(Color::WHITE),
        ..CompositeOpts::scaled(2.0)
    };
    for name in ["out.png", "out.svg", "out.pdf"] {
        let path = dir.join(name);
        composite(&scene(), rect, Destination::File(&path), &opts).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0, "{name}");
    }
    let png = crate::render::image_io::load_image(&dir.join("out.png")).unwrap();
    assert_eq!((png.width, png.height), (40, 40));
    assert_eq!(png.pixel(0, 0), Some([255, 255, 255, 255]));
    let svg = std::fs::read_to_string(dir.join("out.svg")).unwrap();
    assert!(svg.contains(r#"width="40" height="40""#));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn external_canvas_is_drawn_and_optionally_saved() {
    let dir = tmp_dir("canvas");
    let path = dir.join("canvas.png");
    let mut canvas = RasterCanvas::new(20, 20).unwrap();
    composite(
        &scene(),
        Rect::new(0.0, 0.0, 20.0, 20.0),
        Destination::Canvas {
            canvas: &mut canvas,
            save_to: Some(&path),
        },
        &CompositeOpts::default(),
    )
    .unwrap();
    assert_eq!(canvas.to_frame().pixel(1, 18), Some([255, 0, 0, 255]));
    assert!(path.exists());

    let no_pixels = dir.join("svg-canvas.png");
    let mut svg = SvgCanvas::new(20, 20);
    composite(
        &scene(),
        Rect::new(0.0, 0.0, 20.0, 20.0),
        Destination::Canvas {
            canvas: &mut svg,
            save_to: Some(&no_pixels),
        },
        &CompositeOpts::default(),
    )
    .unwrap();
    assert!(!no_pixels.exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn composite_leaves_canvas_state_balanced() {
    let mut canvas = RasterCanvas::new(10, 10).unwrap();
    composite_to_canvas(&scene(), Rect::new(0.0, 0.0, 10.0, 10.0), &mut canvas, 3.0, None).unwrap();
    assert_eq!(canvas.transform(), crate::foundation::core::Affine::IDENTITY);
}

#[test]
fn invalid_scale_is_rejected() {
    let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(precompose(&scene(), rect, 0.0, None, None).is_err());
    let mut c = RasterCanvas::new(4, 4).unwrap();
    let err = composite(
        &scene(),
        rect,
        Destination::Canvas {
            canvas: &mut c,
            save_to: None,
        },
        &CompositeOpts::scaled(f64::NAN),
    );
    assert!(err.is_err());
}
