use super::*;
use crate::render::canvas::{Canvas, Paint};

fn context(w: u32, h: u32) -> Option<GpuContext> {
    match GpuContext::initialize(w, h, false) {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            eprintln!("skipping: {e}");
            None
        }
    }
}

#[test]
fn align_to_rounds_up_to_multiple() {
    assert_eq!(align_to(1, 256), 256);
    assert_eq!(align_to(256, 256), 256);
    assert_eq!(align_to(257, 256), 512);
}

#[test]
fn zero_size_is_rejected_before_touching_the_device() {
    let err = GpuContext::initialize(0, 10, false).unwrap_err();
    assert!(matches!(err, RunonError::Validation(_)));
}

#[test]
fn resize_to_same_size_keeps_surface_identity() {
    let Some(mut ctx) = context(32, 16) else {
        return;
    };
    let id = ctx.surface_id();
    ctx.resize(32, 16).unwrap();
    assert_eq!(ctx.surface_id(), id);
    ctx.resize(40, 16).unwrap();
    assert_eq!(ctx.surface_id(), id + 1);
    assert_eq!(ctx.size(), (40, 16));
}

#[test]
fn terminate_is_idempotent_and_disables_canvas() {
    let Some(mut ctx) = context(8, 8) else {
        return;
    };
    assert!(ctx.get_canvas().is_some());
    ctx.terminate();
    ctx.terminate();
    assert!(ctx.is_terminated());
    assert!(ctx.get_canvas().is_none());
    assert!(ctx.read_pixels().is_err());
    assert!(!ctx.swap_buffers().unwrap());
}

#[test]
fn read_pixels_returns_drawn_fill() {
    let Some(mut ctx) = context(16, 16) else {
        return;
    };
    ctx.clear(Color::WHITE);
    {
        let mut canvas = ctx.get_canvas().unwrap();
        canvas
            .draw_path(
                &crate::pen::drawing::rect_path(Rect::new(0.0, 0.0, 8.0, 16.0)),
                &Paint::fill(Color::rgb(1.0, 0.0, 0.0)),
            )
            .unwrap();
    }
    let frame = ctx.read_pixels().unwrap();
    assert_eq!((frame.width, frame.height), (16, 16));
    assert_eq!(frame.pixel(2, 8), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(13, 8), Some([255, 255, 255, 255]));
}

#[test]
fn hidden_context_does_not_present() {
    let Some(mut ctx) = context(8, 8) else {
        return;
    };
    assert!(!ctx.is_visible());
    assert!(!ctx.swap_buffers().unwrap());
}
