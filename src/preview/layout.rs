//! Window layout: packing preview rectangles into one column and placing the window.

use crate::foundation::core::{Point, Rect};
use crate::foundation::geometry::{Anchor, Edge, RectExt};

/// What the packer needs to know about one preview.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreviewSlot {
    /// Artwork rectangle in pen units.
    pub rect: Rect,
    /// Shares the previous row instead of starting a new one.
    pub layer: bool,
    /// Error placeholder; laid out at its raw size.
    pub is_error: bool,
}

/// Result of [`calculate_window_size`].
#[derive(Clone, Debug, PartialEq)]
pub struct WindowLayout {
    /// Whole window content, origin at zero.
    pub frame: Rect,
    /// One rectangle per slot, top-left origin, left-aligned.
    pub rects: Vec<Rect>,
    /// Scale applied to non-error previews.
    pub scale: f64,
    /// `frame` differs from the previous layout (or there was none).
    pub changed: bool,
}

/// Stack previews top to bottom, one pixel apart.
///
/// Error slots keep their raw rect; the rest are scaled by `scale` about their bottom-left
/// corner and rounded. A layer slot reuses the y of the row it stacks on. The window is as wide
/// as the widest slot and as tall as all rows together.
pub fn calculate_window_size(slots: &[PreviewSlot], scale: f64, last: Option<Rect>) -> WindowLayout {
    let mut rects = Vec::with_capacity(slots.len());
    let mut w: f64 = 0.0;
    let mut row_y = 0.0;
    let mut next_y = 0.0;
    let mut h = 0.0;
    for slot in slots {
        let sr = if slot.is_error {
            slot.rect
        } else {
            slot.rect.scale_about(scale, Anchor::SW).round_xywh()
        };
        w = w.max(sr.width());
        if slot.layer {
            rects.push(Rect::new(0.0, row_y, sr.width(), row_y + sr.height()));
        } else {
            rects.push(Rect::new(0.0, next_y, sr.width(), next_y + sr.height()));
            row_y = next_y;
            next_y += sr.height() + 1.0;
            h += sr.height() + 1.0;
        }
    }
    let frame = Rect::new(0.0, 0.0, w, (h - 1.0_f64).max(0.0));
    WindowLayout {
        changed: last != Some(frame),
        frame,
        rects,
        scale,
    }
}

/// Horizontal centring of `rect` inside `frame`, rounded.
pub fn centre_in_frame(rect: Rect, frame: Rect) -> Rect {
    rect.offset_by((frame.width() - rect.width()) / 2.0, 0.0)
        .round_xywh()
}

/// Window size in screen units for content `frame` at `content_scale`.
pub fn window_size(frame: Rect, content_scale: f64) -> (u32, u32) {
    let s = if content_scale > 0.0 { content_scale } else { 1.0 };
    (
        (frame.width() / s).max(1.0) as u32,
        (frame.height() / s).max(1.0) as u32,
    )
}

/// Top-left screen position of a `size` window pinned at `pin` inside `work_area`.
///
/// `work_area` uses screen coordinates (top-left origin). Vertically centred pins sit 30 units
/// lower. `inset.0` moves the window left, `inset.1` moves it down.
pub fn pin_window(work_area: Rect, size: (f64, f64), pin: Anchor, inset: (f64, f64)) -> Point {
    let zero = work_area.zeroed();
    let (ex, ey) = pin.edges();
    let mut pinned = zero.take(size.0, ex).take(size.1, ey).round_xywh();
    if ey == Edge::MidY {
        pinned = pinned.offset_by(0.0, -30.0);
    }
    let pinned = pinned
        .flip_y(zero.height())
        .offset_by(work_area.x0, work_area.y0);
    Point::new(pinned.x0 - inset.0, pinned.y0 + inset.1)
}

#[cfg(test)]
#[path = "../../tests/unit/preview/layout.rs"]
mod tests;
