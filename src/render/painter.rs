//! Turns resolved pen leaves into [`Canvas`] calls.
//!
//! Pen space has its origin at the bottom left. Each leaf's geometry is flipped into the
//! target's top-left space exactly once, here, together with its gradient stops, image rects and
//! shadow clip, so nothing downstream ever sees pen-space coordinates.

use super::canvas::{Canvas, Paint, PaintStyle, Shader, StrokeParams};
use super::image_io::load_image;
use crate::foundation::color::{BlendMode, Color, Fill};
use crate::foundation::core::{Affine, BezPath, FrameRGBA, Rect};
use crate::foundation::error::RunonResult;
use crate::pen::attrs::{ImageFill, ImageSource, ResolvedStyle, Shadow, StrokeStyle, StyleEntry};
use crate::pen::data::keys;
use crate::pen::{Leaf, Pen};
use std::sync::Arc;

/// Pen space to target space for `rect`: `x' = x - x0`, `y' = y1 - y`.
pub fn flip_transform(rect: Rect) -> Affine {
    Affine::new([1.0, 0.0, 0.0, -1.0, -rect.x0, rect.y1])
}

/// Paint every leaf of `pen`, in walk order.
pub fn paint_tree(
    canvas: &mut dyn Canvas,
    pen: &Pen,
    rect: Rect,
    style: Option<&str>,
) -> RunonResult<()> {
    for leaf in pen.leaves() {
        paint_leaf(canvas, &leaf, rect, style)?;
    }
    Ok(())
}

/// Settings shared by every paint of one leaf.
struct LeafPaint {
    alpha: f64,
    blend: BlendMode,
    anti_alias: bool,
}

impl LeafPaint {
    fn from_style(resolved: &ResolvedStyle, leaf: &Leaf<'_>) -> Self {
        let raw = resolved.raw_paint();
        let mut alpha = leaf
            .data
            .get(keys::ALPHA)
            .and_then(|v| v.as_f64())
            .unwrap_or(1.0);
        if let Some(a) = raw.get("Alphaf").and_then(|v| v.as_f64()) {
            alpha *= a;
        } else if let Some(a) = raw.get("Alpha").and_then(|v| v.as_f64()) {
            alpha *= a / 255.0;
        }
        let anti_alias = raw
            .get("AntiAlias")
            .and_then(|v| v.as_bool())
            .unwrap_or(true);
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            blend: resolved.blend(),
            anti_alias,
        }
    }

    fn paint(&self, style: PaintStyle, shader: Shader) -> Paint {
        Paint {
            style,
            shader,
            alpha: self.alpha,
            blend: self.blend,
            blur: None,
            anti_alias: self.anti_alias,
        }
    }
}

/// Draw one leaf: every resolved attribute in order, each inside its own save/restore.
pub fn paint_leaf(
    canvas: &mut dyn Canvas,
    leaf: &Leaf<'_>,
    rect: Rect,
    style: Option<&str>,
) -> RunonResult<()> {
    let Some(value) = leaf.pen.value() else {
        return Ok(());
    };
    if value.elements().is_empty() {
        return Ok(());
    }
    let resolved = leaf.pen.style(style);
    if !resolved.visible() {
        return Ok(());
    }

    let flip = flip_transform(rect);
    let path = flip * value.clone();
    let base = LeafPaint::from_style(&resolved, leaf);
    let blur = leaf
        .pen
        .data_get(keys::BLUR)
        .and_then(|v| v.as_f64())
        .map(|b| b / 3.0)
        .filter(|s| *s > 0.0);

    for entry in resolved.entries() {
        match entry {
            StyleEntry::RawPaint(_) | StyleEntry::Blend(_) | StyleEntry::Visible(_) => {}
            StyleEntry::Fill(None) => {}
            StyleEntry::Fill(Some(fill)) => {
                let mut p = base.paint(PaintStyle::Fill, flipped_shader(fill, flip));
                p.blur = blur;
                guarded(canvas, |c| c.draw_path(&path, &p))?;
            }
            StyleEntry::Stroke(stroke) => {
                if let Some(p) = stroke_paint(&base, stroke, flip) {
                    guarded(canvas, |c| c.draw_path(&path, &p))?;
                }
            }
            StyleEntry::Image(img) => {
                guarded(canvas, |c| draw_image_fill(c, &base, &path, img, flip))?;
            }
            StyleEntry::Shadow(shadow) => {
                guarded(canvas, |c| draw_shadow(c, &base, &path, shadow, flip))?;
            }
        }
    }
    Ok(())
}

fn guarded(
    canvas: &mut dyn Canvas,
    f: impl FnOnce(&mut dyn Canvas) -> RunonResult<()>,
) -> RunonResult<()> {
    canvas.save();
    let out = f(canvas);
    canvas.restore();
    out
}

fn flipped_shader(fill: &Fill, flip: Affine) -> Shader {
    match fill {
        Fill::Solid(c) => Shader::Solid(*c),
        Fill::Gradient(g) => {
            let mut g = g.clone();
            for stop in &mut g.stops {
                stop.point = flip * stop.point;
            }
            Shader::from_fill(&Fill::Gradient(g))
        }
    }
}

fn stroke_paint(base: &LeafPaint, stroke: &StrokeStyle, flip: Affine) -> Option<Paint> {
    if stroke.weight == 0.0 {
        return None;
    }
    let color = stroke.color.as_ref()?;
    let params = StrokeParams {
        width: stroke.weight,
        miter: stroke.miter,
        dash: stroke.dash.clone(),
    };
    Some(base.paint(PaintStyle::Stroke(params), flipped_shader(color, flip)))
}

fn image_pixels(src: &ImageSource) -> Option<Arc<FrameRGBA>> {
    match src {
        ImageSource::Pixels(p) => Some(p.clone()),
        ImageSource::Path(path) => match load_image(path) {
            Ok(f) => Some(Arc::new(f)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "image not found, cannot be used");
                None
            }
        },
    }
}

fn draw_image_fill(
    canvas: &mut dyn Canvas,
    base: &LeafPaint,
    path: &BezPath,
    img: &ImageFill,
    flip: Affine,
) -> RunonResult<()> {
    let Some(pixels) = image_pixels(&img.source) else {
        return Ok(());
    };
    let dst = flip.transform_rect_bbox(img.rect);
    let mut p = base.paint(
        PaintStyle::Fill,
        Shader::Image {
            image: pixels.clone(),
            rect: dst,
            repeat: img.pattern,
        },
    );
    p.alpha *= img.opacity.clamp(0.0, 1.0);
    if img.pattern {
        canvas.draw_path(path, &p)
    } else {
        canvas.clip_path(path);
        canvas.draw_image(&pixels, dst, &p)
    }
}

fn draw_shadow(
    canvas: &mut dyn Canvas,
    base: &LeafPaint,
    path: &BezPath,
    shadow: &Shadow,
    flip: Affine,
) -> RunonResult<()> {
    if let Some(clip) = shadow.clip {
        canvas.clip_rect(flip.transform_rect_bbox(clip));
    }
    let mut shade = base.paint(PaintStyle::Fill, Shader::Solid(shadow.color));
    shade.blur = Some(shadow.radius).filter(|r| *r > 0.0);
    canvas.draw_path(path, &shade)?;
    canvas.draw_path(path, &base.paint(PaintStyle::Fill, Shader::Solid(Color::BLACK)))
}

#[cfg(test)]
#[path = "../../tests/unit/render/painter.rs"]
mod tests;
