//! The drawing boundary every output target implements.
//!
//! Coordinates handed to a [`Canvas`] are already in the target's top-left-origin space; the
//! painter performs the pen-space flip before any call reaches here.

use crate::foundation::color::{BlendMode, Color, Fill};
use crate::foundation::core::{Affine, BezPath, FrameRGBA, Point, Rect};
use crate::foundation::error::RunonResult;
use crate::pen::attrs::Dash;
use std::sync::Arc;

/// Outline parameters for a stroking paint.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeParams {
    /// Width in canvas units before the canvas transform.
    pub width: f64,
    /// Miter limit; the renderer default when `None`.
    pub miter: Option<f64>,
    /// Dash pattern.
    pub dash: Option<Dash>,
}

impl StrokeParams {
    /// Plain stroke of `width`.
    pub fn new(width: f64) -> Self {
        Self {
            width,
            miter: None,
            dash: None,
        }
    }

    /// `kurbo` stroke description of these parameters.
    pub fn to_kurbo(&self) -> kurbo::Stroke {
        let mut s = kurbo::Stroke::new(self.width)
            .with_join(kurbo::Join::Miter)
            .with_caps(kurbo::Cap::Butt);
        if let Some(m) = self.miter {
            s = s.with_miter_limit(m);
        }
        if let Some(d) = &self.dash
            && !d.dashes.is_empty()
        {
            s = s.with_dashes(d.offset, d.dashes.iter().copied());
        }
        s
    }
}

/// Fill or stroke.
#[derive(Clone, Debug, PartialEq)]
pub enum PaintStyle {
    /// Fill the path interior (non-zero winding).
    Fill,
    /// Stroke the path outline.
    Stroke(StrokeParams),
}

/// Where a paint gets its colour.
#[derive(Clone, Debug, PartialEq)]
pub enum Shader {
    /// Flat colour.
    Solid(Color),
    /// Linear gradient from `start` to `end` with evenly spaced colour stops.
    Linear {
        /// Axis start in canvas units.
        start: Point,
        /// Axis end in canvas units.
        end: Point,
        /// Stop colours, first at `start`, last at `end`.
        colors: Vec<Color>,
    },
    /// Image stretched over `rect`; outside it the edge pixels extend, or the image tiles when
    /// `repeat` is set.
    Image {
        /// Pixels.
        image: Arc<FrameRGBA>,
        /// Placement in canvas units.
        rect: Rect,
        /// Tile beyond `rect` instead of extending the edges.
        repeat: bool,
    },
}

impl Shader {
    /// Shader for a pen fill whose gradient points are already in canvas space.
    pub fn from_fill(fill: &Fill) -> Self {
        match fill {
            Fill::Solid(c) => Shader::Solid(*c),
            Fill::Gradient(g) => match (g.stops.first(), g.stops.last()) {
                (Some(a), Some(b)) => Shader::Linear {
                    start: a.point,
                    end: b.point,
                    colors: g.stops.iter().map(|s| s.color).collect(),
                },
                _ => Shader::Solid(Color::TRANSPARENT),
            },
        }
    }

}

/// Everything a canvas needs to paint one path.
#[derive(Clone, Debug, PartialEq)]
pub struct Paint {
    /// Fill or stroke.
    pub style: PaintStyle,
    /// Colour source.
    pub shader: Shader,
    /// Opacity multiplier applied on top of the shader.
    pub alpha: f64,
    /// Compositing mode.
    pub blend: BlendMode,
    /// Gaussian mask blur, standard deviation in canvas units.
    pub blur: Option<f64>,
    /// Edge anti-aliasing.
    pub anti_alias: bool,
}

impl Paint {
    /// Anti-aliased normal-blend fill of `color`.
    pub fn fill(color: Color) -> Self {
        Self::with_shader(Shader::Solid(color))
    }

    /// Anti-aliased normal-blend fill from `shader`.
    pub fn with_shader(shader: Shader) -> Self {
        Self {
            style: PaintStyle::Fill,
            shader,
            alpha: 1.0,
            blend: BlendMode::Normal,
            blur: None,
            anti_alias: true,
        }
    }

    /// Stroke of `width` in `color`.
    pub fn stroke(color: Color, width: f64) -> Self {
        Self {
            style: PaintStyle::Stroke(StrokeParams::new(width)),
            ..Self::fill(color)
        }
    }
}

/// 2D drawing context: save/restore, an affine transform stack, clipping, path and image
/// drawing.
pub trait Canvas {
    /// Surface size in device units.
    fn size(&self) -> (u32, u32);

    /// Push the transform and clip state.
    fn save(&mut self);

    /// Pop the transform and clip state; unbalanced calls are ignored.
    fn restore(&mut self);

    /// Current canvas-to-device transform.
    fn transform(&self) -> Affine;

    /// Post-multiply the current transform by `t`.
    fn concat(&mut self, t: Affine);

    /// Shift the origin.
    fn translate(&mut self, dx: f64, dy: f64) {
        self.concat(Affine::translate((dx, dy)));
    }

    /// Scale the axes.
    fn scale(&mut self, sx: f64, sy: f64) {
        self.concat(Affine::scale_non_uniform(sx, sy));
    }

    /// Intersect the clip with `path` under the current transform.
    fn clip_path(&mut self, path: &BezPath);

    /// Intersect the clip with `rect` under the current transform.
    fn clip_rect(&mut self, rect: Rect) {
        self.clip_path(&crate::pen::drawing::rect_path(rect));
    }

    /// Replace every pixel with `color`, ignoring transform and clip.
    fn clear(&mut self, color: Color);

    /// Paint `path` under the current transform and clip.
    fn draw_path(&mut self, path: &BezPath, paint: &Paint) -> RunonResult<()>;

    /// Draw `image` stretched into `dst`.
    fn draw_image(&mut self, image: &Arc<FrameRGBA>, dst: Rect, paint: &Paint) -> RunonResult<()> {
        let p = Paint {
            style: PaintStyle::Fill,
            shader: Shader::Image {
                image: image.clone(),
                rect: dst,
                repeat: false,
            },
            ..paint.clone()
        };
        self.draw_path(&crate::pen::drawing::rect_path(dst), &p)
    }

    /// Draw a single line of text with its baseline starting at `origin`.
    fn draw_text(&mut self, text: &str, origin: Point, size: f64, color: Color)
    -> RunonResult<()>;

    /// Pixels drawn so far, for canvases that own a raster.
    fn snapshot(&mut self) -> Option<FrameRGBA> {
        None
    }
}

/// Geometric-mean scale factor of `t`, used to map lengths (blur sigma, text size) to device units.
pub(crate) fn uniform_scale(t: Affine) -> f64 {
    t.determinant().abs().sqrt()
}

/// Transform and clip bookkeeping shared by canvas implementations.
#[derive(Clone, Debug)]
pub(crate) struct StateStack<C: Clone> {
    pub(crate) transform: Affine,
    pub(crate) clip: C,
    saved: Vec<(Affine, C)>,
}

impl<C: Clone> StateStack<C> {
    pub(crate) fn new(clip: C) -> Self {
        Self {
            transform: Affine::IDENTITY,
            clip,
            saved: Vec::new(),
        }
    }

    pub(crate) fn save(&mut self) {
        self.saved.push((self.transform, self.clip.clone()));
    }

    pub(crate) fn restore(&mut self) -> bool {
        match self.saved.pop() {
            Some((t, c)) => {
                self.transform = t;
                self.clip = c;
                true
            }
            None => false,
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.saved.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;
