//! CPU raster canvas.
//!
//! Draws are recorded into one `vello_cpu::RenderContext` and rasterized into the pixmap on
//! read-back. Blurred paints and text are rendered to full-surface layers and drawn back as
//! image paints. Read-back and `clear` start a new scene whose background is the settled pixmap.

use super::blur::blur_sigma;
use super::canvas::{Canvas, Paint, PaintStyle, Shader, StateStack, uniform_scale};
use crate::foundation::color::{BlendMode, Color};
use crate::foundation::core::{Affine, BezPath, FrameRGBA, Point, Rect};
use crate::foundation::error::{RunonError, RunonResult};
use std::sync::Arc;
use vello_cpu::peniko;

/// In-memory raster surface implementing [`Canvas`].
pub struct RasterCanvas {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    // Active clips in push order, with the transform each was pushed under.
    clips: Vec<(BezPath, Affine)>,
    state: StateStack<usize>,
    dirty: bool,
    blank: bool,
}

impl std::fmt::Debug for RasterCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterCanvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("depth", &self.state.depth())
            .field("clips", &self.clips.len())
            .finish()
    }
}

impl RasterCanvas {
    /// Transparent surface of `width x height` pixels.
    pub fn new(width: u32, height: u32) -> RunonResult<Self> {
        let w: u16 = width
            .try_into()
            .map_err(|_| RunonError::render("surface width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| RunonError::render("surface height exceeds u16"))?;
        if w == 0 || h == 0 {
            return Err(RunonError::validation(format!(
                "surface size must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self {
            width: w,
            height: h,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
            clips: Vec::new(),
            state: StateStack::new(0),
            dirty: false,
            blank: true,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    /// Premultiplied RGBA8 bytes, top row first.
    pub fn pixels(&mut self) -> &[u8] {
        self.settle();
        self.pixmap.data_as_u8_slice()
    }

    /// Copy of the current pixels.
    pub fn to_frame(&mut self) -> FrameRGBA {
        let data = self.pixels().to_vec();
        FrameRGBA {
            width: self.width(),
            height: self.height(),
            data,
        }
    }

    fn surface_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Rasterize pending draws into the pixmap.
    fn settle(&mut self) {
        if !self.dirty {
            return;
        }
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        self.dirty = false;
        self.blank = false;
        self.restart();
    }

    /// Fresh scene over the settled pixels, with the active clips re-applied.
    fn restart(&mut self) {
        self.ctx.reset();
        self.ctx.set_aliasing_threshold(None);
        if !self.blank {
            let background = image_brush(Arc::new(self.pixmap.clone()), false, 1.0, true);
            self.ctx.set_paint(background);
            self.ctx.fill_rect(&self.surface_rect());
        }
        for (path, transform) in &self.clips {
            self.ctx.set_transform(*transform);
            self.ctx.push_clip_path(path);
        }
        self.ctx.reset_transform();
    }

    /// Full-surface premultiplied layer composited through the current clips.
    fn draw_layer(&mut self, layer: &FrameRGBA, blend: BlendMode) -> RunonResult<()> {
        let pixmap = frame_to_pixmap(layer)?;
        self.ctx.reset_transform();
        self.ctx.reset_paint_transform();
        self.ctx.set_aliasing_threshold(None);
        self.ctx.set_blend_mode(to_cpu_blend(blend));
        self.ctx.set_paint(image_brush(Arc::new(pixmap), false, 1.0, true));
        self.ctx.fill_rect(&self.surface_rect());
        self.ctx.set_blend_mode(peniko::BlendMode::default());
        self.dirty = true;
        Ok(())
    }
}

/// Record one fill or stroke of `path` with `paint` into `ctx` under `transform`.
///
/// Returns `false` when the paint has nothing to draw.
fn record_path(
    ctx: &mut vello_cpu::RenderContext,
    transform: Affine,
    path: &BezPath,
    paint: &Paint,
    blend: BlendMode,
) -> RunonResult<bool> {
    if let PaintStyle::Stroke(params) = &paint.style
        && params.width <= 0.0
    {
        return Ok(false);
    }
    let alpha = paint.alpha.clamp(0.0, 1.0);
    ctx.set_transform(transform);
    ctx.reset_paint_transform();
    match &paint.shader {
        Shader::Solid(c) => ctx.set_paint(to_cpu_color(*c, alpha)),
        Shader::Linear { start, end, colors } => match colors.as_slice() {
            [] => return Ok(false),
            [only] => ctx.set_paint(to_cpu_color(*only, alpha)),
            _ => {
                let stops: Vec<peniko::Color> =
                    colors.iter().map(|c| to_cpu_color(*c, alpha)).collect();
                let gradient =
                    peniko::Gradient::new_linear(*start, *end).with_stops(stops.as_slice());
                ctx.set_paint(gradient);
            }
        },
        Shader::Image {
            image,
            rect,
            repeat,
        } => {
            if image.width == 0 || image.height == 0 || rect.width() == 0.0 || rect.height() == 0.0
            {
                return Ok(false);
            }
            let pixmap = frame_to_pixmap(image)?;
            ctx.set_paint_transform(
                Affine::translate((rect.x0, rect.y0))
                    * Affine::scale_non_uniform(
                        rect.width() / f64::from(image.width),
                        rect.height() / f64::from(image.height),
                    ),
            );
            ctx.set_paint(image_brush(Arc::new(pixmap), *repeat, alpha as f32, false));
        }
    }
    ctx.set_aliasing_threshold(if paint.anti_alias { None } else { Some(128) });
    ctx.set_blend_mode(to_cpu_blend(blend));
    match &paint.style {
        PaintStyle::Fill => ctx.fill_path(path),
        PaintStyle::Stroke(params) => {
            ctx.set_stroke(params.to_kurbo());
            ctx.stroke_path(path);
        }
    }
    ctx.set_blend_mode(peniko::BlendMode::default());
    ctx.set_aliasing_threshold(None);
    Ok(true)
}

impl Canvas for RasterCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn save(&mut self) {
        self.state.save();
    }

    fn restore(&mut self) {
        if !self.state.restore() {
            tracing::debug!("restore without matching save");
            return;
        }
        while self.clips.len() > self.state.clip {
            self.clips.pop();
            self.ctx.pop_clip_path();
        }
    }

    fn transform(&self) -> Affine {
        self.state.transform
    }

    fn concat(&mut self, t: Affine) {
        self.state.transform *= t;
    }

    fn clip_path(&mut self, path: &BezPath) {
        let transform = self.state.transform;
        self.ctx.set_transform(transform);
        self.ctx.push_clip_path(path);
        self.clips.push((path.clone(), transform));
        self.state.clip = self.clips.len();
    }

    fn clear(&mut self, color: Color) {
        let px = color.to_rgba8_premul().to_array();
        for dst in self.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            dst.copy_from_slice(&px);
        }
        self.dirty = false;
        self.blank = px[3] == 0;
        self.restart();
    }

    fn draw_path(&mut self, path: &BezPath, paint: &Paint) -> RunonResult<()> {
        let transform = self.state.transform;
        match paint.blur {
            Some(sigma) if sigma > 0.0 => {
                let mut isolated = vello_cpu::RenderContext::new(self.width, self.height);
                if !record_path(&mut isolated, transform, path, paint, BlendMode::Normal)? {
                    return Ok(());
                }
                isolated.flush();
                let mut layer = vello_cpu::Pixmap::new(self.width, self.height);
                isolated.render_to_pixmap(&mut layer);
                let data = blur_sigma(
                    layer.data_as_u8_slice(),
                    self.width(),
                    self.height(),
                    sigma * uniform_scale(transform),
                )?;
                let frame = FrameRGBA {
                    width: self.width(),
                    height: self.height(),
                    data,
                };
                self.draw_layer(&frame, paint.blend)
            }
            _ => {
                if record_path(&mut self.ctx, transform, path, paint, paint.blend)? {
                    self.dirty = true;
                }
                Ok(())
            }
        }
    }

    fn draw_text(&mut self, text: &str, origin: Point, size: f64, color: Color) -> RunonResult<()> {
        let t = self.state.transform;
        let at = t * origin;
        let frame = super::text::render_text(
            text,
            at.x,
            at.y,
            size * uniform_scale(t),
            color,
            self.width(),
            self.height(),
        )?;
        self.draw_layer(&frame, BlendMode::Normal)
    }

    fn snapshot(&mut self) -> Option<FrameRGBA> {
        Some(self.to_frame())
    }
}

fn to_cpu_color(c: Color, alpha: f64) -> peniko::Color {
    let [r, g, b, a] = c.mul_alpha(alpha).to_rgba8();
    peniko::Color::from_rgba8(r, g, b, a)
}

fn to_cpu_blend(mode: BlendMode) -> peniko::BlendMode {
    let mix = match mode {
        BlendMode::Normal => peniko::Mix::Normal,
        BlendMode::Multiply => peniko::Mix::Multiply,
        BlendMode::Screen => peniko::Mix::Screen,
        BlendMode::Overlay => peniko::Mix::Overlay,
        BlendMode::Darken => peniko::Mix::Darken,
        BlendMode::Lighten => peniko::Mix::Lighten,
        BlendMode::ColorDodge => peniko::Mix::ColorDodge,
        BlendMode::ColorBurn => peniko::Mix::ColorBurn,
        BlendMode::SoftLight => peniko::Mix::SoftLight,
        BlendMode::HardLight => peniko::Mix::HardLight,
        BlendMode::Difference => peniko::Mix::Difference,
        BlendMode::Exclusion => peniko::Mix::Exclusion,
    };
    peniko::BlendMode::from(mix)
}

/// Image paint over `pixmap`; `exact` picks nearest sampling for pixel-aligned layers.
fn image_brush(
    pixmap: Arc<vello_cpu::Pixmap>,
    repeat: bool,
    alpha: f32,
    exact: bool,
) -> vello_cpu::Image {
    let extend = if repeat {
        peniko::Extend::Repeat
    } else {
        peniko::Extend::Pad
    };
    vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(pixmap),
        sampler: peniko::ImageSampler {
            x_extend: extend,
            y_extend: extend,
            quality: if exact {
                peniko::ImageQuality::Low
            } else {
                peniko::ImageQuality::Medium
            },
            alpha,
        },
    }
}

fn frame_to_pixmap(frame: &FrameRGBA) -> RunonResult<vello_cpu::Pixmap> {
    let w: u16 = frame
        .width
        .try_into()
        .map_err(|_| RunonError::render("image width exceeds u16"))?;
    let h: u16 = frame
        .height
        .try_into()
        .map_err(|_| RunonError::render("image height exceeds u16"))?;
    if frame.data.len() != usize::from(w) * usize::from(h) * 4 {
        return Err(RunonError::render("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels: Vec<peniko::color::PremulRgba8> = frame
        .data
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
