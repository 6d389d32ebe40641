//! [`Canvas`] implementation that records into a `vello::Scene`.
//!
//! Solid fills and strokes, images, clips, alpha and blend modes map onto scene commands.
//! Gradient shaders, image shaders and blurred paints are rasterized on the CPU over the full
//! surface and appended as an image.

use crate::foundation::color::{BlendMode, Color};
use crate::foundation::core::{Affine, BezPath, FrameRGBA, Point, Rect};
use crate::foundation::error::RunonResult;
use crate::render::canvas::{Canvas, Paint, PaintStyle, Shader, StateStack};
use crate::render::raster::RasterCanvas;
use crate::render::text::{parse_svg, text_element};
use std::sync::Arc;
use vello::peniko::Fill;

/// Drawing handle for the surface of a [`super::GpuContext`].
///
/// Clip layers still open when the handle is dropped are closed then.
pub struct GpuCanvas<'a> {
    scene: &'a mut vello::Scene,
    width: u32,
    height: u32,
    state: StateStack<usize>,
}

impl std::fmt::Debug for GpuCanvas<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuCanvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("clip_layers", &self.state.clip.len())
            .finish()
    }
}

impl<'a> GpuCanvas<'a> {
    pub(crate) fn new(scene: &'a mut vello::Scene, width: u32, height: u32) -> Self {
        Self {
            scene,
            width,
            height,
            state: StateStack::new(Vec::new()),
        }
    }

    fn pop_layers(&mut self, n: usize) {
        for _ in 0..n {
            self.scene.pop_layer();
        }
    }

    fn push_clip(&mut self, transform: Affine, path: &BezPath) {
        self.scene.push_layer(
            Fill::NonZero,
            vello::peniko::BlendMode::default(),
            1.0,
            transform,
            path,
        );
    }

    fn surface_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Run `draw` inside an alpha/blend layer when the paint needs one.
    fn with_layer(&mut self, alpha: f64, blend: BlendMode, draw: impl FnOnce(&mut vello::Scene)) {
        let needs_layer = alpha < 1.0 || blend != BlendMode::Normal;
        if needs_layer {
            let rect = self.surface_rect();
            self.scene.push_layer(
                Fill::NonZero,
                peniko_blend(blend),
                alpha.clamp(0.0, 1.0) as f32,
                Affine::IDENTITY,
                &rect,
            );
        }
        draw(self.scene);
        if needs_layer {
            self.scene.pop_layer();
        }
    }

    /// CPU fallback: rasterize `path` over the whole surface and append it as an image.
    fn draw_rasterized(&mut self, path: &BezPath, paint: &Paint) -> RunonResult<()> {
        let mut layer = RasterCanvas::new(self.width, self.height)?;
        layer.concat(self.state.transform);
        let flat = Paint {
            alpha: 1.0,
            blend: BlendMode::Normal,
            ..paint.clone()
        };
        layer.draw_path(path, &flat)?;
        let image = image_data(&layer.to_frame());
        self.with_layer(paint.alpha, paint.blend, |scene| {
            scene.draw_image(&image, Affine::IDENTITY);
        });
        Ok(())
    }
}

impl Drop for GpuCanvas<'_> {
    fn drop(&mut self) {
        let open = self.state.clip.len();
        self.pop_layers(open);
    }
}

pub(crate) fn peniko_color(c: Color) -> vello::peniko::Color {
    let [r, g, b, a] = c.to_rgba8();
    vello::peniko::Color::from_rgba8(r, g, b, a)
}

fn peniko_blend(mode: BlendMode) -> vello::peniko::BlendMode {
    use vello::peniko::Mix;
    let mix = match mode {
        BlendMode::Normal => Mix::Normal,
        BlendMode::Multiply => Mix::Multiply,
        BlendMode::Screen => Mix::Screen,
        BlendMode::Overlay => Mix::Overlay,
        BlendMode::Darken => Mix::Darken,
        BlendMode::Lighten => Mix::Lighten,
        BlendMode::ColorDodge => Mix::ColorDodge,
        BlendMode::ColorBurn => Mix::ColorBurn,
        BlendMode::SoftLight => Mix::SoftLight,
        BlendMode::HardLight => Mix::HardLight,
        BlendMode::Difference => Mix::Difference,
        BlendMode::Exclusion => Mix::Exclusion,
    };
    vello::peniko::BlendMode::from(mix)
}

fn image_data(frame: &FrameRGBA) -> vello::peniko::ImageData {
    vello::peniko::ImageData {
        data: vello::peniko::Blob::from(frame.data.clone()),
        format: vello::peniko::ImageFormat::Rgba8,
        alpha_type: vello::peniko::ImageAlphaType::AlphaPremultiplied,
        width: frame.width,
        height: frame.height,
    }
}

impl Canvas for GpuCanvas<'_> {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn save(&mut self) {
        self.state.save();
    }

    fn restore(&mut self) {
        let open = self.state.clip.len();
        if self.state.restore() {
            self.pop_layers(open.saturating_sub(self.state.clip.len()));
        } else {
            tracing::debug!("restore without matching save");
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
        self.push_clip(transform, path);
        self.state.clip.push((transform, path.clone()));
    }

    fn clear(&mut self, color: Color) {
        // Drop everything recorded so far, then reopen the clip layers so restores stay balanced.
        self.scene.reset();
        let rect = self.surface_rect();
        self.scene.fill(
            Fill::NonZero,
            Affine::IDENTITY,
            peniko_color(color),
            None,
            &rect,
        );
        let open = self.state.clip.clone();
        for (transform, path) in &open {
            self.push_clip(*transform, path);
        }
    }

    fn draw_path(&mut self, path: &BezPath, paint: &Paint) -> RunonResult<()> {
        let color = match (&paint.shader, paint.blur) {
            (Shader::Solid(c), None) => *c,
            _ => return self.draw_rasterized(path, paint),
        };
        let transform = self.state.transform;
        let brush = peniko_color(color);
        match &paint.style {
            PaintStyle::Fill => self.with_layer(paint.alpha, paint.blend, |scene| {
                scene.fill(Fill::NonZero, transform, brush, None, path);
            }),
            PaintStyle::Stroke(params) => {
                if params.width <= 0.0 {
                    return Ok(());
                }
                let stroke = params.to_kurbo();
                self.with_layer(paint.alpha, paint.blend, |scene| {
                    scene.stroke(&stroke, transform, brush, None, path);
                });
            }
        }
        Ok(())
    }

    fn draw_image(&mut self, image: &Arc<FrameRGBA>, dst: Rect, paint: &Paint) -> RunonResult<()> {
        if image.width == 0 || image.height == 0 {
            return Ok(());
        }
        let placement = self.state.transform
            * Affine::translate((dst.x0, dst.y0))
            * Affine::scale_non_uniform(
                dst.width() / f64::from(image.width),
                dst.height() / f64::from(image.height),
            );
        let data = image_data(image);
        self.with_layer(paint.alpha, paint.blend, |scene| {
            scene.draw_image(&data, placement);
        });
        Ok(())
    }

    fn draw_text(&mut self, text: &str, origin: Point, size: f64, color: Color) -> RunonResult<()> {
        let doc = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}">{}</svg>"#,
            text_element(text, origin.x, origin.y, size, color),
            w = self.width.max(1),
            h = self.height.max(1),
        );
        let tree = parse_svg(doc.as_bytes())?;
        let svg_scene = vello_svg::render_tree(&tree);
        self.scene.append(&svg_scene, Some(self.state.transform));
        Ok(())
    }
}
