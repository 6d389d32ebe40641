//! Single-page PDF output canvas built with `pdf-writer`.
//!
//! Solid fills and strokes stay vector. Paints that PDF cannot express directly (gradients,
//! image shaders, blur) are rasterized over their device bounds with [`RasterCanvas`] and placed
//! as image XObjects with a soft mask. Each draw call is wrapped in its own `q`/`Q` pair and
//! re-establishes the page flip and clip, so [`Canvas::clear`] can simply drop earlier operators.

use super::canvas::{Canvas, Paint, PaintStyle, Shader, StateStack, StrokeParams, uniform_scale};
use super::raster::RasterCanvas;
use crate::foundation::color::{BlendMode, Color};
use crate::foundation::core::{Affine, BezPath, FrameRGBA, PathEl, Point, Rect};
use crate::foundation::error::RunonResult;
use anyhow::Context;
use kurbo::Shape;
use pdf_writer::types::{LineCapStyle, LineJoinStyle};
use pdf_writer::{Content, Finish, Name, Pdf, Ref, Str};
use std::path::Path;
use std::sync::Arc;

const FONT_NAME: &[u8] = b"F1";

/// Clip paths already mapped into page space.
type ClipList = Vec<Arc<BezPath>>;

#[derive(Clone, Copy, Debug, PartialEq)]
struct GraphicsState {
    alpha: f32,
    blend: BlendMode,
}

/// Vector canvas producing a one-page PDF document.
pub struct PdfCanvas {
    width: u32,
    height: u32,
    ops: Vec<u8>,
    content: Content,
    states: Vec<GraphicsState>,
    images: Vec<FrameRGBA>,
    uses_font: bool,
    state: StateStack<ClipList>,
}

impl std::fmt::Debug for PdfCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfCanvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("images", &self.images.len())
            .field("states", &self.states.len())
            .finish()
    }
}

impl PdfCanvas {
    /// Empty page of `width x height` points.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
            content: Content::new(),
            states: Vec::new(),
            images: Vec::new(),
            uses_font: false,
            state: StateStack::new(Vec::new()),
        }
    }

    /// Resource name of the graphics state for `alpha` and `blend`, registering it when new.
    fn graphics_state(&mut self, alpha: f64, blend: BlendMode) -> Option<String> {
        let gs = GraphicsState {
            alpha: alpha.clamp(0.0, 1.0) as f32,
            blend,
        };
        if gs.alpha >= 1.0 && blend == BlendMode::Normal {
            return None;
        }
        let idx = match self.states.iter().position(|s| *s == gs) {
            Some(i) => i,
            None => {
                self.states.push(gs);
                self.states.len() - 1
            }
        };
        Some(format!("G{}", idx + 1))
    }

    /// Start one draw: page flip, clip stack and optional graphics state.
    fn begin(&mut self, gs: Option<&str>) {
        self.content.save_state();
        self.content
            .transform([1.0, 0.0, 0.0, -1.0, 0.0, self.height as f32]);
        for clip in self.state.clip.clone() {
            emit_path(&mut self.content, &clip);
            self.content.clip_nonzero();
            self.content.end_path();
        }
        if let Some(name) = gs {
            self.content.set_parameters(Name(name.as_bytes()));
        }
    }

    /// Close the current draw and append it to the page stream.
    fn end(&mut self) {
        self.content.restore_state();
        let done = std::mem::replace(&mut self.content, Content::new());
        self.ops.extend_from_slice(&done.finish());
    }

    /// Rasterize `path` with `paint` over its device bounds and place the result as an image.
    fn draw_rasterized(&mut self, path: &BezPath, paint: &Paint) -> RunonResult<()> {
        let t = self.state.transform;
        let mut bounds = (t * path.clone()).bounding_box();
        if let PaintStyle::Stroke(p) = &paint.style {
            bounds = bounds.inflate(p.width * uniform_scale(t), p.width * uniform_scale(t));
        }
        if let Some(sigma) = paint.blur {
            let m = 3.0 * sigma * uniform_scale(t);
            bounds = bounds.inflate(m, m);
        }
        let page = Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height));
        let bounds = bounds.intersect(page).expand();
        if bounds.width() < 1.0 || bounds.height() < 1.0 {
            return Ok(());
        }

        let mut layer = RasterCanvas::new(bounds.width() as u32, bounds.height() as u32)?;
        layer.concat(Affine::translate((-bounds.x0, -bounds.y0)) * t);
        let flat = Paint {
            alpha: 1.0,
            blend: BlendMode::Normal,
            ..paint.clone()
        };
        layer.draw_path(path, &flat)?;
        self.place_image(layer.to_frame(), bounds, paint.alpha, paint.blend);
        Ok(())
    }

    /// Place `frame` at page-space `dst`.
    fn place_image(&mut self, frame: FrameRGBA, dst: Rect, alpha: f64, blend: BlendMode) {
        self.images.push(frame);
        let name = format!("Im{}", self.images.len());
        let gs = self.graphics_state(alpha, blend);
        self.begin(gs.as_deref());
        // Unit square row 0 is the image's bottom row; flip it so pixel row 0 lands at `dst.y0`.
        self.content.transform([
            dst.width() as f32,
            0.0,
            0.0,
            -dst.height() as f32,
            dst.x0 as f32,
            dst.y1 as f32,
        ]);
        self.content.x_object(Name(name.as_bytes()));
        self.end();
    }

    /// The finished document.
    pub fn to_bytes(&self) -> Vec<u8> {
        let catalog_id = Ref::new(1);
        let tree_id = Ref::new(2);
        let page_id = Ref::new(3);
        let content_id = Ref::new(4);
        let font_id = Ref::new(5);
        let mut next = 6;
        let mut alloc = || {
            let r = Ref::new(next);
            next += 1;
            r
        };
        let state_ids: Vec<Ref> = self.states.iter().map(|_| alloc()).collect();
        let image_ids: Vec<(Ref, Ref)> = self.images.iter().map(|_| (alloc(), alloc())).collect();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(tree_id);
        pdf.pages(tree_id).kids([page_id]).count(1);

        let mut page = pdf.page(page_id);
        page.media_box(pdf_writer::Rect::new(
            0.0,
            0.0,
            self.width as f32,
            self.height as f32,
        ));
        page.parent(tree_id);
        page.contents(content_id);
        let mut resources = page.resources();
        if self.uses_font {
            resources.fonts().pair(Name(FONT_NAME), font_id);
        }
        if !state_ids.is_empty() {
            let mut dict = resources.ext_g_states();
            for (i, id) in state_ids.iter().enumerate() {
                let name = format!("G{}", i + 1);
                dict.pair(Name(name.as_bytes()), *id);
            }
            dict.finish();
        }
        if !image_ids.is_empty() {
            let mut dict = resources.x_objects();
            for (i, (id, _)) in image_ids.iter().enumerate() {
                let name = format!("Im{}", i + 1);
                dict.pair(Name(name.as_bytes()), *id);
            }
            dict.finish();
        }
        resources.finish();
        page.finish();

        if self.uses_font {
            pdf.type1_font(font_id).base_font(Name(b"Helvetica"));
        }
        for (gs, id) in self.states.iter().zip(&state_ids) {
            pdf.ext_graphics(*id)
                .non_stroking_alpha(gs.alpha)
                .stroking_alpha(gs.alpha)
                .blend_mode(pdf_blend(gs.blend));
        }
        for (frame, (id, mask_id)) in self.images.iter().zip(&image_ids) {
            let straight = frame.to_straight();
            let rgb: Vec<u8> = straight
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            let alpha: Vec<u8> = straight.chunks_exact(4).map(|px| px[3]).collect();

            let mut image = pdf.image_xobject(*id, &rgb);
            image.width(frame.width as i32);
            image.height(frame.height as i32);
            image.color_space().device_rgb();
            image.bits_per_component(8);
            image.s_mask(*mask_id);
            image.finish();

            let mut mask = pdf.image_xobject(*mask_id, &alpha);
            mask.width(frame.width as i32);
            mask.height(frame.height as i32);
            mask.color_space().device_gray();
            mask.bits_per_component(8);
            mask.finish();
        }

        pdf.stream(content_id, &self.ops);
        pdf.finish()
    }

    /// Write [`PdfCanvas::to_bytes`] to `path`, creating parent directories.
    pub fn write_file(&self, path: &Path) -> RunonResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output directory '{}'", parent.display()))?;
        }
        std::fs::write(path, self.to_bytes())
            .with_context(|| format!("write pdf '{}'", path.display()))?;
        Ok(())
    }
}

fn pdf_blend(mode: BlendMode) -> pdf_writer::types::BlendMode {
    use pdf_writer::types::BlendMode as B;
    match mode {
        BlendMode::Normal => B::Normal,
        BlendMode::Multiply => B::Multiply,
        BlendMode::Screen => B::Screen,
        BlendMode::Overlay => B::Overlay,
        BlendMode::Darken => B::Darken,
        BlendMode::Lighten => B::Lighten,
        BlendMode::ColorDodge => B::ColorDodge,
        BlendMode::ColorBurn => B::ColorBurn,
        BlendMode::SoftLight => B::SoftLight,
        BlendMode::HardLight => B::HardLight,
        BlendMode::Difference => B::Difference,
        BlendMode::Exclusion => B::Exclusion,
    }
}

fn emit_path(content: &mut Content, path: &BezPath) {
    let mut last = Point::ZERO;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                content.move_to(p.x as f32, p.y as f32);
                last = p;
            }
            PathEl::LineTo(p) => {
                content.line_to(p.x as f32, p.y as f32);
                last = p;
            }
            PathEl::QuadTo(q, p) => {
                let c1 = last + (q - last) * (2.0 / 3.0);
                let c2 = p + (q - p) * (2.0 / 3.0);
                content.cubic_to(
                    c1.x as f32,
                    c1.y as f32,
                    c2.x as f32,
                    c2.y as f32,
                    p.x as f32,
                    p.y as f32,
                );
                last = p;
            }
            PathEl::CurveTo(c1, c2, p) => {
                content.cubic_to(
                    c1.x as f32,
                    c1.y as f32,
                    c2.x as f32,
                    c2.y as f32,
                    p.x as f32,
                    p.y as f32,
                );
                last = p;
            }
            PathEl::ClosePath => {
                content.close_path();
            }
        }
    }
}

fn apply_stroke(content: &mut Content, params: &StrokeParams) {
    content.set_line_width(params.width as f32);
    content.set_line_join(LineJoinStyle::MiterJoin);
    content.set_line_cap(LineCapStyle::ButtCap);
    if let Some(m) = params.miter {
        content.set_miter_limit(m as f32);
    }
    if let Some(d) = &params.dash
        && !d.dashes.is_empty()
    {
        content.set_dash_pattern(d.dashes.iter().map(|v| *v as f32), d.offset as f32);
    }
}

impl Canvas for PdfCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn save(&mut self) {
        self.state.save();
    }

    fn restore(&mut self) {
        if !self.state.restore() {
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
        let mapped = self.state.transform * path.clone();
        self.state.clip.push(Arc::new(mapped));
    }

    fn clear(&mut self, color: Color) {
        self.ops.clear();
        let gs = self.graphics_state(color.a, BlendMode::Normal);
        self.content.save_state();
        if let Some(name) = &gs {
            self.content.set_parameters(Name(name.as_bytes()));
        }
        self.content
            .set_fill_rgb(color.r as f32, color.g as f32, color.b as f32);
        self.content
            .rect(0.0, 0.0, self.width as f32, self.height as f32);
        self.content.fill_nonzero();
        self.end();
    }

    fn draw_path(&mut self, path: &BezPath, paint: &Paint) -> RunonResult<()> {
        if let PaintStyle::Stroke(p) = &paint.style
            && p.width <= 0.0
        {
            return Ok(());
        }
        let color = match (&paint.shader, paint.blur) {
            (Shader::Solid(c), None) => *c,
            _ => return self.draw_rasterized(path, paint),
        };
        let gs = self.graphics_state(paint.alpha * color.a, paint.blend);
        self.begin(gs.as_deref());
        let [a, b, c, d, e, f] = self.state.transform.as_coeffs();
        self.content
            .transform([a as f32, b as f32, c as f32, d as f32, e as f32, f as f32]);
        emit_path(&mut self.content, path);
        let (r, g, b) = (color.r as f32, color.g as f32, color.b as f32);
        match &paint.style {
            PaintStyle::Fill => {
                self.content.set_fill_rgb(r, g, b);
                self.content.fill_nonzero();
            }
            PaintStyle::Stroke(params) => {
                apply_stroke(&mut self.content, params);
                self.content.set_stroke_rgb(r, g, b);
                self.content.stroke();
            }
        }
        self.end();
        Ok(())
    }

    fn draw_image(&mut self, image: &Arc<FrameRGBA>, dst: Rect, paint: &Paint) -> RunonResult<()> {
        let t = self.state.transform;
        if t.as_coeffs()[1] == 0.0 && t.as_coeffs()[2] == 0.0 {
            let mapped = t.transform_rect_bbox(dst);
            self.place_image(image.as_ref().clone(), mapped, paint.alpha, paint.blend);
            return Ok(());
        }
        let p = Paint {
            style: PaintStyle::Fill,
            shader: Shader::Image {
                image: image.clone(),
                rect: dst,
                repeat: false,
            },
            ..paint.clone()
        };
        self.draw_rasterized(&crate::pen::drawing::rect_path(dst), &p)
    }

    fn draw_text(&mut self, text: &str, origin: Point, size: f64, color: Color) -> RunonResult<()> {
        self.uses_font = true;
        let gs = self.graphics_state(color.a, BlendMode::Normal);
        self.begin(gs.as_deref());
        let [a, b, c, d, e, f] = self.state.transform.as_coeffs();
        self.content
            .transform([a as f32, b as f32, c as f32, d as f32, e as f32, f as f32]);
        self.content
            .set_fill_rgb(color.r as f32, color.g as f32, color.b as f32);
        self.content.begin_text();
        self.content.set_font(Name(FONT_NAME), size as f32);
        // Text space is y-up; undo the page flip for the glyphs only.
        self.content.set_text_matrix([
            1.0,
            0.0,
            0.0,
            -1.0,
            origin.x as f32,
            origin.y as f32,
        ]);
        self.content.show(Str(text.as_bytes()));
        self.content.end_text();
        self.end();
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pdf.rs"]
mod tests;
