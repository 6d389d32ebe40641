//! Composite and precompose entry points.
//!
//! Both walk the pen tree through [`paint_tree`]; they differ only in where the pixels end up.
//! A composite targets a file, an external canvas or (with the `gpu` feature) a GPU surface. A
//! precompose always produces an in-memory [`FrameRGBA`] of exactly the requested rectangle.

use super::canvas::Canvas;
use super::image_io::save_png;
use super::painter::paint_tree;
use super::pdf::PdfCanvas;
use super::raster::RasterCanvas;
use super::svg::SvgCanvas;
use crate::foundation::color::Color;
use crate::foundation::core::{FrameRGBA, Rect};
use crate::foundation::error::{RunonError, RunonResult};
use crate::foundation::geometry::RectExt;
use crate::pen::Pen;
use std::path::Path;

/// Options shared by every composite.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeOpts {
    /// Uniform scale applied to geometry and stroke widths.
    pub scale: f64,
    /// Named style layer; `_default` is used when absent or unknown.
    pub style: Option<String>,
    /// Colour painted over the whole surface before drawing.
    pub clear: Option<Color>,
}

impl Default for CompositeOpts {
    fn default() -> Self {
        Self {
            scale: 1.0,
            style: None,
            clear: None,
        }
    }
}

impl CompositeOpts {
    /// Default options at `scale`.
    pub fn scaled(scale: f64) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> RunonResult<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(RunonError::validation(format!(
                "composite scale must be finite and > 0, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}

/// File format of a composite written to disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Raster snapshot.
    Png,
    /// Vector document.
    Svg,
    /// Single-page vector document.
    Pdf,
}

impl OutputFormat {
    /// Format named by the extension of `path` (case-insensitive).
    pub fn from_path(path: &Path) -> RunonResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png") => Ok(Self::Png),
            Some("svg") => Ok(Self::Svg),
            Some("pdf") => Ok(Self::Pdf),
            _ => Err(RunonError::validation(format!(
                "unsupported output format for '{}' (expected .png, .svg or .pdf)",
                path.display()
            ))),
        }
    }
}

/// Where a composite ends up.
pub enum Destination<'a> {
    /// Finished file; the extension picks the format.
    File(&'a Path),
    /// Externally owned canvas, drawn into directly.
    Canvas {
        /// Target canvas.
        canvas: &'a mut dyn Canvas,
        /// PNG written from the canvas snapshot, when the canvas can provide one.
        save_to: Option<&'a Path>,
    },
    /// Surface of a GPU context; flushed only, unless `save_to` asks for a read-back.
    #[cfg(feature = "gpu")]
    Gpu {
        /// Context owning the surface.
        context: &'a mut crate::gpu::GpuContext,
        /// PNG written from the read-back pixels.
        save_to: Option<&'a Path>,
    },
}

impl std::fmt::Debug for Destination<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::File(p) => f.debug_tuple("File").field(p).finish(),
            Destination::Canvas { save_to, .. } => f
                .debug_struct("Canvas")
                .field("save_to", save_to)
                .finish_non_exhaustive(),
            #[cfg(feature = "gpu")]
            Destination::Gpu { save_to, .. } => f
                .debug_struct("Gpu")
                .field("save_to", save_to)
                .finish_non_exhaustive(),
        }
    }
}

/// Pixel size of `rect` at `scale`, rounded.
pub fn surface_size(rect: Rect, scale: f64) -> (u32, u32) {
    let w = (rect.width() * scale).round().max(0.0);
    let h = (rect.height() * scale).round().max(0.0);
    (w as u32, h as u32)
}

/// Draw `pen` into `canvas`: scale by `scale`, flip `rect` into the canvas origin, walk.
pub fn composite_to_canvas(
    pen: &Pen,
    rect: Rect,
    canvas: &mut dyn Canvas,
    scale: f64,
    style: Option<&str>,
) -> RunonResult<()> {
    canvas.save();
    canvas.scale(scale, scale);
    let out = paint_tree(canvas, pen, rect, style);
    canvas.restore();
    out
}

fn draw_onto(pen: &Pen, rect: Rect, canvas: &mut dyn Canvas, opts: &CompositeOpts) -> RunonResult<()> {
    if let Some(c) = opts.clear {
        canvas.clear(c);
    }
    composite_to_canvas(pen, rect, canvas, opts.scale, opts.style.as_deref())
}

/// Render `pen` inside `rect` to `dest`.
#[tracing::instrument(skip(pen, dest, opts), fields(scale = opts.scale))]
pub fn composite(
    pen: &Pen,
    rect: Rect,
    dest: Destination<'_>,
    opts: &CompositeOpts,
) -> RunonResult<()> {
    opts.validate()?;
    match dest {
        Destination::File(path) => composite_to_file(pen, rect, path, opts),
        Destination::Canvas { canvas, save_to } => {
            draw_onto(pen, rect, canvas, opts)?;
            if let Some(path) = save_to {
                match canvas.snapshot() {
                    Some(frame) => save_png(&frame, path)?,
                    None => tracing::warn!(
                        path = %path.display(),
                        "cannot save from an external canvas without pixel access"
                    ),
                }
            }
            Ok(())
        }
        #[cfg(feature = "gpu")]
        Destination::Gpu { context, save_to } => context.composite(pen, rect, save_to, opts),
    }
}

fn composite_to_file(pen: &Pen, rect: Rect, path: &Path, opts: &CompositeOpts) -> RunonResult<()> {
    let format = OutputFormat::from_path(path)?;
    let (w, h) = surface_size(rect, opts.scale);
    match format {
        OutputFormat::Png => {
            let mut canvas = RasterCanvas::new(w, h)?;
            draw_onto(pen, rect, &mut canvas, opts)?;
            save_png(&canvas.to_frame(), path)
        }
        OutputFormat::Svg => {
            let mut canvas = SvgCanvas::new(w, h);
            draw_onto(pen, rect, &mut canvas, opts)?;
            canvas.write_file(path)
        }
        OutputFormat::Pdf => {
            let mut canvas = PdfCanvas::new(w, h);
            draw_onto(pen, rect, &mut canvas, opts)?;
            canvas.write_file(path)
        }
    }
}

/// Rasterize `pen` inside `rect` (rounded to whole units) at `scale`.
///
/// The result is exactly `round(rect.w * scale) x round(rect.h * scale)` pixels with `rect`'s
/// bottom-left corner at the image's bottom-left. When `disk` is given the snapshot is also
/// written there as a PNG.
#[tracing::instrument(skip(pen, disk))]
pub fn precompose(
    pen: &Pen,
    rect: Rect,
    scale: f64,
    style: Option<&str>,
    disk: Option<&Path>,
) -> RunonResult<FrameRGBA> {
    CompositeOpts::scaled(scale).validate()?;
    let rect = rect.round_xywh();
    let (w, h) = surface_size(rect, scale);
    let mut canvas = RasterCanvas::new(w, h)?;
    composite_to_canvas(pen, rect, &mut canvas, scale, style)?;
    let frame = canvas.to_frame();
    if let Some(path) = disk {
        save_png(&frame, path)?;
    }
    Ok(frame)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
