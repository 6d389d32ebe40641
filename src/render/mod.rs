//! Rasterization backend.
//!
//! [`composite`] and [`precompose`] walk a pen tree and issue paint calls on a [`Canvas`]:
//! the CPU [`RasterCanvas`], the vector [`SvgCanvas`] and [`PdfCanvas`], or a GPU canvas from
//! `crate::gpu`. Pixel buffers are premultiplied RGBA8 throughout.

/// Separable gaussian blur.
pub mod blur;
/// The drawing boundary shared by every target.
pub mod canvas;
/// Composite and precompose entry points.
pub mod composite;
/// Raster effects for `Pen::ch`.
pub mod effects;
/// PNG/JPEG decoding and PNG encoding.
pub mod image_io;
/// Leaf-by-leaf painting of a pen tree.
pub mod painter;
/// Single-page PDF canvas.
pub mod pdf;
/// CPU raster canvas.
pub mod raster;
/// SVG canvas.
pub mod svg;
/// Placeholder text rendering.
pub mod text;

pub use canvas::{Canvas, Paint, PaintStyle, Shader, StrokeParams};
pub use composite::{
    CompositeOpts, Destination, OutputFormat, composite, composite_to_canvas, precompose,
    surface_size,
};
pub use effects::{DitherMethod, blur_fx, dither, phototype, precompose_fx};
pub use painter::{flip_transform, paint_tree};
pub use pdf::PdfCanvas;
pub use raster::RasterCanvas;
pub use svg::SvgCanvas;
