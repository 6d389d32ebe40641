//! Runon builds vector artwork as a tree of pens and renders it.
//!
//! - Build a [`Pen`] tree: geometry, styling, layout and effects all hang off the pen
//! - [`composite`] it to PNG, SVG or PDF, or [`precompose`] it into pixels
//! - Draw it live through a [`preview::PreviewLoop`], or [`encode::export`] a timeline of frames
//!
//! The GPU context (feature `gpu`) renders the same tree through vello; the on-screen preview
//! window needs feature `viewer`.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Core value types, errors and geometry helpers.
pub mod foundation;

/// Frame sinks and batch export.
pub mod encode;
/// GPU context manager.
#[cfg(feature = "gpu")]
pub mod gpu;
/// The pen tree and its capabilities.
pub mod pen;
/// Live preview loop.
pub mod preview;
/// Rasterization backend.
pub mod render;

pub use crate::foundation::color::{BlendMode, Color};
pub use crate::foundation::core::{
    Affine, BezPath, Fps, Frame, FrameIndex, FrameRGBA, Point, Rect, Timeline, Vec2,
};
pub use crate::foundation::error::{RunonError, RunonResult};
pub use crate::foundation::geometry::{Anchor, Edge, RectExt};

pub use crate::encode::{ExportOpts, FfmpegSink, FfmpegSinkOpts, FrameSink, InMemorySink, SinkConfig};
#[cfg(feature = "gpu")]
pub use crate::gpu::GpuContext;
pub use crate::pen::Pen;
pub use crate::pen::fx::Effect;
pub use crate::preview::{PreviewConfig, PreviewLoop, Renderer};
pub use crate::render::{CompositeOpts, Destination, composite, precompose};
