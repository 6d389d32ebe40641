//! Frame sinks and batch export.
//!
//! Sinks consume rendered frames in timeline order; [`export::export`] drives a timeline through
//! one. Export has no catch boundary: the first failing frame aborts the run.

/// Batch export over a timeline.
pub mod export;
/// `ffmpeg`-based sink (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// PNG sequence sink.
pub mod png;
/// Sink trait and in-memory sink.
pub mod sink;

pub use export::{ExportOpts, export};
pub use ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use png::PngSequenceSink;
pub use sink::{FrameSink, InMemorySink, SinkConfig};
