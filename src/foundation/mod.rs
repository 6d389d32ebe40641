/// Frame timing, premultiplied pixels and re-exported `kurbo` value types.
pub mod core;
/// Crate error type.
pub mod error;
/// Colours, gradients and blend modes.
pub mod color;
/// Compass anchors and rectangle helpers.
pub mod geometry;
pub(crate) mod math;
