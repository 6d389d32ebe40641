use super::sink::{FrameSink, SinkConfig};
use crate::foundation::color::Color;
use crate::foundation::core::{Frame, FrameIndex, Rect, Timeline};
use crate::foundation::error::{RunonError, RunonResult};
use crate::foundation::geometry::RectExt;
use crate::pen::Pen;
use crate::render::composite::{CompositeOpts, precompose, surface_size};
use std::ops::Range;

/// Batch export options.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportOpts {
    /// Pixels per pen unit.
    pub scale: f64,
    /// Named style layer.
    pub style: Option<String>,
    /// Background painted under every frame; `None` keeps transparency.
    pub background: Option<Color>,
    /// Frame range to export; `None` exports the whole timeline.
    pub range: Option<Range<u64>>,
}

impl Default for ExportOpts {
    fn default() -> Self {
        Self {
            scale: 1.0,
            style: None,
            background: None,
            range: None,
        }
    }
}

impl ExportOpts {
    fn frames(&self, timeline: &Timeline) -> RunonResult<Range<u64>> {
        let Some(r) = self.range.clone() else {
            return Ok(0..timeline.duration);
        };
        if r.start >= r.end || r.end > timeline.duration {
            return Err(RunonError::validation(format!(
                "export range {}..{} outside timeline of {} frames",
                r.start, r.end, timeline.duration
            )));
        }
        Ok(r)
    }
}

/// Render frames of `timeline` with `render` and push them to `sink` in order.
///
/// Returns the number of frames written. The first failure, from `render`, the rasterizer or
/// the sink, aborts the export; `end` is only called after every frame succeeded.
#[tracing::instrument(skip(render, sink), fields(duration = timeline.duration))]
pub fn export<F>(
    timeline: &Timeline,
    rect: Rect,
    opts: &ExportOpts,
    sink: &mut dyn FrameSink,
    mut render: F,
) -> RunonResult<u64>
where
    F: FnMut(&Frame<'_>) -> RunonResult<Pen>,
{
    CompositeOpts::scaled(opts.scale).validate()?;
    let range = opts.frames(timeline)?;
    let rect = rect.round_xywh();
    let (width, height) = surface_size(rect, opts.scale);
    if width == 0 || height == 0 {
        return Err(RunonError::validation("export rect is empty at this scale"));
    }

    sink.begin(SinkConfig {
        width,
        height,
        fps: timeline.fps,
    })?;

    let mut written = 0u64;
    for i in range {
        let frame = Frame {
            i: FrameIndex(i),
            timeline,
            rect,
        };
        let pen = render(&frame)?;
        let pen = match opts.background {
            Some(bg) => Pen::group([Pen::from_rect(rect).f(bg), pen]),
            None => pen,
        };
        let pixels = precompose(&pen, rect, opts.scale, opts.style.as_deref(), None)?;
        sink.push_frame(frame.i, &pixels)?;
        written += 1;
    }
    sink.end()?;
    tracing::info!(frames = written, "export finished");
    Ok(written)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/export.rs"]
mod tests;
