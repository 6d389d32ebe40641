use super::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRGBA};
use crate::foundation::error::{RunonError, RunonResult};
use crate::render::image_io::save_png;
use anyhow::Context as _;
use std::path::{Path, PathBuf};

/// Writes each frame to `<dir>/<prefix>_<index:04>.png`.
///
/// The written paths are kept in order, ready to be handed to preloaded playback.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
    cfg: Option<SinkConfig>,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    /// Sink writing into `dir` with file names starting with `prefix`.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            cfg: None,
            written: Vec::new(),
        }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path frame `idx` is written to.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("{}_{:04}.png", self.prefix, idx.0))
    }

    /// Files written since the last `begin`, in push order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Take the written paths, leaving the list empty.
    pub fn into_paths(self) -> Vec<PathBuf> {
        self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> RunonResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output directory '{}'", self.dir.display()))?;
        self.cfg = Some(cfg);
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> RunonResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| RunonError::render("png sink not started"))?;
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(RunonError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        let path = self.frame_path(idx);
        save_png(frame, &path)?;
        tracing::debug!(path = %path.display(), "frame written");
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> RunonResult<()> {
        self.cfg = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
