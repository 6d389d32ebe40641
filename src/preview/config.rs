//! Preview window configuration.

use crate::foundation::error::{RunonError, RunonResult};
use crate::foundation::geometry::Anchor;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Window and scheduling options for the preview loop.
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewConfig {
    /// Scale applied to every non-error preview.
    pub preview_scale: f64,
    /// Transparent, undecorated window; previews skip their background fill.
    pub window_transparent: bool,
    /// Let mouse events pass through the window.
    pub window_passthrough: bool,
    /// Open without taking focus.
    pub window_background: bool,
    /// Keep the window above others.
    pub window_float: bool,
    /// Pin the window to a corner or edge of the monitor work area.
    pub window_pin: Option<Anchor>,
    /// Offset from the pinned position, `(x, y)` in window units.
    pub window_pin_inset: (f64, f64),
    /// Window opacity, clamped to `0.1..=1.0` when applied.
    pub window_opacity: f64,
    /// Monitor selected by name substring; `"list"` logs the available names.
    pub monitor_name: Option<String>,
    /// Content scale override; the monitor's scale when `None`.
    pub window_content_scale: Option<f64>,
    /// Sleep after a tick that drew previews; the idle backoff restarts here. Seconds.
    pub refresh_delay: f64,
    /// Growth of the idle sleep per empty tick, in seconds.
    pub backoff_step: f64,
    /// Upper bound of the idle sleep, in seconds.
    pub backoff_max: f64,
    /// Interval between preloaded frames during playback, in seconds.
    pub preloaded_interval: f64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            preview_scale: 1.0,
            window_transparent: false,
            window_passthrough: false,
            window_background: false,
            window_float: false,
            window_pin: None,
            window_pin_inset: (0.0, 0.0),
            window_opacity: 1.0,
            monitor_name: None,
            window_content_scale: None,
            refresh_delay: 0.025,
            backoff_step: 0.01,
            backoff_max: 0.25,
            preloaded_interval: 0.01,
        }
    }
}

fn parse_bool(key: &str, raw: &str) -> RunonResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(RunonError::validation(format!(
            "{key}: expected a boolean, got '{other}'"
        ))),
    }
}

impl PreviewConfig {
    /// Parse from JSON text and validate.
    pub fn from_json_str(s: &str) -> RunonResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read a JSON file and validate.
    pub fn load(path: &Path) -> RunonResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read preview config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Apply `RUNON_PREVIEW_SCALE`, `RUNON_WINDOW_TRANSPARENT`, `RUNON_WINDOW_FLOAT` and
    /// `RUNON_MONITOR` from the process environment.
    pub fn with_env_overrides(self) -> RunonResult<Self> {
        self.with_overrides_from(|k| std::env::var(k).ok())
    }

    /// Same as [`PreviewConfig::with_env_overrides`] with an explicit lookup.
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> RunonResult<Self> {
        if let Some(raw) = lookup("RUNON_PREVIEW_SCALE") {
            self.preview_scale = raw.trim().parse().map_err(|_| {
                RunonError::validation(format!("RUNON_PREVIEW_SCALE: not a number: '{raw}'"))
            })?;
        }
        if let Some(raw) = lookup("RUNON_WINDOW_TRANSPARENT") {
            self.window_transparent = parse_bool("RUNON_WINDOW_TRANSPARENT", &raw)?;
        }
        if let Some(raw) = lookup("RUNON_WINDOW_FLOAT") {
            self.window_float = parse_bool("RUNON_WINDOW_FLOAT", &raw)?;
        }
        if let Some(raw) = lookup("RUNON_MONITOR") {
            let name = raw.trim();
            self.monitor_name = (!name.is_empty()).then(|| name.to_string());
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject non-positive scales and delays.
    pub fn validate(&self) -> RunonResult<()> {
        if !self.preview_scale.is_finite() || self.preview_scale <= 0.0 {
            return Err(RunonError::validation(format!(
                "preview_scale must be finite and > 0, got {}",
                self.preview_scale
            )));
        }
        for (name, v) in [
            ("refresh_delay", self.refresh_delay),
            ("backoff_step", self.backoff_step),
            ("backoff_max", self.backoff_max),
            ("preloaded_interval", self.preloaded_interval),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(RunonError::validation(format!(
                    "{name} must be finite and >= 0, got {v}"
                )));
            }
        }
        if let Some(s) = self.window_content_scale
            && (!s.is_finite() || s <= 0.0)
        {
            return Err(RunonError::validation(format!(
                "window_content_scale must be finite and > 0, got {s}"
            )));
        }
        Ok(())
    }

    /// Configured opacity, clamped.
    pub fn opacity(&self) -> f64 {
        clamp_opacity(self.window_opacity)
    }
}

/// Clamp a window opacity to `0.1..=1.0`; NaN becomes fully opaque.
pub fn clamp_opacity(op: f64) -> f64 {
    if op.is_nan() { 1.0 } else { op.clamp(0.1, 1.0) }
}

#[cfg(test)]
#[path = "../../tests/unit/preview/config.rs"]
mod tests;
