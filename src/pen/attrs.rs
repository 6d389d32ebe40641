//! Layered style attributes.
//!
//! A node stores an ordered list of `(layer, attribute)` patches. Resolving a style replays the
//! patches of one layer in insertion order into a [`ResolvedStyle`]; the most recent write to a
//! key wins while the key keeps the position of its first write.

use crate::foundation::color::{BlendMode, Color, Fill};
use crate::foundation::core::{FrameRGBA, Rect};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Layer name used when no explicit style is requested.
pub const DEFAULT_LAYER: &str = "_default";

/// Where an image fill gets its pixels from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// Image file decoded at paint time.
    Path(PathBuf),
    /// In-memory premultiplied pixels, typically a precompose snapshot.
    #[serde(skip)]
    Pixels(Arc<FrameRGBA>),
}

/// Image painted into a path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageFill {
    /// Pixel source.
    pub source: ImageSource,
    /// Placement of the image in pen space.
    pub rect: Rect,
    /// Opacity multiplier.
    #[serde(default = "one")]
    pub opacity: f64,
    /// `true` tiles the image as a shader over the path; `false` clips to the path and draws the
    /// image at `rect`.
    #[serde(default)]
    pub pattern: bool,
}

/// Drop shadow drawn under a path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    /// Optional clip applied before the shadow is drawn.
    #[serde(default)]
    pub clip: Option<Rect>,
    /// Blur radius in pen units.
    #[serde(default = "default_shadow_radius")]
    pub radius: f64,
    /// Shadow colour.
    #[serde(default = "default_shadow_color")]
    pub color: Color,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            clip: None,
            radius: default_shadow_radius(),
            color: default_shadow_color(),
        }
    }
}

fn one() -> f64 {
    1.0
}

fn default_shadow_radius() -> f64 {
    10.0
}

fn default_shadow_color() -> Color {
    Color::BLACK
}

/// Dash pattern for strokes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dash {
    /// Alternating on/off lengths.
    pub dashes: Vec<f64>,
    /// Phase offset.
    #[serde(default)]
    pub offset: f64,
}

/// One style patch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "attr", rename_all = "snake_case")]
pub enum Attr {
    /// Fill colour or gradient; `None` disables the fill.
    Fill {
        /// Fill source.
        fill: Option<Fill>,
    },
    /// Stroke colour or gradient; `None` disables the stroke.
    StrokeColor {
        /// Stroke source.
        fill: Option<Fill>,
    },
    /// Stroke width; `0` disables the stroke.
    StrokeWeight {
        /// Width in pen units.
        weight: f64,
    },
    /// Stroke dash pattern.
    Dash(Dash),
    /// Stroke miter limit.
    Miter {
        /// Limit ratio.
        limit: f64,
    },
    /// Blend mode for every paint of the node.
    Blend {
        /// Mode.
        mode: BlendMode,
    },
    /// Visibility switch.
    Visible {
        /// `false` skips the node.
        visible: bool,
    },
    /// Drop shadow.
    Shadow(Shadow),
    /// Image fill.
    Image(ImageFill),
    /// Backend paint overrides; keys starting with `_` are ignored by painters.
    RawPaint {
        /// Override map.
        paint: BTreeMap<String, serde_json::Value>,
    },
}

/// One entry of a [`StyleStack`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttrPatch {
    /// Layer name.
    pub layer: String,
    /// Patch content.
    pub attr: Attr,
}

/// Ordered `(layer, attribute)` patches.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleStack {
    patches: Vec<AttrPatch>,
}

impl StyleStack {
    /// Empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a patch to `layer`.
    pub fn push(&mut self, layer: &str, attr: Attr) {
        self.patches.push(AttrPatch {
            layer: layer.to_owned(),
            attr,
        });
    }

    /// All patches in application order.
    pub fn patches(&self) -> &[AttrPatch] {
        &self.patches
    }

    /// `true` when no patch was ever applied.
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// `true` when any patch targets `layer`.
    pub fn has_layer(&self, layer: &str) -> bool {
        self.patches.iter().any(|p| p.layer == layer)
    }

    /// New stack replaying `self` then `top`, so `top` wins on shared keys.
    pub fn layered_under(&self, top: &StyleStack) -> StyleStack {
        let mut patches = self.patches.clone();
        patches.extend(top.patches.iter().cloned());
        StyleStack { patches }
    }

    /// Resolve `style`, falling back to [`DEFAULT_LAYER`] when no patch names it.
    pub fn resolve(&self, style: Option<&str>) -> ResolvedStyle {
        let layer = match style {
            Some(s) if self.has_layer(s) => s,
            _ => DEFAULT_LAYER,
        };
        let mut out = ResolvedStyle::default();
        for p in self.patches.iter().filter(|p| p.layer == layer) {
            out.apply(&p.attr);
        }
        out
    }
}

/// Stroke record; colour, weight, dash and miter patch the same entry.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Stroke source.
    pub color: Option<Fill>,
    /// Width in pen units.
    pub weight: f64,
    /// Dash pattern.
    pub dash: Option<Dash>,
    /// Miter limit.
    pub miter: Option<f64>,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: None,
            weight: 1.0,
            dash: None,
            miter: None,
        }
    }
}

/// One resolved attribute, in paint order.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleEntry {
    /// Raw paint overrides.
    RawPaint(BTreeMap<String, serde_json::Value>),
    /// Blend mode.
    Blend(BlendMode),
    /// Fill.
    Fill(Option<Fill>),
    /// Stroke.
    Stroke(StrokeStyle),
    /// Image fill.
    Image(ImageFill),
    /// Shadow.
    Shadow(Shadow),
    /// Visibility.
    Visible(bool),
}

impl StyleEntry {
    fn same_key(&self, other: &StyleEntry) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// Flattened attributes of one layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedStyle {
    entries: Vec<StyleEntry>,
}

impl ResolvedStyle {
    /// Entries in the order their keys were first written.
    pub fn entries(&self) -> &[StyleEntry] {
        &self.entries
    }

    /// `true` when nothing was resolved.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn patch_stroke(&mut self, f: impl FnOnce(&mut StrokeStyle)) {
        for e in &mut self.entries {
            if let StyleEntry::Stroke(s) = e {
                f(s);
                return;
            }
        }
        let mut s = StrokeStyle::default();
        f(&mut s);
        self.entries.push(StyleEntry::Stroke(s));
    }

    fn set(&mut self, entry: StyleEntry) {
        match self.entries.iter_mut().find(|e| e.same_key(&entry)) {
            Some(slot) => *slot = entry,
            None => self.entries.push(entry),
        }
    }

    /// Apply one patch.
    pub fn apply(&mut self, attr: &Attr) {
        match attr {
            Attr::Fill { fill } => self.set(StyleEntry::Fill(fill.clone())),
            Attr::StrokeColor { fill } => self.patch_stroke(|s| s.color = fill.clone()),
            Attr::StrokeWeight { weight } => self.patch_stroke(|s| s.weight = *weight),
            Attr::Dash(d) => self.patch_stroke(|s| s.dash = Some(d.clone())),
            Attr::Miter { limit } => self.patch_stroke(|s| s.miter = Some(*limit)),
            Attr::Blend { mode } => self.set(StyleEntry::Blend(*mode)),
            Attr::Visible { visible } => self.set(StyleEntry::Visible(*visible)),
            Attr::Shadow(s) => self.set(StyleEntry::Shadow(s.clone())),
            Attr::Image(i) => self.set(StyleEntry::Image(i.clone())),
            Attr::RawPaint { paint } => {
                let existing = self.entries.iter_mut().find_map(|e| match e {
                    StyleEntry::RawPaint(m) => Some(m),
                    _ => None,
                });
                match existing {
                    Some(m) => m.extend(paint.iter().map(|(k, v)| (k.clone(), v.clone()))),
                    None => self.entries.push(StyleEntry::RawPaint(paint.clone())),
                }
            }
        }
    }

    /// Resolved fill; `None` when unset or disabled.
    pub fn fill(&self) -> Option<&Fill> {
        self.entries.iter().find_map(|e| match e {
            StyleEntry::Fill(f) => f.as_ref(),
            _ => None,
        })
    }

    /// Resolved stroke record.
    pub fn stroke(&self) -> Option<&StrokeStyle> {
        self.entries.iter().find_map(|e| match e {
            StyleEntry::Stroke(s) => Some(s),
            _ => None,
        })
    }

    /// Resolved blend mode, `Normal` when unset.
    pub fn blend(&self) -> BlendMode {
        self.entries
            .iter()
            .find_map(|e| match e {
                StyleEntry::Blend(b) => Some(*b),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Visibility, `true` when unset.
    pub fn visible(&self) -> bool {
        self.entries
            .iter()
            .find_map(|e| match e {
                StyleEntry::Visible(v) => Some(*v),
                _ => None,
            })
            .unwrap_or(true)
    }

    /// Resolved image fill.
    pub fn image(&self) -> Option<&ImageFill> {
        self.entries.iter().find_map(|e| match e {
            StyleEntry::Image(i) => Some(i),
            _ => None,
        })
    }

    /// Resolved shadow.
    pub fn shadow(&self) -> Option<&Shadow> {
        self.entries.iter().find_map(|e| match e {
            StyleEntry::Shadow(s) => Some(s),
            _ => None,
        })
    }

    /// Raw paint overrides, excluding keys starting with `_`.
    pub fn raw_paint(&self) -> BTreeMap<String, serde_json::Value> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                StyleEntry::RawPaint(m) => Some(m),
                _ => None,
            })
            .flat_map(|m| m.iter())
            .filter(|(k, _)| !k.starts_with('_'))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pen/attrs.rs"]
mod tests;
