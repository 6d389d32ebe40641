use crate::foundation::core::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keyed metadata carried by every pen node.
pub type DataDict = BTreeMap<String, DataValue>;

/// Keys the rendering core reads from accumulated walk data.
pub mod keys {
    /// Frame rectangle recorded by layout and `collapse`.
    pub const FRAME: &str = "frame";
    /// Glyph name for text-derived pens.
    pub const GLYPH_NAME: &str = "glyphName";
    /// Advance width for text-derived pens.
    pub const ADVANCE: &str = "advance";
    /// Opacity multiplier inherited by every leaf below.
    pub const ALPHA: &str = "alpha";
    /// Gaussian mask blur applied to fills (sigma is a third of the value).
    pub const BLUR: &str = "blur";
}

/// One metadata value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DataValue {
    /// Explicit absence.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// String.
    Str(String),
    /// Rectangle in pen space.
    Rect(Rect),
    /// Point in pen space.
    Point(Point),
    /// Ordered list.
    List(Vec<DataValue>),
}

impl DataValue {
    /// Numeric view of `Int` and `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Int(i) => Some(*i as f64),
            DataValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Rectangle view.
    pub fn as_rect(&self) -> Option<Rect> {
        match self {
            DataValue::Rect(r) => Some(*r),
            _ => None,
        }
    }

    /// String view.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean view.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for DataValue {
    fn from(v: bool) -> Self {
        DataValue::Bool(v)
    }
}

impl From<i64> for DataValue {
    fn from(v: i64) -> Self {
        DataValue::Int(v)
    }
}

impl From<f64> for DataValue {
    fn from(v: f64) -> Self {
        DataValue::Float(v)
    }
}

impl From<&str> for DataValue {
    fn from(v: &str) -> Self {
        DataValue::Str(v.to_owned())
    }
}

impl From<String> for DataValue {
    fn from(v: String) -> Self {
        DataValue::Str(v)
    }
}

impl From<Rect> for DataValue {
    fn from(v: Rect) -> Self {
        DataValue::Rect(v)
    }
}

impl From<Point> for DataValue {
    fn from(v: Point) -> Self {
        DataValue::Point(v)
    }
}

/// Overlay `top` onto `base`; keys in `top` win.
pub(crate) fn merged(base: &DataDict, top: &DataDict) -> DataDict {
    if top.is_empty() {
        return base.clone();
    }
    let mut out = base.clone();
    for (k, v) in top {
        out.insert(k.clone(), v.clone());
    }
    out
}
