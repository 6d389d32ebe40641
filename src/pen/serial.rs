//! JSON persistence of pen trees.
//!
//! A pen serialises to a nested object:
//!
//! ```json
//! { "value": [["moveTo", [[0, 0]]], ["lineTo", [[10, 0]]], ["closePath", []]],
//!   "attrs": [{"layer": "_default", "attr": {"attr": "fill", "fill": "#ff0000"}}],
//!   "data": {"frame": {"kind": "rect", "value": {...}}},
//!   "tag": "title" }
//! ```
//!
//! Groups use `"els": [...]` instead of `"value"`. Supplying both is rejected.

use super::attrs::StyleStack;
use super::data::DataDict;
use super::{Content, Pen};
use crate::foundation::core::{BezPath, PathEl, Point};
use crate::foundation::error::{RunonError, RunonResult};
use serde::{Deserialize, Serialize};

/// One recorded command: name plus its points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommandDef(pub String, pub Vec<[f64; 2]>);

/// Plain representation of a [`Pen`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PenDef {
    /// Path commands of a value node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Vec<CommandDef>>,
    /// Children of a group node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub els: Option<Vec<PenDef>>,
    /// Style patches.
    #[serde(default, skip_serializing_if = "StyleStack::is_empty")]
    pub attrs: StyleStack,
    /// Metadata.
    #[serde(default, skip_serializing_if = "DataDict::is_empty")]
    pub data: DataDict,
    /// Lookup tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

fn pt(p: Point) -> [f64; 2] {
    [p.x, p.y]
}

fn command(el: &PathEl) -> CommandDef {
    let (name, pts) = match *el {
        PathEl::MoveTo(p) => ("moveTo", vec![pt(p)]),
        PathEl::LineTo(p) => ("lineTo", vec![pt(p)]),
        PathEl::QuadTo(c, p) => ("qCurveTo", vec![pt(c), pt(p)]),
        PathEl::CurveTo(c1, c2, p) => ("curveTo", vec![pt(c1), pt(c2), pt(p)]),
        PathEl::ClosePath => ("closePath", vec![]),
    };
    CommandDef(name.to_owned(), pts)
}

fn path_from_commands(cmds: &[CommandDef]) -> RunonResult<BezPath> {
    let mut path = BezPath::new();
    for CommandDef(name, pts) in cmds {
        let p = |i: usize| Point::new(pts[i][0], pts[i][1]);
        let expect = |n: usize| -> RunonResult<()> {
            if pts.len() == n {
                Ok(())
            } else {
                Err(RunonError::serde(format!(
                    "'{name}' takes {n} points, got {}",
                    pts.len()
                )))
            }
        };
        match name.as_str() {
            "moveTo" => {
                expect(1)?;
                path.move_to(p(0));
            }
            "lineTo" => {
                expect(1)?;
                path.line_to(p(0));
            }
            "qCurveTo" => {
                expect(2)?;
                path.quad_to(p(0), p(1));
            }
            "curveTo" => {
                expect(3)?;
                path.curve_to(p(0), p(1), p(2));
            }
            "closePath" | "endPath" => {
                expect(0)?;
                if name == "closePath" {
                    path.close_path();
                }
            }
            other => {
                return Err(RunonError::serde(format!("unknown path command '{other}'")));
            }
        }
    }
    Ok(path)
}

impl From<&Pen> for PenDef {
    fn from(pen: &Pen) -> Self {
        let (value, els) = match &pen.content {
            Content::Value(p) => (Some(p.elements().iter().map(command).collect()), None),
            Content::Children(c) => (None, Some(c.iter().map(PenDef::from).collect())),
        };
        PenDef {
            value,
            els,
            attrs: pen.attrs.clone(),
            data: pen.data.clone(),
            tag: pen.tag.clone(),
        }
    }
}

impl From<Pen> for PenDef {
    fn from(pen: Pen) -> Self {
        PenDef::from(&pen)
    }
}

impl TryFrom<PenDef> for Pen {
    type Error = RunonError;

    fn try_from(def: PenDef) -> RunonResult<Self> {
        let content = match (def.value, def.els) {
            (Some(v), Some(e)) if !v.is_empty() && !e.is_empty() => {
                return Err(RunonError::validation(
                    "pen definition has both path commands and children",
                ));
            }
            (Some(v), _) if !v.is_empty() => Content::Value(path_from_commands(&v)?),
            (_, Some(e)) => Content::Children(
                e.into_iter()
                    .map(Pen::try_from)
                    .collect::<RunonResult<Vec<_>>>()?,
            ),
            (Some(_), None) => Content::Value(BezPath::new()),
            (None, None) => Content::default(),
        };
        Ok(Pen {
            content,
            attrs: def.attrs,
            data: def.data,
            tag: def.tag,
        })
    }
}

impl Serialize for Pen {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PenDef::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Pen {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let def = PenDef::deserialize(deserializer)?;
        Pen::try_from(def).map_err(serde::de::Error::custom)
    }
}

impl Pen {
    /// Serialise to a JSON string.
    pub fn to_json(&self) -> RunonResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialise to an indented JSON string.
    pub fn to_json_pretty(&self) -> RunonResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a pen tree from JSON.
    pub fn from_json(s: &str) -> RunonResult<Pen> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pen/serial.rs"]
mod tests;
