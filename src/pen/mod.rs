//! The pen tree.
//!
//! A [`Pen`] is either a *value node* holding one [`BezPath`] or a *group node* holding ordered
//! children. Each node owns its children outright; reusing a subtree elsewhere requires an
//! explicit [`Pen::copy`]. Capability modules (`styling`, `layout`, `pathops`, `segmenting`,
//! `serial`, `glyph`, `fx`) add behaviour to the same type.

use crate::foundation::core::{BezPath, PathEl, Rect};
use crate::foundation::error::{RunonError, RunonResult};
use kurbo::Shape;
use std::fmt;

/// Layered style attributes.
pub mod attrs;
/// Keyed metadata.
pub mod data;
/// Primitive shape builders.
pub mod drawing;
/// Chainable effects.
pub mod fx;
/// Typography accessors.
pub mod glyph;
/// Alignment, transforms and stacking.
pub mod layout;
/// Boolean operations, outlines and flattening.
pub mod pathops;
/// Contour-level access and arc-length queries.
pub mod segmenting;
/// JSON persistence.
pub mod serial;
/// Foreign path ingestion.
pub mod source;
/// Chainable style setters.
pub mod styling;
mod walk;

pub use attrs::{Attr, ResolvedStyle, StyleStack};
pub use data::{DataDict, DataValue};
pub use walk::{Leaf, Leaves};

/// Exactly one of path content or children.
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    /// Recorded path commands.
    Value(BezPath),
    /// Ordered children; order is paint order.
    Children(Vec<Pen>),
}

impl Default for Content {
    fn default() -> Self {
        Content::Children(Vec::new())
    }
}

/// A node of the pen tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pen {
    content: Content,
    attrs: StyleStack,
    data: DataDict,
    tag: Option<String>,
}

impl Pen {
    /// Empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value node holding `path`.
    pub fn from_path(path: BezPath) -> Self {
        Self {
            content: Content::Value(path),
            ..Self::default()
        }
    }

    /// Value node holding a closed rectangle.
    pub fn from_rect(rect: Rect) -> Self {
        Self::from_path(drawing::rect_path(rect))
    }

    /// Group node owning `children`.
    pub fn group(children: impl IntoIterator<Item = Pen>) -> Self {
        Self {
            content: Content::Children(children.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Content of this node.
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Path of a value node.
    pub fn value(&self) -> Option<&BezPath> {
        match &self.content {
            Content::Value(p) => Some(p),
            Content::Children(_) => None,
        }
    }

    /// Mutable path, turning an empty group into a value node first.
    pub fn value_mut(&mut self) -> RunonResult<&mut BezPath> {
        if let Content::Children(children) = &self.content {
            if !children.is_empty() {
                return Err(RunonError::validation(format!(
                    "cannot draw into a group of {} pens; collapse it first",
                    children.len()
                )));
            }
            self.content = Content::Value(BezPath::new());
        }
        match &mut self.content {
            Content::Value(p) => Ok(p),
            Content::Children(_) => Err(RunonError::validation("pen has no path value")),
        }
    }

    /// Children of a group node (empty for value nodes).
    pub fn children(&self) -> &[Pen] {
        match &self.content {
            Content::Children(c) => c,
            Content::Value(_) => &[],
        }
    }

    /// Mutable children of a group node (empty for value nodes).
    pub fn children_mut(&mut self) -> &mut [Pen] {
        match &mut self.content {
            Content::Children(c) => c,
            Content::Value(_) => &mut [],
        }
    }

    /// `true` when the node holds at least one path command.
    pub fn val_present(&self) -> bool {
        matches!(&self.content, Content::Value(p) if !p.elements().is_empty())
    }

    /// `true` for a group node, including the empty pen.
    pub fn is_group(&self) -> bool {
        matches!(self.content, Content::Children(_))
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children().len()
    }

    /// `true` when the pen holds neither commands nor children.
    pub fn is_empty(&self) -> bool {
        match &self.content {
            Content::Value(p) => p.elements().is_empty(),
            Content::Children(c) => c.is_empty(),
        }
    }

    /// Style attribute stack.
    pub fn attrs(&self) -> &StyleStack {
        &self.attrs
    }

    /// Mutable style attribute stack of this node only.
    pub fn attrs_mut(&mut self) -> &mut StyleStack {
        &mut self.attrs
    }

    /// Resolve the named style (falling back to the default layer).
    pub fn style(&self, style: Option<&str>) -> ResolvedStyle {
        self.attrs.resolve(style)
    }

    /// Metadata of this node.
    pub fn data(&self) -> &DataDict {
        &self.data
    }

    /// Mutable metadata of this node.
    pub fn data_mut(&mut self) -> &mut DataDict {
        &mut self.data
    }

    /// Metadata value for `key`.
    pub fn data_get(&self, key: &str) -> Option<&DataValue> {
        self.data.get(key)
    }

    /// Set one metadata value.
    pub fn set_data(&mut self, key: &str, value: impl Into<DataValue>) -> &mut Self {
        self.data.insert(key.to_owned(), value.into());
        self
    }

    /// Chainable [`Pen::set_data`].
    pub fn with_data(mut self, key: &str, value: impl Into<DataValue>) -> Self {
        self.set_data(key, value);
        self
    }

    /// Lookup tag.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Chainable tag setter.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Recorded frame rectangle, if any.
    pub fn frame(&self) -> Option<Rect> {
        self.data.get(data::keys::FRAME).and_then(DataValue::as_rect)
    }

    /// Append `child` at the end of the children.
    ///
    /// An empty value node becomes a group; a node with path commands is rejected.
    pub fn append(&mut self, child: Pen) -> RunonResult<&mut Self> {
        self.ensure_group()?.push(child);
        Ok(self)
    }

    /// Append every pen of `children`.
    pub fn extend(&mut self, children: impl IntoIterator<Item = Pen>) -> RunonResult<&mut Self> {
        self.ensure_group()?.extend(children);
        Ok(self)
    }

    /// Insert `child` at `index` (clamped to the end).
    pub fn insert(&mut self, index: usize, child: Pen) -> RunonResult<&mut Self> {
        let children = self.ensure_group()?;
        let index = index.min(children.len());
        children.insert(index, child);
        Ok(self)
    }

    /// Remove and return the child at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Pen> {
        match &mut self.content {
            Content::Children(c) if index < c.len() => Some(c.remove(index)),
            _ => None,
        }
    }

    /// Drop all content; the node becomes an empty group.
    pub fn reset(&mut self) -> &mut Self {
        self.content = Content::default();
        self
    }

    fn ensure_group(&mut self) -> RunonResult<&mut Vec<Pen>> {
        if let Content::Value(p) = &self.content {
            let n = p.elements().len();
            if n > 0 {
                return Err(RunonError::MixedContent(n));
            }
            self.content = Content::default();
        }
        match &mut self.content {
            Content::Children(c) => Ok(c),
            Content::Value(_) => Err(RunonError::MixedContent(0)),
        }
    }

    /// Merge every descendant path into this node's own value.
    ///
    /// Paths are replayed in tree order. The result keeps this node's attributes layered over
    /// those of the first leaf and records the pre-collapse ambit under the `frame` key. A
    /// childless node is left untouched.
    pub fn collapse(&mut self) -> &mut Self {
        if !self.is_group() || self.is_empty() {
            return self;
        }
        let frame = self.ambit().ok();
        let mut merged = BezPath::new();
        let mut first_attrs: Option<StyleStack> = None;
        for leaf in self.leaves() {
            if first_attrs.is_none() {
                first_attrs = Some(leaf.pen.attrs.clone());
            }
            if let Some(p) = leaf.pen.value() {
                for el in p.elements() {
                    merged.push(*el);
                }
            }
        }
        if let Some(first) = first_attrs {
            self.attrs = first.layered_under(&self.attrs);
        }
        if let Some(frame) = frame {
            self.data
                .insert(data::keys::FRAME.to_owned(), DataValue::Rect(frame));
        }
        self.content = Content::Value(merged);
        self
    }

    /// Chainable [`Pen::collapse`].
    pub fn collapsed(mut self) -> Self {
        self.collapse();
        self
    }

    /// Reverse winding (value node) or child order (group node).
    ///
    /// On a value node the last contour is closed if it was left open, then every contour is
    /// traced backwards from its own start point. On a group node the children are reordered;
    /// with `recursive` every descendant group is reordered and every descendant path reversed.
    pub fn reverse(&mut self, recursive: bool) -> &mut Self {
        match &mut self.content {
            Content::Value(p) if !p.elements().is_empty() => {
                if !matches!(p.elements().last(), Some(PathEl::ClosePath)) {
                    p.close_path();
                }
                *p = segmenting::reverse_path(p);
            }
            Content::Value(_) => {}
            Content::Children(c) => {
                c.reverse();
                if recursive {
                    for child in c.iter_mut() {
                        child.reverse(true);
                    }
                }
            }
        }
        self
    }

    /// Independent deep copy of the node, its subtree, attributes and data.
    pub fn copy(&self) -> Pen {
        self.clone()
    }

    /// Lazy depth-first traversal of every drawable leaf.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves::new(self)
    }

    /// Visit every drawable leaf in tree order.
    pub fn walk(&self, mut visitor: impl FnMut(&Leaf<'_>)) {
        for leaf in self.leaves() {
            visitor(&leaf);
        }
    }

    /// Bounding rectangle of all geometry.
    pub fn ambit(&self) -> RunonResult<Rect> {
        match &self.content {
            Content::Value(p) if !p.elements().is_empty() => Ok(p.bounding_box()),
            Content::Value(_) => Err(RunonError::NoGeometry("ambit of an empty path")),
            Content::Children(c) => c
                .iter()
                .filter_map(|child| child.ambit().ok())
                .reduce(|a, b| a.union(b))
                .ok_or(RunonError::NoGeometry("ambit of a pen without geometry")),
        }
    }

    /// Descendant at `path` (child indices from this node).
    pub fn index(&self, path: &[usize]) -> Option<&Pen> {
        path.iter()
            .try_fold(self, |pen, &i| pen.children().get(i))
    }

    /// Mutable descendant at `path`.
    pub fn index_mut(&mut self, path: &[usize]) -> Option<&mut Pen> {
        let mut pen = self;
        for &i in path {
            pen = pen.children_mut().get_mut(i)?;
        }
        Some(pen)
    }

    /// First node (depth-first, self included) carrying `tag`.
    pub fn find(&self, tag: &str) -> Option<&Pen> {
        if self.tag() == Some(tag) {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(tag))
    }

    /// Every node (depth-first, self included) carrying `tag`.
    pub fn find_all(&self, tag: &str) -> Vec<&Pen> {
        let mut out = Vec::new();
        self.collect_tagged(tag, &mut out);
        out
    }

    fn collect_tagged<'a>(&'a self, tag: &str, out: &mut Vec<&'a Pen>) {
        if self.tag() == Some(tag) {
            out.push(self);
        }
        for c in self.children() {
            c.collect_tagged(tag, out);
        }
    }

    /// Replace each direct child with `f(index, child)`.
    pub fn map_children(mut self, mut f: impl FnMut(usize, Pen) -> Pen) -> Self {
        if let Content::Children(c) = &mut self.content {
            let taken = std::mem::take(c);
            *c = taken.into_iter().enumerate().map(|(i, p)| f(i, p)).collect();
        }
        self
    }

    /// Keep the direct children for which `keep(index, child)` holds.
    pub fn filter_children(mut self, mut keep: impl FnMut(usize, &Pen) -> bool) -> Self {
        if let Content::Children(c) = &mut self.content {
            let taken = std::mem::take(c);
            *c = taken
                .into_iter()
                .enumerate()
                .filter(|(i, p)| keep(*i, p))
                .map(|(_, p)| p)
                .collect();
        }
        self
    }
}

impl fmt::Display for Pen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tag) = &self.tag {
            write!(f, "{tag}:")?;
        }
        match &self.content {
            Content::Value(p) => write!(f, "{}mvs", p.elements().len()),
            Content::Children(c) => {
                f.write_str("[")?;
                for (i, child) in c.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str("]")
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pen/mod.rs"]
mod tests;
