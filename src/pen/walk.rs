use super::data::{DataDict, merged};
use super::{Content, Pen};

/// One drawable leaf reached by [`Pen::leaves`].
#[derive(Clone, Debug)]
pub struct Leaf<'a> {
    /// The value node.
    pub pen: &'a Pen,
    /// Child indices from the walk root down to `pen`.
    pub position: Vec<usize>,
    /// Data of every node from the root to `pen`, closer nodes overriding.
    pub data: DataDict,
}

/// Lazy depth-first leaf iterator; never mutates the tree.
#[derive(Debug)]
pub struct Leaves<'a> {
    stack: Vec<(&'a Pen, Vec<usize>, DataDict)>,
}

impl<'a> Leaves<'a> {
    pub(super) fn new(root: &'a Pen) -> Self {
        Self {
            stack: vec![(root, Vec::new(), root.data.clone())],
        }
    }
}

impl<'a> Iterator for Leaves<'a> {
    type Item = Leaf<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((pen, position, data)) = self.stack.pop() {
            match &pen.content {
                Content::Value(p) if !p.elements().is_empty() => {
                    return Some(Leaf {
                        pen,
                        position,
                        data,
                    });
                }
                Content::Value(_) => {}
                Content::Children(children) => {
                    for (i, child) in children.iter().enumerate().rev() {
                        let mut child_pos = position.clone();
                        child_pos.push(i);
                        self.stack.push((child, child_pos, merged(&data, &child.data)));
                    }
                }
            }
        }
        None
    }
}
