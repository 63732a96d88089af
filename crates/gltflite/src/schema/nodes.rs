use alloc::vec::Vec;

use log::warn;

use super::{Gltf, Index};

/// One entry of [`Gltf::sorted_nodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeOrder {
    /// Position of the parent within the sorted list; `None` for roots.
    pub parent: Option<u32>,
    /// Index of the node in [`Gltf::nodes`].
    pub old_index: Index,
    /// Number of children placed in the sorted list.
    pub child_count: u32,
    /// Position of the first child within the sorted list.
    pub children_start: u32,
}

impl Gltf {
    /// Orders nodes breadth-first, roots first, so every parent precedes its
    /// children and siblings are contiguous.
    ///
    /// Roots are nodes that no other node lists as a child. Child indices that
    /// are out of range, or that would visit a node a second time, are skipped
    /// so a malformed hierarchy cannot loop.
    #[must_use]
    pub fn sorted_nodes(&self) -> Vec<NodeOrder> {
        let n = self.nodes.len();
        let mut is_child = alloc::vec![false; n];
        for node in &self.nodes {
            for &c in &node.children {
                if let Some(flag) = is_child.get_mut(c as usize) {
                    *flag = true;
                }
            }
        }

        let mut visited = alloc::vec![false; n];
        let mut out: Vec<NodeOrder> = Vec::with_capacity(n);
        for (i, &child) in is_child.iter().enumerate() {
            if !child {
                visited[i] = true;
                out.push(NodeOrder {
                    parent: None,
                    old_index: to_u32(i),
                    child_count: 0,
                    children_start: 0,
                });
            }
        }

        let mut i = 0;
        while i < out.len() {
            let start = to_u32(out.len());
            let children = self
                .nodes
                .get(out[i].old_index as usize)
                .map_or(&[][..], |node| &node.children[..]);
            for &c in children {
                match visited.get_mut(c as usize) {
                    Some(seen) if !*seen => {
                        *seen = true;
                        out.push(NodeOrder {
                            parent: Some(to_u32(i)),
                            old_index: c,
                            child_count: 0,
                            children_start: 0,
                        });
                    }
                    _ => warn!("node {} has an invalid or repeated child {c}", out[i].old_index),
                }
            }
            out[i].children_start = start;
            out[i].child_count = to_u32(out.len()) - start;
            i += 1;
        }
        if out.len() < n {
            warn!("{} nodes sit on cycles and were left out", n - out.len());
        }
        out
    }
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
