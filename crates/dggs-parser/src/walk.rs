//! Depth-first discovery of data cells.

use cube_common::{CubeError, CubeResult};

use crate::node::GridNode;

/// Lazy depth-first traversal of a group hierarchy using an explicit
/// worklist, so traversal depth is not bounded by the call stack.
///
/// Yields every node holding a "data" member; such a node must also hold a
/// "pixel" member or the traversal fails. Child groups are pushed
/// regardless of whether the node itself is a data cell. Yield order is
/// last-pushed-first-popped and carries no meaning for the (unordered)
/// target store.
pub struct CellWalk<N: GridNode> {
    stack: Vec<N>,
}

impl<N: GridNode> CellWalk<N> {
    pub fn new(root: N) -> Self {
        Self { stack: vec![root] }
    }
}

impl<N: GridNode> Iterator for CellWalk<N> {
    type Item = CubeResult<N>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node.children() {
                Ok(children) => self.stack.extend(children),
                Err(e) => return Some(Err(e)),
            }

            if node.has_member("data") {
                if !node.has_member("pixel") {
                    return Some(Err(CubeError::MalformedInput(format!(
                        "group {:?} has a `data` member but no `pixel` member",
                        node.address()
                    ))));
                }
                return Some(Ok(node));
            }
        }
        None
    }
}
