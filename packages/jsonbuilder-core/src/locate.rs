//! Identity lookup over the forest.
//!
//! Every lookup, removal, and in-place edit goes through one depth-first pre-order walk
//! that yields the index path of the first matching node. Callers then read, mutate, or
//! take the node at that path without walking again.

use crate::ids::NodeId;
use crate::node::{Kind, Node};

/// Index path from the root sequence down to a node: `[root_idx, child_idx, ...]`.
pub type Path = Vec<usize>;

/// Pre-order search for the first node satisfying `pred`.
pub fn position(forest: &[Node], mut pred: impl FnMut(&Node) -> bool) -> Option<Path> {
    let mut path = Vec::new();
    if walk(forest, &mut pred, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn walk(nodes: &[Node], pred: &mut dyn FnMut(&Node) -> bool, path: &mut Path) -> bool {
    for (idx, node) in nodes.iter().enumerate() {
        path.push(idx);
        if pred(node) || walk(node.children(), pred, path) {
            return true;
        }
        path.pop();
    }
    false
}

pub fn path_of(forest: &[Node], id: NodeId) -> Option<Path> {
    position(forest, |node| node.id == id)
}

pub fn node_at<'a>(forest: &'a [Node], path: &[usize]) -> Option<&'a Node> {
    let (first, rest) = path.split_first()?;
    let mut node = forest.get(*first)?;
    for &idx in rest {
        node = node.children().get(idx)?;
    }
    Some(node)
}

pub fn node_at_mut<'a>(forest: &'a mut [Node], path: &[usize]) -> Option<&'a mut Node> {
    let (first, rest) = path.split_first()?;
    let mut node = forest.get_mut(*first)?;
    for &idx in rest {
        node = node.children_mut()?.get_mut(idx)?;
    }
    Some(node)
}

/// Remove the node at `path` from whichever sequence holds it, subtree intact.
pub fn take_at(forest: &mut Vec<Node>, path: &[usize]) -> Option<Node> {
    let (&last, parents) = path.split_last()?;
    let siblings = if parents.is_empty() {
        forest
    } else {
        node_at_mut(forest, parents)?.children_mut()?
    };
    if last < siblings.len() {
        Some(siblings.remove(last))
    } else {
        None
    }
}

/// Kind of the node holding the node at `path`; `None` for forest roots.
pub fn parent_kind(forest: &[Node], path: &[usize]) -> Option<Kind> {
    match path.split_last() {
        Some((_, parents)) if !parents.is_empty() => node_at(forest, parents).map(Node::kind),
        _ => None,
    }
}

pub fn find_by_id(forest: &[Node], id: NodeId) -> Option<&Node> {
    let path = path_of(forest, id)?;
    node_at(forest, &path)
}

pub fn find_by_id_mut(forest: &mut [Node], id: NodeId) -> Option<&mut Node> {
    let path = path_of(forest, id)?;
    node_at_mut(forest, &path)
}

/// Pre-order visit of every node together with its parent's kind (`None` at the root).
pub fn for_each(forest: &[Node], mut f: impl FnMut(&Node, Option<Kind>)) {
    fn visit(nodes: &[Node], parent: Option<Kind>, f: &mut dyn FnMut(&Node, Option<Kind>)) {
        for node in nodes {
            f(node, parent);
            visit(node.children(), Some(node.kind()), f);
        }
    }
    visit(forest, None, &mut f);
}
