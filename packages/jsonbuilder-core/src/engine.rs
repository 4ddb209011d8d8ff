//! Structural edits on a forest.
//!
//! All operations take the forest explicitly and leave it untouched when they fail.
//! Notifying render/persistence hooks is the caller's job (see [`crate::session`]).

use serde_json::Number;

use crate::config::EditorConfig;
use crate::error::{Error, Result};
use crate::ids::NodeId;
use crate::locate::{self, Path};
use crate::node::{create_node, Body, Forest, Kind, Node};
use crate::traits::IdSource;

/// What a drag gesture carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dragged {
    /// A palette primitive; a node of this kind is created on drop.
    New(Kind),
    /// A node already in the forest.
    Existing(NodeId),
}

/// A node that could not be attached, handed back so it is never silently lost.
#[derive(Debug, Clone, PartialEq)]
pub struct Unattached {
    pub node: Node,
    pub reason: Error,
}

/// Remove a node (with its subtree) from wherever it sits.
pub fn detach(forest: &mut Forest, id: NodeId) -> Result<Node> {
    let path = locate::path_of(forest, id).ok_or(Error::NotFound(id))?;
    locate::take_at(forest, &path).ok_or(Error::NotFound(id))
}

/// First `<prefix><n>` with `n` counting up from the root count that no root already uses.
pub fn fresh_root_key(forest: &[Node], config: &EditorConfig) -> String {
    let mut n = forest.len();
    loop {
        let key = config.root_placeholder(n);
        if !forest.iter().any(|root| root.key.as_deref() == Some(key.as_str())) {
            return key;
        }
        n += 1;
    }
}

/// Append `node` to the root sequence.
///
/// An existing key is kept as-is; a node arriving without one (e.g. a former array member)
/// gets a fresh root placeholder so every root stays keyed.
pub fn attach_as_root(forest: &mut Forest, mut node: Node, config: &EditorConfig) -> NodeId {
    if node.key.is_none() {
        node.key = Some(fresh_root_key(forest, config));
    }
    let id = node.id;
    forest.push(node);
    id
}

/// Append `node` to the children of `parent`, rewriting its key for the parent's kind.
pub fn attach_as_child(
    forest: &mut Forest,
    parent: NodeId,
    mut node: Node,
    config: &EditorConfig,
) -> std::result::Result<NodeId, Unattached> {
    let Some(target) = locate::find_by_id_mut(forest, parent) else {
        return Err(Unattached {
            node,
            reason: Error::NotFound(parent),
        });
    };
    let kind = target.kind();
    let Some(children) = target.children_mut() else {
        return Err(Unattached {
            node,
            reason: Error::InvalidContainer(parent),
        });
    };
    match kind {
        Kind::Array => node.key = None,
        _ => {
            if node.key.is_none() {
                node.key = Some(config.child_key.clone());
            }
        }
    }
    let id = node.id;
    children.push(node);
    Ok(id)
}

/// Drop `dragged` onto `target` (`NodeId::ROOT` for the canvas).
///
/// Every check runs before anything is detached, so a rejected drop leaves the forest
/// exactly as it was.
pub fn reparent<I: IdSource>(
    forest: &mut Forest,
    dragged: Dragged,
    target: NodeId,
    ids: &mut I,
    config: &EditorConfig,
) -> Result<NodeId> {
    if !target.is_root() {
        let parent = locate::find_by_id(forest, target).ok_or(Error::NotFound(target))?;
        if !parent.is_container() {
            return Err(Error::InvalidContainer(target));
        }
    }

    let (node, origin) = match dragged {
        Dragged::New(kind) => {
            let key = if target.is_root() {
                fresh_root_key(forest, config)
            } else {
                config.child_key.clone()
            };
            (create_node(ids, kind, Some(key)), None)
        }
        Dragged::Existing(id) => {
            let path = locate::path_of(forest, id).ok_or(Error::NotFound(id))?;
            let moving = locate::node_at(forest, &path).ok_or(Error::NotFound(id))?;
            if moving.contains(target) {
                return Err(Error::CyclicMove { node: id, target });
            }
            let node = locate::take_at(forest, &path).ok_or(Error::NotFound(id))?;
            (node, Some(path))
        }
    };

    if target.is_root() {
        return Ok(attach_as_root(forest, node, config));
    }
    match attach_as_child(forest, target, node, config) {
        Ok(id) => Ok(id),
        Err(Unattached { node, reason }) => {
            if let Some(path) = origin {
                restore(forest, &path, node);
            }
            Err(reason)
        }
    }
}

/// Put a detached node back at the path it was taken from.
fn restore(forest: &mut Forest, path: &Path, node: Node) {
    let Some((&last, parents)) = path.split_last() else {
        return;
    };
    if parents.is_empty() {
        let idx = last.min(forest.len());
        forest.insert(idx, node);
        return;
    }
    match locate::node_at_mut(forest, parents).and_then(Node::children_mut) {
        Some(siblings) => {
            let idx = last.min(siblings.len());
            siblings.insert(idx, node);
        }
        None => forest.push(node),
    }
}

/// Flip the collapsed flag; returns the new state.
pub fn toggle_collapse(forest: &mut Forest, id: NodeId) -> Result<bool> {
    let node = locate::find_by_id_mut(forest, id).ok_or(Error::NotFound(id))?;
    node.collapsed = !node.collapsed;
    Ok(node.collapsed)
}

/// Delete a node and its subtree; returns how many nodes went away.
pub fn remove(forest: &mut Forest, id: NodeId) -> Result<usize> {
    detach(forest, id).map(|node| node.subtree_len())
}

/// Rename a keyed node. Array members carry no key and are rejected.
pub fn set_key(forest: &mut Forest, id: NodeId, key: impl Into<String>) -> Result<()> {
    let path = locate::path_of(forest, id).ok_or(Error::NotFound(id))?;
    if locate::parent_kind(forest, &path) == Some(Kind::Array) {
        return Err(Error::UnkeyedMember(id));
    }
    let node = locate::node_at_mut(forest, &path).ok_or(Error::NotFound(id))?;
    node.key = Some(key.into());
    Ok(())
}

/// Replace a scalar's literal from its text representation.
///
/// Input that cannot be read as the node's kind is rejected and the old value kept.
pub fn set_value(node: &mut Node, raw: &str) -> Result<()> {
    let invalid = || Error::InvalidValue {
        kind: node.kind(),
        input: raw.to_string(),
    };
    let body = match node.kind() {
        Kind::String => Body::String(raw.to_string()),
        Kind::Number => Body::Number(parse_number(raw).ok_or_else(invalid)?),
        Kind::Boolean => Body::Boolean(parse_bool(raw).ok_or_else(invalid)?),
        Kind::Object | Kind::Array => return Err(invalid()),
    };
    node.body = body;
    Ok(())
}

fn parse_number(raw: &str) -> Option<Number> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<Number>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().and_then(Number::from_f64))
}

fn parse_bool(raw: &str) -> Option<bool> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
