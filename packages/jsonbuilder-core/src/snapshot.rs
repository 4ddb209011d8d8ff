//! Durable encoding of the node graph (ids, kinds, keys, collapse flags), as opposed to the
//! projected JSON document produced by [`crate::codec`].
//!
//! Nodes are stored as a flat pre-order list where each record names its parent, so the
//! encoded text has the same nesting however deep the document is.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::ids::NodeId;
use crate::node::{Body, Forest, Kind, Node};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    nodes: Vec<Record>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Record {
    id: NodeId,
    /// Absent for roots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<NodeId>,
    #[serde(rename = "type")]
    kind: Kind,
    #[serde(default)]
    key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(default)]
    collapsed: bool,
}

/// Nested, serde-friendly form of a node handed to hosts as the render view.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StoredNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: Kind,
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    pub children: Vec<StoredNode>,
    pub collapsed: bool,
}

impl From<&Node> for StoredNode {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id,
            kind: node.kind(),
            key: node.key.clone(),
            value: node.value(),
            children: node.children().iter().map(StoredNode::from).collect(),
            collapsed: node.collapsed,
        }
    }
}

pub fn view(forest: &[Node]) -> Vec<StoredNode> {
    forest.iter().map(StoredNode::from).collect()
}

fn flatten(nodes: &[Node], parent: Option<NodeId>, out: &mut Vec<Record>) {
    for node in nodes {
        out.push(Record {
            id: node.id,
            parent,
            kind: node.kind(),
            key: node.key.clone(),
            value: node.value(),
            collapsed: node.collapsed,
        });
        flatten(node.children(), Some(node.id), out);
    }
}

pub fn encode(forest: &[Node]) -> Result<String> {
    let mut nodes = Vec::new();
    flatten(forest, None, &mut nodes);
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        nodes,
    };
    serde_json::to_string(&snapshot).map_err(|e| Error::Persistence(e.to_string()))
}

fn corrupt(id: NodeId, msg: &str) -> Error {
    Error::CorruptSnapshot(format!("{id}: {msg}"))
}

/// Decode and validate a snapshot. Any structural violation rejects the whole snapshot.
///
/// A parent must appear before its children, which is the order `encode` writes.
pub fn decode(text: &str) -> Result<Forest> {
    let snapshot: Snapshot =
        serde_json::from_str(text).map_err(|e| Error::CorruptSnapshot(e.to_string()))?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(Error::CorruptSnapshot(format!(
            "unsupported version {}",
            snapshot.version
        )));
    }

    let mut kinds: HashMap<NodeId, Kind> = HashMap::with_capacity(snapshot.nodes.len());
    let mut placed = Vec::with_capacity(snapshot.nodes.len());
    for record in snapshot.nodes {
        let id = record.id;
        if id.is_root() {
            return Err(corrupt(id, "reserved id"));
        }
        if kinds.contains_key(&id) {
            return Err(corrupt(id, "duplicate id"));
        }
        let parent_kind = match record.parent {
            None => None,
            Some(parent) => match kinds.get(&parent) {
                Some(kind) if kind.is_container() => Some(*kind),
                Some(_) => return Err(corrupt(id, "parent is a scalar")),
                None => return Err(corrupt(id, "parent not seen before child")),
            },
        };
        match (parent_kind, &record.key) {
            (Some(Kind::Array), Some(_)) => return Err(corrupt(id, "array member carries a key")),
            (None | Some(Kind::Object), None) => return Err(corrupt(id, "missing key")),
            _ => {}
        }

        let body = match (record.kind, record.value) {
            (Kind::String, Some(Value::String(s))) => Body::String(s),
            (Kind::Number, Some(Value::Number(n))) => Body::Number(n),
            (Kind::Boolean, Some(Value::Bool(b))) => Body::Boolean(b),
            (Kind::Object, _) => Body::Object(Vec::new()),
            (Kind::Array, _) => Body::Array(Vec::new()),
            (kind, _) => return Err(corrupt(id, &format!("value does not match {kind}"))),
        };
        kinds.insert(id, record.kind);
        let mut node = Node::new(id, record.key, body);
        node.collapsed = record.collapsed;
        placed.push((record.parent, node));
    }
    Ok(assemble(placed))
}

/// Rebuild nesting from pre-order `(parent, node)` pairs. Walking backwards finishes every
/// subtree before its parent is reached.
fn assemble(placed: Vec<(Option<NodeId>, Node)>) -> Forest {
    let mut pending: HashMap<NodeId, Vec<Node>> = HashMap::new();
    let mut roots = Vec::new();
    for (parent, mut node) in placed.into_iter().rev() {
        if let Some(mut children) = pending.remove(&node.id) {
            children.reverse();
            if let Some(slot) = node.children_mut() {
                *slot = children;
            }
        }
        match parent {
            Some(parent) => pending.entry(parent).or_default().push(node),
            None => roots.push(node),
        }
    }
    roots.reverse();
    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::config::EditorConfig;
    use crate::traits::SequentialIds;
    use serde_json::json;

    #[test]
    fn encode_decode_keeps_graph() {
        let mut forest = codec::import(
            &json!({"a": [1, {"b": "x"}], "c": false}),
            &mut SequentialIds::default(),
            &EditorConfig::default(),
        )
        .unwrap();
        forest[0].collapsed = true;

        let text = encode(&forest).unwrap();
        assert_eq!(decode(&text).unwrap(), forest);
    }

    #[test]
    fn stored_shape_is_flat() {
        let mut list = Node::new(NodeId(3), Some("n".into()), Body::Array(Vec::new()));
        if let Some(children) = list.children_mut() {
            children.push(Node::new(NodeId(4), None, Body::Boolean(true)));
        }
        assert_eq!(
            encode(&[list]).unwrap(),
            r#"{"version":1,"nodes":[{"id":3,"type":"array","key":"n","collapsed":false},{"id":4,"parent":3,"type":"boolean","key":null,"value":true,"collapsed":false}]}"#
        );
    }

    #[test]
    fn deep_nesting_survives() {
        let mut node = Node::new(NodeId(1), None, Body::Number(1u64.into()));
        for id in 2..=300 {
            node = Node::new(NodeId(id), None, Body::Array(vec![node]));
        }
        node.key = Some("deep".into());
        let forest = vec![node];

        let text = encode(&forest).unwrap();
        assert_eq!(decode(&text).unwrap(), forest);
    }

    #[test]
    fn sibling_order_is_kept() {
        let forest = codec::import(
            &json!({"z": [3, 2, 1], "a": {"y": 1, "b": 2}, "m": "s"}),
            &mut SequentialIds::default(),
            &EditorConfig::default(),
        )
        .unwrap();
        let restored = decode(&encode(&forest).unwrap()).unwrap();
        assert_eq!(
            codec::build(&restored).to_string(),
            r#"{"z":[3,2,1],"a":{"y":1,"b":2},"m":"s"}"#
        );
    }

    #[test]
    fn container_values_are_ignored() {
        let text = r#"{"version":1,"nodes":[{"id":1,"type":"object","key":"o","value":""}]}"#;
        let forest = decode(text).unwrap();
        assert_eq!(forest[0].kind(), Kind::Object);
    }

    #[test]
    fn rejects_invariant_violations() {
        let cases = [
            r#"{"version":2,"nodes":[]}"#,
            r#"{"version":1,"nodes":[{"id":0,"type":"boolean","key":"a","value":true}]}"#,
            r#"{"version":1,"nodes":[{"id":1,"type":"boolean","key":"a","value":true},{"id":1,"type":"boolean","key":"b","value":true}]}"#,
            r#"{"version":1,"nodes":[{"id":1,"type":"boolean","key":null,"value":true}]}"#,
            r#"{"version":1,"nodes":[{"id":1,"type":"array","key":"a"},{"id":2,"parent":1,"type":"number","key":"k","value":1}]}"#,
            r#"{"version":1,"nodes":[{"id":1,"type":"object","key":"a"},{"id":2,"parent":1,"type":"number","value":1}]}"#,
            r#"{"version":1,"nodes":[{"id":1,"type":"number","key":"a","value":"1"}]}"#,
            r#"{"version":1,"nodes":[{"id":1,"type":"string","key":"a","value":"s"},{"id":2,"parent":1,"type":"number","key":"k","value":1}]}"#,
            r#"{"version":1,"nodes":[{"id":2,"parent":1,"type":"number","key":"k","value":1},{"id":1,"type":"object","key":"a"}]}"#,
            r#"not json"#,
        ];
        for text in cases {
            assert!(
                matches!(decode(text), Err(Error::CorruptSnapshot(_))),
                "accepted: {text}"
            );
        }
    }
}
