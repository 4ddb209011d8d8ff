use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::ids::NodeId;
use crate::traits::IdSource;

/// The ordered root sequence of a document.
pub type Forest = Vec<Node>;

/// Type tag of a node. Fixed once the node exists.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl Kind {
    pub const ALL: [Kind; 5] = [
        Kind::String,
        Kind::Number,
        Kind::Boolean,
        Kind::Object,
        Kind::Array,
    ];

    pub fn is_container(self) -> bool {
        matches!(self, Kind::Object | Kind::Array)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
            Kind::Object => "object",
            Kind::Array => "array",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a node: the literal for scalars, the ordered children for containers.
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    String(String),
    Number(Number),
    Boolean(bool),
    Object(Vec<Node>),
    Array(Vec<Node>),
}

impl Body {
    /// Default payload for a freshly created node of `kind`.
    pub fn default_for(kind: Kind) -> Self {
        match kind {
            Kind::String => Body::String("...".to_string()),
            Kind::Number => Body::Number(Number::from(0u64)),
            Kind::Boolean => Body::Boolean(true),
            Kind::Object => Body::Object(Vec::new()),
            Kind::Array => Body::Array(Vec::new()),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Body::String(_) => Kind::String,
            Body::Number(_) => Kind::Number,
            Body::Boolean(_) => Kind::Boolean,
            Body::Object(_) => Kind::Object,
            Body::Array(_) => Kind::Array,
        }
    }
}

/// One JSON value in the editable tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// `None` exactly when the node sits directly under an array.
    pub key: Option<String>,
    /// Render hint only; ignored by the codec.
    pub collapsed: bool,
    pub body: Body,
}

impl Node {
    pub fn new(id: NodeId, key: Option<String>, body: Body) -> Self {
        Self {
            id,
            key,
            collapsed: false,
            body,
        }
    }

    pub fn kind(&self) -> Kind {
        self.body.kind()
    }

    pub fn is_container(&self) -> bool {
        self.kind().is_container()
    }

    /// Children in order; always empty for scalars.
    pub fn children(&self) -> &[Node] {
        match &self.body {
            Body::Object(children) | Body::Array(children) => children,
            _ => &[],
        }
    }

    /// Mutable children, or `None` for scalars which can never hold any.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.body {
            Body::Object(children) | Body::Array(children) => Some(children),
            _ => None,
        }
    }

    /// Scalar literal as JSON, `None` for containers.
    pub fn value(&self) -> Option<Value> {
        match &self.body {
            Body::String(s) => Some(Value::String(s.clone())),
            Body::Number(n) => Some(Value::Number(n.clone())),
            Body::Boolean(b) => Some(Value::Bool(*b)),
            Body::Object(_) | Body::Array(_) => None,
        }
    }

    /// Whether `id` names this node or any node below it.
    pub fn contains(&self, id: NodeId) -> bool {
        self.id == id || self.children().iter().any(|child| child.contains(id))
    }

    /// Number of nodes in this subtree, including itself.
    pub fn subtree_len(&self) -> usize {
        1 + self.children().iter().map(Node::subtree_len).sum::<usize>()
    }
}

/// Construct a node with a fresh id and the default payload for `kind`.
pub fn create_node<I: IdSource>(ids: &mut I, kind: Kind, key: Option<String>) -> Node {
    Node::new(ids.next_id(), key, Body::default_for(kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::SequentialIds;

    #[test]
    fn defaults_match_kind() {
        let mut ids = SequentialIds::default();
        let s = create_node(&mut ids, Kind::String, Some("a".into()));
        let n = create_node(&mut ids, Kind::Number, Some("b".into()));
        let b = create_node(&mut ids, Kind::Boolean, Some("c".into()));
        let o = create_node(&mut ids, Kind::Object, Some("d".into()));

        assert_eq!(s.value(), Some(Value::String("...".into())));
        assert_eq!(n.value(), Some(Value::from(0)));
        assert_eq!(b.value(), Some(Value::Bool(true)));
        assert_eq!(o.value(), None);
        assert!(o.children().is_empty());
        assert!(!o.collapsed);
        assert_eq!(
            [s.id, n.id, b.id, o.id],
            [NodeId(1), NodeId(2), NodeId(3), NodeId(4)]
        );
    }

    #[test]
    fn scalars_have_no_children() {
        let mut ids = SequentialIds::default();
        for kind in Kind::ALL {
            let mut node = create_node(&mut ids, kind, None);
            assert_eq!(node.kind(), kind);
            assert_eq!(node.children_mut().is_some(), kind.is_container());
        }
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Kind::Boolean).unwrap(), "\"boolean\"");
        let kind: Kind = serde_json::from_str("\"array\"").unwrap();
        assert_eq!(kind, Kind::Array);
    }
}
