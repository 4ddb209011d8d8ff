//! Mapping between the node forest and plain JSON values.

use serde_json::{Map, Value};

use crate::config::EditorConfig;
use crate::error::{Error, Result};
use crate::node::{Body, Forest, Node};
use crate::traits::IdSource;

pub const EXPORT_MIME: &str = "application/json";

/// Downloadable rendition of a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Export {
    pub file_name: String,
    pub mime: &'static str,
    pub contents: String,
}

/// Project the forest to JSON. Roots become the entries of one top-level object.
pub fn build(forest: &[Node]) -> Value {
    Value::Object(build_entries(forest))
}

/// Project a single subtree.
pub fn build_node(node: &Node) -> Value {
    match &node.body {
        Body::String(s) => Value::String(s.clone()),
        Body::Number(n) => Value::Number(n.clone()),
        Body::Boolean(b) => Value::Bool(*b),
        Body::Object(children) => Value::Object(build_entries(children)),
        Body::Array(children) => Value::Array(children.iter().map(build_node).collect()),
    }
}

fn build_entries(nodes: &[Node]) -> Map<String, Value> {
    let mut map = Map::new();
    for node in nodes {
        map.insert(node.key.clone().unwrap_or_default(), build_node(node));
    }
    map
}

/// Pretty-printed (two-space) export of the current document.
pub fn export(forest: &[Node], config: &EditorConfig) -> Export {
    Export {
        file_name: config.export_file_name.clone(),
        mime: EXPORT_MIME,
        contents: format!("{:#}", build(forest)),
    }
}

/// Turn a JSON document into a fresh forest.
///
/// A top-level object yields one root per entry. A top-level array yields a single root
/// array keyed `config.array_root_key`. Anything else, and `null` anywhere, is rejected.
pub fn import<I: IdSource>(value: &Value, ids: &mut I, config: &EditorConfig) -> Result<Forest> {
    let mut pointer = Vec::new();
    match value {
        Value::Object(map) => import_entries(map, ids, &mut pointer),
        Value::Array(_) => Ok(vec![import_value(
            Some(config.array_root_key.clone()),
            value,
            ids,
            &mut pointer,
        )?]),
        other => Err(Error::MalformedImport(format!(
            "top-level value must be an object or an array, found {}",
            type_name(other)
        ))),
    }
}

/// Decode raw file contents (UTF-8 JSON) and import them.
pub fn import_bytes<I: IdSource>(bytes: &[u8], ids: &mut I, config: &EditorConfig) -> Result<Forest> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::MalformedImport(format!("file is not UTF-8: {e}")))?;
    let value: Value =
        serde_json::from_str(text).map_err(|e| Error::MalformedImport(e.to_string()))?;
    import(&value, ids, config)
}

fn import_entries<I: IdSource>(
    map: &Map<String, Value>,
    ids: &mut I,
    pointer: &mut Vec<String>,
) -> Result<Vec<Node>> {
    map.iter()
        .map(|(key, value)| {
            pointer.push(key.clone());
            let node = import_value(Some(key.clone()), value, ids, pointer);
            pointer.pop();
            node
        })
        .collect()
}

fn import_value<I: IdSource>(
    key: Option<String>,
    value: &Value,
    ids: &mut I,
    pointer: &mut Vec<String>,
) -> Result<Node> {
    let body = match value {
        Value::Null => {
            return Err(Error::MalformedImport(format!(
                "null is not supported (at /{})",
                pointer.join("/")
            )))
        }
        Value::Bool(b) => Body::Boolean(*b),
        Value::Number(n) => Body::Number(n.clone()),
        Value::String(s) => Body::String(s.clone()),
        Value::Object(map) => Body::Object(import_entries(map, ids, pointer)?),
        Value::Array(items) => {
            let mut children = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                pointer.push(idx.to_string());
                let child = import_value(None, item, ids, pointer);
                pointer.pop();
                children.push(child?);
            }
            Body::Array(children)
        }
    };
    Ok(Node::new(ids.next_id(), key, body))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
