#![forbid(unsafe_code)]
//! WASM-friendly bridge for the JSON builder.
//! The page hands in a host object that draws the tree and stores snapshots; everything
//! else (ids, drops, edits, import/export) runs in the core session.

use jsonbuilder_core::snapshot::{self, StoredNode};
use jsonbuilder_core::{
    build, Dragged, EditorConfig, Error, Kind, Node, NodeId, PersistenceBridge, RenderBridge,
    SequentialIds, Session,
};
use serde::Serialize;
use serde_wasm_bindgen::to_value;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[wasm_bindgen]
extern "C" {
    /// Page object implementing the editor hooks.
    pub type EditorHost;

    #[wasm_bindgen(method, js_name = onTreeChanged)]
    fn on_tree_changed(this: &EditorHost, view: JsValue, preview: String);

    #[wasm_bindgen(method, catch, js_name = onPersistRequested)]
    fn on_persist_requested(this: &EditorHost, key: &str, serialized: &str)
        -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = loadPersisted)]
    fn load_persisted(this: &EditorHost, key: &str) -> Result<Option<String>, JsValue>;
}

struct HostRender {
    host: EditorHost,
}

impl RenderBridge for HostRender {
    fn on_tree_changed(&mut self, forest: &[Node]) {
        let view = match to_value(&snapshot::view(forest)) {
            Ok(view) => view,
            Err(err) => {
                warn!(%err, "failed to convert tree view for the host");
                JsValue::NULL
            }
        };
        self.host.on_tree_changed(view, format!("{:#}", build(forest)));
    }
}

struct HostStore {
    host: EditorHost,
    key: String,
}

impl PersistenceBridge for HostStore {
    fn on_persist_requested(&mut self, serialized: &str) -> jsonbuilder_core::Result<()> {
        self.host
            .on_persist_requested(&self.key, serialized)
            .map_err(|e| Error::Persistence(format!("{:?}", e)))
    }

    fn load_persisted(&mut self) -> jsonbuilder_core::Result<Option<String>> {
        self.host
            .load_persisted(&self.key)
            .map_err(|e| Error::Persistence(format!("{:?}", e)))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsExport {
    file_name: String,
    mime: &'static str,
    contents: String,
}

fn to_js(err: Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Accepts `"root"`, `"id_<n>"`, or a bare number.
fn parse_id(raw: &str) -> Result<NodeId, JsValue> {
    if raw == "root" {
        return Ok(NodeId::ROOT);
    }
    let digits = raw.strip_prefix("id_").unwrap_or(raw);
    digits
        .parse::<u64>()
        .map(NodeId)
        .map_err(|_| JsValue::from_str(&format!("invalid node id: {raw}")))
}

fn parse_kind(raw: &str) -> Result<Kind, JsValue> {
    Kind::ALL
        .into_iter()
        .find(|kind| kind.as_str() == raw)
        .ok_or_else(|| JsValue::from_str(&format!("unknown node type: {raw}")))
}

fn id_to_js(id: NodeId) -> String {
    id.to_string()
}

#[wasm_bindgen]
pub struct WasmSession {
    inner: Session<HostRender, HostStore, SequentialIds>,
}

#[wasm_bindgen]
impl WasmSession {
    /// `config_json` is an optional partial `EditorConfig` in camelCase.
    #[wasm_bindgen(constructor)]
    pub fn new(host: EditorHost, config_json: Option<String>) -> Result<WasmSession, JsValue> {
        let config: EditorConfig = match config_json.as_deref() {
            Some(text) => {
                serde_json::from_str(text).map_err(|e| JsValue::from_str(&e.to_string()))?
            }
            None => EditorConfig::default(),
        };
        let raw: JsValue = host.into();
        let render = HostRender {
            host: raw.clone().unchecked_into(),
        };
        let store = HostStore {
            host: raw.unchecked_into(),
            key: config.storage_key.clone(),
        };
        Ok(WasmSession {
            inner: Session::open(render, store, SequentialIds::default(), config),
        })
    }

    /// Drop a palette primitive; returns the new node id, or `undefined` for a stale target.
    #[wasm_bindgen(js_name = dropNew)]
    pub fn drop_new(&mut self, kind: &str, target: &str) -> Result<Option<String>, JsValue> {
        let dragged = Dragged::New(parse_kind(kind)?);
        let target = parse_id(target)?;
        let placed = self.inner.drop_node(dragged, target).map_err(to_js)?;
        Ok(placed.map(id_to_js))
    }

    #[wasm_bindgen(js_name = dropExisting)]
    pub fn drop_existing(&mut self, node: &str, target: &str) -> Result<Option<String>, JsValue> {
        let dragged = Dragged::Existing(parse_id(node)?);
        let target = parse_id(target)?;
        let placed = self.inner.drop_node(dragged, target).map_err(to_js)?;
        Ok(placed.map(id_to_js))
    }

    #[wasm_bindgen(js_name = toggleCollapse)]
    pub fn toggle_collapse(&mut self, node: &str) -> Result<Option<bool>, JsValue> {
        Ok(self.inner.toggle_collapse(parse_id(node)?))
    }

    pub fn remove(&mut self, node: &str) -> Result<Option<u32>, JsValue> {
        Ok(self.inner.remove(parse_id(node)?).map(|n| n as u32))
    }

    #[wasm_bindgen(js_name = setKey)]
    pub fn set_key(&mut self, node: &str, key: String) -> Result<(), JsValue> {
        self.inner.set_key(parse_id(node)?, key).map_err(to_js)
    }

    #[wasm_bindgen(js_name = setValue)]
    pub fn set_value(&mut self, node: &str, raw: &str) -> Result<(), JsValue> {
        self.inner.set_value(parse_id(node)?, raw).map_err(to_js)
    }

    /// Replace the document with uploaded file bytes; returns the new root count.
    #[wasm_bindgen(js_name = importBytes)]
    pub fn import_bytes(&mut self, bytes: &[u8]) -> Result<u32, JsValue> {
        self.inner
            .import_bytes(bytes)
            .map(|roots| roots as u32)
            .map_err(to_js)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    #[wasm_bindgen(js_name = exportJson)]
    pub fn export_json(&self) -> Result<JsValue, JsValue> {
        let export = self.inner.export();
        let js = JsExport {
            file_name: export.file_name,
            mime: export.mime,
            contents: export.contents,
        };
        to_value(&js).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn view(&self) -> Result<JsValue, JsValue> {
        let nodes: Vec<StoredNode> = snapshot::view(self.inner.forest());
        to_value(&nodes).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = lastPersistError)]
    pub fn last_persist_error(&self) -> Option<String> {
        self.inner.last_persist_error().map(ToString::to_string)
    }
}
