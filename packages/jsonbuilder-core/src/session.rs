use serde_json::Value;
use tracing::{debug, warn};

use crate::codec::{self, Export};
use crate::config::EditorConfig;
use crate::engine::{self, Dragged};
use crate::error::{Error, Result};
use crate::ids::NodeId;
use crate::locate;
use crate::node::{Forest, Node};
use crate::snapshot;
use crate::traits::{IdSource, PersistenceBridge, RenderBridge, SequentialIds};

/// Owns one document and wires the engine to its render and persistence hooks.
///
/// Every mutating entry point notifies render, then persistence, exactly once, whether the
/// edit applied, was a no-op, or was rejected. Stale ids (`Error::NotFound`) are treated as
/// no-ops and never returned.
pub struct Session<R, P, I = SequentialIds>
where
    R: RenderBridge,
    P: PersistenceBridge,
    I: IdSource,
{
    forest: Forest,
    ids: I,
    render: R,
    persist: P,
    config: EditorConfig,
    last_persist_error: Option<Error>,
}

impl<R, P> Session<R, P, SequentialIds>
where
    R: RenderBridge,
    P: PersistenceBridge,
{
    pub fn with_defaults(render: R, persist: P) -> Self {
        Self::open(render, persist, SequentialIds::default(), EditorConfig::default())
    }
}

impl<R, P, I> Session<R, P, I>
where
    R: RenderBridge,
    P: PersistenceBridge,
    I: IdSource,
{
    /// Load the persisted forest (once) and draw it. A missing, unreadable, or corrupt
    /// snapshot starts an empty document.
    pub fn open(render: R, mut persist: P, mut ids: I, config: EditorConfig) -> Self {
        let forest = match persist.load_persisted() {
            Ok(Some(text)) => match snapshot::decode(&text) {
                Ok(forest) => {
                    locate::for_each(&forest, |node, _| ids.observe(node.id));
                    debug!(roots = forest.len(), "restored persisted forest");
                    forest
                }
                Err(err) => {
                    warn!(%err, "discarding persisted forest");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(%err, "failed to load persisted forest");
                Vec::new()
            }
        };
        let mut session = Self {
            forest,
            ids,
            render,
            persist,
            config,
            last_persist_error: None,
        };
        session.render.on_tree_changed(&session.forest);
        session
    }

    pub fn forest(&self) -> &[Node] {
        &self.forest
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn render_bridge(&self) -> &R {
        &self.render
    }

    pub fn persistence(&self) -> &P {
        &self.persist
    }

    /// Error from the most recent persist attempt, cleared by the next successful one.
    pub fn last_persist_error(&self) -> Option<&Error> {
        self.last_persist_error.as_ref()
    }

    pub fn find(&self, id: NodeId) -> Option<&Node> {
        locate::find_by_id(&self.forest, id)
    }

    pub fn build(&self) -> Value {
        codec::build(&self.forest)
    }

    pub fn export(&self) -> Export {
        codec::export(&self.forest, &self.config)
    }

    /// Drop a palette primitive or an existing node onto `target` (`NodeId::ROOT` for the
    /// canvas). Returns the placed node's id, or `None` when a referenced node is gone.
    pub fn drop_node(&mut self, dragged: Dragged, target: NodeId) -> Result<Option<NodeId>> {
        let outcome = engine::reparent(
            &mut self.forest,
            dragged,
            target,
            &mut self.ids,
            &self.config,
        );
        self.settle("drop", outcome)
    }

    pub fn toggle_collapse(&mut self, id: NodeId) -> Option<bool> {
        let outcome = engine::toggle_collapse(&mut self.forest, id);
        self.settle("toggle_collapse", outcome).ok().flatten()
    }

    /// Delete a node and its subtree; returns how many nodes were removed.
    pub fn remove(&mut self, id: NodeId) -> Option<usize> {
        let outcome = engine::remove(&mut self.forest, id);
        self.settle("remove", outcome).ok().flatten()
    }

    pub fn set_key(&mut self, id: NodeId, key: impl Into<String>) -> Result<()> {
        let outcome = engine::set_key(&mut self.forest, id, key);
        self.settle("set_key", outcome).map(|_| ())
    }

    pub fn set_value(&mut self, id: NodeId, raw: &str) -> Result<()> {
        let outcome = match locate::find_by_id_mut(&mut self.forest, id) {
            Some(node) => engine::set_value(node, raw),
            None => Err(Error::NotFound(id)),
        };
        self.settle("set_value", outcome).map(|_| ())
    }

    /// Replace the whole document with uploaded file contents. On failure the current
    /// document is kept.
    pub fn import_bytes(&mut self, bytes: &[u8]) -> Result<usize> {
        let outcome = codec::import_bytes(bytes, &mut self.ids, &self.config);
        self.replace("import", outcome)
    }

    pub fn import_value(&mut self, value: &Value) -> Result<usize> {
        let outcome = codec::import(value, &mut self.ids, &self.config);
        self.replace("import", outcome)
    }

    /// Drop every node.
    pub fn clear(&mut self) {
        self.forest.clear();
        debug!("cleared forest");
        self.notify();
    }

    fn replace(&mut self, op: &'static str, outcome: Result<Forest>) -> Result<usize> {
        let outcome = outcome.map(|forest| {
            self.forest = forest;
            self.forest.len()
        });
        self.settle(op, outcome)
            .map(|roots| roots.unwrap_or_default())
    }

    fn settle<T>(&mut self, op: &'static str, outcome: Result<T>) -> Result<Option<T>> {
        let settled = match outcome {
            Ok(value) => {
                debug!(op, "applied");
                Ok(Some(value))
            }
            Err(Error::NotFound(id)) => {
                debug!(op, %id, "stale reference ignored");
                Ok(None)
            }
            Err(err) => {
                debug!(op, %err, "rejected");
                Err(err)
            }
        };
        self.notify();
        settled
    }

    fn notify(&mut self) {
        self.render.on_tree_changed(&self.forest);
        let persisted = snapshot::encode(&self.forest)
            .and_then(|text| self.persist.on_persist_requested(&text));
        match persisted {
            Ok(()) => self.last_persist_error = None,
            Err(err) => {
                warn!(%err, "failed to persist forest");
                self.last_persist_error = Some(err);
            }
        }
    }
}
