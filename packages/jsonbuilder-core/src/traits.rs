use serde_json::Value;

use crate::codec;
use crate::error::Result;
use crate::ids::NodeId;
use crate::node::Node;

/// Pluggable id allocation so tests can assert deterministic ids.
pub trait IdSource {
    fn next_id(&mut self) -> NodeId;
    /// Record an id that entered the forest from elsewhere (e.g. a snapshot) so it is
    /// never handed out again.
    fn observe(&mut self, external: NodeId);
}

/// Called after every mutation, including no-op and rejected ones.
pub trait RenderBridge {
    fn on_tree_changed(&mut self, forest: &[Node]);
}

/// Durable storage for the serialized node graph.
pub trait PersistenceBridge {
    fn on_persist_requested(&mut self, serialized: &str) -> Result<()>;
    /// Invoked once when a session opens.
    fn load_persisted(&mut self) -> Result<Option<String>>;
}

/// Monotonic counter starting at 1; `NodeId::ROOT` is never produced.
#[derive(Clone, Debug, Default)]
pub struct SequentialIds {
    counter: u64,
}

impl SequentialIds {
    pub fn starting_after(last: u64) -> Self {
        Self { counter: last }
    }

    pub fn last(&self) -> u64 {
        self.counter
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> NodeId {
        self.counter += 1;
        NodeId(self.counter)
    }

    fn observe(&mut self, external: NodeId) {
        self.counter = self.counter.max(external.0);
    }
}

/// Ignores redraw requests; useful for headless hosts.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopRender;

impl RenderBridge for NoopRender {
    fn on_tree_changed(&mut self, _forest: &[Node]) {}
}

/// Counts redraws and keeps the JSON projection of the last one.
#[derive(Clone, Debug, Default)]
pub struct RecordingRender {
    pub calls: usize,
    pub last: Option<Value>,
}

impl RenderBridge for RecordingRender {
    fn on_tree_changed(&mut self, forest: &[Node]) {
        self.calls += 1;
        self.last = Some(codec::build(forest));
    }
}

/// In-memory storage slot for prototyping and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryPersistence {
    pub stored: Option<String>,
    pub writes: usize,
    pub loads: usize,
}

impl MemoryPersistence {
    pub fn seeded(serialized: impl Into<String>) -> Self {
        Self {
            stored: Some(serialized.into()),
            ..Self::default()
        }
    }
}

impl PersistenceBridge for MemoryPersistence {
    fn on_persist_requested(&mut self, serialized: &str) -> Result<()> {
        self.writes += 1;
        self.stored = Some(serialized.to_string());
        Ok(())
    }

    fn load_persisted(&mut self) -> Result<Option<String>> {
        self.loads += 1;
        Ok(self.stored.clone())
    }
}
