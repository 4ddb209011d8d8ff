#![forbid(unsafe_code)]
//! Core engine for a drag-and-drop JSON builder.
//! The document is an ordered forest of typed nodes that can be created, edited, reparented,
//! and projected to canonical JSON. Rendering and storage stay outside this crate behind the
//! bridge traits defined here, so the engine can be driven from a browser, a TUI, or tests.

pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod ids;
pub mod locate;
pub mod node;
pub mod session;
pub mod snapshot;
pub mod traits;

pub use codec::{build, build_node, export, import, import_bytes, Export};
pub use config::EditorConfig;
pub use engine::{
    attach_as_child, attach_as_root, detach, fresh_root_key, remove, reparent, set_key, set_value,
    toggle_collapse, Dragged, Unattached,
};
pub use error::{Error, Result};
pub use ids::NodeId;
pub use locate::{find_by_id, find_by_id_mut, parent_kind, Path};
pub use node::{create_node, Body, Forest, Kind, Node};
pub use session::Session;
pub use traits::{
    IdSource, MemoryPersistence, NoopRender, PersistenceBridge, RecordingRender, RenderBridge,
    SequentialIds,
};
