use serde::{Deserialize, Serialize};

/// Host-tunable naming used by the session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Slot name hosts should persist the snapshot under.
    pub storage_key: String,
    /// Default name of the exported artifact.
    pub export_file_name: String,
    /// Placeholder prefix for new root nodes; the first unused number from the root count up
    /// is appended.
    pub root_key_prefix: String,
    /// Key given to nodes entering an object without one.
    pub child_key: String,
    /// Key of the single root created when a top-level array is imported.
    pub array_root_key: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            storage_key: "json_builder_v7".to_string(),
            export_file_name: "data.json".to_string(),
            root_key_prefix: "key_".to_string(),
            child_key: "key".to_string(),
            array_root_key: "root".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn root_placeholder(&self, root_len: usize) -> String {
        format!("{}{}", self.root_key_prefix, root_len)
    }
}
