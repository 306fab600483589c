use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where the session credentials are persisted between runs.
/// We differentiate the backends via a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(tag = "type")]
pub enum StorageConfig {
    /// Nothing survives the process; useful for tests and one-shot commands.
    #[serde(rename = "memory")]
    Memory,
    /// A small JSON document on disk holding the string key/value pairs.
    #[serde(rename = "file")]
    File(FileStorageConfig),
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Memory
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct FileStorageConfig {
    pub path: String,
}
