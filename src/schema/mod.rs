//! Relational schema descriptor
//!
//! A structured description of the demand/capacity database, regenerated
//! by the offline schema-extraction job and read-only at query time. It
//! grounds SQL generation; if it drifts from the live schema, generation
//! degrades silently into hallucinated columns, so the extraction job
//! must run after every migration.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// One column: type, nullability, and grounding hints for the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub data_type: String,

    #[serde(deserialize_with = "deserialize_nullable", default)]
    pub is_nullable: bool,

    #[serde(default)]
    pub max_length: Option<u32>,

    #[serde(default)]
    pub description: Option<String>,

    /// Up to 3 example values exported from the live table
    #[serde(default)]
    pub sample_values: Vec<Value>,
}

/// Foreign key edge: source column to target table/column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKey {
    pub column: String,
    pub references_table: String,
    pub references_column: String,
}

/// One table: description, columns, and key structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDescriptor {
    #[serde(default)]
    pub description: Option<String>,

    pub columns: BTreeMap<String, ColumnDescriptor>,

    #[serde(default)]
    pub primary_keys: Vec<String>,

    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
}

/// The full schema, keyed by table name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    #[serde(flatten)]
    pub tables: BTreeMap<String, TableDescriptor>,
}

impl SchemaDescriptor {
    /// Load the descriptor from the offline-generated JSON file
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading schema descriptor from {:?}", path);

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Schema(format!("Cannot read schema file {}: {}", path.display(), e))
        })?;

        let schema: SchemaDescriptor = serde_json::from_str(&content).map_err(|e| {
            Error::Schema(format!("Invalid schema file {}: {}", path.display(), e))
        })?;

        if schema.tables.is_empty() {
            return Err(Error::Schema(format!(
                "Schema file {} describes no tables",
                path.display()
            )));
        }

        Ok(schema)
    }

    /// Serialize for the SQL generation prompt.
    ///
    /// Tables and columns are BTreeMaps, so the output is byte-stable for
    /// a given schema snapshot and generation stays reproducible.
    pub fn to_prompt_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Accept `true`/`false` as well as the `"YES"`/`"NO"` strings the
/// information_schema export writes.
fn deserialize_nullable<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Nullable {
        Bool(bool),
        Text(String),
    }

    match Nullable::deserialize(deserializer)? {
        Nullable::Bool(b) => Ok(b),
        Nullable::Text(s) => Ok(s.eq_ignore_ascii_case("yes")),
    }
}
