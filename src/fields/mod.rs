//! Field population for content entities
//!
//! The crawler fills a destination field of some host entity from a seed
//! stored in a source field. The host's storage and permission model stay
//! behind two narrow traits:
//! - `FieldStore`: read / write a multi-value field by name
//! - `CapabilityCheck`: ask whether the current actor may crawl

mod populate;

pub use populate::{finish_batched, populate, seed_from_field, values_from_report, Populated};

use crate::crawler::CrawlFlavor;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Capability required before any crawl is started
pub const CRAWL_CAPABILITY: &str = "crawl web content";

/// One value of a multi-value field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Link { uri: String },
}

impl FieldValue {
    /// The textual payload: the text itself, or the link's URI
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Link { uri } => uri,
        }
    }
}

/// Get/set access to an entity's fields by name
pub trait FieldStore {
    /// Values of a field in stored order; empty if the field is unset
    fn field_values(&self, name: &str) -> Vec<FieldValue>;

    /// Replaces all values of a field
    fn set_field_values(&mut self, name: &str, values: Vec<FieldValue>);
}

/// Permission oracle consulted once per population
pub trait CapabilityCheck {
    fn has_capability(&self, name: &str) -> bool;
}

/// Which fields a population reads and writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub source_field: String,
    pub destination_field: String,
    pub flavor: CrawlFlavor,
}

impl FieldMapping {
    pub fn new(source: &str, destination: &str, flavor: CrawlFlavor) -> Self {
        Self {
            source_field: source.to_string(),
            destination_field: destination.to_string(),
            flavor,
        }
    }
}

/// Plain in-memory entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntity {
    fields: BTreeMap<String, Vec<FieldValue>>,
}

impl MemoryEntity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: &str, values: Vec<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), values);
        self
    }
}

impl FieldStore for MemoryEntity {
    fn field_values(&self, name: &str) -> Vec<FieldValue> {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    fn set_field_values(&mut self, name: &str, values: Vec<FieldValue>) {
        self.fields.insert(name.to_string(), values);
    }
}

/// Fixed set of granted capabilities
#[derive(Debug, Clone, Default)]
pub struct StaticCapabilities {
    granted: HashSet<String>,
}

impl StaticCapabilities {
    pub fn granting(names: &[&str]) -> Self {
        Self {
            granted: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

impl CapabilityCheck for StaticCapabilities {
    fn has_capability(&self, name: &str) -> bool {
        self.granted.contains(name)
    }
}
