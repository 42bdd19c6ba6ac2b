//! Output units: groups of files produced together by the host build.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable unit identifier.
///
/// Hosts use either numeric or string ids. Numeric ids sort before string ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnitId {
    Numeric(u64),
    Named(String),
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitId::Numeric(n) => write!(f, "{}", n),
            UnitId::Named(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for UnitId {
    fn from(value: u64) -> Self {
        Self::Numeric(value)
    }
}

impl From<&str> for UnitId {
    fn from(value: &str) -> Self {
        Self::Named(value.to_string())
    }
}

/// A group of artifacts emitted together (an entry point, a split point, a runtime)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputUnit {
    /// Stable identifier, used for deterministic ordering
    pub id: UnitId,

    /// Human name; absent for units generated on demand
    #[serde(default)]
    pub name: Option<String>,

    /// Whether the unit carries bootstrap/runtime logic
    #[serde(default)]
    pub has_runtime: bool,

    /// Content hash per content type (e.g. "javascript", "css/mini-extract")
    #[serde(default)]
    pub content_hash: BTreeMap<String, String>,

    /// Whole-unit hash shared by all content types
    #[serde(default)]
    pub rendered_hash: String,

    /// Names of the files belonging to this unit
    #[serde(default)]
    pub files: Vec<String>,
}

impl OutputUnit {
    pub fn new(id: impl Into<UnitId>, name: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.map(str::to_string),
            has_runtime: false,
            content_hash: BTreeMap::new(),
            rendered_hash: String::new(),
            files: Vec::new(),
        }
    }

    pub fn with_runtime(mut self, has_runtime: bool) -> Self {
        self.has_runtime = has_runtime;
        self
    }

    pub fn with_rendered_hash(mut self, hash: impl Into<String>) -> Self {
        self.rendered_hash = hash.into();
        self
    }

    pub fn with_content_hash(mut self, content_type: impl Into<String>, hash: impl Into<String>) -> Self {
        self.content_hash.insert(content_type.into(), hash.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.files.push(file.into());
        self
    }

    /// Units without a name are never rehashed
    pub fn is_named(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.is_empty())
    }

    /// Label for logs and errors
    pub fn label(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("#{}", self.id),
        }
    }
}
