//! Build artifacts in their in-memory representations.
//!
//! The host hands over artifacts in one of a fixed set of representations.
//! Anything else crossing the host boundary is kept as [`Artifact::Foreign`]
//! so that it can be reported instead of silently passed through.

use serde::{Deserialize, Deserializer};

/// An output artifact produced by the host build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// Plain text content
    PlainText(String),

    /// Delegates its content to an inner artifact
    WrappedSource(Box<Artifact>),

    /// A source together with its materialized rendering
    CachedRendering {
        source: Box<Artifact>,
        rendered: Option<String>,
    },

    /// Content held directly as a value
    RawValue(RawValue),

    /// Source text paired with a positional (source) map
    PositionalMapped {
        source: Box<Artifact>,
        map: String,
    },

    /// Ordered children whose concatenation is the content
    Composite(Vec<Artifact>),

    /// Representation this crate does not know how to read or rewrite
    Foreign { kind: String },
}

impl Artifact {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::PlainText(text.into())
    }

    pub fn wrapped(inner: Artifact) -> Self {
        Self::WrappedSource(Box::new(inner))
    }

    pub fn cached(source: Artifact) -> Self {
        Self::CachedRendering {
            source: Box::new(source),
            rendered: None,
        }
    }

    pub fn raw(value: impl Into<String>) -> Self {
        Self::RawValue(RawValue::new(value))
    }

    pub fn mapped(source: Artifact, map: impl Into<String>) -> Self {
        Self::PositionalMapped {
            source: Box::new(source),
            map: map.into(),
        }
    }

    pub fn composite(children: Vec<Artifact>) -> Self {
        Self::Composite(children)
    }

    pub fn foreign(kind: impl Into<String>) -> Self {
        Self::Foreign { kind: kind.into() }
    }

    /// Name of the representation, as used in snapshots and diagnostics
    pub fn kind(&self) -> &str {
        match self {
            Artifact::PlainText(_) => "plain_text",
            Artifact::WrappedSource(_) => "wrapped_source",
            Artifact::CachedRendering { .. } => "cached_rendering",
            Artifact::RawValue(_) => "raw_value",
            Artifact::PositionalMapped { .. } => "positional_mapped",
            Artifact::Composite(_) => "composite",
            Artifact::Foreign { kind } => kind,
        }
    }
}

/// Raw content exposed under two accessor names.
///
/// Some readers ask for `value`, others for `value_as_string`. Both read the
/// same field so a rewrite is visible through either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    value: String,
}

impl RawValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn value_as_string(&self) -> &str {
        &self.value
    }

    pub fn set(&mut self, value: String) {
        self.value = value;
    }
}

/// Snapshot form of the known representations, tagged by `kind`
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum KnownArtifact {
    PlainText {
        text: String,
    },
    WrappedSource {
        source: Artifact,
    },
    CachedRendering {
        source: Artifact,
        #[serde(default)]
        rendered: Option<String>,
    },
    RawValue {
        #[serde(alias = "value_as_string")]
        value: String,
    },
    PositionalMapped {
        source: Artifact,
        #[serde(default)]
        map: String,
    },
    Composite {
        children: Vec<Artifact>,
    },
}

const KNOWN_KINDS: &[&str] = &[
    "plain_text",
    "wrapped_source",
    "cached_rendering",
    "raw_value",
    "positional_mapped",
    "composite",
];

impl From<KnownArtifact> for Artifact {
    fn from(known: KnownArtifact) -> Self {
        match known {
            KnownArtifact::PlainText { text } => Artifact::PlainText(text),
            KnownArtifact::WrappedSource { source } => Artifact::wrapped(source),
            KnownArtifact::CachedRendering { source, rendered } => Artifact::CachedRendering {
                source: Box::new(source),
                rendered,
            },
            KnownArtifact::RawValue { value } => Artifact::raw(value),
            KnownArtifact::PositionalMapped { source, map } => Artifact::mapped(source, map),
            KnownArtifact::Composite { children } => Artifact::Composite(children),
        }
    }
}

impl<'de> Deserialize<'de> for Artifact {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        // A bare string is shorthand for plain text
        let value = serde_json::Value::deserialize(deserializer)?;
        if let serde_json::Value::String(text) = value {
            return Ok(Artifact::PlainText(text));
        }

        let kind = value
            .get("kind")
            .and_then(|k| k.as_str())
            .ok_or_else(|| D::Error::missing_field("kind"))?
            .to_string();

        if !KNOWN_KINDS.contains(&kind.as_str()) {
            return Ok(Artifact::Foreign { kind });
        }

        serde_json::from_value::<KnownArtifact>(value)
            .map(Artifact::from)
            .map_err(D::Error::custom)
    }
}
