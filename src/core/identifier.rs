//! Resolution of the hash token a file was originally named with.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::OutputUnit;

use super::error::{RehashError, Result};
use super::substitution::SubstitutionKey;

/// Which unit hash a filename was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashStrategy {
    /// One hash per content type of the unit
    Contenthash,

    /// One hash shared by every content type of the unit
    Chunkhash,
}

impl Default for HashStrategy {
    fn default() -> Self {
        Self::Chunkhash
    }
}

impl fmt::Display for HashStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashStrategy::Contenthash => write!(f, "contenthash"),
            HashStrategy::Chunkhash => write!(f, "chunkhash"),
        }
    }
}

impl FromStr for HashStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "contenthash" => Ok(HashStrategy::Contenthash),
            "chunkhash" => Ok(HashStrategy::Chunkhash),
            _ => anyhow::bail!("Unknown hash strategy: {} (expected contenthash or chunkhash)", s),
        }
    }
}

/// Primary file extensions mapped to the unit's content-hash table keys.
///
/// A file whose extension is listed here is a main file of its unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentTypes(BTreeMap<String, String>);

impl Default for ContentTypes {
    fn default() -> Self {
        Self(
            [
                (".js".to_string(), "javascript".to_string()),
                (".css".to_string(), "css/mini-extract".to_string()),
            ]
            .into_iter()
            .collect(),
        )
    }
}

impl ContentTypes {
    pub fn new(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }

    /// Content-hash key for a file, if it has a primary extension
    pub fn content_type(&self, file: &str) -> Option<&str> {
        let ext = extension(file)?;
        self.0.get(&ext).map(String::as_str)
    }

    pub fn is_primary(&self, file: &str) -> bool {
        self.content_type(file).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

/// Extension of the file name including the leading dot (`app.1a2b.js` -> `.js`)
pub fn extension(file: &str) -> Option<String> {
    Path::new(file)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
}

/// The token a main file is currently named with, and the key its
/// replacement is recorded under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OldIdentifier {
    pub token: String,
    pub key: SubstitutionKey,
}

impl OldIdentifier {
    /// Whether the file name actually embeds the token
    pub fn appears_in(&self, file: &str) -> bool {
        !self.token.is_empty() && file.contains(&self.key.needle())
    }

    /// New name of `file`, rewritten by the same rule references to it get
    pub fn renamed(&self, file: &str, new: &str) -> String {
        self.key.rewrite(file, new)
    }
}

/// Text following the last occurrence of `token` in `file`
fn suffix_after(file: &str, token: &str) -> Option<String> {
    if token.is_empty() {
        return None;
    }
    let pos = file.rfind(token)?;
    let rest = &file[pos + token.len()..];
    (!rest.is_empty()).then(|| rest.to_string())
}

/// Resolve the old hash token for a main file of `unit`.
///
/// Under `chunkhash` the script and stylesheet of one unit share the token,
/// so the key is qualified with the rest of the file name after the token
/// (which ends in the extension) to keep their replacements apart.
pub fn old_identifier(
    strategy: HashStrategy,
    file: &str,
    unit: &OutputUnit,
    content_types: &ContentTypes,
) -> Result<OldIdentifier> {
    match strategy {
        HashStrategy::Contenthash => {
            let content_type = content_types.content_type(file).unwrap_or_default();
            let token = unit.content_hash.get(content_type).ok_or_else(|| {
                RehashError::MissingIdentifierTable {
                    unit: unit.label(),
                    content_type: content_type.to_string(),
                }
            })?;
            Ok(OldIdentifier {
                token: token.clone(),
                key: SubstitutionKey::token(token.clone()),
            })
        }
        HashStrategy::Chunkhash => {
            let token = unit.rendered_hash.clone();
            let key = match suffix_after(file, &token) {
                Some(suffix) => SubstitutionKey::qualified(token.clone(), suffix),
                None => SubstitutionKey::token(token.clone()),
            };
            Ok(OldIdentifier { token, key })
        }
    }
}
