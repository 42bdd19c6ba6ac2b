//! Old-to-new hash mapping accumulated during one invocation.

use std::fmt;

use tracing::{debug, warn};

use crate::domain::Artifact;

use super::content::substitute_all;
use super::error::Result;

/// Key of a substitution entry.
///
/// `suffix` is the part of the file name that follows the token, up to the
/// end of the name (`.js` for `app.a1b2c3.js`, `.min.js` for
/// `app.a1b2c3.min.js`). It is set when the same token is shared by files of
/// different content types. The entry then only rewrites `token` where it is
/// directly followed by that suffix, and the file itself is renamed with the
/// same rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubstitutionKey {
    pub token: String,
    pub suffix: Option<String>,
}

impl SubstitutionKey {
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            suffix: None,
        }
    }

    pub fn qualified(token: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            suffix: Some(suffix.into()),
        }
    }

    /// Literal text rewritten by this entry
    pub fn needle(&self) -> String {
        match &self.suffix {
            Some(suffix) => format!("{}{}", self.token, suffix),
            None => self.token.clone(),
        }
    }

    /// Text that replaces the needle for a given new token
    pub fn replacement(&self, new: &str) -> String {
        match &self.suffix {
            Some(suffix) => format!("{}{}", new, suffix),
            None => new.to_string(),
        }
    }

    /// Apply this entry to a single name
    pub fn rewrite(&self, text: &str, new: &str) -> String {
        text.replace(&self.needle(), &self.replacement(new))
    }
}

impl fmt::Display for SubstitutionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.suffix {
            Some(suffix) => write!(f, "{} ({})", self.token, suffix),
            None => write!(f, "{}", self.token),
        }
    }
}

/// Insertion-ordered mapping from old hash to new hash.
///
/// Grows monotonically; an entry is never replaced once set.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionMap {
    entries: Vec<(SubstitutionKey, String)>,
}

impl SubstitutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a replacement. Returns false if the key was already present.
    pub fn insert(&mut self, key: SubstitutionKey, new: String) -> bool {
        if let Some(existing) = self.get(&key) {
            if existing != new {
                warn!(key = %key, kept = %existing, offered = %new, "Hash already remapped, keeping first value");
            }
            return false;
        }

        debug!(key = %key, new = %new, "Recorded hash substitution");
        self.entries.push((key, new));
        true
    }

    pub fn get(&self, key: &SubstitutionKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply every entry, in insertion order, to `artifact`
    pub fn apply(&self, artifact: &mut Artifact) -> Result<()> {
        for (key, new) in &self.entries {
            substitute_all(artifact, &key.needle(), &key.replacement(new))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::content::read_text;

    #[test]
    fn test_first_value_wins() {
        let mut map = SubstitutionMap::new();
        assert!(map.is_empty());
        assert!(map.insert(SubstitutionKey::token("old"), "one".to_string()));
        assert!(!map.insert(SubstitutionKey::token("old"), "two".to_string()));

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&SubstitutionKey::token("old")), Some("one"));
    }

    #[test]
    fn test_qualified_keys_are_distinct() {
        let mut map = SubstitutionMap::new();
        map.insert(SubstitutionKey::qualified("h", ".js"), "js1".to_string());
        map.insert(SubstitutionKey::qualified("h", ".css"), "css1".to_string());

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&SubstitutionKey::qualified("h", ".js")), Some("js1"));
        assert_eq!(map.get(&SubstitutionKey::qualified("h", ".css")), Some("css1"));
        assert_eq!(map.get(&SubstitutionKey::token("h")), None);
    }

    #[test]
    fn test_apply_respects_suffix() {
        let mut map = SubstitutionMap::new();
        map.insert(SubstitutionKey::qualified("a1b2c3", ".js"), "jjj".to_string());
        map.insert(SubstitutionKey::qualified("a1b2c3", ".css"), "ccc".to_string());

        let mut manifest = Artifact::plain(r#"["app.a1b2c3.js","app.a1b2c3.css","app.a1b2c3.js.map"]"#);
        map.apply(&mut manifest).unwrap();

        assert_eq!(
            read_text(&manifest).unwrap(),
            r#"["app.jjj.js","app.ccc.css","app.jjj.js.map"]"#
        );
    }

    #[test]
    fn test_long_suffix_rewrites_name_and_references_alike() {
        let key = SubstitutionKey::qualified("a1b2c3", ".min.js");
        assert_eq!(key.rewrite("app.a1b2c3.min.js", "fff"), "app.fff.min.js");

        let mut map = SubstitutionMap::new();
        map.insert(key, "fff".to_string());
        let mut runtime = Artifact::plain("load('app.a1b2c3.min.js'); load('app.a1b2c3.css');");
        map.apply(&mut runtime).unwrap();

        assert_eq!(
            read_text(&runtime).unwrap(),
            "load('app.fff.min.js'); load('app.a1b2c3.css');"
        );
    }

    #[test]
    fn test_apply_in_insertion_order() {
        let mut map = SubstitutionMap::new();
        map.insert(SubstitutionKey::token("aaa"), "bbb".to_string());
        map.insert(SubstitutionKey::token("bbb"), "ccc".to_string());

        let mut artifact = Artifact::plain("aaa");
        map.apply(&mut artifact).unwrap();
        assert_eq!(read_text(&artifact).unwrap(), "ccc");
    }
}
