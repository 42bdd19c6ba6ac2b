//! Reading and rewriting artifact content.
//!
//! Rewrites are literal, global token replacements applied in place. The
//! token is never interpreted as a pattern.

use crate::domain::Artifact;

use super::error::{RehashError, Result};

/// Current textual content of an artifact
pub fn read_text(artifact: &Artifact) -> Result<String> {
    let mut out = String::new();
    append_text(artifact, &mut out)?;
    Ok(out)
}

fn append_text(artifact: &Artifact, out: &mut String) -> Result<()> {
    match artifact {
        Artifact::PlainText(text) => out.push_str(text),
        Artifact::WrappedSource(inner) => append_text(inner, out)?,
        Artifact::CachedRendering { source, rendered } => match rendered {
            Some(rendered) => out.push_str(rendered),
            None => append_text(source, out)?,
        },
        Artifact::RawValue(raw) => out.push_str(raw.value()),
        Artifact::PositionalMapped { source, .. } => append_text(source, out)?,
        Artifact::Composite(children) => {
            for child in children {
                append_text(child, out)?;
            }
        }
        Artifact::Foreign { kind } => {
            return Err(RehashError::UnsupportedArtifactKind { kind: kind.clone() })
        }
    }
    Ok(())
}

/// Replace every occurrence of `old` with `new` inside `artifact`.
///
/// The artifact is checked as a whole first, so a foreign representation
/// anywhere in the tree fails before anything is rewritten.
pub fn substitute_all<'a>(artifact: &'a mut Artifact, old: &str, new: &str) -> Result<&'a mut Artifact> {
    ensure_supported(artifact)?;
    if !old.is_empty() {
        rewrite(artifact, old, new)?;
    }
    Ok(artifact)
}

/// Fail with the first representation that cannot be rewritten
pub fn ensure_supported(artifact: &Artifact) -> Result<()> {
    match artifact {
        Artifact::PlainText(_) | Artifact::RawValue(_) => Ok(()),
        Artifact::WrappedSource(inner) => ensure_supported(inner),
        Artifact::CachedRendering { source, .. } | Artifact::PositionalMapped { source, .. } => {
            ensure_supported(source)
        }
        Artifact::Composite(children) => children.iter().try_for_each(ensure_supported),
        Artifact::Foreign { kind } => Err(RehashError::UnsupportedArtifactKind { kind: kind.clone() }),
    }
}

fn rewrite(artifact: &mut Artifact, old: &str, new: &str) -> Result<()> {
    match artifact {
        Artifact::PlainText(text) => replace_in_place(text, old, new),
        Artifact::WrappedSource(inner) => rewrite(inner, old, new)?,
        Artifact::CachedRendering { source, rendered } => {
            // The rendering becomes authoritative once rewritten
            let current = match rendered.take() {
                Some(text) => text,
                None => read_text(source)?,
            };
            *rendered = Some(current.replace(old, new));
        }
        Artifact::RawValue(raw) => {
            if raw.value().contains(old) {
                let replaced = raw.value().replace(old, new);
                raw.set(replaced);
            }
        }
        Artifact::PositionalMapped { source, .. } => rewrite(source, old, new)?,
        Artifact::Composite(children) => {
            for child in children.iter_mut() {
                rewrite(child, old, new)?;
            }
        }
        Artifact::Foreign { kind } => {
            return Err(RehashError::UnsupportedArtifactKind { kind: kind.clone() })
        }
    }
    Ok(())
}

fn replace_in_place(text: &mut String, old: &str, new: &str) {
    if text.contains(old) {
        *text = text.replace(old, new);
    }
}
