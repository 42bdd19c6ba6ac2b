//! Snapshot Integration Tests
//!
//! Loading host snapshots from disk and reconciling them.

use std::io::Write;

use rehash::core::{read_text, HashFunction, RehashError};
use rehash::{Artifact, OutputSet, Reconciler};
use tempfile::TempDir;

const SNAPSHOT: &str = r#"{
  "units": [
    {
      "id": 1,
      "name": "runtime",
      "has_runtime": true,
      "rendered_hash": "rrrrrr",
      "files": ["runtime.rrrrrr.js"]
    },
    {
      "id": 0,
      "name": "main",
      "rendered_hash": "mmmmmm",
      "files": ["main.mmmmmm.js", "main.mmmmmm.js.map"]
    },
    {
      "id": 2,
      "name": null,
      "rendered_hash": "dddddd",
      "files": ["2.dddddd.js"]
    }
  ],
  "assets": {
    "runtime.rrrrrr.js": {"kind": "raw_value", "value_as_string": "['main.mmmmmm.js','2.dddddd.js']"},
    "main.mmmmmm.js": {
      "kind": "composite",
      "children": ["import('./2.dddddd.js');", {"kind": "plain_text", "text": "main();"}]
    },
    "main.mmmmmm.js.map": {"kind": "positional_mapped", "source": "{\"file\":\"main.mmmmmm.js\"}", "map": ""},
    "2.dddddd.js": "lazy();"
  },
  "hash": {"hash_function": "md5", "hash_digest_length": 6}
}"#;

fn write_snapshot(temp: &TempDir, body: &str) -> std::path::PathBuf {
    let path = temp.path().join("snapshot.json");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(body.as_bytes()).unwrap();
    path
}

#[test]
fn test_load_and_reconcile_snapshot() {
    let temp = TempDir::new().unwrap();
    let path = write_snapshot(&temp, SNAPSHOT);

    let mut output = OutputSet::from_file(&path).unwrap();
    output.validate().unwrap();

    let hash = output.hash.clone().unwrap();
    assert_eq!(hash.hash_function, Some(HashFunction::Md5));

    let mut options = rehash::ReconcileOptions::default();
    hash.apply_to(&mut options.hash);

    let renames = Reconciler::new(options).reconcile(&mut output).unwrap();

    // main and runtime are renamed, the unnamed split unit is not
    assert_eq!(renames.len(), 2);
    assert!(renames.renamed_to("2.dddddd.js").is_none());

    let main_name = renames.renamed_to("main.mmmmmm.js").unwrap().to_string();
    assert!(main_name.starts_with("main.") && main_name.ends_with(".js"));
    assert_eq!(main_name.len(), "main.".len() + 6 + ".js".len());

    let runtime = read_text(output.asset("runtime.rrrrrr.js").unwrap()).unwrap();
    assert_eq!(runtime, format!("['{}','2.dddddd.js']", main_name));

    let map = read_text(output.asset("main.mmmmmm.js.map").unwrap()).unwrap();
    assert_eq!(map, format!(r#"{{"file":"{}"}}"#, main_name));

    output.apply_renames(&renames).unwrap();
    output.validate().unwrap();
    assert!(output.asset(&main_name).is_some());
}

#[test]
fn test_foreign_kind_in_snapshot() {
    let temp = TempDir::new().unwrap();
    let path = write_snapshot(
        &temp,
        r#"{
          "units": [{"id": 0, "name": "main", "rendered_hash": "aaaa", "files": ["main.aaaa.js"]}],
          "assets": {"main.aaaa.js": {"kind": "original_source", "value": "x"}}
        }"#,
    );

    let mut output = OutputSet::from_file(&path).unwrap();
    assert_eq!(
        output.asset("main.aaaa.js"),
        Some(&Artifact::foreign("original_source"))
    );

    let err = Reconciler::default().reconcile(&mut output).unwrap_err();
    assert!(matches!(err, RehashError::UnsupportedArtifactKind { ref kind } if kind == "original_source"));
}

#[test]
fn test_malformed_snapshot() {
    let temp = TempDir::new().unwrap();
    let path = write_snapshot(&temp, "{ not json");
    assert!(OutputSet::from_file(&path).is_err());

    let missing = temp.path().join("missing.json");
    assert!(OutputSet::from_file(&missing).is_err());
}
