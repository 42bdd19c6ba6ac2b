//! Command-line interface for rehash.
//!
//! Provides commands for reconciling a build snapshot, digesting single
//! files, and inspecting the resolved configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use crate::config::{self, validate_options};
use crate::core::{
    digest, read_text, DigestEncoding, HashFunction, HashStrategy, ReconcileOptions, Reconciler,
};
use crate::domain::{OutputSet, RenameSet};

/// rehash - Post-build content hash reconciliation
#[derive(Parser, Debug)]
#[command(name = "rehash")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile hashes of a build snapshot
    Reconcile {
        /// Snapshot file (JSON)
        snapshot: PathBuf,

        /// Which unit hash file names were built from
        #[arg(short, long, value_enum)]
        strategy: Option<StrategyArg>,

        #[command(flatten)]
        hash: HashFlags,

        /// Write the report to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the digest of a file
    Digest {
        /// File to digest
        file: PathBuf,

        #[command(flatten)]
        hash: HashFlags,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Hash strategy for CLI (maps to HashStrategy)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    /// Per content type hash
    Contenthash,

    /// Whole-unit hash
    Chunkhash,
}

impl From<StrategyArg> for HashStrategy {
    fn from(s: StrategyArg) -> Self {
        match s {
            StrategyArg::Contenthash => HashStrategy::Contenthash,
            StrategyArg::Chunkhash => HashStrategy::Chunkhash,
        }
    }
}

/// Hash option flags shared by several commands
#[derive(Args, Debug, Default, Clone)]
pub struct HashFlags {
    /// Hash function (md5, sha1, sha224, sha256, sha384, sha512)
    #[arg(long)]
    pub hash_function: Option<HashFunction>,

    /// Digest encoding (hex, base64, base64url)
    #[arg(long)]
    pub digest: Option<DigestEncoding>,

    /// Number of digest characters used in file names
    #[arg(long)]
    pub digest_length: Option<usize>,

    /// Salt fed to the hash after the content
    #[arg(long)]
    pub salt: Option<String>,
}

impl HashFlags {
    fn apply_to(&self, options: &mut ReconcileOptions) {
        if let Some(function) = self.hash_function {
            options.hash.hash_function = function;
        }
        if let Some(encoding) = self.digest {
            options.hash.hash_digest = encoding;
        }
        if let Some(length) = self.digest_length {
            options.hash.hash_digest_length = length;
        }
        if let Some(ref salt) = self.salt {
            options.hash.hash_salt = Some(salt.clone());
        }
    }
}

/// Report written after a reconciliation
#[derive(Debug, Serialize)]
pub struct ReconcileReport<'a> {
    /// Renames applied, in processing order
    pub renames: &'a RenameSet,

    /// Final content of every asset, keyed by final name
    pub assets: BTreeMap<String, String>,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Reconcile {
                snapshot,
                strategy,
                hash,
                output,
            } => reconcile_snapshot(&snapshot, strategy, &hash, output.as_deref()).await,
            Commands::Digest { file, hash } => digest_file(&file, &hash).await,
            Commands::Config => show_config().await,
        }
    }
}

/// Load a snapshot, reconcile it and emit the report
async fn reconcile_snapshot(
    snapshot_path: &Path,
    strategy: Option<StrategyArg>,
    flags: &HashFlags,
    output_path: Option<&Path>,
) -> Result<()> {
    let cfg = config::config()?;

    let mut output = OutputSet::from_file(snapshot_path)?;
    output.validate()?;

    let mut options = cfg.options_for(output.hash.as_ref());
    flags.apply_to(&mut options);
    if let Some(strategy) = strategy {
        options.strategy = strategy.into();
    }
    validate_options(&options)?;

    let renames = Reconciler::new(options)
        .reconcile(&mut output)
        .context("Hash reconciliation failed")?;
    output.apply_renames(&renames)?;

    let report = build_report(&output, &renames)?;
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;

    match output_path {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            info!(report = %path.display(), renamed = renames.len(), "Report written");
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn build_report<'a>(output: &OutputSet, renames: &'a RenameSet) -> Result<ReconcileReport<'a>> {
    let mut assets = BTreeMap::new();
    for (name, artifact) in &output.assets {
        let text = read_text(artifact).with_context(|| format!("Failed to read asset: {}", name))?;
        assets.insert(name.clone(), text);
    }

    Ok(ReconcileReport { renames, assets })
}

/// Digest a single file with the configured options
async fn digest_file(path: &Path, flags: &HashFlags) -> Result<()> {
    let cfg = config::config()?;

    let mut options = cfg.options_for(None);
    flags.apply_to(&mut options);
    validate_options(&options)?;

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let result = digest(&options.hash, &content);
    println!("full:  {}", result.full);
    println!("short: {}", result.short);

    Ok(())
}

/// Show the resolved configuration (for debugging)
async fn show_config() -> Result<()> {
    let cfg = config::config()?;
    let options = cfg.options_for(None);

    println!("rehash configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Hash:");
    println!("  Function:      {}", options.hash.hash_function);
    println!("  Digest:        {}", options.hash.hash_digest);
    println!("  Digest length: {}", options.hash.hash_digest_length);
    println!(
        "  Salt:          {}",
        if options.hash.hash_salt.is_some() { "(set)" } else { "(none)" }
    );
    println!();
    println!("Strategy: {}", options.strategy);
    println!();
    println!("Content types:");
    for (ext, content_type) in options.content_types.iter() {
        println!("  {}: {}", ext, content_type);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reconcile_command() {
        let cli = Cli::try_parse_from([
            "rehash",
            "reconcile",
            "snapshot.json",
            "--strategy",
            "contenthash",
            "--hash-function",
            "md5",
            "--digest-length",
            "8",
        ])
        .unwrap();

        match cli.command {
            Commands::Reconcile {
                snapshot,
                strategy,
                hash,
                output,
            } => {
                assert_eq!(snapshot, PathBuf::from("snapshot.json"));
                assert!(matches!(strategy, Some(StrategyArg::Contenthash)));
                assert_eq!(hash.hash_function, Some(HashFunction::Md5));
                assert_eq!(hash.digest_length, Some(8));
                assert!(output.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_hash_function() {
        let result = Cli::try_parse_from(["rehash", "digest", "a.js", "--hash-function", "crc32"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_options() {
        let flags = HashFlags {
            digest: Some(DigestEncoding::Base64Url),
            salt: Some("pepper".to_string()),
            ..Default::default()
        };
        let mut options = ReconcileOptions::default();
        flags.apply_to(&mut options);

        assert_eq!(options.hash.hash_digest, DigestEncoding::Base64Url);
        assert_eq!(options.hash.hash_salt.as_deref(), Some("pepper"));
        assert_eq!(options.hash.hash_function, HashFunction::Sha256);
    }

    #[tokio::test]
    async fn test_reconcile_snapshot_writes_report() {
        let temp = tempfile::TempDir::new().unwrap();
        let snapshot = temp.path().join("snapshot.json");
        let report = temp.path().join("report.json");
        std::fs::write(
            &snapshot,
            r#"{
  "units": [{ "id": "app", "name": "app", "rendered_hash": "a1b2c3",
              "files": ["app.a1b2c3.js"] }],
  "assets": { "app.a1b2c3.js": "let a = 1;" },
  "hash": { "hash_digest_length": 8 }
}"#,
        )
        .unwrap();
        let flags = HashFlags {
            digest_length: Some(8),
            ..Default::default()
        };

        reconcile_snapshot(&snapshot, Some(StrategyArg::Chunkhash), &flags, Some(&report))
            .await
            .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
        assert_eq!(written["renames"][0]["from"], "app.a1b2c3.js");
        assert_eq!(written["assets"].as_object().unwrap().len(), 1);
        assert!(written["assets"].get("app.a1b2c3.js").is_none());
    }

    #[tokio::test]
    async fn test_reconcile_snapshot_reports_missing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("nope.json");

        let err = reconcile_snapshot(&missing, None, &HashFlags::default(), None)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("nope.json"));
    }
}
