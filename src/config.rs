//! Configuration for rehash.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags (applied by the CLI)
//! 2. Environment variables (REHASH_HASH_FUNCTION, REHASH_HASH_DIGEST,
//!    REHASH_HASH_DIGEST_LENGTH, REHASH_HASH_SALT, REHASH_STRATEGY)
//! 3. Hash options recorded in the build snapshot
//! 4. Config file (.rehash/config.yaml)
//! 5. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .rehash/config.yaml
//! - Falls back to the user config directory (e.g. ~/.config/rehash/config.yaml)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::{
    ContentTypes, DigestEncoding, HashFunction, HashOverrides, HashStrategy, ReconcileOptions,
};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const ENV_HASH_FUNCTION: &str = "REHASH_HASH_FUNCTION";
const ENV_HASH_DIGEST: &str = "REHASH_HASH_DIGEST";
const ENV_HASH_DIGEST_LENGTH: &str = "REHASH_HASH_DIGEST_LENGTH";
const ENV_HASH_SALT: &str = "REHASH_HASH_SALT";
const ENV_STRATEGY: &str = "REHASH_STRATEGY";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub hash: HashOverrides,
    #[serde(default)]
    pub strategy: Option<HashStrategy>,
    /// Primary extension -> content hash key
    #[serde(default)]
    pub content_types: Option<BTreeMap<String, String>>,
}

/// Overrides taken from the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub hash: HashOverrides,
    pub strategy: Option<HashStrategy>,
}

/// Resolved configuration, before per-invocation inputs are layered on
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Defaults merged with the config file
    pub base: ReconcileOptions,
    /// Environment overrides, applied after snapshot options
    pub env: EnvOverrides,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Effective options for one snapshot
    pub fn options_for(&self, snapshot: Option<&HashOverrides>) -> ReconcileOptions {
        let mut options = self.base.clone();
        if let Some(snapshot) = snapshot {
            snapshot.apply_to(&mut options.hash);
        }
        self.env.hash.apply_to(&mut options.hash);
        if let Some(strategy) = self.env.strategy {
            options.strategy = strategy;
        }
        options
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".rehash").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let user_config = dirs::config_dir()?.join("rehash").join("config.yaml");
    user_config.exists().then_some(user_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Merge a config file over the defaults
fn base_options(file: Option<&ConfigFile>) -> ReconcileOptions {
    let mut options = ReconcileOptions::default();

    if let Some(file) = file {
        file.hash.apply_to(&mut options.hash);
        if let Some(strategy) = file.strategy {
            options.strategy = strategy;
        }
        if let Some(ref types) = file.content_types {
            options.content_types = ContentTypes::new(types.clone());
        }
    }

    options
}

/// Read overrides through `get`, so tests need not touch the process environment
fn env_overrides_from<F>(get: F) -> Result<EnvOverrides>
where
    F: Fn(&str) -> Option<String>,
{
    let mut env = EnvOverrides::default();

    if let Some(value) = get(ENV_HASH_FUNCTION) {
        env.hash.hash_function = Some(
            value
                .parse::<HashFunction>()
                .with_context(|| format!("Invalid {}", ENV_HASH_FUNCTION))?,
        );
    }
    if let Some(value) = get(ENV_HASH_DIGEST) {
        env.hash.hash_digest = Some(
            value
                .parse::<DigestEncoding>()
                .with_context(|| format!("Invalid {}", ENV_HASH_DIGEST))?,
        );
    }
    if let Some(value) = get(ENV_HASH_DIGEST_LENGTH) {
        env.hash.hash_digest_length = Some(
            value
                .parse::<usize>()
                .with_context(|| format!("Invalid {}: {}", ENV_HASH_DIGEST_LENGTH, value))?,
        );
    }
    if let Some(value) = get(ENV_HASH_SALT) {
        env.hash.hash_salt = Some(value);
    }
    if let Some(value) = get(ENV_STRATEGY) {
        env.strategy = Some(
            value
                .parse::<HashStrategy>()
                .with_context(|| format!("Invalid {}", ENV_STRATEGY))?,
        );
    }

    Ok(env)
}

/// Reject options no reconciliation can work with
pub fn validate_options(options: &ReconcileOptions) -> Result<()> {
    if options.hash.hash_digest_length == 0 {
        anyhow::bail!("hash_digest_length must be at least 1");
    }
    for (ext, content_type) in options.content_types.iter() {
        if !ext.starts_with('.') || ext.len() < 2 {
            anyhow::bail!("Content type extension must look like '.js', got '{}'", ext);
        }
        if content_type.is_empty() {
            anyhow::bail!("Content type for '{}' cannot be empty", ext);
        }
    }
    Ok(())
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = find_config_file();

    let file = match config_file {
        Some(ref path) => Some(load_config_file(path)?),
        None => None,
    };

    let base = base_options(file.as_ref());
    validate_options(&base)?;

    let env = env_overrides_from(|key| std::env::var(key).ok())?;

    Ok(ResolvedConfig {
        base,
        env,
        config_file,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}
