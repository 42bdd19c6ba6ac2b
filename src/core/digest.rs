//! Content digests used as filename hashes.
//!
//! A digest is computed over the artifact text, with the optional salt
//! fed into the same hasher after the content. The short form is the
//! prefix that ends up in filenames.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::Digest;

use super::error::RehashError;

/// Supported hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HashFunction {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashFunction::Md5 => "md5",
            HashFunction::Sha1 => "sha1",
            HashFunction::Sha224 => "sha224",
            HashFunction::Sha256 => "sha256",
            HashFunction::Sha384 => "sha384",
            HashFunction::Sha512 => "sha512",
        }
    }

    fn hash(&self, content: &[u8], salt: Option<&[u8]>) -> Vec<u8> {
        match self {
            HashFunction::Md5 => run::<md5::Md5>(content, salt),
            HashFunction::Sha1 => run::<sha1::Sha1>(content, salt),
            HashFunction::Sha224 => run::<sha2::Sha224>(content, salt),
            HashFunction::Sha256 => run::<sha2::Sha256>(content, salt),
            HashFunction::Sha384 => run::<sha2::Sha384>(content, salt),
            HashFunction::Sha512 => run::<sha2::Sha512>(content, salt),
        }
    }
}

fn run<D: Digest>(content: &[u8], salt: Option<&[u8]>) -> Vec<u8> {
    let mut hasher = D::new();
    hasher.update(content);
    if let Some(salt) = salt {
        hasher.update(salt);
    }
    hasher.finalize().to_vec()
}

impl Default for HashFunction {
    fn default() -> Self {
        Self::Sha256
    }
}

impl fmt::Display for HashFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashFunction {
    type Err = RehashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "md5" => Ok(HashFunction::Md5),
            "sha1" => Ok(HashFunction::Sha1),
            "sha224" => Ok(HashFunction::Sha224),
            "sha256" => Ok(HashFunction::Sha256),
            "sha384" => Ok(HashFunction::Sha384),
            "sha512" => Ok(HashFunction::Sha512),
            _ => Err(RehashError::UnsupportedHashFunction {
                name: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for HashFunction {
    type Error = RehashError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HashFunction> for String {
    fn from(value: HashFunction) -> Self {
        value.as_str().to_string()
    }
}

/// Output encoding of a digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DigestEncoding {
    Hex,
    Base64,
    /// URL-safe alphabet without padding, safe inside filenames
    Base64Url,
}

impl DigestEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestEncoding::Hex => "hex",
            DigestEncoding::Base64 => "base64",
            DigestEncoding::Base64Url => "base64url",
        }
    }

    fn encode(&self, bytes: &[u8]) -> String {
        match self {
            DigestEncoding::Hex => hex::encode(bytes),
            DigestEncoding::Base64 => STANDARD.encode(bytes),
            DigestEncoding::Base64Url => URL_SAFE_NO_PAD.encode(bytes),
        }
    }
}

impl Default for DigestEncoding {
    fn default() -> Self {
        Self::Hex
    }
}

impl fmt::Display for DigestEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestEncoding {
    type Err = RehashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hex" => Ok(DigestEncoding::Hex),
            "base64" => Ok(DigestEncoding::Base64),
            "base64url" => Ok(DigestEncoding::Base64Url),
            _ => Err(RehashError::UnsupportedDigestEncoding {
                name: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for DigestEncoding {
    type Error = RehashError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DigestEncoding> for String {
    fn from(value: DigestEncoding) -> Self {
        value.as_str().to_string()
    }
}

/// Hash configuration supplied by the host for one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashOptions {
    #[serde(default)]
    pub hash_function: HashFunction,

    #[serde(default)]
    pub hash_digest: DigestEncoding,

    #[serde(default = "default_digest_length")]
    pub hash_digest_length: usize,

    #[serde(default)]
    pub hash_salt: Option<String>,
}

pub(crate) fn default_digest_length() -> usize {
    20
}

impl Default for HashOptions {
    fn default() -> Self {
        Self {
            hash_function: HashFunction::default(),
            hash_digest: DigestEncoding::default(),
            hash_digest_length: default_digest_length(),
            hash_salt: None,
        }
    }
}

/// Partial hash options, layered over a base configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashOverrides {
    #[serde(default)]
    pub hash_function: Option<HashFunction>,

    #[serde(default)]
    pub hash_digest: Option<DigestEncoding>,

    #[serde(default)]
    pub hash_digest_length: Option<usize>,

    #[serde(default)]
    pub hash_salt: Option<String>,
}

impl HashOverrides {
    /// Overwrite the fields of `options` that are set here
    pub fn apply_to(&self, options: &mut HashOptions) {
        if let Some(function) = self.hash_function {
            options.hash_function = function;
        }
        if let Some(encoding) = self.hash_digest {
            options.hash_digest = encoding;
        }
        if let Some(length) = self.hash_digest_length {
            options.hash_digest_length = length;
        }
        if let Some(salt) = &self.hash_salt {
            options.hash_salt = Some(salt.clone());
        }
    }
}

/// A computed digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentDigest {
    /// Complete encoded digest
    pub full: String,

    /// First `hash_digest_length` characters of `full`
    pub short: String,
}

/// Digest `content` according to `options`
pub fn digest(options: &HashOptions, content: &str) -> ContentDigest {
    let salt = options
        .hash_salt
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::as_bytes);
    let raw = options.hash_function.hash(content.as_bytes(), salt);
    let full = options.hash_digest.encode(&raw);
    let short = full.chars().take(options.hash_digest_length).collect();

    ContentDigest { full, short }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_value() {
        let options = HashOptions {
            hash_digest_length: 8,
            ..Default::default()
        };

        let d = digest(&options, "abc");
        assert_eq!(
            d.full,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(d.short, "ba7816bf");
    }

    #[test]
    fn test_md5_hex_known_value() {
        let options = HashOptions {
            hash_function: HashFunction::Md5,
            ..Default::default()
        };

        let d = digest(&options, "");
        assert_eq!(d.full, "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(d.short, "d41d8cd98f00b204e980");
    }

    #[test]
    fn test_salt_is_appended_after_content() {
        let salted = HashOptions {
            hash_salt: Some("c".to_string()),
            ..Default::default()
        };

        // "ab" + salt "c" hashes the same bytes as "abc"
        assert_eq!(
            digest(&salted, "ab").full,
            digest(&HashOptions::default(), "abc").full
        );
        assert_ne!(
            digest(&salted, "ab").full,
            digest(&HashOptions::default(), "ab").full
        );
    }

    #[test]
    fn test_empty_salt_is_ignored() {
        let salted = HashOptions {
            hash_salt: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(digest(&salted, "x"), digest(&HashOptions::default(), "x"));
    }

    #[test]
    fn test_base64_encodings() {
        let b64 = HashOptions {
            hash_digest: DigestEncoding::Base64,
            hash_digest_length: 100,
            ..Default::default()
        };
        let url = HashOptions {
            hash_digest: DigestEncoding::Base64Url,
            hash_digest_length: 100,
            ..Default::default()
        };

        let standard = digest(&b64, "abc").full;
        assert!(standard.ends_with('='));
        let safe = digest(&url, "abc").full;
        assert!(!safe.contains('=') && !safe.contains('/') && !safe.contains('+'));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("SHA512".parse::<HashFunction>().unwrap(), HashFunction::Sha512);
        assert_eq!("base64url".parse::<DigestEncoding>().unwrap(), DigestEncoding::Base64Url);
        assert!(matches!(
            "md4".parse::<HashFunction>(),
            Err(RehashError::UnsupportedHashFunction { .. })
        ));
        assert!(matches!(
            "latin1".parse::<DigestEncoding>(),
            Err(RehashError::UnsupportedDigestEncoding { .. })
        ));
    }

    #[test]
    fn test_overrides_only_touch_set_fields() {
        let mut options = HashOptions {
            hash_salt: Some("keep".to_string()),
            ..Default::default()
        };
        let overrides = HashOverrides {
            hash_digest_length: Some(4),
            ..Default::default()
        };

        overrides.apply_to(&mut options);
        assert_eq!(options.hash_digest_length, 4);
        assert_eq!(options.hash_function, HashFunction::Sha256);
        assert_eq!(options.hash_salt.as_deref(), Some("keep"));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: HashOptions =
            serde_json::from_str(r#"{"hash_function": "sha1", "hash_digest_length": 6}"#).unwrap();
        assert_eq!(options.hash_function, HashFunction::Sha1);
        assert_eq!(options.hash_digest, DigestEncoding::Hex);
        assert_eq!(options.hash_digest_length, 6);
        assert!(options.hash_salt.is_none());
    }
}
