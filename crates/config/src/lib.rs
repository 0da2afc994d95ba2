//! Configuration loading for the badge uploader.
//!
//! Credentials live in a Java-style properties file (`key=value`, `#`/`!`
//! comments). The file format is a deployment contract shared with the
//! badge-management service's other tooling, so it is parsed as-is.

use std::fmt;
use std::path::Path;

/// Credentials and hashing key for one run. Loaded once, immutable.
#[derive(Debug, Clone)]
pub struct Config {
    /// Service root, e.g. "https://badges.example.com". No trailing slash.
    pub base_url: String,
    /// Application id for the token exchange.
    pub app_id: String,
    /// Application secret for the token exchange.
    pub secret: String,
    /// Shared HMAC key. Used as raw UTF-8 bytes, never decoded.
    pub badging_key: String,
}

/// Error type for config loading. All variants are fatal before any
/// input or network work happens.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read
    Io { path: String, source: std::io::Error },
    /// A non-comment line without a `=` or `:` separator
    Malformed { line_no: usize, line: String },
    /// A required key is absent or empty after parsing
    MissingKey(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read config file {}: {}", path, source)
            }
            ConfigError::Malformed { line_no, line } => {
                write!(f, "config file line {}: no key/value separator in {:?}", line_no, line)
            }
            ConfigError::MissingKey(key) => {
                write!(f, "config file is missing required property {:?}", key)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load and validate a properties file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let entries = parse_properties(&contents)?;

        let get = |key: &'static str| -> Result<String, ConfigError> {
            // Last occurrence wins, matching java.util.Properties
            match entries.iter().rev().find(|(k, _)| k == key) {
                Some((_, value)) if !value.is_empty() => Ok(value.clone()),
                _ => Err(ConfigError::MissingKey(key)),
            }
        };

        let mut base_url = get("baseUrl")?;
        if base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Config {
            base_url,
            app_id: get("appId")?,
            secret: get("secret")?,
            badging_key: get("badgingKey")?,
        })
    }
}

/// Parse `key=value` / `key: value` lines. Comment lines start with `#`
/// or `!`. Keys and values are trimmed. Order of appearance is kept.
fn parse_properties(contents: &str) -> Result<Vec<(String, String)>, ConfigError> {
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);

    let mut entries = Vec::new();
    for (idx, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let sep = line.find(['=', ':']).ok_or_else(|| ConfigError::Malformed {
            line_no: idx + 1,
            line: line.to_string(),
        })?;
        let key = line[..sep].trim();
        if key.is_empty() {
            return Err(ConfigError::Malformed {
                line_no: idx + 1,
                line: line.to_string(),
            });
        }
        let value = line[sep + 1..].trim();

        entries.push((key.to_string(), value.to_string()));
    }

    Ok(entries)
}
