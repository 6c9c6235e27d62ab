//! Configuration for epubkeep.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (EPUBKEEP_EPUB_VERSION, EPUBKEEP_CONFIG)
//! 2. Project config file (.epubkeep/config.yaml, searched upwards)
//! 3. User config file (<config dir>/epubkeep/config.yaml)
//! 4. Defaults

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::RegistryConfig;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub package: PackageConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    /// Extension → media type overrides
    #[serde(default)]
    pub media_types: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageConfig {
    /// Package version for new manifests ("2.0" or "3.0")
    pub epub_version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchConfig {
    pub debounce_ms: Option<u64>,
    pub reappear_timeout_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub epub_version: String,
    pub watch: WatchSettings,
    pub media_types: HashMap<String, String>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub debounce_ms: u64,
    pub reappear_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            reappear_timeout_ms: 1000,
            poll_interval_ms: 50,
        }
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            epub_version: default_epub_version(),
            watch: WatchSettings::default(),
            media_types: HashMap::new(),
            config_file: None,
        }
    }
}

fn default_epub_version() -> String {
    "2.0".to_string()
}

impl ResolvedConfig {
    /// Settings handed to the registry constructor
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            epub_version: self.epub_version.clone(),
            debounce: Duration::from_millis(self.watch.debounce_ms),
            reappear_timeout: Duration::from_millis(self.watch.reappear_timeout_ms),
            poll_interval: Duration::from_millis(self.watch.poll_interval_ms),
            media_types: self.media_types.clone(),
        }
    }

    /// Same config with a different package version
    pub fn with_epub_version(mut self, version: impl Into<String>) -> Self {
        self.epub_version = version.into();
        self
    }
}

/// Find config file by searching current directory and parents,
/// then the user config directory
fn find_config_file() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var("EPUBKEEP_CONFIG") {
        return Some(PathBuf::from(explicit));
    }

    if let Ok(mut current) = std::env::current_dir() {
        loop {
            let config_path = current.join(".epubkeep").join("config.yaml");
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }
    }

    let user_config = dirs::config_dir()?.join("epubkeep").join("config.yaml");
    user_config.exists().then_some(user_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Merge a parsed config file over the defaults
fn resolve(file: Option<ConfigFile>, config_file: Option<PathBuf>) -> ResolvedConfig {
    let defaults = WatchSettings::default();

    let Some(file) = file else {
        return ResolvedConfig {
            config_file,
            ..ResolvedConfig::default()
        };
    };

    ResolvedConfig {
        epub_version: file
            .package
            .epub_version
            .unwrap_or_else(default_epub_version),
        watch: WatchSettings {
            debounce_ms: file.watch.debounce_ms.unwrap_or(defaults.debounce_ms),
            reappear_timeout_ms: file
                .watch
                .reappear_timeout_ms
                .unwrap_or(defaults.reappear_timeout_ms),
            poll_interval_ms: file
                .watch
                .poll_interval_ms
                .unwrap_or(defaults.poll_interval_ms),
        },
        media_types: file.media_types,
        config_file,
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = find_config_file();

    let file = match &config_file {
        Some(path) => Some(load_config_file(path)?),
        None => None,
    };

    let mut config = resolve(file, config_file);

    if let Ok(version) = std::env::var("EPUBKEEP_EPUB_VERSION") {
        config.epub_version = version;
    }

    if let Some(path) = &config.config_file {
        tracing::debug!("Loaded config from {}", path.display());
    }

    Ok(config)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let config = resolve(None, None);

        assert_eq!(config.epub_version, "2.0");
        assert_eq!(config.watch.reappear_timeout_ms, 1000);
        assert!(config.media_types.is_empty());
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".epubkeep");
        std::fs::create_dir_all(&dir).unwrap();

        let config_path = dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1"
package:
  epub_version: "3.0"
watch:
  reappear_timeout_ms: 250
media_types:
  xht: application/xhtml+xml
"#
        )
        .unwrap();

        let parsed = load_config_file(&config_path).unwrap();
        assert_eq!(parsed.version, "1");
        assert_eq!(parsed.package.epub_version.as_deref(), Some("3.0"));

        let config = resolve(Some(parsed), Some(config_path.clone()));
        assert_eq!(config.epub_version, "3.0");
        assert_eq!(config.watch.reappear_timeout_ms, 250);
        // unset fields fall back to defaults
        assert_eq!(config.watch.debounce_ms, 100);
        assert_eq!(
            config.media_types.get("xht").map(String::as_str),
            Some("application/xhtml+xml")
        );
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_registry_config_conversion() {
        let config = ResolvedConfig::default().with_epub_version("3.0");
        let registry = config.registry_config();

        assert_eq!(registry.epub_version, "3.0");
        assert_eq!(registry.reappear_timeout, Duration::from_secs(1));
        assert_eq!(registry.poll_interval, Duration::from_millis(50));
    }

    #[test]
    fn test_invalid_yaml_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "version: [unterminated").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
