use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid source registry: {0}")]
    Json(#[from] serde_json::Error),
}

/// Server settings, read from a TOML file.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub bind_address: String,
    /// Path of the JSON source registry
    pub sources_path: PathBuf,
    /// Per-source HTTP timeout in seconds
    pub fetch_timeout_secs: u64,
    /// How many sources are fetched at once
    pub fetch_concurrency: usize,
    /// Background refresh interval in minutes, 0 disables it
    pub refresh_interval: u64,
    pub static_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            sources_path: PathBuf::from("sources.json"),
            fetch_timeout_secs: 30,
            fetch_concurrency: 4,
            refresh_interval: 0,
            static_dir: PathBuf::from("static"),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = read(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

/// One entry of the source registry.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SourceConfig {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Load the source registry, a JSON array of `{name, url, tags}`.
pub fn load_sources<P: AsRef<Path>>(path: P) -> Result<Vec<SourceConfig>, ConfigError> {
    let content = read(path.as_ref())?;
    parse_sources(&content)
}

pub fn parse_sources(content: &str) -> Result<Vec<SourceConfig>, ConfigError> {
    let sources: Vec<SourceConfig> = serde_json::from_str(content)?;
    Ok(sources)
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    mod settings_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = Config::default();
            assert_eq!(config.bind_address, "0.0.0.0:8000");
            assert_eq!(config.sources_path, PathBuf::from("sources.json"));
            assert_eq!(config.fetch_timeout_secs, 30);
            assert_eq!(config.fetch_concurrency, 4);
            assert_eq!(config.refresh_interval, 0);
        }

        #[test]
        fn test_load_valid_config() {
            let content = r#"
                bind_address = "127.0.0.1:9000"
                sources_path = "/etc/retro/sources.json"
                fetch_timeout_secs = 10
                fetch_concurrency = 8
                refresh_interval = 30
            "#;

            let mut temp_file = NamedTempFile::new().unwrap();
            temp_file.write_all(content.as_bytes()).unwrap();

            let config = Config::load(temp_file.path()).unwrap();

            assert_eq!(config.bind_address, "127.0.0.1:9000");
            assert_eq!(config.sources_path, PathBuf::from("/etc/retro/sources.json"));
            assert_eq!(config.fetch_timeout_secs, 10);
            assert_eq!(config.fetch_concurrency, 8);
            assert_eq!(config.refresh_interval, 30);
            assert_eq!(config.static_dir, PathBuf::from("static"));
        }

        #[test]
        fn test_partial_config_keeps_defaults() {
            let config = Config::from_str("refresh_interval = 5").unwrap();

            assert_eq!(config.refresh_interval, 5);
            assert_eq!(config.bind_address, "0.0.0.0:8000");
            assert_eq!(config.fetch_timeout_secs, 30);
        }

        #[test]
        fn test_empty_config_is_default() {
            let config = Config::from_str("").unwrap();
            assert_eq!(config, Config::default());
        }

        #[test]
        fn test_load_config_missing_file() {
            let result = Config::load("/nonexistent/path/retro_news.toml");
            assert!(matches!(result, Err(ConfigError::Io { .. })));
        }

        #[test]
        fn test_load_or_default_missing_file() {
            let config = Config::load_or_default("/nonexistent/path/retro_news.toml").unwrap();
            assert_eq!(config, Config::default());
        }

        #[test]
        fn test_load_config_invalid_toml() {
            let mut temp_file = NamedTempFile::new().unwrap();
            temp_file
                .write_all(b"this is not valid toml {{{")
                .unwrap();

            let result = Config::load_or_default(temp_file.path());
            assert!(matches!(result, Err(ConfigError::Toml(_))));
        }

        #[test]
        fn test_wrong_field_type() {
            let result = Config::from_str("fetch_timeout_secs = \"soon\"");
            assert!(result.is_err());
        }
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn test_parse_sources() {
            let content = r#"[
                {"name": "Smashing", "url": "https://smashing.example/feed", "tags": ["design", "UX"]},
                {"name": "Mind", "url": "https://mind.example/rss", "tags": ["psychology"]}
            ]"#;

            let sources = parse_sources(content).unwrap();

            assert_eq!(sources.len(), 2);
            assert_eq!(sources[0].name, "Smashing");
            assert_eq!(sources[0].url, "https://smashing.example/feed");
            assert_eq!(sources[0].tags, vec!["design", "UX"]);
            assert_eq!(sources[1].tags, vec!["psychology"]);
        }

        #[test]
        fn test_tags_default_to_empty() {
            let sources =
                parse_sources(r#"[{"name": "Plain", "url": "https://plain.example/rss"}]"#)
                    .unwrap();
            assert!(sources[0].tags.is_empty());
        }

        #[test]
        fn test_registry_order_preserved() {
            let content = r#"[
                {"name": "C", "url": "u3", "tags": []},
                {"name": "A", "url": "u1", "tags": []},
                {"name": "B", "url": "u2", "tags": []}
            ]"#;

            let names: Vec<_> = parse_sources(content)
                .unwrap()
                .into_iter()
                .map(|s| s.name)
                .collect();
            assert_eq!(names, vec!["C", "A", "B"]);
        }

        #[test]
        fn test_missing_url_is_error() {
            let result = parse_sources(r#"[{"name": "Broken", "tags": []}]"#);
            assert!(matches!(result, Err(ConfigError::Json(_))));
        }

        #[test]
        fn test_not_an_array_is_error() {
            let result = parse_sources(r#"{"name": "A", "url": "u1"}"#);
            assert!(result.is_err());
        }

        #[test]
        fn test_load_sources_from_file() {
            let mut temp_file = NamedTempFile::new().unwrap();
            temp_file
                .write_all(br#"[{"name": "A", "url": "u1", "tags": ["design"]}]"#)
                .unwrap();

            let sources = load_sources(temp_file.path()).unwrap();
            assert_eq!(sources.len(), 1);
            assert_eq!(sources[0].name, "A");
        }

        #[test]
        fn test_load_sources_missing_file_names_path() {
            let err = load_sources("/nonexistent/sources.json").unwrap_err();
            assert!(err.to_string().contains("/nonexistent/sources.json"));
        }
    }
}
