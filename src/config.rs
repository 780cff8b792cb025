//! Exporter configuration.
//!
//! Settings come from an optional TOML file and are overridden by command
//! line flags:
//!
//! ```toml
//! slabinfo_path = "/proc/slabinfo"
//! listen = "0.0.0.0:9555"
//!
//! [events]
//! regex = "^kmalloc"
//! ```

use std::net::{AddrParseError, SocketAddr};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::collector::slabinfo::{DEFAULT_SLABINFO_PATH, FilterError, SlabCollector};
use crate::collector::traits::FileSystem;

/// Listen address used when none is configured.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:9555";

/// Error type for configuration problems. All of them are fatal at startup.
#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The config file is not valid TOML or has unknown keys.
    Parse {
        path: Option<PathBuf>,
        source: toml::de::Error,
    },
    /// The `events.regex` inclusion pattern does not compile.
    InvalidFilterPattern(FilterError),
    /// The listen address is not `host:port`.
    InvalidListenAddress {
        addr: String,
        source: AddrParseError,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read config {}: {}", path.display(), source)
            }
            ConfigError::Parse {
                path: Some(path),
                source,
            } => write!(f, "invalid config {}: {}", path.display(), source),
            ConfigError::Parse { path: None, source } => write!(f, "invalid config: {}", source),
            ConfigError::InvalidFilterPattern(e) => write!(f, "{}", e),
            ConfigError::InvalidListenAddress { addr, source } => {
                write!(f, "invalid listen address {:?}: {}", addr, source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::InvalidFilterPattern(e) => Some(e),
            ConfigError::InvalidListenAddress { source, .. } => Some(source),
        }
    }
}

impl From<FilterError> for ConfigError {
    fn from(e: FilterError) -> Self {
        ConfigError::InvalidFilterPattern(e)
    }
}

/// Event filtering settings (`[events]` table).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventsConfig {
    /// Inclusion pattern applied to raw slabinfo lines. Empty means unset.
    pub regex: Option<String>,
}

/// Top-level exporter settings. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExporterConfig {
    pub slabinfo_path: Option<PathBuf>,
    pub listen: Option<String>,
    pub events: EventsConfig,
}

impl ExporterConfig {
    /// Parses TOML config content.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse { path: None, source })
    }

    /// Reads and parses a config file.
    pub fn load<F: FileSystem>(fs: &F, path: &Path) -> Result<Self, ConfigError> {
        let content = fs.read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })
    }

    /// Layers `overrides` on top of `self`: every value set in `overrides`
    /// wins.
    pub fn merge(self, overrides: ExporterConfig) -> Self {
        Self {
            slabinfo_path: overrides.slabinfo_path.or(self.slabinfo_path),
            listen: overrides.listen.or(self.listen),
            events: EventsConfig {
                regex: overrides.events.regex.or(self.events.regex),
            },
        }
    }

    /// Returns the slabinfo path, falling back to `/proc/slabinfo`.
    pub fn slabinfo_path(&self) -> PathBuf {
        self.slabinfo_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SLABINFO_PATH))
    }

    /// Returns the inclusion pattern, treating an empty string as unset.
    pub fn filter_pattern(&self) -> Option<&str> {
        self.events.regex.as_deref().filter(|p| !p.is_empty())
    }

    /// Parses the listen address, falling back to [`DEFAULT_LISTEN`].
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = self.listen.as_deref().unwrap_or(DEFAULT_LISTEN);
        addr.parse()
            .map_err(|source| ConfigError::InvalidListenAddress {
                addr: addr.to_string(),
                source,
            })
    }

    /// Builds a collector over `fs`. Fails fast on an invalid pattern.
    pub fn build_collector<F: FileSystem>(&self, fs: F) -> Result<SlabCollector<F>, ConfigError> {
        Ok(SlabCollector::new(
            fs,
            self.slabinfo_path(),
            self.filter_pattern(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockFs, SLABINFO_PATH};

    #[test]
    fn test_parse_full_config() {
        let config = ExporterConfig::parse(
            r#"
slabinfo_path = "/host/proc/slabinfo"
listen = "127.0.0.1:9100"

[events]
regex = "^kmalloc"
"#,
        )
        .unwrap();

        assert_eq!(
            config.slabinfo_path,
            Some(PathBuf::from("/host/proc/slabinfo"))
        );
        assert_eq!(config.filter_pattern(), Some("^kmalloc"));
        assert_eq!(
            config.listen_addr().unwrap(),
            "127.0.0.1:9100".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = ExporterConfig::parse("").unwrap();

        assert_eq!(config, ExporterConfig::default());
        assert_eq!(config.slabinfo_path(), PathBuf::from("/proc/slabinfo"));
        assert_eq!(config.filter_pattern(), None);
        assert_eq!(
            config.listen_addr().unwrap(),
            DEFAULT_LISTEN.parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_empty_regex_is_unset() {
        let config = ExporterConfig::parse("[events]\nregex = \"\"\n").unwrap();
        assert_eq!(config.filter_pattern(), None);
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        let err = ExporterConfig::parse("[events]\nregexp = \"x\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { path: None, .. }));
    }

    #[test]
    fn test_merge_overrides_win() {
        let file = ExporterConfig {
            slabinfo_path: Some(PathBuf::from("/a")),
            listen: Some("127.0.0.1:1".to_string()),
            events: EventsConfig {
                regex: Some("^dentry".to_string()),
            },
        };
        let flags = ExporterConfig {
            listen: Some("127.0.0.1:2".to_string()),
            events: EventsConfig {
                regex: Some("^kmalloc".to_string()),
            },
            ..ExporterConfig::default()
        };

        let merged = file.merge(flags);
        assert_eq!(merged.slabinfo_path, Some(PathBuf::from("/a")));
        assert_eq!(merged.listen.as_deref(), Some("127.0.0.1:2"));
        assert_eq!(merged.filter_pattern(), Some("^kmalloc"));
    }

    #[test]
    fn test_invalid_listen_address() {
        let config = ExporterConfig {
            listen: Some("localhost".to_string()),
            ..ExporterConfig::default()
        };
        assert!(matches!(
            config.listen_addr(),
            Err(ConfigError::InvalidListenAddress { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut fs = MockFs::new();
        fs.add_file("/etc/slab-exporter.toml", "[events]\nregex = \"^ext4\"\n");

        let config = ExporterConfig::load(&fs, Path::new("/etc/slab-exporter.toml")).unwrap();
        assert_eq!(config.filter_pattern(), Some("^ext4"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ExporterConfig::load(&MockFs::new(), Path::new("/missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/missing.toml"));
    }

    #[test]
    fn test_load_reports_path_on_syntax_error() {
        let mut fs = MockFs::new();
        fs.add_file("/etc/bad.toml", "[events\n");

        let err = ExporterConfig::load(&fs, Path::new("/etc/bad.toml")).unwrap_err();
        assert!(err.to_string().starts_with("invalid config /etc/bad.toml"));
    }

    #[test]
    fn test_build_collector() {
        let config = ExporterConfig {
            slabinfo_path: Some(PathBuf::from(SLABINFO_PATH)),
            events: EventsConfig {
                regex: Some("^dentry".to_string()),
            },
            ..ExporterConfig::default()
        };

        let collector = config.build_collector(MockFs::typical_slabinfo()).unwrap();
        let snapshot = collector.collect();
        assert_eq!(snapshot.pools, 1);
        assert_eq!(snapshot.measurements[0].label_value, "dentry");
    }

    #[test]
    fn test_build_collector_invalid_pattern() {
        let config = ExporterConfig {
            events: EventsConfig {
                regex: Some("slab[".to_string()),
            },
            ..ExporterConfig::default()
        };

        let err = config.build_collector(MockFs::new()).err().unwrap();
        assert!(matches!(err, ConfigError::InvalidFilterPattern(_)));
    }
}
