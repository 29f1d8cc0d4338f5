//! Edge configuration.
//!
//! Configuration is loaded in layers with the following precedence (lowest to highest):
//! 1. Environment variables (EXODUS_*)
//! 2. TOML configuration file
//! 3. Command-line arguments
//!
//! Alias groups only come from the TOML file. The loaded configuration is
//! immutable for the lifetime of the process.

use std::path::Path;
use std::path::PathBuf;

use exodus_alias::AliasResolver;
use exodus_alias::AliasRule;
use exodus_alias::MAX_RULES_PER_GROUP;
use exodus_origin::constants::ORIGINAL_URI_HEADER;
use serde::Deserialize;
use serde::Serialize;
use snafu::ResultExt;
use snafu::Snafu;

/// Configuration of the origin request rewriter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeConfig {
    /// Versioned index holding the published content records.
    #[serde(default)]
    pub table: TableConfig,

    /// Path alias groups.
    #[serde(default)]
    pub aliases: AliasConfig,

    /// Header that carries the originally requested path downstream.
    #[serde(default = "default_original_uri_header")]
    pub original_uri_header: String,

    /// Default `tracing` filter directive, used when `RUST_LOG` is unset.
    #[serde(default)]
    pub log_filter: Option<String>,
}

/// Location of the versioned index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Table name. Required.
    #[serde(default)]
    pub name: String,

    /// Region the index client connects to.
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            region: default_region(),
        }
    }
}

/// The two alias groups applied to every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasConfig {
    /// Content-origin aliases, e.g. `/content/origin` -> `/origin`.
    #[serde(default)]
    pub origin: Vec<AliasRule>,

    /// Regional mirror aliases. Never applied to listing paths.
    #[serde(default)]
    pub rhui: Vec<AliasRule>,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            table: TableConfig::default(),
            aliases: AliasConfig::default(),
            original_uri_header: default_original_uri_header(),
            log_filter: None,
        }
    }
}

impl EdgeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).context(ReadFileSnafu { path })?;
        toml::from_str(&content).context(ParseTomlSnafu { path })
    }

    /// Load configuration from environment variables.
    ///
    /// Recognized: `EXODUS_TABLE_NAME`, `EXODUS_REGION`,
    /// `EXODUS_ORIGINAL_URI_HEADER`, `EXODUS_LOG`.
    pub fn from_env() -> Self {
        Self {
            table: TableConfig {
                name: parse_env("EXODUS_TABLE_NAME").unwrap_or_default(),
                region: parse_env("EXODUS_REGION").unwrap_or_else(default_region),
            },
            aliases: AliasConfig::default(),
            original_uri_header: parse_env("EXODUS_ORIGINAL_URI_HEADER").unwrap_or_else(default_original_uri_header),
            log_filter: parse_env("EXODUS_LOG"),
        }
    }

    /// Merge configuration from another source.
    ///
    /// Fields in `other` that are set or non-default override fields in `self`.
    pub fn merge(&mut self, other: Self) {
        if !other.table.name.is_empty() {
            self.table.name = other.table.name;
        }
        if other.table.region != default_region() {
            self.table.region = other.table.region;
        }
        if !other.aliases.origin.is_empty() {
            self.aliases.origin = other.aliases.origin;
        }
        if !other.aliases.rhui.is_empty() {
            self.aliases.rhui = other.aliases.rhui;
        }
        if other.original_uri_header != default_original_uri_header() {
            self.original_uri_header = other.original_uri_header;
        }
        if other.log_filter.is_some() {
            self.log_filter = other.log_filter;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table.name.trim().is_empty() {
            return ValidationSnafu {
                message: "table.name must be set",
            }
            .fail();
        }

        if self.original_uri_header.is_empty()
            || !self.original_uri_header.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return ValidationSnafu {
                message: format!(
                    "original_uri_header '{}' must be a non-empty token of ASCII letters, digits and '-'",
                    self.original_uri_header
                ),
            }
            .fail();
        }

        for (group, rules) in [("origin", &self.aliases.origin), ("rhui", &self.aliases.rhui)] {
            if rules.len() > MAX_RULES_PER_GROUP {
                return ValidationSnafu {
                    message: format!("aliases.{group} has {} rules, maximum is {MAX_RULES_PER_GROUP}", rules.len()),
                }
                .fail();
            }
            if let Some(rule) = rules.iter().find(|rule| rule.src.is_empty()) {
                return ValidationSnafu {
                    message: format!("aliases.{group} contains a rule with empty src (dest '{}')", rule.dest),
                }
                .fail();
            }
        }

        Ok(())
    }

    /// The alias resolver described by this configuration.
    pub fn resolver(&self) -> AliasResolver {
        AliasResolver::origin_and_rhui(self.aliases.origin.clone(), self.aliases.rhui.clone())
    }
}

/// Layer environment, an optional TOML file and CLI overrides, then validate.
pub fn load_config(toml_path: Option<&Path>, overrides: EdgeConfig) -> Result<EdgeConfig, ConfigError> {
    let mut config = EdgeConfig::from_env();

    if let Some(path) = toml_path {
        config.merge(EdgeConfig::from_toml_file(path)?);
    }

    config.merge(overrides);
    config.validate()?;
    Ok(config)
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_original_uri_header() -> String {
    ORIGINAL_URI_HEADER.to_string()
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.parse().ok()
}

/// Configuration loading and parsing errors.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    #[snafu(display("failed to read config file {}: {source}", path.display()))]
    ReadFile { path: PathBuf, source: std::io::Error },

    #[snafu(display("failed to parse TOML config file {}: {source}", path.display()))]
    ParseToml { path: PathBuf, source: toml::de::Error },

    #[snafu(display("configuration validation failed: {message}"))]
    Validation { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> EdgeConfig {
        EdgeConfig {
            table: TableConfig {
                name: "exodus-cdn".into(),
                region: default_region(),
            },
            ..EdgeConfig::default()
        }
    }

    #[test]
    fn test_default_requires_table() {
        assert!(EdgeConfig::default().validate().is_err());
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let config: EdgeConfig = toml::from_str(
            r#"
            [table]
            name = "exodus-cdn"

            [[aliases.origin]]
            src = "/content/origin"
            dest = "/origin"

            [[aliases.rhui]]
            src = "/content/dist/rhel/rhui"
            dest = "/content/dist/rhel"
            "#,
        )
        .unwrap();

        assert_eq!(config.table.name, "exodus-cdn");
        assert_eq!(config.table.region, "us-east-1");
        assert_eq!(config.original_uri_header, ORIGINAL_URI_HEADER);
        assert_eq!(config.aliases.origin, vec![AliasRule::new("/content/origin", "/origin")]);
        assert_eq!(config.aliases.rhui.len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_empty_src() {
        let mut config = valid();
        config.aliases.rhui.push(AliasRule::new("", "/anything"));
        assert!(matches!(config.validate(), Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_validation_rejects_bad_header_name() {
        let mut config = valid();
        config.original_uri_header = "bad header".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_oversized_group() {
        let mut config = valid();
        config.aliases.origin = (0..=MAX_RULES_PER_GROUP).map(|i| AliasRule::new(format!("/a{i}"), "/b")).collect();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge() {
        let mut base = valid();
        base.aliases.origin = vec![AliasRule::new("/a", "/b")];

        let mut overrides = EdgeConfig::default();
        overrides.table.name = "other-table".into();
        overrides.log_filter = Some("debug".into());
        base.merge(overrides);

        assert_eq!(base.table.name, "other-table");
        assert_eq!(base.log_filter.as_deref(), Some("debug"));
        // Unset fields in the override leave the base untouched.
        assert_eq!(base.aliases.origin, vec![AliasRule::new("/a", "/b")]);
        assert_eq!(base.original_uri_header, ORIGINAL_URI_HEADER);
    }

    #[test]
    fn test_resolver_applies_listing_exemption() {
        let mut config = valid();
        config.aliases.rhui = vec![AliasRule::new("/rhui", "/dist")];
        let resolver = config.resolver();
        assert_eq!(resolver.resolve("/rhui/repo/listing"), "/rhui/repo/listing");
        assert_eq!(resolver.resolve("/rhui/repo/repomd.xml"), "/dist/repo/repomd.xml");
    }
}
