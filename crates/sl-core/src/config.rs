//! Configuration types and parsing for stepladder.yml

use crate::catalog::{CatalogPolicy, CatalogWarning, MigrationCatalog, MigrationDefinition};
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Config file names searched by [`Config::load_from_dir`], in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["stepladder.yml", "stepladder.yaml"];

const MEMORY_DB_PATH: &str = ":memory:";

/// Project configuration from stepladder.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Database holding both the schema and the ledger tables
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Option key under which the installed version is stored
    #[serde(default = "default_version_option")]
    pub version_option: String,

    /// Upgrade to the latest migration whenever the database is opened
    #[serde(default = "default_true")]
    pub auto_upgrade: bool,

    /// Reaction to migrations declared out of version order
    #[serde(default)]
    pub catalog_policy: CatalogPolicy,

    /// Migration definitions, in declaration order
    #[serde(default)]
    pub migrations: Vec<MigrationDefinition>,

    /// SQL executed for each named step
    #[serde(default)]
    pub steps: BTreeMap<String, String>,
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// DuckDB file path, relative to the project directory, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "stepladder.duckdb".to_string()
}

fn default_version_option() -> String {
    "schema_version".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                message: format!("{}: {e}", path.display()),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for stepladder.yml or stepladder.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
            .map_or_else(
                || {
                    Err(CoreError::ConfigNotFound {
                        path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
                    })
                },
                |path| Self::load(&path),
            )
    }

    /// Parse and validate configuration from YAML text
    pub fn parse(yaml: &str) -> CoreResult<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        if self.version_option.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "version_option cannot be empty".to_string(),
            });
        }

        if self.database.path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }

        for (name, sql) in &self.steps {
            if name.trim().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: "Step names cannot be blank".to_string(),
                });
            }
            if sql.trim().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: format!("Step '{name}' has no SQL"),
                });
            }
        }

        Ok(())
    }

    /// Validate the declared migrations and build the catalog
    pub fn build_catalog(&self) -> CoreResult<(MigrationCatalog, Vec<CatalogWarning>)> {
        MigrationCatalog::build(self.migrations.clone(), self.catalog_policy)
    }

    /// Resolve the database path against a project root.
    ///
    /// `override_path` (from `--database` / `SL_DATABASE`) wins over the
    /// configured path. `:memory:` is passed through untouched.
    pub fn database_path(&self, root: &Path, override_path: Option<&str>) -> String {
        let raw = override_path.unwrap_or(&self.database.path);
        if raw == MEMORY_DB_PATH {
            return raw.to_string();
        }
        let path = PathBuf::from(raw);
        if path.is_absolute() {
            raw.to_string()
        } else {
            root.join(path).display().to_string()
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
