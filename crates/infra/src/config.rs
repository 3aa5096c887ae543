//! Environment configuration.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

pub const BACKUP_PATH_VAR: &str = "STOCKROOM_BACKUP_PATH";
pub const DEFAULT_MIN_STOCK_VAR: &str = "STOCKROOM_DEFAULT_MIN_STOCK";
pub const DEFAULT_MAX_STOCK_VAR: &str = "STOCKROOM_DEFAULT_MAX_STOCK";
pub const MARKUP_PERCENT_VAR: &str = "STOCKROOM_MARKUP_PERCENT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    InvalidValue {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("default stock limits are inconsistent: minimum {minimum} > maximum {maximum}")]
    InconsistentLimits { minimum: i64, maximum: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Where `save`/`load` read and write the full backup.
    pub backup_path: PathBuf,
    /// Limits given to a record created through a new entry.
    pub default_min_stock: i64,
    pub default_max_stock: i64,
    /// Markup applied to outbound movements.
    pub markup_percent: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backup_path: PathBuf::from("full_backup.json"),
            default_min_stock: 20,
            default_max_stock: 200,
            markup_percent: 8,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source; unset variables fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let backup_path = match lookup(BACKUP_PATH_VAR) {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => {
                tracing::warn!(
                    path = %defaults.backup_path.display(),
                    "{BACKUP_PATH_VAR} not set, using default backup path"
                );
                defaults.backup_path
            }
        };

        let default_min_stock = parse_or(
            &lookup,
            DEFAULT_MIN_STOCK_VAR,
            "a non-negative integer",
            defaults.default_min_stock,
        )?;
        let default_max_stock = parse_or(
            &lookup,
            DEFAULT_MAX_STOCK_VAR,
            "a non-negative integer",
            defaults.default_max_stock,
        )?;
        for (var, value) in [
            (DEFAULT_MIN_STOCK_VAR, default_min_stock),
            (DEFAULT_MAX_STOCK_VAR, default_max_stock),
        ] {
            if value < 0 {
                return Err(ConfigError::InvalidValue {
                    var,
                    expected: "a non-negative integer",
                    value: value.to_string(),
                });
            }
        }
        if default_min_stock > default_max_stock {
            return Err(ConfigError::InconsistentLimits {
                minimum: default_min_stock,
                maximum: default_max_stock,
            });
        }

        let markup_percent = parse_or(
            &lookup,
            MARKUP_PERCENT_VAR,
            "a whole percentage",
            defaults.markup_percent,
        )?;

        Ok(Self {
            backup_path,
            default_min_stock,
            default_max_stock,
            markup_percent,
        })
    }
}

fn parse_or<F, T>(
    lookup: &F,
    var: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            var,
            expected,
            value: raw,
        }),
    }
}
