//! Genesis configuration.
//!
//! A [`GenesisConfig`] is read from TOML or JSON and turned into a ledger with
//! [`GenesisConfig::build`], which runs the genesis allocator.

use std::path::{Path, PathBuf};

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{error::TokenError, ledger::SplittableToken};

/// Environment variable holding the genesis config path.
pub const GENESIS_PATH_ENV: &str = "SPLITTABLE_GENESIS";

/// Errors raised while loading or applying a genesis config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The document did not parse into a [`GenesisConfig`].
    #[error("invalid config: {0}")]
    Invalid(String),
    /// No path was given and the environment variable is unset.
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),
    /// The genesis allocator rejected the holders or amounts.
    #[error("genesis rejected: {0}")]
    Genesis(#[from] TokenError),
}

/// Genesis description for a splittable token.
///
/// Expected shape (TOML):
/// ```toml
/// name = "Billion Token for Test"
/// symbol = "BTT"
/// owner = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
/// holders = ["0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"]
/// amounts = ["0x33b2e3c9fd0803ce8000000"]
/// contractAddress = "0x00000000000000000000000000000000000000fd"
/// ```
///
/// `holders` and `amounts` are kept as parallel arrays so a length mismatch is
/// reported by the allocator, not by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenesisConfig {
    /// Token name.
    pub name: String,
    /// Token symbol.
    pub symbol: String,
    /// Owner allowed to increase supply.
    pub owner: Address,
    /// Initial holders.
    #[serde(default)]
    pub holders: Vec<Address>,
    /// Initial amounts in base units, index-aligned with `holders`.
    #[serde(default)]
    pub amounts: Vec<U256>,
    /// Address logs are attributed to when served through the ABI surface.
    #[serde(default)]
    pub contract_address: Option<Address>,
}

impl GenesisConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Parses a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Loads from disk; `.json` files are parsed as JSON, anything else as TOML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&raw)
        } else {
            Self::from_toml_str(&raw)
        }
    }

    /// Loads the file named by `SPLITTABLE_GENESIS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var(GENESIS_PATH_ENV)
            .map_err(|_| ConfigError::MissingEnv(GENESIS_PATH_ENV))?;
        Self::from_path(path)
    }

    /// Runs the genesis allocator.
    pub fn build(&self) -> Result<SplittableToken, ConfigError> {
        Ok(SplittableToken::initialize(
            self.owner,
            self.name.clone(),
            self.symbol.clone(),
            &self.holders,
            &self.amounts,
        )?)
    }
}
