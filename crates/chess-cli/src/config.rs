//! Configuration file loading for the terminal front end.
//!
//! Settings come from `chess.toml` in the current directory, or from the file
//! named with `--config`. Every key is optional.

use chess_core::PieceKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// The default promotion names a piece a pawn cannot become.
    #[error("Invalid default promotion: {0}")]
    InvalidPromotion(PieceKind),
}

/// Settings for the `chess` binary.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Log filter used when `RUST_LOG` is unset. Defaults to "warn".
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// List each piece's moves after every turn in `play`.
    #[serde(default)]
    pub show_hints: bool,
    /// Draw the board with chess glyphs instead of FEN letters.
    #[serde(default = "default_unicode_pieces")]
    pub unicode_pieces: bool,
    /// Piece a pawn becomes when a move names no promotion.
    #[serde(default = "default_promotion")]
    pub default_promotion: PieceKind,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_unicode_pieces() -> bool {
    true
}

fn default_promotion() -> PieceKind {
    PieceKind::Queen
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            log_level: default_log_level(),
            show_hints: false,
            unicode_pieces: default_unicode_pieces(),
            default_promotion: default_promotion(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from `path`, or from [`Self::config_path()`].
    ///
    /// An explicit path must exist. Without one, a missing `chess.toml`
    /// yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_toml(&std::fs::read_to_string(path)?)?,
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::from_toml(&std::fs::read_to_string(&default_path)?)?
                } else {
                    Self::default()
                }
            }
        };
        Ok(config)
    }

    /// Parses and checks a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: CliConfig = toml::from_str(content)?;
        if !config.default_promotion.is_promotion_target() {
            return Err(ConfigError::InvalidPromotion(config.default_promotion));
        }
        Ok(config)
    }

    /// Returns the default configuration file location.
    pub fn config_path() -> PathBuf {
        PathBuf::from("chess.toml")
    }
}
