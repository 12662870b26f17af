//! Configuration module for the turtle-canvas server.
//!
//! Supports command-line arguments, environment variables and a TOML
//! configuration file. CLI arguments (or their environment fallbacks)
//! take precedence over config file values.

use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Command-line arguments for the canvas server
#[derive(Parser, Debug)]
#[command(name = "turtle-canvas")]
#[command(author = "turtle-canvas authors")]
#[command(version = "0.1.0")]
#[command(about = "A turtle-graphics canvas server over a line protocol", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind to (e.g., 127.0.0.1)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Maximum number of concurrent client sessions
    #[arg(long)]
    pub max_connections: Option<usize>,

    /// Canvas width in columns
    #[arg(long, env = "COLS")]
    pub cols: Option<usize>,

    /// Canvas height in rows
    #[arg(long, env = "ROWS")]
    pub rows: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub canvas: CanvasSection,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server-related configuration
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_connections: default_max_connections(),
        }
    }
}

/// Canvas-related configuration
#[derive(Debug, Deserialize)]
pub struct CanvasSection {
    #[serde(default = "default_cols")]
    pub cols: usize,
    #[serde(default = "default_rows")]
    pub rows: usize,
    #[serde(default = "default_brush_glyph")]
    pub brush_glyph: String,
    /// Starting brush column (defaults to the grid center)
    pub start_col: Option<usize>,
    /// Starting brush row (defaults to just below the grid center)
    pub start_row: Option<usize>,
}

impl Default for CanvasSection {
    fn default() -> Self {
        Self {
            cols: default_cols(),
            rows: default_rows(),
            brush_glyph: default_brush_glyph(),
            start_col: None,
            start_row: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8124
}

fn default_max_connections() -> usize {
    1024
}

fn default_cols() -> usize {
    30
}

fn default_rows() -> usize {
    30
}

fn default_brush_glyph() -> String {
    "*".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Per-session canvas settings, copied into every new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasConfig {
    pub cols: usize,
    pub rows: usize,
    pub brush_glyph: char,
    pub start_col: usize,
    pub start_row: usize,
}

impl CanvasConfig {
    /// Build canvas settings with the brush parked near the grid center.
    pub fn centered(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            brush_glyph: '*',
            start_col: cols / 2,
            start_row: (rows / 2).saturating_sub(1),
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self::centered(default_cols(), default_rows())
    }
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_connections: usize,
    pub canvas: CanvasConfig,
    pub log_level: String,
}

impl Config {
    /// Load configuration from CLI args, environment and optional TOML file.
    pub fn load() -> Result<Self, ConfigError> {
        let cli = CliArgs::parse();

        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        Self::merge(cli, toml_config)
    }

    /// Merge CLI args over TOML values and validate the result.
    fn merge(cli: CliArgs, toml_config: TomlConfig) -> Result<Self, ConfigError> {
        let cols = cli.cols.unwrap_or(toml_config.canvas.cols);
        let rows = cli.rows.unwrap_or(toml_config.canvas.rows);
        if cols == 0 || rows == 0 {
            return Err(ConfigError::EmptyGrid { cols, rows });
        }

        let brush_glyph = single_char(&toml_config.canvas.brush_glyph)
            .ok_or_else(|| ConfigError::InvalidGlyph(toml_config.canvas.brush_glyph.clone()))?;

        let centered = CanvasConfig::centered(cols, rows);
        let start_col = toml_config.canvas.start_col.unwrap_or(centered.start_col);
        let start_row = toml_config.canvas.start_row.unwrap_or(centered.start_row);
        if start_col >= cols || start_row >= rows {
            return Err(ConfigError::StartOutOfBounds {
                col: start_col,
                row: start_row,
                cols,
                rows,
            });
        }

        Ok(Config {
            host: cli.host.unwrap_or(toml_config.server.host),
            port: cli.port.unwrap_or(toml_config.server.port),
            max_connections: cli
                .max_connections
                .unwrap_or(toml_config.server.max_connections)
                .max(1),
            canvas: CanvasConfig {
                cols,
                rows,
                brush_glyph,
                start_col,
                start_row,
            },
            log_level: cli.log_level.unwrap_or(toml_config.logging.level),
        })
    }

    /// Socket address string for the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {}", .0.display(), .1)]
    FileRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{}': {}", .0.display(), .1)]
    TomlParse(PathBuf, #[source] toml::de::Error),

    #[error("Canvas must have at least one column and one row (got {cols}x{rows})")]
    EmptyGrid { cols: usize, rows: usize },

    #[error("Brush glyph must be exactly one character (got {0:?})")]
    InvalidGlyph(String),

    #[error("Brush start ({col},{row}) lies outside the {cols}x{rows} canvas")]
    StartOutOfBounds {
        col: usize,
        row: usize,
        cols: usize,
        rows: usize,
    },
}
