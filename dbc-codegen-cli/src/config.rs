//! Configuration loading and parsing

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use dbc_codegen::Endianness;

/// Project configuration (loaded from codegen.toml)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// DBC file to generate code from
    pub input: PathBuf,

    /// Node whose view of the network is generated
    pub self_node: String,

    /// Generate code for every message regardless of the self node's role
    #[serde(default)]
    pub generate_all: bool,

    /// Bit-packing convention of the generated code
    #[serde(default)]
    pub endianness: Endianness,

    /// Output file for the generated code (stdout when omitted)
    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}
