use log::{info, warn};
use serde::Deserialize;
use std::path::Path;

use crate::engine::entry::symbol::{DEFAULT_MAX_DEPTH, DEFAULT_SCALE};
use crate::engine::entry::SymbolConfig;
use crate::engine::sink::DEFAULT_MAX_TRADE_BATCH;
use crate::error::MatchError;

pub const DEFAULT_METRICS_ADDR: &str = "0.0.0.0:4010";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
    pub metrics_addr: String,
    pub max_trade_batch: usize,
    pub default_depth: usize,
    pub default_base_scale: u32,
    pub default_quote_scale: u32,
    pub symbols: Vec<SymbolConfig>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            metrics_addr: DEFAULT_METRICS_ADDR.to_string(),
            max_trade_batch: DEFAULT_MAX_TRADE_BATCH,
            default_depth: DEFAULT_MAX_DEPTH,
            default_base_scale: DEFAULT_SCALE,
            default_quote_scale: DEFAULT_SCALE,
            symbols: Vec::new(),
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the runtime config. A missing file falls back to defaults,
    /// a file that exists but does not parse is an error.
    pub fn from_toml(path: impl AsRef<Path>) -> Result<Self, MatchError> {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "runtime config {} not found, using defaults",
                    path.display()
                );
                return Ok(RuntimeConfig::new());
            }
            Err(e) => return Err(e.into()),
        };
        let config = Self::parse(&contents)?;
        info!(
            "loaded runtime config {} with {} symbols",
            path.display(),
            config.symbols.len()
        );
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, MatchError> {
        let config: RuntimeConfig =
            toml::from_str(contents).map_err(|e| MatchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.max_trade_batch == 0 {
            return Err(MatchError::Config("max_trade_batch must be positive".into()));
        }
        if self.default_depth == 0 {
            return Err(MatchError::Config("default_depth must be positive".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for symbol in &self.symbols {
            if symbol.name.is_empty() {
                return Err(MatchError::Config("symbol name must not be empty".into()));
            }
            if !seen.insert(symbol.name.as_str()) {
                return Err(MatchError::Config(format!(
                    "symbol {} configured twice",
                    symbol.name
                )));
            }
            if symbol.max_depth == 0 {
                return Err(MatchError::Config(format!(
                    "symbol {} max_depth must be positive",
                    symbol.name
                )));
            }
        }
        Ok(())
    }

    /// Settings for a symbol without its own `[[symbols]]` entry
    pub fn default_symbol(&self, name: &str) -> SymbolConfig {
        SymbolConfig::new(name)
            .with_scales(self.default_base_scale, self.default_quote_scale)
            .with_max_depth(self.default_depth)
    }
}
