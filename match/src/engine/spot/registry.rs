//! Engine Registry
//!
//! Owns one [`SymbolEngine`] per trading pair. Engines are created lazily on
//! first use through the map's atomic compute-if-absent, so concurrent callers
//! can never end up with two engines for the same symbol.

use dashmap::DashMap;
use std::sync::Arc;

use crate::config::RuntimeConfig;
use crate::engine::entry::SymbolConfig;
use crate::engine::matchlogic::SymbolEngine;

#[derive(Debug, Default)]
pub struct EngineRegistry {
    engines: DashMap<String, Arc<SymbolEngine>>,
    configs: DashMap<String, SymbolConfig>,
    defaults: RuntimeConfig,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the `[[symbols]]` of `config`
    pub fn with_config(config: &RuntimeConfig) -> Self {
        let registry = Self {
            engines: DashMap::new(),
            configs: DashMap::new(),
            defaults: RuntimeConfig {
                symbols: Vec::new(),
                ..config.clone()
            },
        };
        for symbol in &config.symbols {
            registry.configure(symbol.clone());
        }
        registry
    }

    /// Stores settings used the next time an engine for the symbol is built.
    /// A live engine keeps the settings it was created with.
    pub fn configure(&self, config: SymbolConfig) {
        self.configs.insert(config.name.clone(), config);
    }

    pub fn symbol_config(&self, symbol: &str) -> SymbolConfig {
        self.configs
            .get(symbol)
            .map(|c| c.value().clone())
            .unwrap_or_else(|| self.defaults.default_symbol(symbol))
    }

    /// Returns the symbol's engine, creating it on first use
    pub fn get_engine(&self, symbol: &str) -> Arc<SymbolEngine> {
        if let Some(engine) = self.engines.get(symbol) {
            return engine.value().clone();
        }
        self.engines
            .entry(symbol.to_string())
            .or_insert_with(|| {
                let config = self.symbol_config(symbol);
                log::info!(
                    "create engine {} base_scale {} quote_scale {} max_depth {}",
                    symbol,
                    config.base_scale,
                    config.quote_scale,
                    config.max_depth
                );
                Arc::new(SymbolEngine::new(config))
            })
            .value()
            .clone()
    }

    /// Looks up an engine without creating one
    pub fn engine(&self, symbol: &str) -> Option<Arc<SymbolEngine>> {
        self.engines.get(symbol).map(|e| e.value().clone())
    }

    /// Deregisters the engine. References already handed out stay usable.
    pub fn remove_engine(&self, symbol: &str) -> Option<Arc<SymbolEngine>> {
        let removed = self.engines.remove(symbol).map(|(_, engine)| engine);
        if removed.is_some() {
            log::info!("remove engine {}", symbol);
        }
        removed
    }

    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.engines.iter().map(|e| e.key().clone()).collect();
        symbols.sort();
        symbols
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}
