// src/config.rs

use std::collections::HashMap;
use std::env;

use anyhow::{Context, Result};

use crate::blockchain::models::ChainOverride;
use crate::resolver::models::FetchOptions;

// A struct to hold all configuration, loaded once at startup from the .env file.
#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub port: u16,

    /// Extra or replacement RPC endpoints, from `CHAIN_RPC_URLS`.
    /// Built-in networks (Ethereum, Sepolia, Optimism, Base, Polygon, ...)
    /// need no entry here.
    pub chain_overrides: Vec<ChainOverride>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            chain_overrides: Vec::new(),
        }
    }
}

impl Config {
    /// Chain ids that have a configured override.
    pub fn overridden_chains(&self) -> Vec<u64> {
        self.chain_overrides.iter().map(|o| o.chain_id).collect()
    }

    /// Options shared by the resolve and execute stages of every request.
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions::with_overrides(self.chain_overrides.clone())
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();

        let chain_overrides = match env::var("CHAIN_RPC_URLS") {
            Ok(raw) if !raw.trim().is_empty() => parse_chain_rpc_urls(&raw)?,
            _ => Vec::new(),
        };

        Ok(Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            chain_overrides,
        })
    }
}

/// Parses a JSON map of chain id -> RPC URL.
pub fn parse_chain_rpc_urls(raw: &str) -> Result<Vec<ChainOverride>> {
    let chain_rpc_urls: HashMap<String, String> =
        serde_json::from_str(raw).context("Invalid CHAIN_RPC_URLS JSON format")?;

    let mut overrides = chain_rpc_urls
        .into_iter()
        .map(|(chain_id, rpc_url)| {
            let chain_id = chain_id
                .trim()
                .parse::<u64>()
                .with_context(|| format!("CHAIN_RPC_URLS key '{}' is not a chain id", chain_id))?;
            Ok(ChainOverride::new(chain_id, rpc_url))
        })
        .collect::<Result<Vec<_>>>()?;
    overrides.sort_by_key(|o| o.chain_id);
    Ok(overrides)
}
