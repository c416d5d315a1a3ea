// src/lib.rs

// Re-export commonly used types
pub use ethers::types::{Address, Bytes, U256};
pub use resolver::{FetchOptions, FetchOutput, FetchResult, ResolvedCallIntent, Web3Client};

pub mod api;
pub mod blockchain;
pub mod config;
pub mod mcp;
pub mod resolver;
pub mod utils;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: config::Config,
    /// Resolver for web3:// URLs
    pub web3: Web3Client,
}

impl AppState {
    pub fn new(config: config::Config, web3: Web3Client) -> Self {
        Self { config, web3 }
    }
}
