// src/blockchain/mod.rs

// Re-export the client module with the chain client seam
pub mod client;
pub use client::{ChainClient, ChainContext, ClientFactory, EvmClient, RpcClientFactory};

// Re-export other modules
pub mod chains;
pub mod evm_client;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use ethers::{
    abi::{ParamType, Token},
    types::{Address, Bytes, U256},
    utils::to_checksum,
};
