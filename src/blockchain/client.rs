//! Blockchain client module for EVM-compatible networks.
//!
//! This module defines the read-only interface the resolver uses to talk to
//! a chain, and the factory that hands out one client per network.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use ethers::{
    abi::{Function, Token},
    types::{Address, Bytes},
};
use tracing::debug;

pub use super::evm_client::EvmClient;
use crate::blockchain::{
    chains,
    models::{ChainDescriptor, ChainOverride, Web3Error},
};

/// Read-only access to a single chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Chain id this client is bound to.
    fn chain_id(&self) -> u64;

    /// Raw `eth_call`. `None` means the node returned no data at all.
    async fn call(&self, to: Address, data: Bytes) -> Result<Option<Bytes>, Web3Error>;

    /// Typed call: encodes `args` against `function`, calls, decodes the outputs.
    async fn read_contract(
        &self,
        address: Address,
        function: &Function,
        args: &[Token],
    ) -> Result<Vec<Token>, Web3Error> {
        let data = function.encode_input(args)?;
        let raw = self.call(address, Bytes::from(data)).await?.unwrap_or_default();
        Ok(function.decode_output(&raw)?)
    }
}

/// Builds chain clients from resolved chain descriptors.
pub trait ClientFactory: Send + Sync {
    fn connect(&self, chain: &ChainDescriptor) -> Result<Arc<dyn ChainClient>, Web3Error>;
}

/// The chain a resolution is currently operating on.
#[derive(Clone)]
pub struct ChainContext {
    pub chain: ChainDescriptor,
    pub client: Arc<dyn ChainClient>,
}

impl ChainContext {
    /// Resolves `chain_id` against the overrides and connects to it.
    pub fn connect(
        factory: &dyn ClientFactory,
        chain_id: u64,
        overrides: &[ChainOverride],
    ) -> Result<Self, Web3Error> {
        let chain = chains::resolve_chain(chain_id, overrides)?;
        let client = factory.connect(&chain)?;
        Ok(Self { chain, client })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain.id
    }
}

impl std::fmt::Debug for ChainContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainContext")
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

/// Hands out JSON-RPC backed clients, reusing them per chain and endpoint.
#[derive(Default)]
pub struct RpcClientFactory {
    clients: DashMap<(u64, String), Arc<EvmClient>>,
}

impl RpcClientFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClientFactory for RpcClientFactory {
    fn connect(&self, chain: &ChainDescriptor) -> Result<Arc<dyn ChainClient>, Web3Error> {
        let rpc_url = chain.primary_rpc_url().ok_or_else(|| Web3Error::Connection {
            chain_id: chain.id,
            reason: "no RPC URL configured".to_string(),
        })?;

        let key = (chain.id, rpc_url.to_string());
        if let Some(cached) = self.clients.get(&key) {
            let client: Arc<dyn ChainClient> = cached.value().clone();
            return Ok(client);
        }

        let evm_client = Arc::new(EvmClient::new(chain.id, rpc_url)?);
        debug!("Connected to chain {} ({}) at {}", chain.id, chain.name, evm_client.url());
        self.clients.insert(key, evm_client.clone());
        let client: Arc<dyn ChainClient> = evm_client;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_reuses_clients() {
        let factory = RpcClientFactory::new();
        let chain = chains::resolve_chain(1, &[]).unwrap();
        factory.connect(&chain).unwrap();
        factory.connect(&chain).unwrap();
        assert_eq!(factory.clients.len(), 1);

        let overridden =
            chains::resolve_chain(1, &[ChainOverride::new(1, "http://localhost:8545")]).unwrap();
        let client = factory.connect(&overridden).unwrap();
        assert_eq!(client.chain_id(), 1);
        assert_eq!(factory.clients.len(), 2);
    }

    #[test]
    fn test_factory_rejects_missing_rpc() {
        let factory = RpcClientFactory::new();
        let chain = ChainDescriptor {
            id: 5,
            name: "empty".to_string(),
            short_name: "empty".to_string(),
            rpc_urls: vec![],
        };
        assert!(matches!(
            factory.connect(&chain),
            Err(Web3Error::Connection { chain_id: 5, .. })
        ));
    }
}
