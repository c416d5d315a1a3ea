// src/blockchain/evm_client.rs

use crate::blockchain::{client::ChainClient, models::Web3Error};
use async_trait::async_trait;
use ethers::{
    providers::{Http, Middleware, Provider},
    types::{transaction::eip2718::TypedTransaction, Address, Bytes, TransactionRequest},
};
use std::sync::Arc;

/// Client for reading from one EVM-compatible chain over JSON-RPC
#[derive(Clone, Debug)]
pub struct EvmClient {
    chain_id: u64,
    provider: Arc<Provider<Http>>,
}

impl EvmClient {
    /// Create a new EvmClient for the given RPC URL
    pub fn new(chain_id: u64, rpc_url: &str) -> Result<Self, Web3Error> {
        let provider = Provider::<Http>::try_from(rpc_url).map_err(|e| {
            tracing::warn!(
                "Failed to create provider for chain {} at {}: {}",
                chain_id,
                rpc_url,
                e
            );
            Web3Error::Connection {
                chain_id,
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            chain_id,
            provider: Arc::new(provider),
        })
    }

    /// The endpoint this client talks to
    pub fn url(&self) -> String {
        self.provider.url().to_string()
    }
}

#[async_trait]
impl ChainClient for EvmClient {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Option<Bytes>, Web3Error> {
        let tx: TypedTransaction = TransactionRequest::new().to(to).data(data).into();
        let output = self
            .provider
            .call(&tx, None)
            .await
            .map_err(|e| Web3Error::Rpc(e.to_string()))?;

        if output.is_empty() {
            Ok(None)
        } else {
            Ok(Some(output))
        }
    }
}
