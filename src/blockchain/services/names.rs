//! Name resolution for `web3://` hostnames.
//!
//! Names are resolved against ENS-style registries through `eth_call`. A name
//! may point at a contract on another chain through its `contentcontract`
//! text record (`<chain short name or id>:<address>`).

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::{
    abi::{ParamType, Token},
    types::{Address, H160},
};
use tracing::debug;

pub use ethers::providers::namehash;

use crate::blockchain::{
    chains,
    client::ChainContext,
    models::{ChainDescriptor, Web3Error},
    services::abi::view_function,
};

/// ENS registry, deployed at the same address on mainnet and Sepolia.
pub const ENS_REGISTRY: Address = H160([
    0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x2E, 0x07, 0x4E, 0xC6, 0x9A, 0x0D, 0xFB, 0x29, 0x97,
    0xBA, 0x6C, 0x7D, 0x2E, 0x1E,
]);

const CONTENT_CONTRACT_KEY: &str = "contentcontract";

/// Outcome of a successful name lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub address: Address,
    /// Set when the name points at a contract on a different chain.
    pub chain_id: Option<u64>,
}

#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Whether this resolver can handle `name` on `chain`.
    fn is_supported(&self, name: &str, chain: &ChainDescriptor) -> bool;

    async fn resolve(&self, name: &str, ctx: &ChainContext) -> Result<ResolvedName, Web3Error>;
}

/// Resolver for an ENS-compatible registry serving one top-level suffix.
#[derive(Debug, Clone)]
pub struct EnsResolver {
    suffix: String,
    registry: Address,
    chain_ids: Vec<u64>,
}

impl EnsResolver {
    pub fn new(suffix: &str, registry: Address, chain_ids: Vec<u64>) -> Self {
        Self {
            suffix: suffix.to_ascii_lowercase(),
            registry,
            chain_ids,
        }
    }

    /// `.eth` names on Ethereum mainnet and Sepolia.
    pub fn ens() -> Self {
        Self::new(".eth", ENS_REGISTRY, vec![1, 11155111])
    }

    async fn lookup_address(
        &self,
        ctx: &ChainContext,
        target: Address,
        function: &str,
        node: &Token,
    ) -> Result<Address, Web3Error> {
        let f = view_function(function, &[ParamType::FixedBytes(32)], &[ParamType::Address]);
        let tokens = ctx
            .client
            .read_contract(target, &f, std::slice::from_ref(node))
            .await?;
        match tokens.into_iter().next() {
            Some(Token::Address(address)) => Ok(address),
            _ => Err(Web3Error::NameRecordMissing(format!(
                "{}() returned no address",
                function
            ))),
        }
    }

    async fn content_contract(
        &self,
        ctx: &ChainContext,
        resolver: Address,
        node: &Token,
    ) -> Option<String> {
        let f = view_function(
            "text",
            &[ParamType::FixedBytes(32), ParamType::String],
            &[ParamType::String],
        );
        let args = [node.clone(), Token::String(CONTENT_CONTRACT_KEY.to_string())];
        match ctx.client.read_contract(resolver, &f, &args).await {
            Ok(tokens) => match tokens.into_iter().next() {
                Some(Token::String(value)) if !value.is_empty() => Some(value),
                _ => None,
            },
            Err(e) => {
                debug!("no {} record on resolver {:?}: {}", CONTENT_CONTRACT_KEY, resolver, e);
                None
            }
        }
    }
}

/// Parses a `contentcontract` record: `0x…`, `<short name>:0x…` or `<chain id>:0x…`.
pub fn parse_content_contract(value: &str) -> Result<ResolvedName, Web3Error> {
    let (chain_id, address) = match value.trim().split_once(':') {
        Some((prefix, address)) => {
            let chain_id = match prefix.parse::<u64>() {
                Ok(id) => id,
                Err(_) => chains::chain_id_for_short_name(prefix).ok_or_else(|| {
                    Web3Error::NameRecordMissing(format!("unknown chain short name '{}'", prefix))
                })?,
            };
            (Some(chain_id), address)
        }
        None => (None, value.trim()),
    };

    let address = Address::from_str(address).map_err(|e| {
        Web3Error::NameRecordMissing(format!("invalid contract address '{}': {}", address, e))
    })?;

    Ok(ResolvedName { address, chain_id })
}

#[async_trait]
impl NameResolver for EnsResolver {
    fn is_supported(&self, name: &str, chain: &ChainDescriptor) -> bool {
        let name = name.to_ascii_lowercase();
        self.chain_ids.contains(&chain.id)
            && name.len() > self.suffix.len()
            && name.ends_with(&self.suffix)
    }

    async fn resolve(&self, name: &str, ctx: &ChainContext) -> Result<ResolvedName, Web3Error> {
        let node = Token::FixedBytes(namehash(&name.to_ascii_lowercase()).as_bytes().to_vec());

        let resolver = self
            .lookup_address(ctx, self.registry, "resolver", &node)
            .await?;
        if resolver.is_zero() {
            return Err(Web3Error::NameRecordMissing(format!("no resolver for '{}'", name)));
        }

        if let Some(record) = self.content_contract(ctx, resolver, &node).await {
            debug!("{} has {} record '{}'", name, CONTENT_CONTRACT_KEY, record);
            return parse_content_contract(&record);
        }

        let address = self.lookup_address(ctx, resolver, "addr", &node).await?;
        if address.is_zero() {
            return Err(Web3Error::NameRecordMissing(format!("no address for '{}'", name)));
        }

        Ok(ResolvedName {
            address,
            chain_id: None,
        })
    }
}

/// Ordered list of name services; the first one supporting a name wins.
#[derive(Clone, Default)]
pub struct NameResolvers {
    providers: Vec<Arc<dyn NameResolver>>,
}

impl NameResolvers {
    pub fn new(providers: Vec<Arc<dyn NameResolver>>) -> Self {
        Self { providers }
    }

    /// ENS only. Web3Q chains carry no default name service; their names
    /// are reached through a `contentcontract` redirect or a pushed resolver.
    pub fn with_defaults() -> Self {
        Self::new(vec![Arc::new(EnsResolver::ens())])
    }

    pub fn push(&mut self, provider: Arc<dyn NameResolver>) {
        self.providers.push(provider);
    }
}

#[async_trait]
impl NameResolver for NameResolvers {
    fn is_supported(&self, name: &str, chain: &ChainDescriptor) -> bool {
        self.providers.iter().any(|p| p.is_supported(name, chain))
    }

    async fn resolve(&self, name: &str, ctx: &ChainContext) -> Result<ResolvedName, Web3Error> {
        let provider = self
            .providers
            .iter()
            .find(|p| p.is_supported(name, &ctx.chain))
            .ok_or_else(|| {
                Web3Error::NameRecordMissing(format!(
                    "no name service for '{}' on chain {}",
                    name,
                    ctx.chain_id()
                ))
            })?;
        provider.resolve(name, ctx).await
    }
}
