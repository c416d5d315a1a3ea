//! Resolution of `web3://` URLs into contract reads, and their execution.
//!
//! [`Web3Client::resolve`] turns a URL into a [`ResolvedCallIntent`],
//! [`Web3Client::execute`] runs an intent against its chain, and
//! [`Web3Client::fetch`] does both.

use std::sync::Arc;

use crate::blockchain::{
    client::{ChainContext, ClientFactory, RpcClientFactory},
    models::Web3Error,
    services::names::{NameResolver, NameResolvers},
};

pub mod executor;
pub mod mime;
pub mod models;
pub mod parsers;
pub mod pipeline;

pub use models::{
    ContractCall, ContractCallMode, FetchOptions, FetchOutput, FetchResult, MethodCall,
    NameResolutionInfo, ParsedPath, ResolveMode, ResolvedCallIntent,
};
pub use parsers::{AutoParser, DefaultAutoParser, DefaultManualParser, ManualParser};

/// Entry point for resolving and fetching `web3://` URLs.
///
/// Cheap to clone; every call is independent and may run concurrently.
#[derive(Clone)]
pub struct Web3Client {
    factory: Arc<dyn ClientFactory>,
    names: Arc<dyn NameResolver>,
    auto: Arc<dyn AutoParser>,
    manual: Arc<dyn ManualParser>,
}

impl Web3Client {
    /// Client with the default name services and sub-parsers.
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        let names: Arc<dyn NameResolver> = Arc::new(NameResolvers::with_defaults());
        Self {
            factory,
            auto: Arc::new(DefaultAutoParser::new(names.clone())),
            names,
            manual: Arc::new(DefaultManualParser),
        }
    }

    /// Client talking JSON-RPC to the configured endpoints.
    pub fn with_rpc() -> Self {
        Self::new(Arc::new(RpcClientFactory::new()))
    }

    /// Replaces the name services. The default auto parser is rebound to
    /// them, so call this before [`Web3Client::with_auto_parser`].
    pub fn with_name_resolver(mut self, names: Arc<dyn NameResolver>) -> Self {
        self.auto = Arc::new(DefaultAutoParser::new(names.clone()));
        self.names = names;
        self
    }

    pub fn with_auto_parser(mut self, auto: Arc<dyn AutoParser>) -> Self {
        self.auto = auto;
        self
    }

    pub fn with_manual_parser(mut self, manual: Arc<dyn ManualParser>) -> Self {
        self.manual = manual;
        self
    }

    /// Resolves `url` and executes the resulting intent with the same options.
    pub async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<FetchResult, Web3Error> {
        let intent = self.resolve(url, options).await?;
        self.execute(intent, options).await
    }

    fn connect(&self, chain_id: u64, options: &FetchOptions) -> Result<ChainContext, Web3Error> {
        ChainContext::connect(self.factory.as_ref(), chain_id, &options.chain_overrides)
    }
}
