// src/blockchain/models.rs
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// --- Error types for web3 URL resolution ---

/// Every failure a resolution, execution or fetch can surface.
#[derive(Error, Debug)]
pub enum Web3Error {
    #[error("malformed web3 URL: {0}")]
    MalformedUrl(String),
    #[error("unsupported protocol '{0}', expected 'web3'")]
    UnsupportedProtocol(String),
    #[error("unknown chain id {0}")]
    UnknownChain(u64),
    #[error("unable to resolve name '{name}'")]
    UnresolvableName {
        name: String,
        #[source]
        source: Option<Box<Web3Error>>,
    },
    #[error("unsupported resolve mode '{0}'")]
    UnsupportedResolveMode(String),
    #[error("no contract found at {0:?}")]
    NotAContract(Address),
    #[error("name record missing: {0}")]
    NameRecordMissing(String),
    #[error("invalid web3 path: {0}")]
    InvalidPath(String),
    #[error("invalid call intent: {0}")]
    InvalidIntent(String),
    #[error("abi error: {0}")]
    Abi(#[from] ethers::abi::Error),
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("failed to connect to chain {chain_id}: {reason}")]
    Connection { chain_id: u64, reason: String },
}

impl Web3Error {
    pub fn unresolvable(name: &str, cause: Option<Web3Error>) -> Self {
        Web3Error::UnresolvableName {
            name: name.to_string(),
            source: cause.map(Box::new),
        }
    }

    /// Stable machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Web3Error::MalformedUrl(_) => "MalformedUrl",
            Web3Error::UnsupportedProtocol(_) => "UnsupportedProtocol",
            Web3Error::UnknownChain(_) => "UnknownChain",
            Web3Error::UnresolvableName { .. } => "UnresolvableName",
            Web3Error::UnsupportedResolveMode(_) => "UnsupportedResolveMode",
            Web3Error::NotAContract(_) => "NotAContract",
            Web3Error::NameRecordMissing(_) => "NameRecordMissing",
            Web3Error::InvalidPath(_) => "InvalidPath",
            Web3Error::InvalidIntent(_) => "InvalidIntent",
            Web3Error::Abi(_) => "Abi",
            Web3Error::Rpc(_) => "Rpc",
            Web3Error::Connection { .. } => "Connection",
        }
    }

    /// True when the URL or intent names something that cannot be served,
    /// false when the chain or the transport failed.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Web3Error::Abi(_) | Web3Error::Rpc(_) | Web3Error::Connection { .. }
        )
    }
}

// --- Chain Models ---

/// Connection parameters for one EVM network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDescriptor {
    pub id: u64,
    pub name: String,
    pub short_name: String,
    pub rpc_urls: Vec<String>,
}

impl ChainDescriptor {
    /// The endpoint the transport talks to.
    pub fn primary_rpc_url(&self) -> Option<&str> {
        self.rpc_urls.first().map(String::as_str)
    }
}

/// Caller-supplied replacement (or addition) for a chain's RPC endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainOverride {
    pub chain_id: u64,
    pub rpc_urls: Vec<String>,
}

impl ChainOverride {
    pub fn new(chain_id: u64, rpc_url: impl Into<String>) -> Self {
        Self {
            chain_id,
            rpc_urls: vec![rpc_url.into()],
        }
    }
}
