//! Sub-parsers turning the path of a `web3://` URL into a contract call.
//!
//! Which parser runs is decided by the contract's resolve mode. Each parser
//! returns a [`ParsedPath`] that the pipeline merges into the intent.

use async_trait::async_trait;

use crate::blockchain::{client::ChainContext, models::Web3Error};
use crate::resolver::models::ParsedPath;

pub mod auto;
pub mod manual;

pub use auto::DefaultAutoParser;
pub use manual::DefaultManualParser;

/// Path parser for contracts in manual mode. Never touches the chain.
pub trait ManualParser: Send + Sync {
    fn parse_manual(&self, path: &str) -> Result<ParsedPath, Web3Error>;
}

/// Path parser for contracts in auto mode. May read from the active chain,
/// e.g. to resolve names used as arguments.
#[async_trait]
pub trait AutoParser: Send + Sync {
    async fn parse_auto(&self, path: &str, ctx: &ChainContext) -> Result<ParsedPath, Web3Error>;
}
