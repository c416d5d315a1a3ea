// src/blockchain/chains.rs

//! Chain id lookup over caller overrides and the built-in network table.

use crate::blockchain::models::{ChainDescriptor, ChainOverride, Web3Error};

/// Network used when a URL carries no chain id.
pub const DEFAULT_CHAIN_ID: u64 = 1;

struct BuiltinChain {
    id: u64,
    name: &'static str,
    short_name: &'static str,
    rpc_url: &'static str,
}

const BUILTIN_CHAINS: &[BuiltinChain] = &[
    BuiltinChain {
        id: 1,
        name: "Ethereum Mainnet",
        short_name: "eth",
        rpc_url: "https://ethereum-rpc.publicnode.com",
    },
    BuiltinChain {
        id: 10,
        name: "OP Mainnet",
        short_name: "oeth",
        rpc_url: "https://mainnet.optimism.io",
    },
    BuiltinChain {
        id: 56,
        name: "BNB Smart Chain",
        short_name: "bnb",
        rpc_url: "https://bsc-dataseed.bnbchain.org",
    },
    BuiltinChain {
        id: 137,
        name: "Polygon",
        short_name: "matic",
        rpc_url: "https://polygon-rpc.com",
    },
    BuiltinChain {
        id: 333,
        name: "Web3Q Mainnet",
        short_name: "w3q",
        rpc_url: "https://mainnet.web3q.io:8545",
    },
    BuiltinChain {
        id: 3334,
        name: "Web3Q Galileo",
        short_name: "w3q-g",
        rpc_url: "https://galileo.web3q.io:8545",
    },
    BuiltinChain {
        id: 8453,
        name: "Base",
        short_name: "base",
        rpc_url: "https://mainnet.base.org",
    },
    BuiltinChain {
        id: 17000,
        name: "Holesky",
        short_name: "holesky",
        rpc_url: "https://ethereum-holesky-rpc.publicnode.com",
    },
    BuiltinChain {
        id: 42161,
        name: "Arbitrum One",
        short_name: "arb1",
        rpc_url: "https://arb1.arbitrum.io/rpc",
    },
    BuiltinChain {
        id: 11155111,
        name: "Sepolia",
        short_name: "sep",
        rpc_url: "https://ethereum-sepolia-rpc.publicnode.com",
    },
];

impl BuiltinChain {
    fn descriptor(&self) -> ChainDescriptor {
        ChainDescriptor {
            id: self.id,
            name: self.name.to_string(),
            short_name: self.short_name.to_string(),
            rpc_urls: vec![self.rpc_url.to_string()],
        }
    }
}

fn builtin(chain_id: u64) -> Option<&'static BuiltinChain> {
    BUILTIN_CHAINS.iter().find(|c| c.id == chain_id)
}

/// Maps a chain id to its connection parameters. Overrides are consulted
/// first, in order; an override for an unknown id introduces a new chain.
pub fn resolve_chain(
    chain_id: u64,
    overrides: &[ChainOverride],
) -> Result<ChainDescriptor, Web3Error> {
    if let Some(over) = overrides.iter().find(|o| o.chain_id == chain_id) {
        let mut descriptor = match builtin(chain_id) {
            Some(known) => known.descriptor(),
            None => ChainDescriptor {
                id: chain_id,
                name: format!("Chain {}", chain_id),
                short_name: chain_id.to_string(),
                rpc_urls: Vec::new(),
            },
        };
        descriptor.rpc_urls = over.rpc_urls.clone();
        return Ok(descriptor);
    }

    builtin(chain_id)
        .map(BuiltinChain::descriptor)
        .ok_or(Web3Error::UnknownChain(chain_id))
}

/// Looks up a built-in chain by its short name (e.g. `eth`, `w3q-g`).
pub fn chain_id_for_short_name(short_name: &str) -> Option<u64> {
    BUILTIN_CHAINS
        .iter()
        .find(|c| c.short_name.eq_ignore_ascii_case(short_name))
        .map(|c| c.id)
}

/// All chains reachable with the given overrides, sorted by id.
pub fn list_chains(overrides: &[ChainOverride]) -> Vec<ChainDescriptor> {
    let mut ids: Vec<u64> = BUILTIN_CHAINS.iter().map(|c| c.id).collect();
    ids.extend(overrides.iter().map(|o| o.chain_id));
    ids.sort_unstable();
    ids.dedup();
    ids.into_iter()
        .filter_map(|id| resolve_chain(id, overrides).ok())
        .collect()
}
