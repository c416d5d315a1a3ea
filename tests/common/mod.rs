//! In-memory chain doubles shared by the integration tests.

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use dashmap::DashMap;
use ethers::abi::{Function, ParamType, Token};
use ethers::types::{Address, Bytes};
use web3_url_gateway::blockchain::{
    client::{ChainClient, ClientFactory},
    models::{ChainDescriptor, Web3Error},
    services::{
        abi::view_function,
        names::{namehash, ENS_REGISTRY},
    },
};

pub const SITE: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
pub const HOLDER: &str = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359";

pub fn address(value: &str) -> Address {
    Address::from_str(value).unwrap()
}

#[derive(Debug, Clone)]
pub enum Reply {
    Data(Bytes),
    /// The node returned `0x`.
    Empty,
    Fail(String),
}

/// A chain whose `eth_call` results are scripted per (contract, calldata).
pub struct MockChain {
    chain_id: u64,
    replies: DashMap<(Address, Bytes), Reply>,
    calls: AtomicUsize,
}

impl MockChain {
    pub fn new(chain_id: u64) -> Arc<Self> {
        Arc::new(Self {
            chain_id,
            replies: DashMap::new(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn on_call(&self, to: Address, data: impl Into<Bytes>, reply: Reply) {
        self.replies.insert((to, data.into()), reply);
    }

    /// Scripts a typed call: `function(args)` returns `outputs`.
    pub fn on_function(&self, to: Address, function: &Function, args: &[Token], outputs: &[Token]) {
        let input = function.encode_input(args).unwrap();
        self.on_call(to, input, Reply::Data(ethers::abi::encode(outputs).into()));
    }

    pub fn set_resolve_mode(&self, to: Address, mode: &str) {
        let mut raw = [0u8; 32];
        raw[..mode.len()].copy_from_slice(mode.as_bytes());
        let f = view_function("resolveMode", &[], &[ParamType::FixedBytes(32)]);
        self.on_function(to, &f, &[], &[Token::FixedBytes(raw.to_vec())]);
    }

    /// Scripts a calldata-mode call returning `payload` wrapped as ABI `bytes`.
    pub fn serve(&self, to: Address, path: &str, payload: &[u8]) {
        let wrapped = ethers::abi::encode(&[Token::Bytes(payload.to_vec())]);
        self.on_call(to, path.as_bytes().to_vec(), Reply::Data(wrapped.into()));
    }

    /// Registers an ENS name in the registry on this chain.
    pub fn register_name(&self, name: &str, target: Address, content_contract: Option<&str>) {
        let resolver = Address::repeat_byte(0xee);
        let node = Token::FixedBytes(namehash(name).as_bytes().to_vec());

        let f = view_function("resolver", &[ParamType::FixedBytes(32)], &[ParamType::Address]);
        self.on_function(ENS_REGISTRY, &f, &[node.clone()], &[Token::Address(resolver)]);

        let f = view_function("addr", &[ParamType::FixedBytes(32)], &[ParamType::Address]);
        self.on_function(resolver, &f, &[node.clone()], &[Token::Address(target)]);

        if let Some(record) = content_contract {
            let f = view_function(
                "text",
                &[ParamType::FixedBytes(32), ParamType::String],
                &[ParamType::String],
            );
            self.on_function(
                resolver,
                &f,
                &[node, Token::String("contentcontract".into())],
                &[Token::String(record.into())],
            );
        }
    }

    /// Registers a name whose registry entry has no resolver.
    pub fn register_empty_name(&self, name: &str) {
        let node = Token::FixedBytes(namehash(name).as_bytes().to_vec());
        let f = view_function("resolver", &[ParamType::FixedBytes(32)], &[ParamType::Address]);
        self.on_function(ENS_REGISTRY, &f, &[node], &[Token::Address(Address::zero())]);
    }
}

#[async_trait]
impl ChainClient for MockChain {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Option<Bytes>, Web3Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.replies.get(&(to, data)).map(|r| r.value().clone()) {
            Some(Reply::Data(bytes)) => Ok(Some(bytes)),
            Some(Reply::Empty) => Ok(None),
            Some(Reply::Fail(reason)) => Err(Web3Error::Rpc(reason)),
            None => Err(Web3Error::Rpc("execution reverted".into())),
        }
    }
}

/// Hands out the registered mock chains.
#[derive(Default)]
pub struct MockFactory {
    chains: DashMap<u64, Arc<MockChain>>,
}

impl MockFactory {
    pub fn with_chains(chains: &[Arc<MockChain>]) -> Arc<Self> {
        let factory = Self::default();
        for chain in chains {
            factory.chains.insert(chain.chain_id, chain.clone());
        }
        Arc::new(factory)
    }
}

impl ClientFactory for MockFactory {
    fn connect(&self, chain: &ChainDescriptor) -> Result<Arc<dyn ChainClient>, Web3Error> {
        match self.chains.get(&chain.id) {
            Some(mock) => {
                let client: Arc<dyn ChainClient> = mock.value().clone();
                Ok(client)
            }
            None => Err(Web3Error::Connection {
                chain_id: chain.id,
                reason: "no mock chain registered".into(),
            }),
        }
    }
}
