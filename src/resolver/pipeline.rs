// src/resolver/pipeline.rs

use std::str::FromStr;

use ethers::abi::{ParamType, Token};
use ethers::types::Address;
use ethers::utils::parse_bytes32_string;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info};

use crate::blockchain::{
    chains::DEFAULT_CHAIN_ID,
    client::ChainContext,
    models::Web3Error,
    services::abi,
};
use crate::resolver::{
    models::{FetchOptions, NameResolutionInfo, ResolveMode, ResolvedCallIntent, WEB3_SCHEME},
    Web3Client,
};

lazy_static! {
    static ref WEB3_URL: Regex = Regex::new(
        r"^(?P<protocol>[^:]+)://(?P<hostname>[^:/?]+)(?::(?P<chain_id>[1-9][0-9]*))?(?P<path>.*)$"
    )
    .unwrap();
    static ref ADDRESS_PREFIX: Regex = Regex::new(r"^0x[0-9a-fA-F]{40}").unwrap();
}

#[derive(Debug, PartialEq, Eq)]
struct UrlParts<'a> {
    hostname: &'a str,
    chain_id: Option<u64>,
    path: &'a str,
}

fn split_url(url: &str) -> Result<UrlParts<'_>, Web3Error> {
    let caps = WEB3_URL
        .captures(url)
        .ok_or_else(|| Web3Error::MalformedUrl(url.to_string()))?;

    let protocol = caps.name("protocol").map_or("", |m| m.as_str());
    if protocol != WEB3_SCHEME {
        return Err(Web3Error::UnsupportedProtocol(protocol.to_string()));
    }

    // A segment the grammar rejects (`:0`, `:abc`) stays in the path. One it
    // accepts is a chain id even when it does not fit in a u64; no chain can
    // be registered under such an id.
    let chain_id = match caps.name("chain_id") {
        Some(m) => Some(
            m.as_str()
                .parse::<u64>()
                .map_err(|_| Web3Error::UnknownChain(u64::MAX))?,
        ),
        None => None,
    };

    Ok(UrlParts {
        hostname: caps.name("hostname").map_or("", |m| m.as_str()),
        chain_id,
        path: caps.name("path").map_or("", |m| m.as_str()),
    })
}

/// Reads a `bytes32` resolve mode. Anything that is not NUL-padded UTF-8
/// reads as the empty string.
fn decode_resolve_mode(raw: &[u8]) -> String {
    <[u8; 32]>::try_from(raw)
        .ok()
        .and_then(|word| parse_bytes32_string(&word).ok().map(str::to_string))
        .unwrap_or_default()
}

/// Reads `resolveMode()` from the contract. A failed call is not an error:
/// it reads as the empty string, i.e. auto mode.
async fn probe_resolve_mode(
    ctx: &ChainContext,
    address: Address,
) -> Result<ResolveMode, Web3Error> {
    let function = abi::view_function("resolveMode", &[], &[ParamType::FixedBytes(32)]);
    let probed: Result<String, Web3Error> = ctx
        .client
        .read_contract(address, &function, &[])
        .await
        .map(|tokens| match tokens.first() {
            Some(Token::FixedBytes(raw)) => decode_resolve_mode(raw),
            _ => String::new(),
        });

    let value = probed.unwrap_or_else(|e| {
        debug!("resolveMode() unavailable on {:?}, assuming auto: {}", address, e);
        String::new()
    });
    ResolveMode::from_probe(&value)
}

impl Web3Client {
    /// Turns a `web3://` URL into a fully resolved call intent.
    pub async fn resolve(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<ResolvedCallIntent, Web3Error> {
        let parts = split_url(url)?;
        debug!(
            "Resolving {} (host {}, chain {:?}, path '{}')",
            url, parts.hostname, parts.chain_id, parts.path
        );

        let ctx = self.connect(parts.chain_id.unwrap_or(DEFAULT_CHAIN_ID), options)?;
        let (contract_address, name_resolution, ctx) =
            self.locate_contract(parts.hostname, ctx, options).await?;

        let mode = probe_resolve_mode(&ctx, contract_address).await?;
        debug!("{:?} on chain {} is in {:?} mode", contract_address, ctx.chain_id(), mode);

        let parsed = match mode {
            ResolveMode::Manual => self.manual.parse_manual(parts.path)?,
            ResolveMode::Auto => self.auto.parse_auto(parts.path, &ctx).await?,
        };

        Ok(ResolvedCallIntent {
            chain_id: ctx.chain_id(),
            contract_address,
            name_resolution,
            mode,
            call: parsed.call,
            method_return_json_encode: parsed.return_json_encode,
            mime_type: parsed.mime_type,
        })
    }

    /// Maps the hostname to a contract address. Returns the chain context all
    /// later stages must use, which differs from `ctx` when the name points
    /// at another chain.
    async fn locate_contract(
        &self,
        hostname: &str,
        ctx: ChainContext,
        options: &FetchOptions,
    ) -> Result<(Address, Option<NameResolutionInfo>, ChainContext), Web3Error> {
        if let Some(m) = ADDRESS_PREFIX.find(hostname) {
            let address = Address::from_str(m.as_str())
                .map_err(|e| Web3Error::MalformedUrl(format!("{}: {}", hostname, e)))?;
            return Ok((address, None, ctx));
        }

        if !self.names.is_supported(hostname, &ctx.chain) {
            return Err(Web3Error::unresolvable(hostname, None));
        }

        let info = NameResolutionInfo {
            chain_id: ctx.chain_id(),
            resolved_name: hostname.to_string(),
        };
        let resolved = self
            .names
            .resolve(hostname, &ctx)
            .await
            .map_err(|e| Web3Error::unresolvable(hostname, Some(e)))?;
        debug!("{} resolved to {:?}", hostname, resolved.address);

        let ctx = match resolved.chain_id {
            Some(chain_id) if chain_id != ctx.chain_id() => {
                info!(
                    "{} points to chain {}, switching from chain {}",
                    hostname,
                    chain_id,
                    ctx.chain_id()
                );
                self.connect(chain_id, options)?
            }
            _ => ctx,
        };

        Ok((resolved.address, Some(info), ctx))
    }
}
