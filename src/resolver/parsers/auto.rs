// src/resolver/parsers/auto.rs
//! `/<method>/<arg>/<arg>…[?query]` paths mapped onto typed contract reads.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::abi::{ParamType, Token};
use ethers::types::{Address, I256, U256};
use lazy_static::lazy_static;
use percent_encoding::percent_decode_str;
use regex::Regex;
use tracing::debug;

use crate::blockchain::{
    client::ChainContext,
    models::Web3Error,
    services::{abi, names::NameResolver},
};
use crate::resolver::{
    mime,
    models::{MethodCall, ParsedPath},
    parsers::AutoParser,
};

lazy_static! {
    static ref METHOD_NAME: Regex = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap();
    static ref HEX_ADDRESS: Regex = Regex::new(r"^0x[0-9a-fA-F]{40}$").unwrap();
}

pub struct DefaultAutoParser {
    names: Arc<dyn NameResolver>,
}

impl DefaultAutoParser {
    pub fn new(names: Arc<dyn NameResolver>) -> Self {
        Self { names }
    }

    async fn parse_argument(
        &self,
        raw: &str,
        ctx: &ChainContext,
    ) -> Result<(ParamType, Token), Web3Error> {
        if let Some((tag, value)) = raw.split_once('!') {
            let kind = abi::parse_param_type(tag).map_err(|e| {
                Web3Error::InvalidPath(format!("unknown argument type '{}': {}", tag, e))
            })?;
            let value = percent_decode(value)?;
            let token = self.typed_token(&kind, &value, ctx).await?;
            return Ok((kind, token));
        }

        let value = percent_decode(raw)?;
        self.inferred_token(&value, ctx).await
    }

    async fn typed_token(
        &self,
        kind: &ParamType,
        value: &str,
        ctx: &ChainContext,
    ) -> Result<Token, Web3Error> {
        let token = match kind {
            ParamType::Uint(bits) => Token::Uint(parse_uint_sized(value, *bits)?),
            ParamType::Int(bits) => Token::Int(parse_int(value, *bits)?),
            ParamType::Bool => match value {
                "true" => Token::Bool(true),
                "false" => Token::Bool(false),
                other => {
                    return Err(Web3Error::InvalidPath(format!("'{}' is not a bool", other)))
                }
            },
            ParamType::String => Token::String(value.to_string()),
            ParamType::Address => Token::Address(self.address_or_name(value, ctx).await?),
            ParamType::Bytes => Token::Bytes(parse_hex(value)?),
            ParamType::FixedBytes(size) => {
                let bytes = parse_hex(value)?;
                if bytes.len() != *size {
                    return Err(Web3Error::InvalidPath(format!(
                        "bytes{} argument has {} bytes",
                        size,
                        bytes.len()
                    )));
                }
                Token::FixedBytes(bytes)
            }
            other => {
                return Err(Web3Error::InvalidPath(format!(
                    "unsupported argument type '{}'",
                    other
                )))
            }
        };
        Ok(token)
    }

    async fn inferred_token(
        &self,
        value: &str,
        ctx: &ChainContext,
    ) -> Result<(ParamType, Token), Web3Error> {
        if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
            return Ok((ParamType::Uint(256), Token::Uint(parse_uint(value)?)));
        }

        if let Some(digits) = value.strip_prefix("0x") {
            if digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                return match digits.len() {
                    40 => Ok((ParamType::Address, Token::Address(parse_address(value)?))),
                    64 => Ok((ParamType::FixedBytes(32), Token::FixedBytes(parse_hex(value)?))),
                    _ => Ok((ParamType::Bytes, Token::Bytes(parse_hex(value)?))),
                };
            }
        }

        let address = self.resolve_name(value, ctx).await?;
        Ok((ParamType::Address, Token::Address(address)))
    }

    async fn address_or_name(&self, value: &str, ctx: &ChainContext) -> Result<Address, Web3Error> {
        if HEX_ADDRESS.is_match(value) {
            return parse_address(value);
        }
        self.resolve_name(value, ctx).await
    }

    async fn resolve_name(&self, name: &str, ctx: &ChainContext) -> Result<Address, Web3Error> {
        if !self.names.is_supported(name, &ctx.chain) {
            return Err(Web3Error::InvalidPath(format!(
                "argument '{}' is neither a literal nor a resolvable name",
                name
            )));
        }
        let resolved = self
            .names
            .resolve(name, ctx)
            .await
            .map_err(|e| Web3Error::unresolvable(name, Some(e)))?;
        debug!("argument {} resolved to {:?}", name, resolved.address);
        Ok(resolved.address)
    }
}

#[async_trait]
impl AutoParser for DefaultAutoParser {
    async fn parse_auto(&self, path: &str, ctx: &ChainContext) -> Result<ParsedPath, Web3Error> {
        let (pathname, query) = match path.split_once('?') {
            Some((pathname, query)) => (pathname, query),
            None => (path, ""),
        };
        let options = QueryOptions::parse(query)?;

        if pathname.is_empty() || pathname == "/" {
            return Ok(ParsedPath::calldata(Vec::new()).with_mime_type(options.mime_type));
        }

        let rest = pathname
            .strip_prefix('/')
            .ok_or_else(|| Web3Error::InvalidPath(format!("path '{}' must start with '/'", path)))?;
        let mut segments: Vec<&str> = rest.split('/').collect();
        if segments.len() > 1 && segments.last() == Some(&"") {
            segments.pop();
        }

        let method = segments[0];
        if !METHOD_NAME.is_match(method) {
            return Err(Web3Error::InvalidPath(format!(
                "'{}' is not a valid method name",
                method
            )));
        }

        let mut call = MethodCall::new(method);
        for raw in &segments[1..] {
            let (kind, token) = self.parse_argument(raw, ctx).await?;
            call = call.with_arg(kind, token);
        }

        let return_json_encode = options.return_types.is_some();
        if let Some(return_types) = options.return_types {
            call = call.with_returns(return_types);
        }

        Ok(ParsedPath {
            return_json_encode,
            ..ParsedPath::method(call).with_mime_type(options.mime_type)
        })
    }
}

#[derive(Debug, Default)]
struct QueryOptions {
    return_types: Option<Vec<ParamType>>,
    mime_type: Option<String>,
}

impl QueryOptions {
    fn parse(query: &str) -> Result<Self, Web3Error> {
        let mut options = QueryOptions::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "returns" | "returnTypes" => {
                    options.return_types = Some(parse_return_types(&value)?)
                }
                "mime.content" => options.mime_type = Some(value.into_owned()),
                "mime.type" => {
                    let mime = mime::mime_for_extension(&value).ok_or_else(|| {
                        Web3Error::InvalidPath(format!("unknown mime.type '{}'", value))
                    })?;
                    options.mime_type = Some(mime.to_string());
                }
                _ => {}
            }
        }
        Ok(options)
    }
}

/// `(t1,t2,…)`, tuples allowed as members.
fn parse_return_types(value: &str) -> Result<Vec<ParamType>, Web3Error> {
    let inner = value
        .trim()
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
        .ok_or_else(|| Web3Error::InvalidPath(format!("returns '{}' must be parenthesized", value)))?;
    if inner.trim().is_empty() {
        return Err(Web3Error::InvalidPath("returns=() declares no return type".into()));
    }

    split_top_level(inner)
        .into_iter()
        .map(|tag| {
            abi::parse_param_type(tag).map_err(|e| {
                Web3Error::InvalidPath(format!("unknown return type '{}': {}", tag, e))
            })
        })
        .collect()
}

fn split_top_level(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&list[start..]);
    parts
}

fn percent_decode(raw: &str) -> Result<String, Web3Error> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|v| v.into_owned())
        .map_err(|e| Web3Error::InvalidPath(format!("argument '{}' is not UTF-8: {}", raw, e)))
}

fn parse_uint(value: &str) -> Result<U256, Web3Error> {
    let parsed = match value.strip_prefix("0x") {
        Some(digits) => U256::from_str_radix(digits, 16).ok(),
        None => U256::from_dec_str(value).ok(),
    };
    parsed.ok_or_else(|| Web3Error::InvalidPath(format!("'{}' is not an unsigned integer", value)))
}

fn parse_uint_sized(value: &str, bits: usize) -> Result<U256, Web3Error> {
    let parsed = parse_uint(value)?;
    if bits < 256 && parsed.bits() > bits {
        return Err(Web3Error::InvalidPath(format!(
            "'{}' does not fit in uint{}",
            value, bits
        )));
    }
    Ok(parsed)
}

/// Two's complement encoding of a decimal value, checked against `int<bits>`.
fn parse_int(value: &str, bits: usize) -> Result<U256, Web3Error> {
    let parsed = I256::from_dec_str(value)
        .map_err(|_| Web3Error::InvalidPath(format!("'{}' is not a signed integer", value)))?;
    if bits < 256 {
        // int<bits> spans [-2^(bits-1), 2^(bits-1) - 1]
        let bound = U256::one() << bits.saturating_sub(1);
        let magnitude = parsed.unsigned_abs();
        let fits = if parsed.is_negative() {
            magnitude <= bound
        } else {
            magnitude < bound
        };
        if !fits {
            return Err(Web3Error::InvalidPath(format!(
                "'{}' does not fit in int{}",
                value, bits
            )));
        }
    }
    Ok(parsed.into_raw())
}

fn parse_hex(value: &str) -> Result<Vec<u8>, Web3Error> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| Web3Error::InvalidPath(format!("'{}' is not 0x-prefixed hex", value)))?;
    hex::decode(digits).map_err(|e| Web3Error::InvalidPath(format!("bad hex '{}': {}", value, e)))
}

fn parse_address(value: &str) -> Result<Address, Web3Error> {
    Address::from_str(value)
        .map_err(|e| Web3Error::InvalidPath(format!("bad address '{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{
        chains,
        client::ChainClient,
        models::ChainDescriptor,
        services::names::ResolvedName,
    };
    use crate::resolver::models::ContractCall;
    use ethers::types::Bytes;

    struct OfflineClient;

    #[async_trait]
    impl ChainClient for OfflineClient {
        fn chain_id(&self) -> u64 {
            1
        }

        async fn call(&self, _to: Address, _data: Bytes) -> Result<Option<Bytes>, Web3Error> {
            Err(Web3Error::Rpc("offline".into()))
        }
    }

    struct FixedNames;

    #[async_trait]
    impl NameResolver for FixedNames {
        fn is_supported(&self, name: &str, _chain: &ChainDescriptor) -> bool {
            name.ends_with(".eth")
        }

        async fn resolve(&self, name: &str, _ctx: &ChainContext) -> Result<ResolvedName, Web3Error> {
            if name == "missing.eth" {
                return Err(Web3Error::NameRecordMissing(name.to_string()));
            }
            Ok(ResolvedName {
                address: Address::repeat_byte(0x11),
                chain_id: None,
            })
        }
    }

    fn ctx() -> ChainContext {
        ChainContext {
            chain: chains::resolve_chain(1, &[]).unwrap(),
            client: Arc::new(OfflineClient),
        }
    }

    fn parser() -> DefaultAutoParser {
        DefaultAutoParser::new(Arc::new(FixedNames))
    }

    async fn parse(path: &str) -> Result<ParsedPath, Web3Error> {
        parser().parse_auto(path, &ctx()).await
    }

    fn method(parsed: &ParsedPath) -> &MethodCall {
        match &parsed.call {
            ContractCall::Method(call) => call,
            other => panic!("expected a method call, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_root_path_is_empty_calldata() {
        for path in ["", "/"] {
            let parsed = parse(path).await.unwrap();
            assert_eq!(parsed.call, ContractCall::Calldata(Bytes::default()));
        }
        let parsed = parse("/?mime.type=html").await.unwrap();
        assert_eq!(parsed.mime_type.as_deref(), Some("text/html"));
    }

    #[tokio::test]
    async fn test_inferred_arguments() {
        let parsed = parse(
            "/balanceOf/0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed/42/0xdead/vitalik.eth/",
        )
        .await
        .unwrap();
        let call = method(&parsed);
        assert_eq!(call.name, "balanceOf");
        assert_eq!(
            call.arg_types,
            vec![
                ParamType::Address,
                ParamType::Uint(256),
                ParamType::Bytes,
                ParamType::Address
            ]
        );
        assert_eq!(call.arg_values[1], Token::Uint(U256::from(42)));
        assert_eq!(call.arg_values[2], Token::Bytes(vec![0xde, 0xad]));
        assert_eq!(call.arg_values[3], Token::Address(Address::repeat_byte(0x11)));
        assert_eq!(call.return_types, vec![ParamType::String]);
        assert!(!parsed.return_json_encode);

        let hash = format!("0x{}", "ab".repeat(32));
        let parsed = parse(&format!("/get/{}", hash)).await.unwrap();
        assert_eq!(method(&parsed).arg_types, vec![ParamType::FixedBytes(32)]);
    }

    #[tokio::test]
    async fn test_typed_arguments() {
        let parsed = parse("/set/uint8!7/int256!-3/bool!true/string!hello%20world/bytes2!0xbeef")
            .await
            .unwrap();
        let call = method(&parsed);
        assert_eq!(
            call.arg_types,
            vec![
                ParamType::Uint(8),
                ParamType::Int(256),
                ParamType::Bool,
                ParamType::String,
                ParamType::FixedBytes(2)
            ]
        );
        assert_eq!(call.arg_values[1], Token::Int(I256::from(-3i64).into_raw()));
        assert_eq!(call.arg_values[3], Token::String("hello world".into()));

        assert!(matches!(
            parse("/set/bool!maybe").await,
            Err(Web3Error::InvalidPath(_))
        ));
        assert!(matches!(
            parse("/set/bytes32!0xbeef").await,
            Err(Web3Error::InvalidPath(_))
        ));
    }

    #[tokio::test]
    async fn test_sized_integers_are_range_checked() {
        for path in ["/set/uint8!255", "/set/uint8!0xff", "/set/int8!127", "/set/int8!-128"] {
            assert!(parse(path).await.is_ok(), "{}", path);
        }
        for path in ["/set/uint8!256", "/set/uint8!300", "/set/int8!128", "/set/int8!-129"] {
            assert!(
                matches!(parse(path).await, Err(Web3Error::InvalidPath(_))),
                "{}",
                path
            );
        }

        let parsed = parse("/set/int16!-1").await.unwrap();
        assert_eq!(method(&parsed).arg_values[0], Token::Int(U256::MAX));
    }

    #[tokio::test]
    async fn test_returns_query() {
        let parsed = parse("/tokenURI/1?returns=(uint256,(address,bool))&mime.content=text%2Fplain")
            .await
            .unwrap();
        let call = method(&parsed);
        assert_eq!(
            call.return_types,
            vec![
                ParamType::Uint(256),
                ParamType::Tuple(vec![ParamType::Address, ParamType::Bool])
            ]
        );
        assert!(parsed.return_json_encode);
        assert_eq!(parsed.mime_type.as_deref(), Some("text/plain"));

        let legacy = parse("/name?returnTypes=(string)").await.unwrap();
        assert!(legacy.return_json_encode);

        assert!(matches!(
            parse("/name?returns=()").await,
            Err(Web3Error::InvalidPath(_))
        ));
    }

    #[tokio::test]
    async fn test_rejected_paths() {
        assert!(matches!(parse("/1bad").await, Err(Web3Error::InvalidPath(_))));
        assert!(matches!(parse(":0/name").await, Err(Web3Error::InvalidPath(_))));
        assert!(matches!(
            parse("/owner/not-a-name").await,
            Err(Web3Error::InvalidPath(_))
        ));
        assert!(matches!(
            parse("/owner/missing.eth").await,
            Err(Web3Error::UnresolvableName { .. })
        ));
    }
}
