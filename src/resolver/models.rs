// src/resolver/models.rs

use ethers::abi::{Function, ParamType, Token};
use ethers::types::{Address, Bytes};
use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};

use crate::blockchain::{
    models::{ChainOverride, Web3Error},
    services::abi,
};

/// The only URL scheme the resolver accepts.
pub const WEB3_SCHEME: &str = "web3";

// --- Call intent ---

/// How a contract wants its URL paths interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    #[default]
    Auto,
    Manual,
}

impl ResolveMode {
    /// Interprets the decoded `resolveMode()` value of a contract.
    pub fn from_probe(value: &str) -> Result<Self, Web3Error> {
        match value {
            "" | "auto" => Ok(ResolveMode::Auto),
            "manual" => Ok(ResolveMode::Manual),
            other => Err(Web3Error::UnsupportedResolveMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractCallMode {
    Calldata,
    Method,
}

/// A typed read of a named contract function.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub name: String,
    pub arg_types: Vec<ParamType>,
    /// Aligned 1:1 with `arg_types`.
    pub arg_values: Vec<Token>,
    pub return_types: Vec<ParamType>,
}

impl MethodCall {
    /// A call with no arguments returning a single `string`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arg_types: Vec::new(),
            arg_values: Vec::new(),
            return_types: vec![ParamType::String],
        }
    }

    pub fn with_arg(mut self, kind: ParamType, value: Token) -> Self {
        self.arg_types.push(kind);
        self.arg_values.push(value);
        self
    }

    pub fn with_returns(mut self, return_types: Vec<ParamType>) -> Self {
        self.return_types = return_types;
        self
    }

    /// Ad hoc function fragment for this call.
    pub fn function(&self) -> Function {
        abi::view_function(&self.name, &self.arg_types, &self.return_types)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContractCall {
    /// Raw input bytes, bypassing ABI method encoding.
    Calldata(Bytes),
    Method(MethodCall),
}

impl ContractCall {
    pub fn mode(&self) -> ContractCallMode {
        match self {
            ContractCall::Calldata(_) => ContractCallMode::Calldata,
            ContractCall::Method(_) => ContractCallMode::Method,
        }
    }
}

/// What a mode sub-parser makes of a URL path.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPath {
    pub call: ContractCall,
    pub return_json_encode: bool,
    pub mime_type: Option<String>,
}

impl ParsedPath {
    pub fn calldata(data: impl Into<Bytes>) -> Self {
        Self {
            call: ContractCall::Calldata(data.into()),
            return_json_encode: false,
            mime_type: None,
        }
    }

    pub fn method(call: MethodCall) -> Self {
        Self {
            call: ContractCall::Method(call),
            return_json_encode: false,
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: Option<String>) -> Self {
        self.mime_type = mime_type;
        self
    }
}

/// Recorded when the hostname had to go through name resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameResolutionInfo {
    pub chain_id: u64,
    pub resolved_name: String,
}

/// Fully-resolved description of the contract read a URL stands for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "IntentRecord", try_from = "IntentRecord")]
pub struct ResolvedCallIntent {
    pub chain_id: u64,
    pub contract_address: Address,
    pub name_resolution: Option<NameResolutionInfo>,
    pub mode: ResolveMode,
    pub call: ContractCall,
    pub method_return_json_encode: bool,
    pub mime_type: Option<String>,
}

impl ResolvedCallIntent {
    pub fn contract_call_mode(&self) -> ContractCallMode {
        self.call.mode()
    }

    pub fn calldata(&self) -> Option<&Bytes> {
        match &self.call {
            ContractCall::Calldata(data) => Some(data),
            ContractCall::Method(_) => None,
        }
    }

    pub fn method(&self) -> Option<&MethodCall> {
        match &self.call {
            ContractCall::Method(call) => Some(call),
            ContractCall::Calldata(_) => None,
        }
    }
}

/// Flat wire shape of a `ResolvedCallIntent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntentRecord {
    chain_id: u64,
    contract_address: Address,
    #[serde(default)]
    name_resolution: Option<NameResolutionInfo>,
    #[serde(default)]
    mode: ResolveMode,
    contract_call_mode: ContractCallMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    calldata: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    method_name: Option<String>,
    #[serde(default)]
    method_arg_types: Vec<String>,
    /// Display form only; `method_arg_data` is authoritative.
    #[serde(default)]
    method_arg_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    method_arg_data: Option<Bytes>,
    #[serde(default)]
    method_return_types: Vec<String>,
    #[serde(default)]
    method_return_json_encode: bool,
    #[serde(default)]
    mime_type: Option<String>,
}

impl From<ResolvedCallIntent> for IntentRecord {
    fn from(intent: ResolvedCallIntent) -> Self {
        let mut record = IntentRecord {
            chain_id: intent.chain_id,
            contract_address: intent.contract_address,
            name_resolution: intent.name_resolution,
            mode: intent.mode,
            contract_call_mode: intent.call.mode(),
            calldata: None,
            method_name: None,
            method_arg_types: Vec::new(),
            method_arg_values: Vec::new(),
            method_arg_data: None,
            method_return_types: Vec::new(),
            method_return_json_encode: intent.method_return_json_encode,
            mime_type: intent.mime_type,
        };

        match intent.call {
            ContractCall::Calldata(data) => record.calldata = Some(data),
            ContractCall::Method(call) => {
                record.method_arg_types = call.arg_types.iter().map(abi::param_type_to_string).collect();
                record.method_arg_values = call.arg_values.iter().map(abi::stringify_token).collect();
                record.method_arg_data = Some(Bytes::from(ethers::abi::encode(&call.arg_values)));
                record.method_return_types =
                    call.return_types.iter().map(abi::param_type_to_string).collect();
                record.method_name = Some(call.name);
            }
        }
        record
    }
}

fn parse_type_list(tags: &[String]) -> Result<Vec<ParamType>, Web3Error> {
    tags.iter()
        .map(|tag| {
            abi::parse_param_type(tag)
                .map_err(|e| Web3Error::InvalidIntent(format!("bad type '{}': {}", tag, e)))
        })
        .collect()
}

impl TryFrom<IntentRecord> for ResolvedCallIntent {
    type Error = Web3Error;

    fn try_from(record: IntentRecord) -> Result<Self, Self::Error> {
        let call = match record.contract_call_mode {
            ContractCallMode::Calldata => {
                if record.method_name.is_some() {
                    return Err(Web3Error::InvalidIntent(
                        "calldata intent carries a method name".into(),
                    ));
                }
                let data = record.calldata.ok_or_else(|| {
                    Web3Error::InvalidIntent("calldata intent without calldata".into())
                })?;
                ContractCall::Calldata(data)
            }
            ContractCallMode::Method => {
                if record.calldata.is_some() {
                    return Err(Web3Error::InvalidIntent(
                        "method intent carries calldata".into(),
                    ));
                }
                let name = record.method_name.ok_or_else(|| {
                    Web3Error::InvalidIntent("method intent without a method name".into())
                })?;
                let arg_types = parse_type_list(&record.method_arg_types)?;
                let arg_values = match (&record.method_arg_data, arg_types.is_empty()) {
                    (_, true) => Vec::new(),
                    (Some(data), false) => ethers::abi::decode(&arg_types, data).map_err(|e| {
                        Web3Error::InvalidIntent(format!("undecodable method arguments: {}", e))
                    })?,
                    (None, false) => {
                        return Err(Web3Error::InvalidIntent(
                            "method arguments declared without argument data".into(),
                        ))
                    }
                };
                let mut return_types = parse_type_list(&record.method_return_types)?;
                if return_types.is_empty() {
                    return_types.push(ParamType::String);
                }
                ContractCall::Method(MethodCall {
                    name,
                    arg_types,
                    arg_values,
                    return_types,
                })
            }
        };

        Ok(ResolvedCallIntent {
            chain_id: record.chain_id,
            contract_address: record.contract_address,
            name_resolution: record.name_resolution,
            mode: record.mode,
            call,
            method_return_json_encode: record.method_return_json_encode,
            mime_type: record.mime_type,
        })
    }
}

// --- Fetch result ---

/// Options shared by both pipeline stages.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub chain_overrides: Vec<ChainOverride>,
}

impl FetchOptions {
    pub fn with_overrides(chain_overrides: Vec<ChainOverride>) -> Self {
        Self { chain_overrides }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutput {
    /// Payload of a calldata-mode call.
    Bytes(Bytes),
    /// One token per declared return type.
    Decoded(Vec<Token>),
    /// JSON array of strings.
    Json(String),
}

impl FetchOutput {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchOutput::Bytes(_) => "bytes",
            FetchOutput::Decoded(_) => "decoded",
            FetchOutput::Json(_) => "json",
        }
    }

    /// The output as an ordered sequence of strings.
    pub fn to_string_sequence(&self) -> Vec<String> {
        match self {
            FetchOutput::Bytes(bytes) => vec![format!("0x{}", hex::encode(bytes))],
            FetchOutput::Decoded(tokens) => abi::output_sequence(tokens.clone())
                .iter()
                .map(abi::stringify_token)
                .collect(),
            FetchOutput::Json(json) => vec![json.clone()],
        }
    }

    /// Re-encodes the output as a JSON array of strings.
    pub fn into_json(self) -> FetchOutput {
        let values = serde_json::Value::from(self.to_string_sequence());
        FetchOutput::Json(values.to_string())
    }

    /// Bytes to serve over HTTP.
    pub fn to_body(&self) -> Vec<u8> {
        match self {
            FetchOutput::Bytes(bytes) => bytes.to_vec(),
            FetchOutput::Decoded(tokens) => tokens
                .iter()
                .map(abi::stringify_token)
                .collect::<Vec<_>>()
                .join(",")
                .into_bytes(),
            FetchOutput::Json(json) => json.clone().into_bytes(),
        }
    }
}

impl Serialize for FetchOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FetchOutput", 2)?;
        state.serialize_field("kind", self.kind())?;
        match self {
            FetchOutput::Bytes(bytes) => state.serialize_field("value", bytes)?,
            FetchOutput::Decoded(tokens) => {
                let values: Vec<String> = tokens.iter().map(abi::stringify_token).collect();
                state.serialize_field("value", &values)?
            }
            FetchOutput::Json(json) => state.serialize_field("value", json)?,
        }
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    pub resolved_intent: ResolvedCallIntent,
    pub output: FetchOutput,
    pub mime_type: Option<String>,
}
