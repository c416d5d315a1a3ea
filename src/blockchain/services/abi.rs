// src/blockchain/services/abi.rs

use ethers::abi::{
    ethabi::param_type::Reader, Function, Param, ParamType, StateMutability, Token,
};
use ethers::types::I256;
use ethers::utils::to_checksum;

/// Parses a Solidity type tag such as `uint256`, `bytes32` or `address[]`.
pub fn parse_param_type(tag: &str) -> Result<ParamType, ethers::abi::Error> {
    Reader::read(tag.trim())
}

/// Canonical type string, e.g. `uint256`.
pub fn param_type_to_string(kind: &ParamType) -> String {
    kind.to_string()
}

fn unnamed_param(kind: &ParamType) -> Param {
    Param {
        name: String::new(),
        kind: kind.clone(),
        internal_type: None,
    }
}

/// Builds an ad hoc `view` function fragment from its name and type lists.
#[allow(deprecated)]
pub fn view_function(name: &str, inputs: &[ParamType], outputs: &[ParamType]) -> Function {
    Function {
        name: name.to_string(),
        inputs: inputs.iter().map(unnamed_param).collect(),
        outputs: outputs.iter().map(unnamed_param).collect(),
        constant: None,
        state_mutability: StateMutability::View,
    }
}

/// Renders a decoded value the way a JSON consumer expects to read it.
pub fn stringify_token(token: &Token) -> String {
    match token {
        Token::Address(address) => to_checksum(address, None),
        Token::FixedBytes(bytes) | Token::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
        Token::Int(raw) => I256::from_raw(*raw).to_string(),
        Token::Uint(value) => value.to_string(),
        Token::Bool(b) => b.to_string(),
        Token::String(s) => s.clone(),
        Token::FixedArray(items) | Token::Array(items) | Token::Tuple(items) => items
            .iter()
            .map(stringify_token)
            .collect::<Vec<_>>()
            .join(","),
    }
}

/// Turns a function's decoded outputs into an ordered sequence: a single
/// array return contributes its elements, a single scalar is wrapped.
pub fn output_sequence(mut tokens: Vec<Token>) -> Vec<Token> {
    if tokens.len() != 1 {
        return tokens;
    }
    match tokens.remove(0) {
        Token::Array(items) | Token::FixedArray(items) => items,
        single => vec![single],
    }
}
