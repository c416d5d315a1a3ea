// src/resolver/executor.rs

use ethers::abi::{ParamType, Token};
use ethers::types::{Address, Bytes};
use tracing::debug;

use crate::blockchain::{client::ChainContext, models::Web3Error};
use crate::resolver::{
    models::{ContractCall, FetchOptions, FetchOutput, FetchResult, ResolvedCallIntent},
    Web3Client,
};

/// Raw call whose return data wraps the payload in a single ABI `bytes` value.
async fn call_with_calldata(
    ctx: &ChainContext,
    address: Address,
    data: Bytes,
) -> Result<Bytes, Web3Error> {
    let raw = ctx
        .client
        .call(address, data)
        .await?
        .ok_or(Web3Error::NotAContract(address))?;

    match ethers::abi::decode(&[ParamType::Bytes], &raw) {
        Ok(mut tokens) => match tokens.pop() {
            Some(Token::Bytes(payload)) => Ok(Bytes::from(payload)),
            _ => Err(Web3Error::NotAContract(address)),
        },
        Err(e) => {
            debug!("return data of {:?} is not ABI bytes: {}", address, e);
            Err(Web3Error::NotAContract(address))
        }
    }
}

impl Web3Client {
    /// Runs a resolved intent against its chain. The intent may come from
    /// [`Web3Client::resolve`] or from a deserialized record.
    pub async fn execute(
        &self,
        intent: ResolvedCallIntent,
        options: &FetchOptions,
    ) -> Result<FetchResult, Web3Error> {
        let ctx = self.connect(intent.chain_id, options)?;

        let output = match &intent.call {
            ContractCall::Calldata(data) => FetchOutput::Bytes(
                call_with_calldata(&ctx, intent.contract_address, data.clone()).await?,
            ),
            ContractCall::Method(call) => {
                debug!(
                    "Calling {}({}) on {:?}",
                    call.name,
                    call.arg_types
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(","),
                    intent.contract_address
                );
                let tokens = ctx
                    .client
                    .read_contract(intent.contract_address, &call.function(), &call.arg_values)
                    .await?;
                FetchOutput::Decoded(tokens)
            }
        };

        let output = if intent.method_return_json_encode {
            output.into_json()
        } else {
            output
        };

        let mime_type = intent.mime_type.clone();
        Ok(FetchResult {
            resolved_intent: intent,
            output,
            mime_type,
        })
    }
}
