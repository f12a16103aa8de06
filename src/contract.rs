// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Runtime-ABI contract binding.
//!
//! A [`Contract`] pairs a deployed address with a JSON ABI. Methods are
//! partitioned by state mutability: constant (`view`/`pure`) methods execute
//! as direct `eth_call`s returning decoded outputs, while mutating methods
//! build signable [`Clause`]s, either handed back to the caller or signed and
//! broadcast immediately through a [`TxSender`]. Events are exposed as named
//! filter builders.

use std::str::FromStr;

use alloy::{
    dyn_abi::{DecodedEvent, DynSolValue, EventExt, FunctionExt, JsonAbiExt},
    json_abi::{Event, Function, JsonAbi, StateMutability},
    primitives::{Address, Selector, B256, U256},
    providers::Provider,
    rpc::types::TransactionRequest,
};

use crate::client::AvaxClientError;
use crate::tx::{Clause, SendResult, TxSender};
use crate::types::{EventFilter, EventRow};

/// A deployed contract bound to its ABI.
pub struct Contract<P> {
    address: Address,
    abi: JsonAbi,
    provider: P,
}

impl<P: Provider + Clone> Contract<P> {
    pub fn new(provider: P, address: Address, abi: JsonAbi) -> Self {
        Self {
            address,
            abi,
            provider,
        }
    }

    /// Bind a contract from its JSON ABI text.
    pub fn from_json(
        provider: P,
        address: &str,
        abi_json: &str,
    ) -> Result<Self, AvaxClientError> {
        let address = Address::from_str(address)
            .map_err(|e| AvaxClientError::InvalidAddress(e.to_string()))?;

        let abi: JsonAbi = serde_json::from_str(abi_json)
            .map_err(|e| AvaxClientError::ContractError(format!("Invalid ABI JSON: {e}")))?;

        Ok(Self::new(provider, address, abi))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Look up a method by name.
    pub fn method(&self, name: &str) -> Result<BoundMethod<'_, P>, AvaxClientError> {
        let function = self
            .abi
            .function(name)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| {
                AvaxClientError::ContractError(format!("Unknown function `{name}`"))
            })?;

        Ok(BoundMethod {
            function,
            address: self.address,
            provider: &self.provider,
        })
    }

    /// Look up an event by name.
    pub fn event(&self, name: &str) -> Result<BoundEvent<'_>, AvaxClientError> {
        let event = self
            .abi
            .event(name)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| AvaxClientError::ContractError(format!("Unknown event `{name}`")))?;

        Ok(BoundEvent {
            event,
            address: self.address,
        })
    }
}

impl<P> std::fmt::Debug for Contract<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contract")
            .field("address", &self.address)
            .field("functions", &self.abi.functions().count())
            .field("events", &self.abi.events().count())
            .finish()
    }
}

/// One contract method, bound to an address and a provider.
pub struct BoundMethod<'a, P> {
    function: &'a Function,
    address: Address,
    provider: &'a P,
}

impl<'a, P: Provider + Clone> BoundMethod<'a, P> {
    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// 4-byte dispatch selector of this method.
    pub fn selector(&self) -> Selector {
        self.function.selector()
    }

    /// True for `view`/`pure` methods, which execute via `eth_call`.
    pub fn is_constant(&self) -> bool {
        matches!(
            self.function.state_mutability,
            StateMutability::View | StateMutability::Pure
        )
    }

    /// Execute a constant method and decode its outputs.
    pub async fn call(&self, args: &[DynSolValue]) -> Result<Vec<DynSolValue>, AvaxClientError> {
        if !self.is_constant() {
            return Err(AvaxClientError::ContractError(format!(
                "Function `{}` mutates state; build a clause and sign it instead",
                self.function.name
            )));
        }

        let data = self
            .function
            .abi_encode_input(args)
            .map_err(|e| AvaxClientError::ContractError(e.to_string()))?;

        let request = TransactionRequest::default()
            .to(self.address)
            .input(data.into());

        let output = self
            .provider
            .call(request)
            .await
            .map_err(|e| AvaxClientError::RpcError(e.to_string()))?;

        self.function
            .abi_decode_output(&output)
            .map_err(|e| AvaxClientError::ContractError(e.to_string()))
    }

    /// Build a signable clause invoking this method.
    pub fn clause(&self, args: &[DynSolValue]) -> Result<Clause, AvaxClientError> {
        let data = self
            .function
            .abi_encode_input(args)
            .map_err(|e| AvaxClientError::ContractError(e.to_string()))?;

        Ok(Clause::call(self.address, data))
    }

    /// Build a clause carrying native value alongside the call.
    pub fn clause_with_value(
        &self,
        args: &[DynSolValue],
        value: U256,
    ) -> Result<Clause, AvaxClientError> {
        Ok(self.clause(args)?.with_value(value))
    }

    /// Build the clause and immediately sign and broadcast it.
    pub async fn send(
        &self,
        sender: &TxSender,
        args: &[DynSolValue],
    ) -> Result<SendResult, AvaxClientError> {
        sender.send_clause(&self.clause(args)?).await
    }
}

/// One contract event, usable as a filter builder and row decoder.
pub struct BoundEvent<'a> {
    event: &'a Event,
    address: Address,
}

impl<'a> BoundEvent<'a> {
    pub fn name(&self) -> &str {
        &self.event.name
    }

    /// keccak topic identifying this event.
    pub fn signature_topic(&self) -> B256 {
        self.event.selector()
    }

    /// Filter matching this event on the bound contract.
    pub fn filter(&self) -> EventFilter {
        EventFilter::new()
            .address(self.address)
            .event_signature(self.event.selector())
    }

    /// Decode a raw row into indexed and body values.
    pub fn decode(&self, row: &EventRow) -> Result<DecodedEvent, AvaxClientError> {
        self.event
            .decode_log_parts(row.topics.iter().copied(), &row.data)
            .map_err(|e| AvaxClientError::ContractError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use alloy::providers::ProviderBuilder;
    use alloy::primitives::Bytes;

    use super::*;
    use crate::erc20::ERC20_ABI;

    const TOKEN_ADDRESS: &str = "0x5425890298aed601595a70AB815c96711a31Bc65";

    fn bound_token() -> Contract<impl Provider + Clone> {
        let provider = ProviderBuilder::new()
            .connect_http("http://localhost:8545".parse().unwrap());
        Contract::from_json(provider, TOKEN_ADDRESS, ERC20_ABI).unwrap()
    }

    #[test]
    fn partitions_constant_and_mutating_methods() {
        let contract = bound_token();

        assert!(contract.method("balanceOf").unwrap().is_constant());
        assert!(contract.method("decimals").unwrap().is_constant());
        assert!(!contract.method("transfer").unwrap().is_constant());
        assert!(!contract.method("approve").unwrap().is_constant());
    }

    #[test]
    fn unknown_function_is_a_contract_error() {
        let contract = bound_token();

        let result = contract.method("mintUnlimited");
        assert!(matches!(result, Err(AvaxClientError::ContractError(_))));
    }

    #[test]
    fn clause_payload_starts_with_the_selector() {
        let contract = bound_token();
        let method = contract.method("transfer").unwrap();

        let recipient = Address::from([0x42; 20]);
        let clause = method
            .clause(&[
                DynSolValue::Address(recipient),
                DynSolValue::Uint(U256::from(1_000u64), 256),
            ])
            .unwrap();

        assert_eq!(clause.to, Some(contract.address()));
        assert_eq!(&clause.data[..4], method.selector().as_slice());
        // selector + two 32-byte words
        assert_eq!(clause.data.len(), 4 + 64);
    }

    #[tokio::test]
    async fn calling_a_mutating_method_is_rejected_before_any_io() {
        let contract = bound_token();
        let method = contract.method("transfer").unwrap();

        let result = method
            .call(&[
                DynSolValue::Address(Address::from([0x42; 20])),
                DynSolValue::Uint(U256::from(1u64), 256),
            ])
            .await;

        assert!(matches!(result, Err(AvaxClientError::ContractError(_))));
    }

    #[test]
    fn event_filter_carries_topic_and_address() {
        let contract = bound_token();
        let event = contract.event("Transfer").unwrap();
        let filter = event.filter();

        assert_eq!(filter.address, Some(contract.address()));
        assert_eq!(filter.topic0, Some(event.signature_topic()));
    }

    #[test]
    fn decodes_a_transfer_row() {
        let contract = bound_token();
        let event = contract.event("Transfer").unwrap();

        let from = Address::from([0x11; 20]);
        let to = Address::from([0x22; 20]);
        let value = U256::from(1_500_000u64);

        let row = EventRow {
            contract: contract.address(),
            topics: vec![event.signature_topic(), from.into_word(), to.into_word()],
            data: Bytes::from(value.to_be_bytes::<32>().to_vec()),
            ..EventRow::default()
        };

        let decoded = event.decode(&row).unwrap();
        assert_eq!(decoded.indexed[0].as_address(), Some(from));
        assert_eq!(decoded.indexed[1].as_address(), Some(to));
        assert_eq!(decoded.body[0].as_uint().map(|(v, _)| v), Some(value));
    }

    #[test]
    fn unknown_event_is_a_contract_error() {
        let contract = bound_token();
        assert!(contract.event("Burned").is_err());
    }
}
