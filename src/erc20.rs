// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-20 token interactions, built on the runtime contract binder.

use std::str::FromStr;

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, U256},
    providers::Provider,
};

use crate::client::AvaxClientError;
use crate::contract::Contract;
use crate::tx::Clause;
use crate::types::{format_amount, TokenBalance};

/// Standard ERC-20 ABI fragment used for balance queries and transfers.
pub const ERC20_ABI: &str = r#"[
  {"type":"function","name":"name","inputs":[],"outputs":[{"name":"","type":"string"}],"stateMutability":"view"},
  {"type":"function","name":"symbol","inputs":[],"outputs":[{"name":"","type":"string"}],"stateMutability":"view"},
  {"type":"function","name":"decimals","inputs":[],"outputs":[{"name":"","type":"uint8"}],"stateMutability":"view"},
  {"type":"function","name":"totalSupply","inputs":[],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"},
  {"type":"function","name":"balanceOf","inputs":[{"name":"account","type":"address"}],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"},
  {"type":"function","name":"allowance","inputs":[{"name":"owner","type":"address"},{"name":"spender","type":"address"}],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"},
  {"type":"function","name":"transfer","inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[{"name":"","type":"bool"}],"stateMutability":"nonpayable"},
  {"type":"function","name":"approve","inputs":[{"name":"spender","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[{"name":"","type":"bool"}],"stateMutability":"nonpayable"},
  {"type":"function","name":"transferFrom","inputs":[{"name":"from","type":"address"},{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[{"name":"","type":"bool"}],"stateMutability":"nonpayable"},
  {"type":"event","name":"Transfer","inputs":[{"name":"from","type":"address","indexed":true},{"name":"to","type":"address","indexed":true},{"name":"value","type":"uint256","indexed":false}],"anonymous":false},
  {"type":"event","name":"Approval","inputs":[{"name":"owner","type":"address","indexed":true},{"name":"spender","type":"address","indexed":true},{"name":"value","type":"uint256","indexed":false}],"anonymous":false}
]"#;

/// ERC-20 contract wrapper.
pub struct Erc20<P> {
    contract: Contract<P>,
}

impl<P: Provider + Clone> Erc20<P> {
    /// Bind an ERC-20 token at the given address.
    pub fn new(provider: P, token_address: &str) -> Result<Self, AvaxClientError> {
        Ok(Self {
            contract: Contract::from_json(provider, token_address, ERC20_ABI)?,
        })
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    /// Get the token name.
    pub async fn name(&self) -> Result<String, AvaxClientError> {
        let outputs = self.contract.method("name")?.call(&[]).await?;
        first_string(outputs)
    }

    /// Get the token symbol.
    pub async fn symbol(&self) -> Result<String, AvaxClientError> {
        let outputs = self.contract.method("symbol")?.call(&[]).await?;
        first_string(outputs)
    }

    /// Get the token decimals.
    pub async fn decimals(&self) -> Result<u8, AvaxClientError> {
        let value = first_uint(self.contract.method("decimals")?.call(&[]).await?)?;
        u8::try_from(value)
            .map_err(|_| AvaxClientError::ContractError("Decimals out of range".to_string()))
    }

    /// Get the balance of an address.
    pub async fn balance_of(&self, wallet_address: &str) -> Result<TokenBalance, AvaxClientError> {
        let addr = Address::from_str(wallet_address)
            .map_err(|e| AvaxClientError::InvalidAddress(e.to_string()))?;

        // Metadata lookups may fail on nonstandard tokens; the balance itself
        // must not.
        let name = self.name().await.unwrap_or_else(|_| "Unknown".to_string());
        let symbol = self.symbol().await.unwrap_or_else(|_| "???".to_string());
        let decimals = self.decimals().await.unwrap_or(18);

        let balance = first_uint(
            self.contract
                .method("balanceOf")?
                .call(&[DynSolValue::Address(addr)])
                .await?,
        )?;

        Ok(TokenBalance {
            symbol,
            name,
            balance_raw: balance.to_string(),
            balance_formatted: format_amount(balance, decimals),
            decimals,
            contract_address: Some(format!("{:?}", self.contract.address())),
        })
    }

    /// Clause transferring `amount` base units to `to`.
    pub fn transfer_clause(&self, to: &str, amount: U256) -> Result<Clause, AvaxClientError> {
        let to = Address::from_str(to)
            .map_err(|e| AvaxClientError::InvalidAddress(format!("Invalid to address: {e}")))?;

        self.contract.method("transfer")?.clause(&[
            DynSolValue::Address(to),
            DynSolValue::Uint(amount, 256),
        ])
    }
}

fn first_string(outputs: Vec<DynSolValue>) -> Result<String, AvaxClientError> {
    outputs
        .into_iter()
        .next()
        .and_then(|value| value.as_str().map(str::to_owned))
        .ok_or_else(|| AvaxClientError::ContractError("Expected a string return value".to_string()))
}

fn first_uint(outputs: Vec<DynSolValue>) -> Result<U256, AvaxClientError> {
    outputs
        .into_iter()
        .next()
        .and_then(|value| value.as_uint().map(|(v, _)| v))
        .ok_or_else(|| AvaxClientError::ContractError("Expected a uint return value".to_string()))
}
