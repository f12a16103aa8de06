// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Clause construction and signed transaction broadcast.
//!
//! A [`Clause`] is one unit of on-chain instruction (call target, native
//! value, payload). Clauses are built offline, by hand or through the
//! contract binder, and handed to a [`TxSender`] whose wallet-filled
//! provider signs and broadcasts them. Fees and nonces are owned by the
//! provider fillers, not by this module.

use std::str::FromStr;

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, Bytes, TxHash, U256},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::TransactionRequest,
};

use crate::client::AvaxClientError;
use crate::types::NetworkConfig;

/// Wallet-filled provider type used for signing and broadcasting.
type SigningProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

/// A single unit of on-chain instruction.
#[derive(Debug, Clone, Default)]
pub struct Clause {
    /// Call target; `None` deploys the payload as contract code.
    pub to: Option<Address>,
    /// Native value carried by the call, in wei.
    pub value: U256,
    /// Call payload.
    pub data: Bytes,
    /// Optional human-readable note, surfaced when the clause is signed.
    pub comment: Option<String>,
}

impl Clause {
    /// Clause invoking a contract with the given payload.
    pub fn call(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to: Some(to),
            value: U256::ZERO,
            data: data.into(),
            comment: None,
        }
    }

    /// Clause transferring native value with no payload.
    pub fn transfer(to: Address, value: U256) -> Self {
        Self {
            to: Some(to),
            value,
            data: Bytes::new(),
            comment: None,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Lower into a transaction request; fees and nonce are left to the
    /// provider fillers.
    pub fn to_request(&self) -> TransactionRequest {
        let mut request = TransactionRequest::default()
            .value(self.value)
            .input(self.data.clone().into());

        if let Some(to) = self.to {
            request = request.to(to);
        }

        request
    }
}

/// Transaction send result.
#[derive(Debug, Clone)]
pub struct SendResult {
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Explorer URL for the transaction
    pub explorer_url: String,
}

/// Signs and broadcasts clauses for one wallet on one network.
pub struct TxSender {
    network: NetworkConfig,
    provider: SigningProvider,
}

impl TxSender {
    /// Create a sender whose provider signs with `wallet`.
    pub async fn new(
        network: NetworkConfig,
        wallet: EthereumWallet,
    ) -> Result<Self, AvaxClientError> {
        let url: url::Url = network
            .rpc_url
            .parse()
            .map_err(|e: url::ParseError| AvaxClientError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

        Ok(Self { network, provider })
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Sign and broadcast a clause, returning the hash once accepted.
    pub async fn send_clause(&self, clause: &Clause) -> Result<SendResult, AvaxClientError> {
        if let Some(comment) = &clause.comment {
            tracing::info!(comment = %comment, "Signing clause");
        }

        let pending = self
            .provider
            .send_transaction(clause.to_request())
            .await
            .map_err(|e| AvaxClientError::TransactionFailed(format!("Failed to send: {e}")))?;

        let tx_hash = *pending.tx_hash();
        let explorer_url = format!("{}/tx/{}", self.network.explorer_url, tx_hash);

        tracing::info!(%tx_hash, "Transaction broadcast");

        Ok(SendResult {
            tx_hash,
            explorer_url,
        })
    }

    /// Send a native AVAX transfer.
    pub async fn transfer_native(
        &self,
        to: &str,
        amount_wei: U256,
    ) -> Result<SendResult, AvaxClientError> {
        let to = Address::from_str(to)
            .map_err(|e| AvaxClientError::InvalidAddress(format!("Invalid to address: {e}")))?;

        self.send_clause(&Clause::transfer(to, amount_wei)).await
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::TxKind;

    use super::*;

    fn target() -> Address {
        Address::from([0x42; 20])
    }

    #[test]
    fn transfer_clause_carries_value_and_no_payload() {
        let clause = Clause::transfer(target(), U256::from(1_000u64));

        assert_eq!(clause.to, Some(target()));
        assert_eq!(clause.value, U256::from(1_000u64));
        assert!(clause.data.is_empty());
    }

    #[test]
    fn call_clause_carries_payload() {
        let clause = Clause::call(target(), vec![0xde, 0xad, 0xbe, 0xef])
            .with_value(U256::from(7u64))
            .with_comment("swap approval");

        assert_eq!(clause.data.as_ref(), &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(clause.value, U256::from(7u64));
        assert_eq!(clause.comment.as_deref(), Some("swap approval"));
    }

    #[test]
    fn request_maps_clause_fields() {
        let clause = Clause::call(target(), vec![0x01, 0x02]).with_value(U256::from(5u64));
        let request = clause.to_request();

        assert!(matches!(request.to, Some(TxKind::Call(a)) if a == target()));
        assert_eq!(request.value, Some(U256::from(5u64)));
        assert_eq!(
            request.input.input.as_ref().map(|b| b.as_ref()),
            Some(&[0x01u8, 0x02][..])
        );
    }

    #[test]
    fn deployment_clause_has_no_target() {
        let clause = Clause {
            to: None,
            value: U256::ZERO,
            data: Bytes::from(vec![0x60, 0x80]),
            comment: None,
        };

        assert!(clause.to_request().to.is_none());
    }
}
