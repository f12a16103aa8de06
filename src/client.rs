// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain-access capabilities and the Avalanche C-Chain client.
//!
//! The polling protocols in [`crate::confirm`] and [`crate::events`] consume
//! the narrow [`ChainClient`] capability, so each call site (and each test)
//! decides which client instance backs it. [`AvaxClient`] is the production
//! implementation on top of the alloy HTTP provider stack.

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use alloy::{
    network::Ethereum,
    primitives::{Address, TxHash},
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
};
use async_trait::async_trait;

use crate::confirm::{self, WaitError, DEFAULT_TICK_BUDGET};
use crate::contract::Contract;
use crate::erc20::Erc20;
use crate::events::{self, BoxError, FetchError, DEFAULT_PAGE_SIZE};
use crate::types::*;

/// HTTP provider type for Avalanche C-Chain (with all fillers).
pub type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Interval between chain-head polls when waiting for a block tick.
///
/// The C-Chain produces blocks roughly every two seconds under load.
const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(2);

/// A source of block ticks. `next` suspends until a new block is appended.
#[async_trait]
pub trait Ticker: Send {
    async fn next(&mut self) -> Result<Tick, AvaxClientError>;
}

/// Chain-access capability consumed by the polling protocols.
///
/// Deliberately narrow: a tick source, a receipt lookup, and a windowed log
/// filter. Test doubles implement this per test case instead of sharing a
/// module-level client.
#[async_trait]
pub trait ChainClient: Send + Sync {
    type Ticker: Ticker;

    /// Create a fresh tick source positioned at the current chain head.
    fn ticker(&self) -> Self::Ticker;

    /// Look up the receipt for a transaction, if it has been mined yet.
    async fn receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>, AvaxClientError>;

    /// Apply `filter` over the half-open row window `[offset, offset + limit)`.
    async fn apply_filter(
        &self,
        filter: &EventFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<EventRow>, AvaxClientError>;
}

/// Avalanche C-Chain client.
pub struct AvaxClient {
    /// Network configuration
    network: NetworkConfig,
    /// Alloy HTTP provider
    provider: HttpProvider,
    /// Head-poll interval for the block ticker
    tick_interval: Duration,
}

impl AvaxClient {
    /// Create a new client for the specified network.
    pub async fn new(network: NetworkConfig) -> Result<Self, AvaxClientError> {
        let url: url::Url = network
            .rpc_url
            .parse()
            .map_err(|e: url::ParseError| AvaxClientError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self {
            network,
            provider,
            tick_interval: DEFAULT_TICK_INTERVAL,
        })
    }

    /// Create a client for Avalanche Fuji testnet.
    pub async fn fuji() -> Result<Self, AvaxClientError> {
        Self::new(AVAX_FUJI).await
    }

    /// Create a client for Avalanche mainnet.
    pub async fn mainnet() -> Result<Self, AvaxClientError> {
        Self::new(AVAX_MAINNET).await
    }

    /// Override the head-poll interval used by [`ChainClient::ticker`].
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Get the underlying provider, e.g. for contract binding.
    pub fn provider(&self) -> &HttpProvider {
        &self.provider
    }

    /// Get the current block number.
    pub async fn block_number(&self) -> Result<u64, AvaxClientError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| AvaxClientError::RpcError(e.to_string()))
    }

    /// Get the native AVAX balance for an address.
    pub async fn native_balance(&self, address: &str) -> Result<TokenBalance, AvaxClientError> {
        let addr = Address::from_str(address)
            .map_err(|e| AvaxClientError::InvalidAddress(e.to_string()))?;

        let balance = self
            .provider
            .get_balance(addr)
            .await
            .map_err(|e| AvaxClientError::RpcError(e.to_string()))?;

        Ok(TokenBalance {
            symbol: "AVAX".to_string(),
            name: "Avalanche".to_string(),
            balance_raw: balance.to_string(),
            balance_formatted: format_amount(balance, 18),
            decimals: 18,
            contract_address: None,
        })
    }

    /// Get the ERC-20 token balance for an address.
    pub async fn token_balance(
        &self,
        wallet_address: &str,
        token_address: &str,
    ) -> Result<TokenBalance, AvaxClientError> {
        let token = Erc20::new(self.provider.clone(), token_address)?;
        token.balance_of(wallet_address).await
    }

    /// Get all balances (native + given tokens) for an account.
    pub async fn account_balances(
        &self,
        wallet_address: &str,
        token_addresses: &[&str],
    ) -> Result<AccountBalances, AvaxClientError> {
        let native = self.native_balance(wallet_address).await?;

        let mut tokens = Vec::new();
        for token_addr in token_addresses {
            match self.token_balance(wallet_address, token_addr).await {
                Ok(balance) => tokens.push(balance),
                Err(e) => {
                    tracing::warn!(
                        token = %token_addr,
                        error = %e,
                        "Failed to get token balance"
                    );
                    // Continue with other tokens
                }
            }
        }

        Ok(AccountBalances {
            address: wallet_address.to_string(),
            network: self.network.name.to_string(),
            chain_id: self.network.chain_id,
            native,
            tokens,
        })
    }

    /// Bind a contract at `address` from its JSON ABI.
    pub fn contract(
        &self,
        address: &str,
        abi_json: &str,
    ) -> Result<Contract<HttpProvider>, AvaxClientError> {
        Contract::from_json(self.provider.clone(), address, abi_json)
    }

    /// Wait for a receipt with the default tick budget.
    ///
    /// See [`crate::confirm::wait_for_receipt`] for the full contract.
    pub async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<Receipt, WaitError> {
        confirm::wait_for_receipt(self, tx_hash, DEFAULT_TICK_BUDGET).await
    }

    /// Page through a filter's events with the default page size.
    ///
    /// See [`crate::events::fetch_events`] for the full contract.
    pub async fn fetch_events<F, Fut>(
        &self,
        filter: &EventFilter,
        on_page: F,
    ) -> Result<(), FetchError>
    where
        F: FnMut(Vec<EventRow>) -> Fut,
        Fut: Future<Output = Result<(), BoxError>>,
    {
        events::fetch_events(self, filter, DEFAULT_PAGE_SIZE, on_page).await
    }
}

#[async_trait]
impl ChainClient for AvaxClient {
    type Ticker = BlockTicker<HttpProvider>;

    fn ticker(&self) -> Self::Ticker {
        BlockTicker::new(self.provider.clone(), self.tick_interval)
    }

    async fn receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>, AvaxClientError> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| AvaxClientError::RpcError(e.to_string()))?;

        Ok(receipt.map(Receipt::from_rpc))
    }

    async fn apply_filter(
        &self,
        filter: &EventFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<EventRow>, AvaxClientError> {
        let logs = self
            .provider
            .get_logs(&filter.to_rpc())
            .await
            .map_err(|e| AvaxClientError::RpcError(e.to_string()))?;

        let rows = logs.into_iter().map(EventRow::from_log).collect();
        Ok(window_rows(rows, offset, limit))
    }
}

impl std::fmt::Debug for AvaxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvaxClient")
            .field("network", &self.network.name)
            .field("chain_id", &self.network.chain_id)
            .field("tick_interval", &self.tick_interval)
            .finish()
    }
}

/// Tick source that polls the chain head.
///
/// The head baseline is taken on the first `next` call; after that, each call
/// resolves once one further block exists. A ticker that fell behind the head
/// catches up one block per call, so one tick always stands for one block.
pub struct BlockTicker<P> {
    provider: P,
    head: Option<u64>,
    poll_interval: Duration,
}

impl<P> BlockTicker<P> {
    pub fn new(provider: P, poll_interval: Duration) -> Self {
        Self {
            provider,
            head: None,
            poll_interval,
        }
    }
}

#[async_trait]
impl<P: Provider> Ticker for BlockTicker<P> {
    async fn next(&mut self) -> Result<Tick, AvaxClientError> {
        loop {
            let number = self
                .provider
                .get_block_number()
                .await
                .map_err(|e| AvaxClientError::RpcError(e.to_string()))?;

            match self.head {
                None => {
                    self.head = Some(number);
                }
                Some(head) if number > head => {
                    self.head = Some(head + 1);
                    return Ok(Tick);
                }
                Some(_) => {}
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Select the `[offset, offset + limit)` window from a full result set.
pub(crate) fn window_rows(rows: Vec<EventRow>, offset: u64, limit: u64) -> Vec<EventRow> {
    rows.into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect()
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, thiserror::Error)]
pub enum AvaxClientError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Contract error: {0}")]
    ContractError(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}
