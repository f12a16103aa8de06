// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared domain types and network constants.

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use alloy::rpc::types::{Filter, Log, TransactionReceipt};
use serde::{Deserialize, Serialize};

/// Avalanche network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
}

/// Avalanche C-Chain Mainnet configuration.
pub const AVAX_MAINNET: NetworkConfig = NetworkConfig {
    name: "Avalanche C-Chain",
    chain_id: 43114,
    rpc_url: "https://api.avax.network/ext/bc/C/rpc",
    explorer_url: "https://snowtrace.io",
};

/// Avalanche Fuji Testnet configuration.
pub const AVAX_FUJI: NetworkConfig = NetworkConfig {
    name: "Avalanche Fuji Testnet",
    chain_id: 43113,
    rpc_url: "https://api.avax-test.network/ext/bc/C/rpc",
    explorer_url: "https://testnet.snowtrace.io",
};

/// Known ERC-20 token metadata.
#[derive(Debug, Clone)]
pub struct Erc20Token {
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimals: u8,
    /// Mainnet contract address
    pub mainnet_address: Option<&'static str>,
    /// Fuji testnet contract address
    pub fuji_address: Option<&'static str>,
}

/// USDC for reference/testing.
pub const USDC_TOKEN: Erc20Token = Erc20Token {
    symbol: "USDC",
    name: "USD Coin",
    decimals: 6,
    // Official USDC on Avalanche C-Chain
    mainnet_address: Some("0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E"),
    // Fuji testnet USDC (Circle's test token)
    fuji_address: Some("0x5425890298aed601595a70AB815c96711a31Bc65"),
};

/// Notification that one new block has been appended to the chain.
///
/// Carries no payload; consuming a tick means block time has advanced by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick;

/// Outcome of a mined transaction.
///
/// Does not exist until the transaction is mined; once observed it is final.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Block number where the transaction was included
    pub block_number: u64,
    /// Gas actually used
    pub gas_used: u64,
    /// Whether on-chain execution failed
    pub reverted: bool,
    /// Event rows emitted during execution
    pub logs: Vec<EventRow>,
}

impl Receipt {
    /// Map an RPC receipt into the facade shape.
    pub fn from_rpc(receipt: TransactionReceipt) -> Self {
        let logs = receipt
            .inner
            .logs()
            .iter()
            .cloned()
            .map(EventRow::from_log)
            .collect();

        Self {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number.unwrap_or(0),
            gas_used: receipt.gas_used as u64,
            reverted: !receipt.status(),
            logs,
        }
    }
}

/// One raw event record returned by a log filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRow {
    /// Emitting contract address
    pub contract: Address,
    /// Topic words; topic 0 is the event signature for non-anonymous events
    pub topics: Vec<B256>,
    /// Unindexed event data
    pub data: Bytes,
    /// Block number the event was emitted in, if known
    pub block_number: Option<u64>,
    /// Hash of the emitting transaction, if known
    pub tx_hash: Option<TxHash>,
    /// Position within the block, if known
    pub log_index: Option<u64>,
}

impl EventRow {
    /// Map an RPC log into the facade shape.
    pub fn from_log(log: Log) -> Self {
        Self {
            contract: log.address(),
            topics: log.topics().to_vec(),
            data: log.data().data.clone(),
            block_number: log.block_number,
            tx_hash: log.transaction_hash,
            log_index: log.log_index,
        }
    }
}

/// Event log filter criteria.
///
/// Builder methods mirror the RPC filter surface; the offset/limit window is
/// supplied separately at application time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Restrict to events emitted by this contract
    pub address: Option<Address>,
    /// Restrict to events with this signature topic
    pub topic0: Option<B256>,
    /// Inclusive lower block bound
    pub from_block: Option<u64>,
    /// Inclusive upper block bound
    pub to_block: Option<u64>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn event_signature(mut self, topic: B256) -> Self {
        self.topic0 = Some(topic);
        self
    }

    pub fn from_block(mut self, block: u64) -> Self {
        self.from_block = Some(block);
        self
    }

    pub fn to_block(mut self, block: u64) -> Self {
        self.to_block = Some(block);
        self
    }

    /// Lower into an RPC log filter.
    pub fn to_rpc(&self) -> Filter {
        let mut filter = Filter::new();
        if let Some(address) = self.address {
            filter = filter.address(address);
        }
        if let Some(topic) = self.topic0 {
            filter = filter.event_signature(topic);
        }
        if let Some(block) = self.from_block {
            filter = filter.from_block(block);
        }
        if let Some(block) = self.to_block {
            filter = filter.to_block(block);
        }
        filter
    }
}

/// Token balance information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBalance {
    /// Token symbol (e.g., "AVAX", "USDC")
    pub symbol: String,
    /// Token name
    pub name: String,
    /// Balance in smallest unit (wei for native, token decimals for ERC-20)
    pub balance_raw: String,
    /// Balance formatted with decimals
    pub balance_formatted: String,
    /// Number of decimals
    pub decimals: u8,
    /// Contract address (None for native token)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
}

/// Native and token balances for one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalances {
    /// Account address
    pub address: String,
    /// Network name
    pub network: String,
    /// Chain ID
    pub chain_id: u64,
    /// Native token balance (AVAX)
    pub native: TokenBalance,
    /// ERC-20 token balances
    pub tokens: Vec<TokenBalance>,
}

/// Errors from human-readable amount parsing.
#[derive(Debug, thiserror::Error)]
pub enum AmountError {
    #[error("invalid amount format: {0}")]
    Format(String),

    #[error("amount overflow")]
    Overflow,
}

/// Parse a human-readable amount to its smallest unit.
///
/// # Arguments
/// * `amount` - Amount as a string (e.g., "1.5")
/// * `decimals` - Number of decimals (18 for AVAX, 6 for USDC)
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    let parts: Vec<&str> = amount.split('.').collect();

    if parts.len() > 2 {
        return Err(AmountError::Format(amount.to_string()));
    }

    let whole = parts[0]
        .parse::<u128>()
        .map_err(|_| AmountError::Format(format!("invalid whole number `{}`", parts[0])))?;

    let decimal_part = if parts.len() == 2 {
        let dec_str = parts[1];
        if dec_str.len() > decimals as usize {
            return Err(AmountError::Format(format!(
                "too many decimal places (max {decimals})"
            )));
        }
        // Pad with zeros to match decimals
        let padded = format!("{:0<width$}", dec_str, width = decimals as usize);
        padded
            .parse::<u128>()
            .map_err(|_| AmountError::Format(format!("invalid decimal `{dec_str}`")))?
    } else {
        0u128
    };

    let multiplier = 10u128.pow(decimals as u32);
    let total = whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(decimal_part))
        .ok_or(AmountError::Overflow)?;

    Ok(U256::from(total))
}

/// Format an amount in smallest units to a human-readable string.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        if trimmed.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_whole() {
        let result = parse_amount("1", 18).unwrap();
        assert_eq!(result, U256::from(1_000_000_000_000_000_000u64));
    }

    #[test]
    fn test_parse_amount_decimal() {
        let result = parse_amount("1.5", 18).unwrap();
        assert_eq!(result, U256::from(1_500_000_000_000_000_000u64));
    }

    #[test]
    fn test_parse_amount_usdc() {
        // 1.5 USDC = 1_500_000 (6 decimals)
        let result = parse_amount("1.5", 6).unwrap();
        assert_eq!(result, U256::from(1_500_000u64));
    }

    #[test]
    fn test_parse_amount_small() {
        let result = parse_amount("0.001", 18).unwrap();
        assert_eq!(result, U256::from(1_000_000_000_000_000u64));
    }

    #[test]
    fn test_parse_amount_rejects_double_dot() {
        assert!(parse_amount("1.2.3", 18).is_err());
    }

    #[test]
    fn test_format_amount() {
        let one_avax = U256::from(1_000_000_000_000_000_000u64);
        assert_eq!(format_amount(one_avax, 18), "1");

        let one_and_half = U256::from(1_500_000_000_000_000_000u64);
        assert_eq!(format_amount(one_and_half, 18), "1.5");

        assert_eq!(format_amount(U256::ZERO, 18), "0");
    }

    #[test]
    fn test_format_amount_usdc() {
        let one_usdc = U256::from(1_000_000u64);
        assert_eq!(format_amount(one_usdc, 6), "1");

        let one_and_half = U256::from(1_500_000u64);
        assert_eq!(format_amount(one_and_half, 6), "1.5");
    }

    #[test]
    fn event_filter_builder_sets_fields() {
        let address = Address::from([0xaa; 20]);
        let topic = B256::from([0xbb; 32]);
        let filter = EventFilter::new()
            .address(address)
            .event_signature(topic)
            .from_block(100)
            .to_block(200);

        assert_eq!(filter.address, Some(address));
        assert_eq!(filter.topic0, Some(topic));
        assert_eq!(filter.from_block, Some(100));
        assert_eq!(filter.to_block, Some(200));
    }

    #[test]
    fn usdc_addresses_parse() {
        for addr in [
            USDC_TOKEN.mainnet_address.unwrap(),
            USDC_TOKEN.fuji_address.unwrap(),
        ] {
            assert!(addr.parse::<Address>().is_ok());
        }
    }
}
