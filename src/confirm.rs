// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Receipt Confirmation
//!
//! Polls for a transaction receipt once per chain tick, bounded by a tick
//! budget.
//!
//! ## Strategy
//!
//! 1. Test the tick counter against the budget *before* consuming a tick, so
//!    a zero budget fails without waiting and at most `max_ticks` ticks are
//!    ever consumed.
//! 2. After each tick, look the receipt up once. A reverted receipt fails
//!    immediately; reversion is final and waiting longer cannot change it.
//! 3. Transport errors from the client are not retried here; they propagate
//!    to the caller unchanged.
//!
//! The timeout is tick-based, not wall-clock based: how long `max_ticks`
//! takes depends on the block production rate of the underlying chain.

use alloy::primitives::TxHash;

use crate::client::{AvaxClientError, ChainClient, Ticker};
use crate::types::Receipt;

/// Default number of block ticks to wait before giving up.
pub const DEFAULT_TICK_BUDGET: u32 = 5;

/// Terminal outcomes of a receipt wait.
#[derive(Debug, thiserror::Error)]
pub enum WaitError {
    /// No receipt appeared within the tick budget.
    ///
    /// Retrying with a fresh budget is safe; the transaction may still be
    /// mined later.
    #[error("transaction {tx_hash} was not mined within {ticks} block ticks")]
    NotFound { tx_hash: TxHash, ticks: u32 },

    /// The transaction was mined but execution failed on-chain.
    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: TxHash },

    #[error(transparent)]
    Client(#[from] AvaxClientError),
}

/// Wait for the receipt of `tx_hash`, consuming at most `max_ticks` ticks.
pub async fn wait_for_receipt<C: ChainClient>(
    client: &C,
    tx_hash: TxHash,
    max_ticks: u32,
) -> Result<Receipt, WaitError> {
    let mut ticker = client.ticker();
    let mut waited = 0u32;

    loop {
        if waited >= max_ticks {
            return Err(WaitError::NotFound {
                tx_hash,
                ticks: max_ticks,
            });
        }

        ticker.next().await?;

        match client.receipt(tx_hash).await? {
            Some(receipt) if receipt.reverted => {
                tracing::debug!(%tx_hash, block = receipt.block_number, "transaction reverted");
                return Err(WaitError::Reverted { tx_hash });
            }
            Some(receipt) => {
                tracing::debug!(%tx_hash, block = receipt.block_number, "transaction confirmed");
                return Ok(receipt);
            }
            None => {
                waited += 1;
                tracing::debug!(%tx_hash, waited, max_ticks, "no receipt yet");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::types::{EventFilter, EventRow, Tick};

    /// Chain double whose receipt becomes visible once a scripted number of
    /// ticks has been consumed.
    struct ScriptedChain {
        ticks: Arc<AtomicU32>,
        /// `(appears_after_ticks, reverted)`; `None` means never mined.
        receipt: Option<(u32, bool)>,
        fail_receipt_lookup: bool,
    }

    impl ScriptedChain {
        fn new(receipt: Option<(u32, bool)>) -> Self {
            Self {
                ticks: Arc::new(AtomicU32::new(0)),
                receipt,
                fail_receipt_lookup: false,
            }
        }

        fn ticks_consumed(&self) -> u32 {
            self.ticks.load(Ordering::SeqCst)
        }
    }

    struct CountingTicker {
        ticks: Arc<AtomicU32>,
    }

    #[async_trait]
    impl Ticker for CountingTicker {
        async fn next(&mut self) -> Result<Tick, AvaxClientError> {
            self.ticks.fetch_add(1, Ordering::SeqCst);
            Ok(Tick)
        }
    }

    #[async_trait]
    impl ChainClient for ScriptedChain {
        type Ticker = CountingTicker;

        fn ticker(&self) -> Self::Ticker {
            CountingTicker {
                ticks: self.ticks.clone(),
            }
        }

        async fn receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>, AvaxClientError> {
            if self.fail_receipt_lookup {
                return Err(AvaxClientError::RpcError("receipt lookup failed".into()));
            }

            let consumed = self.ticks.load(Ordering::SeqCst);
            Ok(self.receipt.and_then(|(appears_at, reverted)| {
                (consumed >= appears_at).then(|| Receipt {
                    tx_hash,
                    block_number: appears_at as u64,
                    gas_used: 21_000,
                    reverted,
                    logs: Vec::new(),
                })
            }))
        }

        async fn apply_filter(
            &self,
            _filter: &EventFilter,
            _offset: u64,
            _limit: u64,
        ) -> Result<Vec<EventRow>, AvaxClientError> {
            Ok(Vec::new())
        }
    }

    fn tx_hash() -> TxHash {
        TxHash::from([0x11; 32])
    }

    #[tokio::test]
    async fn zero_budget_fails_without_consuming_a_tick() {
        let chain = ScriptedChain::new(Some((1, false)));

        let result = wait_for_receipt(&chain, tx_hash(), 0).await;

        assert!(matches!(result, Err(WaitError::NotFound { ticks: 0, .. })));
        assert_eq!(chain.ticks_consumed(), 0);
    }

    #[tokio::test]
    async fn exhausted_budget_consumes_exactly_max_ticks() {
        let chain = ScriptedChain::new(None);

        let result = wait_for_receipt(&chain, tx_hash(), 5).await;

        assert!(matches!(result, Err(WaitError::NotFound { ticks: 5, .. })));
        assert_eq!(chain.ticks_consumed(), 5);
    }

    #[tokio::test]
    async fn reverted_receipt_fails_at_discovery_tick() {
        let chain = ScriptedChain::new(Some((2, true)));

        let result = wait_for_receipt(&chain, tx_hash(), 5).await;

        assert!(matches!(result, Err(WaitError::Reverted { .. })));
        // Reversion is terminal; the remaining budget is never spent.
        assert_eq!(chain.ticks_consumed(), 2);
    }

    #[tokio::test]
    async fn clean_receipt_returned_at_discovery_tick() {
        let chain = ScriptedChain::new(Some((3, false)));

        let receipt = wait_for_receipt(&chain, tx_hash(), 5).await.unwrap();

        assert_eq!(receipt.tx_hash, tx_hash());
        assert!(!receipt.reverted);
        assert_eq!(chain.ticks_consumed(), 3);
    }

    #[tokio::test]
    async fn receipt_on_last_budgeted_tick_still_succeeds() {
        let chain = ScriptedChain::new(Some((5, false)));

        let receipt = wait_for_receipt(&chain, tx_hash(), 5).await.unwrap();

        assert!(!receipt.reverted);
        assert_eq!(chain.ticks_consumed(), 5);
    }

    #[tokio::test]
    async fn transport_errors_propagate_unchanged() {
        let mut chain = ScriptedChain::new(Some((1, false)));
        chain.fail_receipt_lookup = true;

        let result = wait_for_receipt(&chain, tx_hash(), 5).await;

        assert!(matches!(
            result,
            Err(WaitError::Client(AvaxClientError::RpcError(_)))
        ));
    }
}
