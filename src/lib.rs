// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Chain Client - Async facade over the Avalanche C-Chain
//!
//! This crate wraps the alloy provider stack behind a small async surface:
//! contract method invocation, transaction and certificate signing, balance
//! queries, tick-budgeted receipt confirmation, and offset/limit event
//! pagination. The polling protocols are written against the injected
//! [`client::ChainClient`] capability so they can be driven by test doubles.
//!
//! ## Modules
//!
//! - `client` - chain-access capability traits and the alloy-backed client
//! - `confirm` - receipt confirmation bounded by a tick budget
//! - `events` - cursor-based event-log pagination
//! - `contract` - runtime-ABI contract binding
//! - `erc20` - ERC-20 helpers built on the binder
//! - `tx` - clause construction and signed broadcast
//! - `signing` - key ingestion and certificate signing
//! - `types` - shared domain types and network constants

pub mod client;
pub mod confirm;
pub mod contract;
pub mod erc20;
pub mod events;
pub mod signing;
pub mod tx;
pub mod types;

pub use client::{AvaxClient, AvaxClientError, BlockTicker, ChainClient, HttpProvider, Ticker};
pub use confirm::{wait_for_receipt, WaitError, DEFAULT_TICK_BUDGET};
pub use contract::{BoundEvent, BoundMethod, Contract};
pub use erc20::{Erc20, ERC20_ABI};
pub use events::{fetch_events, BoxError, FetchError, DEFAULT_PAGE_SIZE};
pub use signing::{
    sign_certificate, signer_from_hex, signer_from_pem, wallet_from_pem, wallet_from_signer,
    Certificate, CertificatePurpose,
};
pub use tx::{Clause, SendResult, TxSender};
pub use types::*;
