// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Event Pagination
//!
//! Pages through an event filter's result set with an advancing offset/limit
//! window, delivering each page to an async consumer.
//!
//! ## Strategy
//!
//! 1. Apply the filter over `[offset, offset + page_size)`. The filter
//!    capability owns the exact meaning of the window (block-height or
//!    log-index ordered).
//! 2. A strictly empty page ends the stream. A short but non-empty page does
//!    not; the next window is still fetched.
//! 3. The consumer is awaited before the next page is fetched, so a slow
//!    consumer backpressures the whole loop.
//! 4. The cursor advances by exactly `page_size` per page, never by the row
//!    count actually returned.
//!
//! The cursor lives on this call stack only. If the consumer fails, the
//! failure propagates, pagination halts, and a re-invocation starts over
//! from offset 0.

use std::future::Future;

use crate::client::{AvaxClientError, ChainClient};
use crate::types::{EventFilter, EventRow};

/// Default page size for event pagination.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Failure raised by a page consumer, propagated verbatim.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Terminal outcomes of an event fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The page consumer failed; pagination halted with no cursor recovery.
    #[error("event page consumer failed: {0}")]
    Consumer(#[source] BoxError),

    #[error(transparent)]
    Client(#[from] AvaxClientError),
}

/// Deliver every page matching `filter` to `on_page` until the stream is
/// exhausted.
pub async fn fetch_events<C, F, Fut>(
    client: &C,
    filter: &EventFilter,
    page_size: u64,
    mut on_page: F,
) -> Result<(), FetchError>
where
    C: ChainClient,
    F: FnMut(Vec<EventRow>) -> Fut,
    Fut: Future<Output = Result<(), BoxError>>,
{
    let mut offset = 0u64;

    loop {
        let page = client.apply_filter(filter, offset, page_size).await?;

        if page.is_empty() {
            tracing::debug!(offset, "event stream exhausted");
            return Ok(());
        }

        tracing::debug!(offset, rows = page.len(), "delivering event page");
        on_page(page).await.map_err(FetchError::Consumer)?;

        offset += page_size;
    }
}
