// SPDX-License-Identifier: AGPL-3.0
// Rentboard Core - Paginator
//
// Issues bounded page requests through the AdsApi port. Never touches view
// state; callers merge the returned page themselves.

use crate::types::{Advertisement, FetchError, SearchCriteria, ViewId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// One bounded page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub view: ViewId,
    pub criteria: SearchCriteria,
    /// Owner filter, only set for the `mine` view
    pub owner: Option<String>,
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    /// Query parameters in wire order: criteria, owner, offset, limit
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> = self
            .criteria
            .query_pairs()
            .into_iter()
            .map(|(name, value)| (name, value.to_string()))
            .collect();

        if let Some(owner) = &self.owner {
            pairs.push(("user_id", owner.clone()));
        }
        pairs.push(("offset", self.offset.to_string()));
        pairs.push(("limit", self.limit.to_string()));
        pairs
    }
}

/// The remote listings API
#[async_trait]
pub trait AdsApi: Send + Sync {
    /// Fetch one page. An empty or absent `ads` list is an empty page, not an error.
    async fn fetch_ads(&self, request: &PageRequest) -> Result<Vec<Advertisement>, FetchError>;
}

/// Page fetcher with an at-most-one-in-flight rule per view
pub struct Paginator {
    api: Arc<dyn AdsApi>,
    /// view -> ticket of the fetch currently holding the slot
    in_flight: Mutex<HashMap<ViewId, u64>>,
    next_ticket: AtomicU64,
}

impl Paginator {
    pub fn new(api: Arc<dyn AdsApi>) -> Self {
        Self {
            api,
            in_flight: Mutex::new(HashMap::new()),
            next_ticket: AtomicU64::new(1),
        }
    }

    /// Fetch the page described by `request`.
    ///
    /// Fails with [`FetchError::AlreadyInFlight`] while another fetch for the
    /// same view is pending.
    pub async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Advertisement>, FetchError> {
        let slot = self.claim(request.view)?;
        self.fetch_claimed(&slot, request).await
    }

    /// Take the view's in-flight slot. It is held until the returned guard
    /// is dropped, so a caller can read and update paging state under it.
    pub fn claim(&self, view: ViewId) -> Result<InFlightSlot<'_>, FetchError> {
        let mut slots = self.slots();
        if slots.contains_key(&view) {
            tracing::debug!("Fetch for {} already in flight", view);
            return Err(FetchError::AlreadyInFlight);
        }

        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        slots.insert(view, ticket);
        Ok(InFlightSlot {
            paginator: self,
            view,
            ticket,
        })
    }

    /// Fetch under a slot taken with [`Paginator::claim`]
    pub async fn fetch_claimed(
        &self,
        slot: &InFlightSlot<'_>,
        request: &PageRequest,
    ) -> Result<Vec<Advertisement>, FetchError> {
        debug_assert_eq!(slot.view, request.view);

        tracing::debug!(
            "Fetching {} page, offset: {}, limit: {}",
            request.view,
            request.offset,
            request.limit
        );
        let page = self.api.fetch_ads(request).await?;
        tracing::debug!("Fetched {} records for {}", page.len(), request.view);
        Ok(page)
    }

    /// Forget the view's paging position.
    ///
    /// Releases the in-flight slot so a fetch under new criteria is not blocked
    /// by one issued under the old criteria. The late result of that older fetch
    /// is discarded by the aggregator.
    pub fn reset_offset(&self, view: ViewId) {
        if self.slots().remove(&view).is_some() {
            tracing::debug!("Released in-flight slot for {}", view);
        }
    }

    /// Whether a fetch for `view` currently holds the slot
    pub fn is_in_flight(&self, view: ViewId) -> bool {
        self.slots().contains_key(&view)
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<ViewId, u64>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds a view's in-flight slot until dropped
pub struct InFlightSlot<'a> {
    paginator: &'a Paginator,
    view: ViewId,
    ticket: u64,
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        let mut slots = self.paginator.slots();
        // A reset may have handed the slot to a newer fetch
        if slots.get(&self.view) == Some(&self.ticket) {
            slots.remove(&self.view);
        }
    }
}
