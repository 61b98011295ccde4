// SPDX-License-Identifier: AGPL-3.0
// Rentboard Core - View aggregation
//
// Each view keeps its own records, server offset and exhaustion flag. Pages
// are merged in arrival order and records already present are skipped.

use crate::paginator::{PageRequest, Paginator};
use crate::types::{AdId, Advertisement, FetchError, SearchCriteria, ViewId};
use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Records and paging position of a single view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    records: Vec<Advertisement>,
    seen: HashSet<AdId>,
    offset: usize,
    exhausted: bool,
    generation: u64,
}

impl ViewState {
    pub fn records(&self) -> &[Advertisement] {
        &self.records
    }

    /// Server-side position: raw count of records merged since the last reset
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Bumped on every reset; fetches issued under an older value are stale
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Append a page, returning how many records were new.
    ///
    /// The offset advances by the raw page length, duplicates included, since
    /// it tracks the server's position rather than the local unique count.
    pub fn merge_page(&mut self, page: Vec<Advertisement>, requested: usize) -> usize {
        let fetched = page.len();
        let before = self.records.len();

        for ad in page {
            if self.seen.insert(ad.id.clone()) {
                self.records.push(ad);
            }
        }

        self.offset += fetched;
        if fetched < requested {
            self.exhausted = true;
        }
        self.records.len() - before
    }

    /// Clear records and paging position
    pub fn reset(&mut self) {
        self.records.clear();
        self.seen.clear();
        self.offset = 0;
        self.exhausted = false;
        self.generation += 1;
    }
}

/// Result of a [`ViewAggregator::load_more`] call that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and merged
    Merged { fetched: usize, added: usize },
    /// The view has no more records; nothing was fetched
    Exhausted,
    /// A fetch for this view was already pending; this call was dropped
    InFlight,
    /// The view was reset while the fetch was pending; the page was discarded
    Stale,
}

/// Point-in-time copy of a view for display
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub view: ViewId,
    pub records: Vec<Advertisement>,
    pub offset: usize,
    pub exhausted: bool,
    /// Last surfaced network error, cleared by the next successful load
    pub error: Option<FetchError>,
}

#[derive(Default)]
struct ViewSlot {
    state: ViewState,
    error: Option<FetchError>,
}

/// Owner of the search, newest and mine views
pub struct ViewAggregator {
    paginator: Paginator,
    /// Sent as the owner filter on `mine` requests
    owner: Option<String>,
    slots: [RwLock<ViewSlot>; 3],
}

impl ViewAggregator {
    pub fn new(paginator: Paginator, owner: Option<String>) -> Self {
        Self {
            paginator,
            owner,
            slots: std::array::from_fn(|_| RwLock::default()),
        }
    }

    /// Merge a page into `view`, returning how many records were new
    pub fn merge_page(&self, view: ViewId, page: Vec<Advertisement>, requested: usize) -> usize {
        self.write(view).state.merge_page(page, requested)
    }

    /// Clear the view and its paging position. Pending fetches become stale.
    pub fn reset_view(&self, view: ViewId) {
        {
            let mut slot = self.write(view);
            slot.state.reset();
            slot.error = None;
        }
        self.paginator.reset_offset(view);
        tracing::debug!("Reset {} view", view);
    }

    /// Fetch and merge the next page of `view`.
    ///
    /// Network failures and timeouts are recorded as the view's error and
    /// returned without touching records or offset. A malformed response is
    /// merged as an empty page.
    pub async fn load_more(
        &self,
        view: ViewId,
        criteria: &SearchCriteria,
        page_size: usize,
    ) -> Result<LoadOutcome, FetchError> {
        let page_size = page_size.max(1);

        // Held until the page is merged so no other load reads the same offset
        let claim = match self.paginator.claim(view) {
            Ok(claim) => claim,
            Err(FetchError::AlreadyInFlight) => return Ok(LoadOutcome::InFlight),
            Err(e) => return Err(e),
        };

        let (request, generation) = {
            let slot = self.read(view);
            if slot.state.exhausted {
                tracing::debug!("{} view is exhausted, skipping fetch", view);
                return Ok(LoadOutcome::Exhausted);
            }

            let request = PageRequest {
                view,
                criteria: criteria.clone(),
                owner: match view {
                    ViewId::Mine => self.owner.clone(),
                    _ => None,
                },
                offset: slot.state.offset,
                limit: page_size,
            };
            (request, slot.state.generation)
        };

        let page = match self.paginator.fetch_claimed(&claim, &request).await {
            Ok(page) => page,
            Err(FetchError::MalformedResponse(reason)) => {
                tracing::warn!("Treating malformed {} page as empty: {}", view, reason);
                Vec::new()
            }
            Err(e) => {
                tracing::error!("Failed to load {} page: {}", view, e);
                let mut slot = self.write(view);
                if slot.state.generation == generation {
                    slot.error = Some(e.clone());
                }
                return Err(e);
            }
        };

        let mut slot = self.write(view);
        if slot.state.generation != generation {
            tracing::debug!("Discarding stale {} page of {} records", view, page.len());
            return Ok(LoadOutcome::Stale);
        }

        let fetched = page.len();
        let added = slot.state.merge_page(page, page_size);
        slot.error = None;
        tracing::info!(
            "Merged {} page: {} fetched, {} new, offset {}{}",
            view,
            fetched,
            added,
            slot.state.offset,
            if slot.state.exhausted { ", exhausted" } else { "" }
        );
        Ok(LoadOutcome::Merged { fetched, added })
    }

    /// Copy of the view's current state
    pub fn snapshot(&self, view: ViewId) -> ViewSnapshot {
        let slot = self.read(view);
        ViewSnapshot {
            view,
            records: slot.state.records.clone(),
            offset: slot.state.offset,
            exhausted: slot.state.exhausted,
            error: slot.error.clone(),
        }
    }

    pub fn state(&self, view: ViewId) -> ViewState {
        self.read(view).state.clone()
    }

    fn read(&self, view: ViewId) -> RwLockReadGuard<'_, ViewSlot> {
        self.slots[view.index()]
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, view: ViewId) -> RwLockWriteGuard<'_, ViewSlot> {
        self.slots[view.index()]
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
