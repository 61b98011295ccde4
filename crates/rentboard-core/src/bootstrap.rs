// SPDX-License-Identifier: AGPL-3.0
// Rentboard Core - Session restore
//
// Replays the last persisted search once per process, before user input.

use crate::criteria::CriteriaStore;
use crate::types::{FetchError, SearchCriteria, ViewId};
use crate::views::{LoadOutcome, ViewAggregator};
use std::sync::atomic::{AtomicBool, Ordering};

/// What [`SessionBootstrapper::restore`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A prior search was replayed into the search view
    Restored {
        criteria: SearchCriteria,
        load: Result<LoadOutcome, FetchError>,
    },
    /// Nothing to restore; all views stay empty
    Fresh,
    /// Restore already ran in this process
    AlreadyRestored,
}

#[derive(Default)]
pub struct SessionBootstrapper {
    done: AtomicBool,
}

impl SessionBootstrapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn restore(
        &self,
        criteria: &CriteriaStore,
        views: &ViewAggregator,
        page_size: usize,
    ) -> RestoreOutcome {
        if self.done.swap(true, Ordering::SeqCst) {
            tracing::debug!("Session already restored");
            return RestoreOutcome::AlreadyRestored;
        }

        let session = match criteria.load_persisted() {
            Some(session) if session.is_searched => session,
            _ => return RestoreOutcome::Fresh,
        };

        tracing::info!("Restoring previous search: {:?}", session.criteria);
        views.reset_view(ViewId::Search);
        let load = views
            .load_more(ViewId::Search, &session.criteria, page_size)
            .await;
        if let Err(e) = &load {
            tracing::warn!("Restored search could not be loaded: {}", e);
        }

        RestoreOutcome::Restored {
            criteria: session.criteria,
            load,
        }
    }
}
