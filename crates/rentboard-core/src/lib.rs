// SPDX-License-Identifier: AGPL-3.0
// Rentboard Core - Shared logic for all frontends
//
// This crate provides:
// - Advertisement, SearchCriteria and error types
// - CriteriaStore for the persisted search session
// - Paginator and ViewAggregator for per-view paging
// - SessionBootstrapper to replay the last search on startup
// - Browser, the context object frontends drive
//
// Transport, storage medium and host integration are reached through traits.

pub mod bootstrap;
pub mod browser;
pub mod criteria;
pub mod paginator;
pub mod platform;
pub mod settings;
pub mod storage;
pub mod submit;
pub mod types;
pub mod ui;
pub mod views;

#[cfg(test)]
mod testing;

// Re-export commonly used items
pub use bootstrap::{RestoreOutcome, SessionBootstrapper};
pub use browser::Browser;
pub use criteria::CriteriaStore;
pub use paginator::{AdsApi, InFlightSlot, PageRequest, Paginator};
pub use platform::{HostPlatform, Impact, NoopPlatform, PlatformError};
pub use settings::SettingsStore;
pub use storage::{FileSessionStorage, MemoryStorage, SessionStorage};
pub use submit::{SubmitReceipt, Submitter};
pub use types::{
    city_label, AdDraft, AdId, Advertisement, AppError, BrowserSettings, FetchError,
    SearchCriteria, SessionState, ViewId, CITIES, MAX_DRAFT_IMAGES,
};
pub use ui::UiState;
pub use views::{LoadOutcome, ViewAggregator, ViewSnapshot, ViewState};
