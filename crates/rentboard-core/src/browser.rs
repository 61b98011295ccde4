// SPDX-License-Identifier: AGPL-3.0
// Rentboard Core - Browser context
//
// The one object a frontend holds. It owns the criteria store, the views and
// the UI state, and routes user actions through them.

use crate::bootstrap::{RestoreOutcome, SessionBootstrapper};
use crate::criteria::CriteriaStore;
use crate::paginator::{AdsApi, Paginator};
use crate::platform::{best_effort, HostPlatform, Impact, NoopPlatform};
use crate::storage::SessionStorage;
use crate::submit::{SubmitReceipt, Submitter};
use crate::types::{AdDraft, AppError, BrowserSettings, FetchError, SearchCriteria, SessionState, ViewId};
use crate::ui::UiState;
use crate::views::{LoadOutcome, ViewAggregator, ViewSnapshot};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

/// Header colour requested from the host on startup
const HEADER_COLOR: &str = "#2a2a2a";

pub struct Browser {
    settings: BrowserSettings,
    criteria: CriteriaStore,
    views: ViewAggregator,
    ui: RwLock<UiState>,
    bootstrapper: SessionBootstrapper,
    submitter: Arc<dyn Submitter>,
    platform: Arc<dyn HostPlatform>,
}

impl Browser {
    pub fn new(
        settings: BrowserSettings,
        api: Arc<dyn AdsApi>,
        storage: Arc<dyn SessionStorage>,
        submitter: Arc<dyn Submitter>,
    ) -> Self {
        let views = ViewAggregator::new(Paginator::new(api), settings.user_id.clone());

        Self {
            settings,
            criteria: CriteriaStore::new(storage),
            views,
            ui: RwLock::new(UiState::default()),
            bootstrapper: SessionBootstrapper::new(),
            submitter,
            platform: Arc::new(NoopPlatform),
        }
    }

    /// Use a host platform for haptics and viewport hooks
    pub fn with_platform(mut self, platform: Arc<dyn HostPlatform>) -> Self {
        self.platform = platform;
        self
    }

    pub fn settings(&self) -> &BrowserSettings {
        &self.settings
    }

    /// Signal the host and replay the last persisted search.
    ///
    /// Call once, before handling any user input.
    pub async fn restore(&self) -> RestoreOutcome {
        best_effort("ready", self.platform.ready());
        best_effort("expand", self.platform.expand());
        best_effort("set_header_color", self.platform.set_header_color(HEADER_COLOR));
        best_effort(
            "disable_vertical_swipes",
            self.platform.disable_vertical_swipes(),
        );

        self.bootstrapper
            .restore(&self.criteria, &self.views, self.settings.page_size)
            .await
    }

    /// Run a new search: persist the criteria, then reload the search view
    pub async fn search(&self, criteria: SearchCriteria) -> Result<LoadOutcome, FetchError> {
        if let Err(e) = self.criteria.set_criteria(criteria) {
            tracing::error!("Search criteria were not persisted: {}", e);
        }

        self.ui_mut().select_tab(ViewId::Search);
        let outcome = self.refresh(ViewId::Search).await?;
        if matches!(outcome, LoadOutcome::Merged { .. }) {
            self.haptic(Impact::Light);
        }
        Ok(outcome)
    }

    /// Fetch the next page of `view` under its current criteria
    pub async fn load_more(&self, view: ViewId) -> Result<LoadOutcome, FetchError> {
        let criteria = self.criteria_for(view);
        self.views
            .load_more(view, &criteria, self.settings.page_size)
            .await
    }

    /// Drop everything loaded for `view` and fetch its first page again
    pub async fn refresh(&self, view: ViewId) -> Result<LoadOutcome, FetchError> {
        self.views.reset_view(view);
        self.load_more(view).await
    }

    pub fn select_tab(&self, tab: ViewId) {
        if self.ui_mut().select_tab(tab) {
            self.haptic(Impact::Light);
        }
    }

    pub fn open_modal(&self, url: impl Into<String>) {
        self.ui_mut().open_modal(url);
        self.haptic(Impact::Light);
    }

    pub fn close_modal(&self) {
        self.ui_mut().close_modal();
    }

    pub fn open_form(&self) {
        self.ui_mut().open_form();
    }

    /// Store edits to the open form's draft. Returns false when no form is open.
    pub fn edit_draft(&self, draft: AdDraft) -> bool {
        self.ui_mut().edit_draft(draft)
    }

    /// Close the form without submitting; the draft is kept
    pub fn close_form(&self, draft: AdDraft) {
        self.ui_mut().close_form(draft);
    }

    /// Close the form and hand the draft to the submitter.
    ///
    /// On success the draft is cleared and the `mine` view reloaded. A draft
    /// missing required fields is not sent and the form stays open.
    pub async fn submit_form(&self, draft: AdDraft) -> Result<SubmitReceipt, AppError> {
        let missing = draft.missing_fields();
        if !missing.is_empty() {
            self.ui_mut().form_draft = draft;
            return Err(AppError::InvalidDraft(missing));
        }

        self.ui_mut().close_form(draft.clone());
        let receipt = self.submitter.submit(&draft).await.map_err(|e| {
            tracing::error!("Listing submission failed: {}", e);
            e
        })?;

        tracing::info!("Listing submitted, status: {}", receipt.status);
        self.ui_mut().clear_draft();
        self.haptic(Impact::Medium);

        if let Err(e) = self.refresh(ViewId::Mine).await {
            tracing::warn!("Own listings could not be reloaded: {}", e);
        }
        Ok(receipt)
    }

    pub fn ui(&self) -> UiState {
        self.ui.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn session(&self) -> SessionState {
        self.criteria.current()
    }

    pub fn view(&self, view: ViewId) -> ViewSnapshot {
        self.views.snapshot(view)
    }

    /// The collection of the active tab
    pub fn active_view(&self) -> ViewSnapshot {
        let tab = self.ui().active_tab;
        self.views.snapshot(tab)
    }

    fn criteria_for(&self, view: ViewId) -> SearchCriteria {
        match view {
            ViewId::Search => self.criteria.current().criteria,
            ViewId::Newest | ViewId::Mine => SearchCriteria::default(),
        }
    }

    fn haptic(&self, impact: Impact) {
        best_effort("haptic", self.platform.haptic(impact));
    }

    fn ui_mut(&self) -> RwLockWriteGuard<'_, UiState> {
        self.ui.write().unwrap_or_else(PoisonError::into_inner)
    }
}
