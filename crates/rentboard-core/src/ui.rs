// SPDX-License-Identifier: AGPL-3.0
// Rentboard Core - UI state
//
// Transient, in-memory only. Transitions here never touch the network or disk.

use crate::types::{AdDraft, ViewId};

/// Which view is shown and which overlays are open
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub active_tab: ViewId,
    /// Image URL shown full-screen, if any
    pub modal_image: Option<String>,
    pub form_open: bool,
    pub form_draft: AdDraft,
}

impl UiState {
    /// Switch views, returning whether the active tab changed
    pub fn select_tab(&mut self, tab: ViewId) -> bool {
        let changed = self.active_tab != tab;
        self.active_tab = tab;
        changed
    }

    pub fn open_modal(&mut self, url: impl Into<String>) {
        self.modal_image = Some(url.into());
    }

    pub fn close_modal(&mut self) -> Option<String> {
        self.modal_image.take()
    }

    pub fn open_form(&mut self) {
        self.form_open = true;
    }

    /// Close the form, keeping the draft for the next time it opens
    pub fn close_form(&mut self, draft: AdDraft) {
        self.form_open = false;
        self.form_draft = draft;
    }

    /// Replace the draft while the form is open. Returns false when it is closed.
    pub fn edit_draft(&mut self, draft: AdDraft) -> bool {
        if self.form_open {
            self.form_draft = draft;
        }
        self.form_open
    }

    pub fn clear_draft(&mut self) {
        self.form_draft = AdDraft::default();
    }
}
