// SPDX-License-Identifier: AGPL-3.0
// Rentboard Core - Scripted collaborators for unit tests

use crate::paginator::{AdsApi, PageRequest};
use crate::platform::{HostPlatform, Impact, PlatformError};
use crate::storage::SessionStorage;
use crate::submit::{SubmitReceipt, Submitter};
use crate::types::{AdDraft, AdId, Advertisement, AppError, FetchError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::ops::Range;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn ad(id: &str) -> Advertisement {
    Advertisement {
        id: AdId::new(id),
        city: "minsk".into(),
        rooms: Some(2),
        price: Some(350),
        address: format!("Nezavisimosti {}", id),
        description: String::new(),
        phone: None,
        images: vec![format!("https://img.example/{}.jpg", id)],
        created_at: None,
    }
}

pub fn ads(ids: Range<usize>) -> Vec<Advertisement> {
    ids.map(|i| ad(&i.to_string())).collect()
}

/// AdsApi answering from a queue of scripted responses (empty page when dry)
#[derive(Default)]
pub struct ScriptedApi {
    responses: Mutex<VecDeque<Result<Vec<Advertisement>, FetchError>>>,
    requests: Mutex<Vec<PageRequest>>,
    hold: Mutex<Option<Arc<Notify>>>,
    seen: Notify,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(&self, page: Vec<Advertisement>) {
        self.responses.lock().unwrap().push_back(Ok(page));
    }

    pub fn push_error(&self, error: FetchError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Make the next request wait until the returned gate is notified
    pub fn hold_next(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.hold.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Wait until a request reaches the api
    pub async fn wait_for_request(&self) {
        self.seen.notified().await;
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AdsApi for ScriptedApi {
    async fn fetch_ads(&self, request: &PageRequest) -> Result<Vec<Advertisement>, FetchError> {
        self.requests.lock().unwrap().push(request.clone());
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()));
        let hold = self.hold.lock().unwrap().take();

        self.seen.notify_one();
        if let Some(gate) = hold {
            gate.notified().await;
        }
        response
    }
}

/// Submitter that records drafts and answers with a fixed result
pub struct RecordingSubmitter {
    accept: bool,
    drafts: Mutex<Vec<AdDraft>>,
}

impl RecordingSubmitter {
    pub fn accepting() -> Self {
        Self {
            accept: true,
            drafts: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            accept: false,
            drafts: Mutex::new(Vec::new()),
        }
    }

    pub fn drafts(&self) -> Vec<AdDraft> {
        self.drafts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Submitter for RecordingSubmitter {
    async fn submit(&self, draft: &AdDraft) -> Result<SubmitReceipt, AppError> {
        self.drafts.lock().unwrap().push(draft.clone());
        if self.accept {
            Ok(SubmitReceipt {
                status: "pending".into(),
                message: "Sent for moderation".into(),
            })
        } else {
            Err(AppError::Submission("Internal server error".into()))
        }
    }
}

/// Storage that holds nothing and refuses every write
#[derive(Default)]
pub struct FailingStorage {
    writes: Mutex<usize>,
}

impl FailingStorage {
    pub fn attempted_writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

impl SessionStorage for FailingStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, AppError> {
        Ok(None)
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), AppError> {
        *self.writes.lock().unwrap() += 1;
        Err(AppError::FileIo(format!("Failed to write {}: read-only", key)))
    }
}

/// Host that records every call and fails all of them
#[derive(Default)]
pub struct FailingPlatform {
    calls: Mutex<Vec<String>>,
}

impl FailingPlatform {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), PlatformError> {
        self.calls.lock().unwrap().push(call);
        Err(PlatformError("no host".into()))
    }
}

impl HostPlatform for FailingPlatform {
    fn haptic(&self, impact: Impact) -> Result<(), PlatformError> {
        self.record(format!("haptic:{:?}", impact))
    }

    fn ready(&self) -> Result<(), PlatformError> {
        self.record("ready".into())
    }

    fn expand(&self) -> Result<(), PlatformError> {
        self.record("expand".into())
    }

    fn set_header_color(&self, color: &str) -> Result<(), PlatformError> {
        self.record(format!("header:{}", color))
    }

    fn disable_vertical_swipes(&self) -> Result<(), PlatformError> {
        self.record("disable_vertical_swipes".into())
    }
}
