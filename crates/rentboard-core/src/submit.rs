// SPDX-License-Identifier: AGPL-3.0
// Rentboard Core - Listing submission port

use crate::types::{AdDraft, AppError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Acknowledgement returned by the submission collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    /// Moderation status, typically "pending"
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// Delivers a completed draft to wherever listings are moderated
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, draft: &AdDraft) -> Result<SubmitReceipt, AppError>;
}
