//! The scheduling collaborator seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use voxline_core::Result;

/// A normalized calendar-creation request. Only ever constructed once all
/// required fields are non-empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulingRequest {
    pub requester_name: String,
    /// Calendar date, YYYY-MM-DD.
    pub date: String,
    /// Local time of day, HH:MM.
    pub time: String,
    pub title: String,
}

/// What the calendar collaborator returns for a created event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatedEvent {
    pub id: String,
    pub link: String,
    pub summary: String,
    pub start: String,
}

/// External scheduling collaborator. Consumed, never reimplemented, by the
/// gate; the production implementation lives in `voxline-calendar`.
#[async_trait]
pub trait MeetingScheduler: Send + Sync {
    async fn create_event(&self, request: &SchedulingRequest) -> Result<CreatedEvent>;
}
