use crate::domain::models::BookingDraft;
use crate::infrastructure::error::InfraError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::sleep;

static NEXT_REFERENCE: AtomicU64 = AtomicU64::new(1);

fn next_reference() -> String {
    let sequence = NEXT_REFERENCE.fetch_add(1, Ordering::Relaxed);
    format!("bk-{}-{sequence}", Utc::now().timestamp_micros())
}

/// A validated draft, normalised for hand-off.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BookingRequest {
    pub name: String,
    pub email: String,
    pub timezone: String,
    pub date: String,
    pub time: String,
    pub duration_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BookingRequest {
    pub fn from_draft(draft: &BookingDraft) -> Self {
        Self {
            name: draft.name.trim().to_string(),
            email: draft.email.clone(),
            timezone: draft.timezone.trim().to_string(),
            date: draft.date.clone(),
            time: draft.time.clone(),
            duration_minutes: draft.duration.minutes(),
            notes: Some(draft.notes.trim())
                .filter(|value| !value.is_empty())
                .map(ToOwned::to_owned),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BookingReceipt {
    pub reference: String,
    pub accepted_at: DateTime<Utc>,
}

#[async_trait]
pub trait BookingGateway: Send + Sync {
    async fn submit(&self, request: &BookingRequest) -> Result<BookingReceipt, InfraError>;
}

/// Stands in for a booking backend: waits, then accepts. Nothing leaves the process.
#[derive(Debug, Clone)]
pub struct SimulatedBookingGateway {
    latency: Duration,
}

impl SimulatedBookingGateway {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn from_millis(latency_ms: u64) -> Self {
        Self::new(Duration::from_millis(latency_ms))
    }
}

impl Default for SimulatedBookingGateway {
    fn default() -> Self {
        Self::from_millis(crate::infrastructure::config::DEFAULT_SUBMIT_LATENCY_MS)
    }
}

#[async_trait]
impl BookingGateway for SimulatedBookingGateway {
    async fn submit(&self, _request: &BookingRequest) -> Result<BookingReceipt, InfraError> {
        sleep(self.latency).await;
        Ok(BookingReceipt {
            reference: next_reference(),
            accepted_at: Utc::now(),
        })
    }
}
