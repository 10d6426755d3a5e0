//! Event Pipeline
//!
//! The single inbound entry point the transport invokes per message.
//! Decodes raw payloads into typed events, feeds the occupancy tracker
//! and drives the report scheduler. Every per-message failure is
//! contained here: one bad message never interrupts later messages or
//! drops the transport connection.

use crate::models::SceneEvent;
use crate::occupancy_tracker::OccupancyTracker;
use crate::report_scheduler::ReportScheduler;
use std::sync::Arc;

/// Longest payload prefix echoed into decode warnings
const PAYLOAD_LOG_PREFIX: usize = 100;

/// Decode-validate-dispatch pipeline for inbound scene payloads
pub struct EventPipeline {
    tracker: Arc<OccupancyTracker>,
    scheduler: Arc<ReportScheduler>,
}

impl EventPipeline {
    /// Create a pipeline over the given tracker and scheduler
    pub fn new(tracker: Arc<OccupancyTracker>, scheduler: Arc<ReportScheduler>) -> Self {
        Self { tracker, scheduler }
    }

    /// Handle one raw payload from the subscribed topic.
    ///
    /// Bounded, CPU-only work: JSON decode, one tracker update, one
    /// cadence decision. Never returns an error to the delivery loop.
    pub async fn handle_payload(&self, topic: &str, payload: &[u8]) {
        let event: SceneEvent = match serde_json::from_slice(payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(
                    topic = %topic,
                    error = %e,
                    payload = %payload_prefix(payload),
                    "Dropping non-JSON message"
                );
                return;
            }
        };

        if let Err(e) = self.tracker.update(&event).await {
            tracing::warn!(topic = %topic, error = %e, "Dropping malformed event");
            return;
        }

        let (scenes, aggregate) = self.tracker.snapshot().await;
        self.scheduler.on_update(&scenes, &aggregate).await;
    }

    /// The tracker feeding this pipeline
    pub fn tracker(&self) -> &Arc<OccupancyTracker> {
        &self.tracker
    }
}

fn payload_prefix(payload: &[u8]) -> String {
    let end = payload.len().min(PAYLOAD_LOG_PREFIX);
    String::from_utf8_lossy(&payload[..end]).into_owned()
}
