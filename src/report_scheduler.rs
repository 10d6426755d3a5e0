//! Report Scheduler
//!
//! Decides, on each processed event and at shutdown, whether to emit a
//! one-line live summary or a multi-line detailed report, and renders
//! them to stdout. Purely a function of elapsed time and message count;
//! never mutates tracker state.
//!
//! Interactive terminals get a short interval and a carriage-return
//! overwritten live line. Redirected or containerized output gets a
//! longer interval and one appended line per summary so log collectors
//! capture every report. Rendering failures are logged and swallowed;
//! they never abort the ingestion path.

use crate::error::{Error, Result};
use crate::models::{AggregateStats, SceneOccupancy};
use std::io::{IsTerminal, Write};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// A detailed report is emitted every this many processed messages
pub const DETAILED_REPORT_EVERY: u64 = 150;

/// Live summary interval when attached to an interactive terminal
pub const INTERACTIVE_INTERVAL: Duration = Duration::from_secs(1);

/// Live summary interval for redirected/containerized output
pub const NON_INTERACTIVE_INTERVAL: Duration = Duration::from_secs(3);

/// Cadence state guarded by one lock
struct SchedulerState {
    last_summary_at: Option<Instant>,
    finalized: bool,
    live_emitted: u64,
    detailed_emitted: u64,
}

/// Rate-limited live summary and detailed report emitter
pub struct ReportScheduler {
    summary_interval: Duration,
    interactive: bool,
    state: Mutex<SchedulerState>,
}

impl ReportScheduler {
    /// Create a scheduler with cadence derived from the output context:
    /// interactive unless stdout is redirected or `DOCKER_CONTAINER` is set.
    pub fn from_output_context() -> Self {
        let interactive =
            std::env::var("DOCKER_CONTAINER").is_err() && std::io::stdout().is_terminal();
        Self::new(interactive)
    }

    /// Create a scheduler for an explicit output context
    pub fn new(interactive: bool) -> Self {
        let summary_interval = if interactive {
            INTERACTIVE_INTERVAL
        } else {
            NON_INTERACTIVE_INTERVAL
        };
        Self {
            summary_interval,
            interactive,
            state: Mutex::new(SchedulerState {
                last_summary_at: None,
                finalized: false,
                live_emitted: 0,
                detailed_emitted: 0,
            }),
        }
    }

    /// Evaluate cadence after one processed event.
    ///
    /// Emits a live summary at most once per interval, plus a detailed
    /// report whenever the message count hits a multiple of
    /// [`DETAILED_REPORT_EVERY`].
    pub async fn on_update(&self, scenes: &[SceneOccupancy], aggregate: &AggregateStats) {
        let now = Instant::now();
        let detailed_due =
            aggregate.message_count > 0 && aggregate.message_count % DETAILED_REPORT_EVERY == 0;

        let live_due = {
            let mut state = self.state.lock().await;
            if state.finalized {
                return;
            }
            let due = state
                .last_summary_at
                .map_or(true, |t| now.duration_since(t) >= self.summary_interval);
            if due {
                state.last_summary_at = Some(now);
                state.live_emitted += 1;
            }
            if detailed_due {
                state.detailed_emitted += 1;
            }
            due
        };

        if live_due {
            if let Err(e) = self.emit_live(scenes, aggregate) {
                tracing::warn!(error = %e, "Failed to render live summary");
            }
        }

        if detailed_due {
            if let Err(e) = self.emit_detailed(scenes, aggregate) {
                tracing::warn!(error = %e, "Failed to render detailed report");
            }
        }
    }

    /// Emit the final detailed report, exactly once per process run.
    ///
    /// Called on shutdown; unconditional with respect to the periodic
    /// threshold. Later updates and repeat calls are no-ops.
    pub async fn finalize(&self, scenes: &[SceneOccupancy], aggregate: &AggregateStats) {
        {
            let mut state = self.state.lock().await;
            if state.finalized {
                return;
            }
            state.finalized = true;
            state.detailed_emitted += 1;
        }

        if let Err(e) = self.emit_detailed(scenes, aggregate) {
            tracing::warn!(error = %e, "Failed to render final report");
        }
    }

    /// Reports emitted so far as (live, detailed)
    pub async fn report_counts(&self) -> (u64, u64) {
        let state = self.state.lock().await;
        (state.live_emitted, state.detailed_emitted)
    }

    fn emit_live(&self, scenes: &[SceneOccupancy], aggregate: &AggregateStats) -> Result<()> {
        let line = format_live_line(scenes, aggregate);
        let mut out = std::io::stdout().lock();
        let written = if self.interactive {
            // Overwrite the same line in place
            write!(out, "\r{line}").and_then(|_| out.flush())
        } else {
            writeln!(out, "{line}")
        };
        written.map_err(|e| Error::Render(e.to_string()))
    }

    fn emit_detailed(&self, scenes: &[SceneOccupancy], aggregate: &AggregateStats) -> Result<()> {
        let report = format_detailed_report(scenes, aggregate);
        let mut out = std::io::stdout().lock();
        writeln!(out, "{report}").map_err(|e| Error::Render(e.to_string()))
    }
}

/// One-line live summary: scene-by-scene current counts, total, message
/// count and the timestamp of the last update.
pub fn format_live_line(scenes: &[SceneOccupancy], aggregate: &AggregateStats) -> String {
    let summary = scenes
        .iter()
        .map(|s| format!("{}: {}", s.display_name, s.current_count))
        .collect::<Vec<_>>()
        .join(" | ");

    let timestamp = aggregate
        .last_update
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "No data".to_string());

    format!(
        "[{}] Total: {} people ({}) - {} msgs",
        timestamp, aggregate.total_current, summary, aggregate.message_count
    )
}

/// Multi-line detailed report: peak and current counts per scene, total
/// peak and message count.
pub fn format_detailed_report(scenes: &[SceneOccupancy], aggregate: &AggregateStats) -> String {
    let rule = "=".repeat(60);
    let mut out = String::new();

    // Leading newline breaks out of an overwritten live line
    out.push('\n');
    out.push_str(&rule);
    out.push_str("\nSceneScape People Counter - Peak Occupancy Summary\n");
    out.push_str(&rule);
    out.push('\n');

    let Some(last_update) = aggregate.last_update else {
        out.push_str("Last Update: No data received yet");
        return out;
    };

    out.push_str(&format!("Last Update: {}\n", last_update.format("%H:%M:%S")));
    out.push_str(&format!(
        "Total Messages Processed: {}\n",
        group_thousands(aggregate.message_count)
    ));
    out.push_str(&format!(
        "Maximum Total People Detected: {}\n",
        aggregate.total_peak
    ));
    out.push('\n');

    if scenes.is_empty() {
        out.push_str("No live data received yet...\n");
    } else {
        out.push_str("Maximum People Count by Scene:\n");
        for scene in scenes {
            out.push_str(&format!(
                "  {}: {} people (currently: {})\n",
                scene.display_name, scene.peak_count, scene.current_count
            ));
        }
    }

    out.push_str(&rule);
    out
}

/// Thousands-separated rendering of a message count
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn scenes() -> Vec<SceneOccupancy> {
        vec![
            SceneOccupancy {
                scene_id: "a".to_string(),
                display_name: "Lab".to_string(),
                current_count: 1,
                peak_count: 3,
            },
            SceneOccupancy {
                scene_id: "b".to_string(),
                display_name: "Lobby".to_string(),
                current_count: 2,
                peak_count: 2,
            },
        ]
    }

    fn aggregate(message_count: u64) -> AggregateStats {
        AggregateStats {
            total_current: 3,
            total_peak: 5,
            message_count,
            last_update: Some(chrono::Utc.with_ymd_and_hms(2026, 8, 28, 12, 34, 56).unwrap()),
        }
    }

    #[test]
    fn test_live_line_format() {
        let line = format_live_line(&scenes(), &aggregate(42));
        assert_eq!(line, "[12:34:56] Total: 3 people (Lab: 1 | Lobby: 2) - 42 msgs");
    }

    #[test]
    fn test_detailed_report_contents() {
        let report = format_detailed_report(&scenes(), &aggregate(1234));
        assert!(report.contains("Peak Occupancy Summary"));
        assert!(report.contains("Last Update: 12:34:56"));
        assert!(report.contains("Total Messages Processed: 1,234"));
        assert!(report.contains("Maximum Total People Detected: 5"));
        assert!(report.contains("  Lab: 3 people (currently: 1)"));
        assert!(report.contains("  Lobby: 2 people (currently: 2)"));
    }

    #[test]
    fn test_detailed_report_without_data() {
        let report = format_detailed_report(&[], &AggregateStats::default());
        assert!(report.contains("Last Update: No data received yet"));
        assert!(!report.contains("Maximum"));
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_summary_rate_limited() {
        let scheduler = ReportScheduler::new(false);
        let scenes = scenes();

        // First event emits immediately; the rest inside the interval are
        // suppressed
        scheduler.on_update(&scenes, &aggregate(1)).await;
        scheduler.on_update(&scenes, &aggregate(2)).await;
        scheduler.on_update(&scenes, &aggregate(3)).await;
        assert_eq!(scheduler.report_counts().await, (1, 0));

        tokio::time::advance(NON_INTERACTIVE_INTERVAL).await;
        scheduler.on_update(&scenes, &aggregate(4)).await;
        assert_eq!(scheduler.report_counts().await, (2, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_detailed_report_every_threshold() {
        let scheduler = ReportScheduler::new(false);
        let scenes = scenes();

        scheduler.on_update(&scenes, &aggregate(149)).await;
        assert_eq!(scheduler.report_counts().await.1, 0);

        scheduler.on_update(&scenes, &aggregate(150)).await;
        assert_eq!(scheduler.report_counts().await.1, 1);

        scheduler.on_update(&scenes, &aggregate(300)).await;
        assert_eq!(scheduler.report_counts().await.1, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finalize_emits_exactly_once() {
        let scheduler = ReportScheduler::new(false);
        let scenes = scenes();

        scheduler.finalize(&scenes, &aggregate(10)).await;
        scheduler.finalize(&scenes, &aggregate(10)).await;
        assert_eq!(scheduler.report_counts().await.1, 1);

        // Updates after finalization are no-ops
        tokio::time::advance(NON_INTERACTIVE_INTERVAL).await;
        scheduler.on_update(&scenes, &aggregate(11)).await;
        assert_eq!(scheduler.report_counts().await, (0, 1));
    }

    #[tokio::test]
    async fn test_interactive_interval_is_shorter() {
        let interactive = ReportScheduler::new(true);
        let non_interactive = ReportScheduler::new(false);
        assert!(interactive.summary_interval < non_interactive.summary_interval);
    }
}
