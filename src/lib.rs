//! SceneScape People Counter Library
//!
//! Counts people across SceneScape scenes in real time.
//!
//! ## Components
//!
//! 1. SceneRegistry - scene catalogue and display names
//! 2. OccupancyTracker - per-scene and aggregate occupancy statistics
//! 3. ReportScheduler - live summary / detailed report cadence
//! 4. EventPipeline - inbound payload decode and dispatch
//! 5. SceneScapeClient - REST catalogue lookup
//! 6. MqttTransport - broker connection and delivery loop
//!
//! ## Design Principles
//!
//! - All shared state behind one lock discipline; snapshots never observe
//!   a partial update
//! - Per-message errors are contained at the pipeline; one bad message
//!   never drops the transport connection
//! - No network I/O on the aggregation path

pub mod error;
pub mod event_pipeline;
pub mod models;
pub mod mqtt_transport;
pub mod occupancy_tracker;
pub mod report_scheduler;
pub mod scene_registry;
pub mod scenescape_client;
pub mod state;

pub use error::{Error, Result};
