//! SceneScape People Counter
//!
//! Entry point: wires the catalogue client, occupancy tracker, report
//! scheduler and MQTT transport together and runs the delivery loop
//! until interrupted.

use scenescape_counter::{
    event_pipeline::EventPipeline,
    mqtt_transport::{self, MqttTransport},
    occupancy_tracker::OccupancyTracker,
    report_scheduler::ReportScheduler,
    scene_registry::SceneRegistry,
    scenescape_client::SceneScapeClient,
    state::AppConfig,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scenescape_counter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Starting SceneScape people counter v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Validate configuration before constructing any collaborator
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            eprintln!();
            eprintln!("Copy .env.example to .env.local, fill in your SceneScape server");
            eprintln!("details and export them (or rely on .env loading) before starting.");
            std::process::exit(1);
        }
    };

    tracing::info!(
        rest_url = %config.rest_url,
        mqtt_host = %config.mqtt_host,
        mqtt_port = config.mqtt_port,
        verify_ssl = config.verify_ssl,
        auth_file = %config.auth_file.display(),
        "Configuration loaded"
    );

    // Catalogue lookup; fatal on failure since events cannot be labeled
    // without it
    let api = SceneScapeClient::new(&config.rest_url, &config.api_token, config.verify_ssl)?;
    let scenes = api.get_scenes().await?;
    for scene in &scenes {
        tracing::info!(scene_id = %scene.id, name = %scene.display_name, "Found scene");
    }
    tracing::info!(count = scenes.len(), "Scene catalogue loaded");

    let registry = Arc::new(SceneRegistry::with_scenes(scenes));
    let tracker = Arc::new(OccupancyTracker::new(registry));
    let scheduler = Arc::new(ReportScheduler::from_output_context());
    let pipeline = Arc::new(EventPipeline::new(tracker.clone(), scheduler.clone()));

    let credentials = mqtt_transport::load_credentials(&config.auth_file)?;
    tracing::info!(user = %credentials.user, "Loaded MQTT credentials");

    let mut transport =
        MqttTransport::connect(&config.mqtt_host, config.mqtt_port, &credentials, pipeline)?;
    tracing::info!(
        host = %config.mqtt_host,
        port = config.mqtt_port,
        "Connecting to MQTT broker"
    );

    print_banner();

    tokio::select! {
        _ = transport.run() => {}
        _ = tokio::signal::ctrl_c() => {
            println!();
            tracing::info!("Shutting down people counter");
        }
    }

    // Final detailed report, then transport teardown
    let (scenes, aggregate) = tracker.snapshot().await;
    scheduler.finalize(&scenes, &aggregate).await;
    transport.shutdown().await;

    tracing::info!("People counter stopped");
    Ok(())
}

fn print_banner() {
    let rule = "=".repeat(60);
    println!();
    println!("{rule}");
    println!("SceneScape People Counter - Live Data");
    println!("{rule}");
    println!("Press Ctrl+C to stop...");
    println!();
}
