//! MQTT Transport
//!
//! Delivery adapter for the regulated scene topic: credential loading,
//! TLS connection, subscription and the polling loop that hands each
//! publish to the event pipeline. The broker speaks TLS with a
//! self-signed certificate even on the plaintext port, so certificate
//! verification is disabled, matching the credentials the controller
//! ships with.

use crate::error::{Error, Result};
use crate::event_pipeline::EventPipeline;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS, TlsConfiguration, Transport};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Topic pattern covering regulated data for all scenes
pub const SCENE_TOPIC: &str = "scenescape/regulated/scene/+";

/// Delay before re-polling after a connection error
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Broker credentials from the controller auth file
#[derive(Debug, Clone)]
pub struct MqttCredentials {
    pub user: String,
    pub password: String,
}

/// Raw auth file shape; fields validated after decode
#[derive(Debug, Deserialize)]
struct AuthFile {
    #[serde(default)]
    user: Option<String>,

    #[serde(default)]
    password: Option<String>,
}

/// Load broker credentials from a JSON auth file.
///
/// Missing, unreadable or malformed files are fatal to startup.
pub fn load_credentials(path: &Path) -> Result<MqttCredentials> {
    let path = resolve_auth_path(path);
    let raw = std::fs::read_to_string(&path)
        .map_err(|e| Error::Credential(format!("Auth file {}: {e}", path.display())))?;
    parse_credentials(&raw)
        .map_err(|e| Error::Credential(format!("{} ({})", e, path.display())))
}

fn parse_credentials(raw: &str) -> std::result::Result<MqttCredentials, String> {
    let auth: AuthFile =
        serde_json::from_str(raw).map_err(|e| format!("Invalid JSON in auth file: {e}"))?;

    match (auth.user, auth.password) {
        (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
            Ok(MqttCredentials { user, password })
        }
        _ => Err("Missing user or password in auth file".to_string()),
    }
}

/// Container images mount the auth file under /app; fall back to the
/// relative path when running natively.
fn resolve_auth_path(path: &Path) -> PathBuf {
    if !path.exists() {
        if let Ok(stripped) = path.strip_prefix("/app") {
            return stripped.to_path_buf();
        }
    }
    path.to_path_buf()
}

/// MQTT connection and delivery loop
pub struct MqttTransport {
    client: AsyncClient,
    event_loop: EventLoop,
    pipeline: Arc<EventPipeline>,
}

impl MqttTransport {
    /// Build the broker connection.
    ///
    /// The connection is established lazily by the delivery loop; the
    /// subscription is (re-)issued on every connection acknowledgement so
    /// it survives broker reconnects.
    pub fn connect(
        host: &str,
        port: u16,
        credentials: &MqttCredentials,
        pipeline: Arc<EventPipeline>,
    ) -> Result<Self> {
        let client_id = format!("people-counter-{}", std::process::id());
        let mut options = MqttOptions::new(client_id, host, port);
        options.set_credentials(credentials.user.clone(), credentials.password.clone());
        options.set_keep_alive(Duration::from_secs(60));

        let connector = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true)
            .build()
            .map_err(|e| Error::Internal(format!("TLS connector: {e}")))?;
        options.set_transport(Transport::Tls(TlsConfiguration::NativeConnector(connector)));

        let (client, event_loop) = AsyncClient::new(options, 64);

        Ok(Self {
            client,
            event_loop,
            pipeline,
        })
    }

    /// Pump the delivery loop.
    ///
    /// Runs until the enclosing task is cancelled. Connection errors are
    /// logged and retried after a short delay; the client reconnects on
    /// the next poll. Per-message handling never fails out of the loop.
    pub async fn run(&mut self) {
        loop {
            match self.event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    tracing::info!("Connected to MQTT broker");
                    match self.client.subscribe(SCENE_TOPIC, QoS::AtMostOnce).await {
                        Ok(()) => {
                            tracing::info!(
                                topic = SCENE_TOPIC,
                                "Subscribed, waiting for live object data"
                            );
                        }
                        Err(e) => {
                            tracing::error!(
                                topic = SCENE_TOPIC,
                                error = %e,
                                "Failed to subscribe to scene topic"
                            );
                        }
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    self.pipeline
                        .handle_payload(&publish.topic, &publish.payload)
                        .await;
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    tracing::warn!("Broker requested disconnect");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "MQTT connection error, retrying");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    }

    /// Disconnect from the broker. Failures are logged, never escalated.
    pub async fn shutdown(&mut self) {
        if let Err(e) = self.client.disconnect().await {
            tracing::warn!(error = %e, "MQTT disconnect failed");
            return;
        }
        // Pump the loop briefly so the DISCONNECT packet reaches the wire
        let _ = tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                match self.event_loop.poll().await {
                    Ok(_) => continue,
                    Err(_) => break,
                }
            }
        })
        .await;
        tracing::debug!("MQTT client disconnected");
    }
}
