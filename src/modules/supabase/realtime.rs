//! Realtime change stream for a single table.
//!
//! Joins a Phoenix channel on Supabase Realtime with a `postgres_changes`
//! filter for one table and forwards every insert/update/delete through a
//! [`tokio::sync::broadcast`] channel. The socket is kept alive with periodic
//! heartbeats and re-established with exponential backoff when it drops.
//! Cancelling the token sends `phx_leave` and ends the background task.

use std::sync::Arc;
use std::time::Duration;

use futures::{Sink, SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use url::Url;

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    #[error("Invalid realtime URL: {0}")]
    InvalidUrl(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Channel join rejected: {0}")]
    JoinRejected(String),

    #[error("Channel closed by server")]
    ChannelClosed,
}

/// Row operation reported by `postgres_changes`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Insert,
    Update,
    Delete,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeEvent {
    /// The channel was (re)joined. Changes made while disconnected are lost,
    /// so consumers should treat this like a change.
    Subscribed,
    Change {
        change_type: ChangeType,
        commit_timestamp: Option<String>,
    },
}

/// Exponential backoff configuration for reconnection
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// `None` retries forever
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    pub socket_url: Url,
    /// Token presented on join; the anon key for public reads
    pub access_token: String,
    pub schema: String,
    pub table: String,
    pub heartbeat: Duration,
    pub reconnect: ReconnectConfig,
}

impl RealtimeConfig {
    pub fn topic(&self) -> String {
        format!("realtime:{}", self.table)
    }
}

/// Build the Realtime socket URL from the project URL
pub fn socket_url(project_url: &str, api_key: &str) -> Result<Url, RealtimeError> {
    let mut url = Url::parse(project_url).map_err(|e| RealtimeError::InvalidUrl(e.to_string()))?;

    let scheme = match url.scheme() {
        "https" => "wss",
        "http" => "ws",
        other => {
            return Err(RealtimeError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                other
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| RealtimeError::InvalidUrl(format!("cannot switch to {}", scheme)))?;

    url.set_path("/realtime/v1/websocket");
    url.query_pairs_mut()
        .clear()
        .append_pair("apikey", api_key)
        .append_pair("vsn", "1.0.0");

    Ok(url)
}

/// Spawn the channel task and return a receiver for its events.
///
/// The receiver is created before the task starts, so the first
/// [`RealtimeEvent::Subscribed`] is never missed.
pub fn subscribe_table(
    config: RealtimeConfig,
    cancel: CancellationToken,
) -> broadcast::Receiver<Arc<RealtimeEvent>> {
    let (event_tx, event_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

    tokio::spawn(async move {
        channel_loop(config, event_tx, cancel).await;
    });

    event_rx
}

// ── Background reconnection loop ─────────────────────────────────────

async fn channel_loop(
    config: RealtimeConfig,
    event_tx: broadcast::Sender<Arc<RealtimeEvent>>,
    cancel: CancellationToken,
) {
    let topic = config.topic();
    // Reset whenever a join succeeds
    let mut attempt: u32 = 0;

    loop {
        let result = connect_and_listen(&config, &event_tx, &cancel, &mut attempt).await;
        if cancel.is_cancelled() {
            break;
        }

        match result {
            Ok(()) => tracing::info!(topic = %topic, attempt, "Realtime socket closed by server"),
            Err(e) => tracing::warn!(topic = %topic, error = %e, attempt, "Realtime channel error"),
        }

        if let Some(max) = config.reconnect.max_retries {
            if attempt >= max {
                tracing::error!(
                    topic = %topic,
                    max_retries = max,
                    "Realtime reconnection limit reached, giving up"
                );
                break;
            }
        }

        let delay = calculate_backoff(attempt, &config.reconnect);
        tracing::info!(
            delay_ms = delay.as_millis() as u64,
            attempt,
            "Waiting before Realtime reconnect"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }

        attempt += 1;
    }

    tracing::debug!(topic = %topic, "Realtime loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

async fn connect_and_listen(
    config: &RealtimeConfig,
    event_tx: &broadcast::Sender<Arc<RealtimeEvent>>,
    cancel: &CancellationToken,
    attempt: &mut u32,
) -> Result<(), RealtimeError> {
    let topic = config.topic();
    tracing::info!(topic = %topic, "Connecting to Realtime");

    let (ws_stream, _response) = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Ok(()),
        connected = tokio_tungstenite::connect_async(config.socket_url.as_str()) => {
            connected.map_err(|e| RealtimeError::WebSocket(e.to_string()))?
        }
    };

    let (mut write, mut read) = ws_stream.split();

    let mut next_ref: u64 = 1;
    let join_ref = next_ref.to_string();
    next_ref += 1;

    let join = PhoenixMessage::new(
        &topic,
        "phx_join",
        join_payload(config),
        Some(join_ref.clone()),
        Some(join_ref.clone()),
    );
    send_message(&mut write, &join).await?;

    let mut heartbeat = interval_at(Instant::now() + config.heartbeat, config.heartbeat);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let leave = PhoenixMessage::new(
                    &topic,
                    "phx_leave",
                    json!({}),
                    Some(next_ref.to_string()),
                    Some(join_ref.clone()),
                );
                // The socket is dropped right after, whether or not these land
                let _ = send_message(&mut write, &leave).await;
                let _ = write.close().await;
                tracing::info!(topic = %topic, "Left Realtime channel");
                return Ok(());
            }
            _ = heartbeat.tick() => {
                let beat = PhoenixMessage::new(
                    "phoenix",
                    "heartbeat",
                    json!({}),
                    Some(next_ref.to_string()),
                    None,
                );
                next_ref += 1;
                send_message(&mut write, &beat).await?;
                tracing::trace!("Realtime heartbeat sent");
            }
            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(event) = handle_text(&text, &topic, &join_ref)? {
                            if event == RealtimeEvent::Subscribed {
                                *attempt = 0;
                            }
                            // No receivers just means nobody is listening right now
                            let _ = event_tx.send(Arc::new(event));
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        match frame {
                            Some(cf) => tracing::info!(
                                code = %cf.code,
                                reason = %cf.reason,
                                "Realtime close frame received"
                            ),
                            None => tracing::info!("Realtime close frame received (no payload)"),
                        }
                        return Ok(());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(RealtimeError::WebSocket(e.to_string())),
                    None => {
                        tracing::info!("Realtime stream ended");
                        return Ok(());
                    }
                }
            }
        }
    }
}

async fn send_message<S>(sink: &mut S, message: &PhoenixMessage) -> Result<(), RealtimeError>
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let text = serde_json::to_string(message).map_err(|e| RealtimeError::WebSocket(e.to_string()))?;
    sink.send(Message::Text(text.into()))
        .await
        .map_err(|e| RealtimeError::WebSocket(e.to_string()))
}

// ── Message parsing ──────────────────────────────────────────────────

/// Phoenix channel envelope (serializer vsn 1.0.0)
#[derive(Debug, Serialize, Deserialize)]
struct PhoenixMessage {
    topic: String,
    event: String,
    #[serde(default)]
    payload: serde_json::Value,
    #[serde(rename = "ref", default)]
    msg_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    join_ref: Option<String>,
}

impl PhoenixMessage {
    fn new(
        topic: &str,
        event: &str,
        payload: serde_json::Value,
        msg_ref: Option<String>,
        join_ref: Option<String>,
    ) -> Self {
        Self {
            topic: topic.to_string(),
            event: event.to_string(),
            payload,
            msg_ref,
            join_ref,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PhxReply {
    status: String,
    #[serde(default)]
    response: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ChangePayload {
    data: ChangeData,
}

#[derive(Debug, Deserialize)]
struct ChangeData {
    #[serde(rename = "type")]
    change_type: ChangeType,
    #[serde(default)]
    commit_timestamp: Option<String>,
}

fn join_payload(config: &RealtimeConfig) -> serde_json::Value {
    json!({
        "config": {
            "broadcast": { "ack": false, "self": false },
            "presence": { "key": "" },
            "postgres_changes": [
                { "event": "*", "schema": config.schema, "table": config.table }
            ],
            "private": false
        },
        "access_token": config.access_token
    })
}

/// Interpret one text frame. Frames for other topics (heartbeat replies on
/// `phoenix`) are ignored; join rejection and channel errors end the
/// connection so the loop can back off and rejoin.
fn handle_text(
    text: &str,
    topic: &str,
    join_ref: &str,
) -> Result<Option<RealtimeEvent>, RealtimeError> {
    let message: PhoenixMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to parse Realtime frame");
            return Ok(None);
        }
    };

    if message.topic != topic {
        return Ok(None);
    }

    match message.event.as_str() {
        "phx_reply" if message.msg_ref.as_deref() == Some(join_ref) => {
            let reply: PhxReply = serde_json::from_value(message.payload)
                .map_err(|e| RealtimeError::JoinRejected(e.to_string()))?;
            if reply.status == "ok" {
                tracing::info!(topic = %topic, "Joined Realtime channel");
                Ok(Some(RealtimeEvent::Subscribed))
            } else {
                Err(RealtimeError::JoinRejected(reply.response.to_string()))
            }
        }
        "postgres_changes" => match serde_json::from_value::<ChangePayload>(message.payload) {
            Ok(payload) => Ok(Some(RealtimeEvent::Change {
                change_type: payload.data.change_type,
                commit_timestamp: payload.data.commit_timestamp,
            })),
            Err(e) => {
                tracing::debug!(error = %e, "Unrecognised postgres_changes payload");
                Ok(Some(RealtimeEvent::Change {
                    change_type: ChangeType::Unknown,
                    commit_timestamp: None,
                }))
            }
        },
        "system" => {
            tracing::debug!(payload = %message.payload, "Realtime system message");
            Ok(None)
        }
        "phx_error" => Err(RealtimeError::WebSocket(format!(
            "channel error: {}",
            message.payload
        ))),
        "phx_close" => Err(RealtimeError::ChannelClosed),
        _ => Ok(None),
    }
}

// ── Backoff calculation ──────────────────────────────────────────────

/// `delay = min(initial * 2^attempt, max)` with +-25% deterministic jitter
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(attempt.min(16) as i32);
    let capped = base.min(config.max_delay.as_secs_f64());

    let jitter_factor = 1.0 + 0.25 * ((attempt as f64 * 7.3).sin());
    Duration::from_secs_f64((capped * jitter_factor).max(0.0))
}
