//! Realtime socket client.
//!
//! One background task owns the websocket. Client handles talk to it over a
//! command channel; each subscription gets its own event channel back. The
//! task keeps the connection alive with heartbeats and ends when the socket
//! fails or every handle is gone.

use std::collections::HashMap;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::interval;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::frame::{ChangeEvent, Frame, PostgresChanges, events};

/// Keep-alive cadence. The server drops sockets that stay silent for about
/// a minute.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);

/// Buffered changes per subscription before the task starts dropping.
const EVENT_CHANNEL_CAPACITY: usize = 64;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Handle to a live realtime connection.
///
/// Cheap to clone; all clones talk to the same socket task.
#[derive(Debug, Clone)]
pub struct RealtimeClient {
    commands: mpsc::Sender<Command>,
}

impl RealtimeClient {
    /// Connects to a project's realtime endpoint and spawns the socket task.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be derived or the websocket
    /// handshake fails.
    pub async fn connect(base_url: impl AsRef<str>, api_key: &str) -> Result<Self> {
        let url = websocket_url(base_url.as_ref(), api_key)?;
        debug!(host = ?url.host_str(), "connecting realtime socket");

        let (socket, _response) = connect_async(url.as_str()).await?;
        let (commands, command_rx) = mpsc::channel(16);
        tokio::spawn(SocketTask::new(socket, command_rx).run());

        Ok(Self { commands })
    }

    /// Opens a database change subscription.
    ///
    /// The join is pushed to the server and events flow into the returned
    /// handle as they arrive; the join acknowledgement is logged, not
    /// awaited.
    ///
    /// A subscription's configuration maps to one channel topic. Joining
    /// the same topic again replaces the earlier subscription, whose feed
    /// then ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket task has already ended.
    pub async fn subscribe(&self, changes: PostgresChanges) -> Result<Subscription> {
        let topic = changes.topic();
        let (events, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        self.commands
            .send(Command::Subscribe { changes, events })
            .await
            .map_err(|_| Error::Closed)?;

        Ok(Subscription {
            topic,
            events: event_rx,
            commands: self.commands.clone(),
        })
    }
}

/// One live change subscription.
#[derive(Debug)]
pub struct Subscription {
    topic: String,
    events: mpsc::Receiver<ChangeEvent>,
    commands: mpsc::Sender<Command>,
}

impl Subscription {
    /// Waits for the next change.
    ///
    /// Returns `None` once the subscription ends: the channel was left, the
    /// server closed it, or the socket task died.
    pub async fn next_event(&mut self) -> Option<ChangeEvent> {
        self.events.recv().await
    }

    /// Channel topic this subscription joined.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Leaves the channel and releases the subscription.
    pub async fn unsubscribe(self) {
        let Self {
            topic, commands, ..
        } = self;
        commands.send(Command::Unsubscribe { topic }).await.ok();
    }
}

/// Commands from client handles to the socket task.
#[derive(Debug)]
enum Command {
    Subscribe {
        changes: PostgresChanges,
        events: mpsc::Sender<ChangeEvent>,
    },
    Unsubscribe {
        topic: String,
    },
}

/// One joined topic and its event sink.
struct Listener {
    changes: PostgresChanges,
    events: mpsc::Sender<ChangeEvent>,
}

/// Event sinks keyed by topic. A topic holds at most one sink; inserting
/// it again drops the previous sink, which ends that subscription's feed.
#[derive(Default)]
struct Listeners(HashMap<String, Listener>);

impl Listeners {
    fn insert(&mut self, topic: String, listener: Listener) {
        self.0.insert(topic, listener);
    }

    fn remove(&mut self, topic: &str) -> Option<Listener> {
        self.0.remove(topic)
    }

    /// Routes a change to its topic's sink, applying the subscription's
    /// event filter. A full sink drops the change; a closed sink retires
    /// the listener.
    fn dispatch(&mut self, topic: &str, event: ChangeEvent) {
        let delivery = {
            let Some(listener) = self.0.get(topic) else {
                debug!(%topic, "change for unknown topic");
                return;
            };
            if !listener.changes.accepts(event.kind) {
                return;
            }
            listener.events.try_send(event)
        };

        match delivery {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(%topic, "subscriber lagging, dropping change");
            }
            Err(TrySendError::Closed(_)) => {
                self.0.remove(topic);
            }
        }
    }
}

/// The task owning the websocket.
struct SocketTask {
    socket: Socket,
    commands: mpsc::Receiver<Command>,
    listeners: Listeners,
    next_ref: u64,
}

impl SocketTask {
    fn new(socket: Socket, commands: mpsc::Receiver<Command>) -> Self {
        Self {
            socket,
            commands,
            listeners: Listeners::default(),
            next_ref: 0,
        }
    }

    async fn run(mut self) {
        let mut heartbeat = interval(HEARTBEAT_INTERVAL);

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        debug!("all realtime handles dropped");
                        break;
                    };
                    if let Err(e) = self.handle_command(command).await {
                        error!(error = %e, "realtime send failed");
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    let frame = Frame::heartbeat(self.take_ref());
                    if let Err(e) = self.send_frame(&frame).await {
                        error!(error = %e, "heartbeat failed");
                        break;
                    }
                }
                message = self.socket.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => self.handle_text(text.as_str()),
                        Some(Ok(Message::Close(_))) | None => {
                            debug!("realtime socket closed by server");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            error!(error = %e, "realtime socket failed");
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn handle_command(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Subscribe { changes, events } => {
                let topic = changes.topic();
                let frame = Frame::join(&topic, &changes, self.take_ref());
                self.listeners.insert(topic, Listener { changes, events });
                self.send_frame(&frame).await
            }
            Command::Unsubscribe { topic } => {
                if self.listeners.remove(&topic).is_none() {
                    return Ok(());
                }
                let frame = Frame::leave(&topic, self.take_ref());
                self.send_frame(&frame).await
            }
        }
    }

    fn handle_text(&mut self, text: &str) {
        let frame: Frame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "undecodable realtime frame");
                return;
            }
        };

        match frame.event.as_str() {
            events::POSTGRES_CHANGES => self.dispatch_change(&frame),
            events::PHX_REPLY => {
                let status = frame
                    .payload
                    .get("status")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown");
                debug!(topic = %frame.topic, %status, "channel reply");
            }
            events::PHX_ERROR => warn!(topic = %frame.topic, "channel error"),
            events::PHX_CLOSE => {
                debug!(topic = %frame.topic, "channel closed by server");
                self.listeners.remove(&frame.topic);
            }
            events::SYSTEM => debug!(topic = %frame.topic, "system message"),
            other => debug!(event = %other, "ignoring realtime event"),
        }
    }

    fn dispatch_change(&mut self, frame: &Frame) {
        let Some(event) = ChangeEvent::from_payload(&frame.payload) else {
            warn!(topic = %frame.topic, "undecodable change payload");
            return;
        };
        self.listeners.dispatch(&frame.topic, event);
    }

    async fn send_frame(&mut self, frame: &Frame) -> Result<()> {
        let json = serde_json::to_string(frame)?;
        self.socket.send(Message::text(json)).await?;
        Ok(())
    }

    fn take_ref(&mut self) -> u64 {
        self.next_ref += 1;
        self.next_ref
    }
}

/// Derives the websocket URL from a project base URL.
fn websocket_url(base_url: &str, api_key: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)?;

    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => return Err(Error::InvalidUrl(format!("unsupported scheme {other}"))),
    };
    url.set_scheme(scheme)
        .map_err(|()| Error::InvalidUrl(base_url.to_string()))?;

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| Error::InvalidUrl(base_url.to_string()))?;
        segments.pop_if_empty();
        segments.extend(["realtime", "v1", "websocket"]);
    }
    url.query_pairs_mut()
        .append_pair("apikey", api_key)
        .append_pair("vsn", "1.0.0");

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod url_tests {
        use super::*;

        #[test]
        fn test_websocket_url_from_https() {
            let url = websocket_url("https://project.example.co", "anon-key").unwrap();
            assert_eq!(
                url.as_str(),
                "wss://project.example.co/realtime/v1/websocket?apikey=anon-key&vsn=1.0.0"
            );
        }

        #[test]
        fn test_websocket_url_from_http() {
            let url = websocket_url("http://localhost:54321", "key").unwrap();
            assert_eq!(
                url.as_str(),
                "ws://localhost:54321/realtime/v1/websocket?apikey=key&vsn=1.0.0"
            );
        }

        #[test]
        fn test_websocket_url_rejects_odd_schemes() {
            assert!(websocket_url("ftp://project.example.co", "key").is_err());
        }
    }

    mod listener_tests {
        use super::*;
        use crate::frame::ChangeKind;
        use serde_json::json;
        use tokio_test::{assert_pending, assert_ready, task};

        fn insert_event() -> ChangeEvent {
            ChangeEvent {
                kind: ChangeKind::Insert,
                table: "chat_messages".to_string(),
                schema: "public".to_string(),
                commit_timestamp: None,
                record: Some(json!({ "id": 1 })),
                old_record: None,
            }
        }

        #[test]
        fn test_dispatch_applies_the_event_filter() {
            let changes = PostgresChanges::insert("chat_messages");
            let topic = changes.topic();
            let (events, mut rx) = mpsc::channel(4);
            let mut listeners = Listeners::default();
            listeners.insert(topic.clone(), Listener { changes, events });

            let update = ChangeEvent {
                kind: ChangeKind::Update,
                ..insert_event()
            };
            listeners.dispatch(&topic, update);
            assert!(rx.try_recv().is_err());

            listeners.dispatch(&topic, insert_event());
            assert_eq!(rx.try_recv().unwrap().kind, ChangeKind::Insert);
        }

        #[test]
        fn test_closed_sink_retires_the_listener() {
            let changes = PostgresChanges::all("online_users");
            let topic = changes.topic();
            let (events, rx) = mpsc::channel(4);
            drop(rx);
            let mut listeners = Listeners::default();
            listeners.insert(topic.clone(), Listener { changes, events });

            listeners.dispatch(&topic, insert_event());
            assert!(listeners.remove(&topic).is_none());
        }

        #[test]
        fn test_lagging_sink_drops_the_change_but_stays() {
            let changes = PostgresChanges::all("online_users");
            let topic = changes.topic();
            let (events, mut rx) = mpsc::channel(1);
            let mut listeners = Listeners::default();
            listeners.insert(topic.clone(), Listener { changes, events });

            listeners.dispatch(&topic, insert_event());
            listeners.dispatch(&topic, insert_event());

            assert!(rx.try_recv().is_ok());
            assert!(rx.try_recv().is_err());
            assert!(listeners.remove(&topic).is_some());
        }

        #[test]
        fn test_rejoining_a_topic_ends_the_earlier_feed() {
            let changes = PostgresChanges::insert("chat_messages");
            let topic = changes.topic();
            let (commands, _command_rx) = mpsc::channel(1);
            let (first, first_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
            let mut subscription = Subscription {
                topic: topic.clone(),
                events: first_rx,
                commands,
            };
            let mut listeners = Listeners::default();
            listeners.insert(topic.clone(), Listener { changes: changes.clone(), events: first });

            let mut next = task::spawn(subscription.next_event());
            assert_pending!(next.poll());

            let (second, mut second_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
            listeners.insert(topic.clone(), Listener { changes, events: second });

            assert!(next.is_woken());
            assert_eq!(assert_ready!(next.poll()), None);

            listeners.dispatch(&topic, insert_event());
            assert_eq!(second_rx.try_recv().unwrap().kind, ChangeKind::Insert);
        }
    }
}
