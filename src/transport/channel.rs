use super::protocol::{ClientMessage, ServerMessage};
use crate::error::TransportError;
use futures_util::{Sink, SinkExt, StreamExt};
use std::time::Duration;
use strum::Display;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

const EVENT_BUFFER: usize = 64;

/// Lifecycle of the duplex channel. There is no way back from `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
}

/// Inbound traffic and lifecycle notices, in the order the socket produced them.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Opened,
    /// `{"type":"routine"}` frame. Informational only.
    Routine(serde_json::Value),
    /// `{"type":"error"}` frame.
    Error(String),
    /// Socket-level failure; the channel closes right after.
    Fault(String),
    Closed,
}

/// Write side of the duplex channel as seen by the rest of the crate.
pub trait GoalChannel: Send + Sync {
    fn state(&self) -> ChannelState;

    /// Queue `message` for the socket. Fails unless the channel is `Open`.
    fn send(&self, message: ClientMessage) -> Result<(), TransportError>;
}

/// Persistent WebSocket connection.
///
/// Opened once, closed on [`DuplexChannel::close`] or drop. Never reconnects.
pub struct DuplexChannel {
    state: watch::Receiver<ChannelState>,
    outbound: mpsc::UnboundedSender<ClientMessage>,
    events: broadcast::Sender<ChannelEvent>,
    cancel: CancellationToken,
}

impl DuplexChannel {
    /// Start connecting to `url` in the background. Must be called inside a
    /// Tokio runtime.
    pub fn open(url: &str) -> Self {
        let (state_tx, state_rx) = watch::channel(ChannelState::Connecting);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let cancel = CancellationToken::new();

        tokio::spawn(run_socket(
            url.to_string(),
            state_tx,
            outbound_rx,
            events.clone(),
            cancel.clone(),
        ));

        Self {
            state: state_rx,
            outbound: outbound_tx,
            events,
            cancel,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.events.subscribe()
    }

    pub fn watch_state(&self) -> watch::Receiver<ChannelState> {
        self.state.clone()
    }

    /// Wait until the channel leaves `Connecting`, up to `timeout`.
    /// Returns the state observed when the wait ended.
    pub async fn wait_until_settled(&self, timeout: Duration) -> ChannelState {
        let mut state = self.state.clone();
        match tokio::time::timeout(
            timeout,
            state.wait_for(|s| *s != ChannelState::Connecting),
        )
        .await
        {
            Ok(Ok(settled)) => *settled,
            Ok(Err(_)) => ChannelState::Closed,
            Err(_) => *self.state.borrow(),
        }
    }

    /// Stop the socket. Frames already accepted by [`GoalChannel::send`] are
    /// still written before the close frame.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// [`DuplexChannel::close`], then wait up to `timeout` for pending frames
    /// to be flushed and the socket to finish closing.
    pub async fn close_and_flush(&self, timeout: Duration) -> ChannelState {
        self.close();
        let mut state = self.state.clone();
        let closed = state.wait_for(|s| *s == ChannelState::Closed);
        match tokio::time::timeout(timeout, closed).await {
            Ok(_) => ChannelState::Closed,
            Err(_) => {
                tracing::warn!("Channel: close did not finish within {timeout:?}");
                *self.state.borrow()
            }
        }
    }
}

impl Drop for DuplexChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl GoalChannel for DuplexChannel {
    fn state(&self) -> ChannelState {
        *self.state.borrow()
    }

    fn send(&self, message: ClientMessage) -> Result<(), TransportError> {
        let state = self.state();
        if state != ChannelState::Open {
            return Err(TransportError::Unavailable { state });
        }
        self.outbound
            .send(message)
            .map_err(|_| TransportError::Unavailable {
                state: ChannelState::Closed,
            })
    }
}

async fn run_socket(
    url: String,
    state: watch::Sender<ChannelState>,
    mut outbound: mpsc::UnboundedReceiver<ClientMessage>,
    events: broadcast::Sender<ChannelEvent>,
    cancel: CancellationToken,
) {
    tracing::info!("Channel: connecting to {url}");

    let connected = tokio::select! {
        () = cancel.cancelled() => None,
        result = tokio_tungstenite::connect_async(url.as_str()) => match result {
            Ok((stream, _)) => Some(stream),
            Err(e) => {
                tracing::warn!("Channel: connect to {url} failed: {e}");
                let _ = events.send(ChannelEvent::Fault("WebSocket error occurred.".into()));
                None
            }
        },
    };

    let Some(stream) = connected else {
        state.send_replace(ChannelState::Closed);
        let _ = events.send(ChannelEvent::Closed);
        return;
    };

    let (mut write, mut read) = stream.split();
    state.send_replace(ChannelState::Open);
    let _ = events.send(ChannelEvent::Opened);
    tracing::info!("Channel: open");

    loop {
        tokio::select! {
            biased;
            Some(message) = outbound.recv() => {
                if !write_frame(&mut write, message, &events).await {
                    break;
                }
            }
            () = cancel.cancelled() => {
                // Frames accepted before close still go out ahead of the close frame.
                outbound.close();
                while let Ok(message) = outbound.try_recv() {
                    if !write_frame(&mut write, message, &events).await {
                        break;
                    }
                }
                let _ = write.send(Message::Close(None)).await;
                break;
            }
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => dispatch_inbound(&text, &events),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("Channel: receive failed: {e}");
                    let _ = events.send(ChannelEvent::Fault("WebSocket error occurred.".into()));
                    break;
                }
            }
        }
    }

    outbound.close();
    state.send_replace(ChannelState::Closed);

    let mut undelivered = 0usize;
    while let Ok(message) = outbound.try_recv() {
        tracing::warn!(kind = message.kind(), "Channel: frame dropped, socket closed");
        undelivered += 1;
    }
    if undelivered > 0 {
        let _ = events.send(ChannelEvent::Fault(format!(
            "{undelivered} message(s) could not be delivered."
        )));
    }

    let _ = events.send(ChannelEvent::Closed);
    tracing::warn!("Channel: connection closed");
}

/// Write one frame. `false` means the socket is unusable.
async fn write_frame<S>(
    write: &mut S,
    message: ClientMessage,
    events: &broadcast::Sender<ChannelEvent>,
) -> bool
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let kind = message.kind();
    if let Err(e) = write.send(Message::Text(message.to_json().into())).await {
        tracing::warn!("Channel: send {kind} frame failed: {e}");
        let _ = events.send(ChannelEvent::Fault("WebSocket error occurred.".into()));
        return false;
    }
    tracing::debug!(kind, "frame sent");
    true
}

fn dispatch_inbound(text: &str, events: &broadcast::Sender<ChannelEvent>) {
    let event = match serde_json::from_str::<ServerMessage>(text) {
        Ok(ServerMessage::Routine { data }) => ChannelEvent::Routine(data),
        Ok(ServerMessage::Error { data }) => ChannelEvent::Error(data),
        Err(e) => {
            tracing::debug!("Channel: ignoring unrecognized frame: {e}");
            return;
        }
    };
    let _ = events.send(event);
}
