#![allow(dead_code)]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use routinely::Config;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

/// Single-connection WebSocket peer standing in for the planner's `/ws`.
pub struct ChannelServer {
    pub url: String,
    received: mpsc::UnboundedReceiver<String>,
    push: mpsc::UnboundedSender<String>,
    hangup: CancellationToken,
}

impl ChannelServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind channel server");
        let addr = listener.local_addr().expect("channel server addr");
        let (received_tx, received) = mpsc::unbounded_channel();
        let (push, mut push_rx) = mpsc::unbounded_channel::<String>();
        let hangup = CancellationToken::new();
        let server_hangup = hangup.clone();

        tokio::spawn(async move {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let Ok(ws) = tokio_tungstenite::accept_async(stream).await else {
                return;
            };
            let (mut write, mut read) = ws.split();

            loop {
                tokio::select! {
                    () = server_hangup.cancelled() => {
                        let _ = write.send(Message::Close(None)).await;
                        break;
                    }
                    Some(text) = push_rx.recv() => {
                        if write.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    frame = read.next() => match frame {
                        Some(Ok(Message::Text(text))) => {
                            let _ = received_tx.send(text.as_str().to_owned());
                        }
                        Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                        Some(Ok(_)) => {}
                    }
                }
            }
        });

        Self {
            url: format!("ws://{addr}/ws"),
            received,
            push,
            hangup,
        }
    }

    /// Next text frame from the client, parsed as JSON.
    pub async fn next_frame(&mut self) -> serde_json::Value {
        let text = tokio::time::timeout(Duration::from_secs(5), self.received.recv())
            .await
            .expect("timed out waiting for a client frame")
            .expect("channel server stopped");
        serde_json::from_str(&text).expect("client frame should be JSON")
    }

    /// `true` if no client frame arrives within `wait`.
    pub async fn stays_quiet(&mut self, wait: Duration) -> bool {
        !matches!(
            tokio::time::timeout(wait, self.received.recv()).await,
            Ok(Some(_))
        )
    }

    pub fn push(&self, frame: serde_json::Value) {
        self.push
            .send(frame.to_string())
            .expect("channel server stopped");
    }

    pub fn hang_up(&self) {
        self.hangup.cancel();
    }
}

/// A `ws://` URL nothing is listening on.
pub async fn dead_channel_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let addr = listener.local_addr().expect("probe addr");
    drop(listener);
    format!("ws://{addr}/ws")
}

/// Config wired to local test endpoints with a complete profile.
pub fn test_config(planner_url: &str, channel_url: &str) -> Config {
    let mut config = Config::default();
    config.planner.base_url = planner_url.to_string();
    config.planner.request_timeout_secs = 5;
    config.channel.url = channel_url.to_string();
    config.session.poll_interval_ms = 50;
    config.account.user_id = Some("u-1".into());
    config.account.email = Some("runner@example.com".into());
    config.account.token = Some("session-token".into());
    config.profile.gender = Some("f".into());
    config.profile.age = Some(29);
    config
}
