#![allow(dead_code)]
//! In-process RPC server used by the integration tests.
//!
//! Accepts exactly one WebSocket connection. Every text frame the client
//! writes is decoded and handed to the test through [`FakeServer::next_request`];
//! the test decides what to send back.

use futures_util::{SinkExt, StreamExt};
use serde_json::Value as JsonValue;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Message};

pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

enum ServerCmd {
    Send(Message),
    HangUp,
}

pub struct FakeServer {
    addr: SocketAddr,
    requests: mpsc::UnboundedReceiver<JsonValue>,
    commands: mpsc::UnboundedSender<ServerCmd>,
}

impl FakeServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (req_tx, requests) = mpsc::unbounded_channel();
        let (commands, mut cmd_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let ws = accept_async(tcp).await.unwrap();
            let (mut sink, mut stream) = ws.split();

            loop {
                tokio::select! {
                    frame = stream.next() => match frame {
                        Some(Ok(Message::Text(text))) => {
                            let request: JsonValue = serde_json::from_str(text.as_str()).unwrap();
                            let _ = req_tx.send(request);
                        },
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                        Some(Ok(_)) => {},
                    },
                    cmd = cmd_rx.recv() => match cmd {
                        Some(ServerCmd::Send(message)) => {
                            if sink.send(message).await.is_err() {
                                break;
                            }
                        },
                        Some(ServerCmd::HangUp) | None => break,
                    },
                }
            }
        });

        Self {
            addr,
            requests,
            commands,
        }
    }

    pub fn url(&self) -> String {
        format!("ws://{}/rpc", self.addr)
    }

    /// Next request written by the client, as raw JSON.
    pub async fn next_request(&mut self) -> JsonValue {
        timeout(TEST_TIMEOUT, self.requests.recv())
            .await
            .expect("timed out waiting for a request")
            .expect("server task ended")
    }

    pub fn reply(&self, frame: JsonValue) {
        self.send(Message::Text(frame.to_string().into()));
    }

    pub fn send(&self, message: Message) {
        let _ = self.commands.send(ServerCmd::Send(message));
    }

    /// Drop the TCP connection without a close handshake.
    pub fn hang_up(&self) {
        let _ = self.commands.send(ServerCmd::HangUp);
    }
}

/// Accepts the WebSocket handshake and then never reads or writes again,
/// so pings go unanswered.
pub async fn start_silent_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let _ws = accept_async(tcp).await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
    });
    addr
}

/// Accepts TCP connections but never answers the WebSocket handshake.
pub async fn start_stalled_listener() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((tcp, _)) = listener.accept().await {
            held.push(tcp);
        }
    });
    addr
}
