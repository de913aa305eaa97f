//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use kangaroo_server::ui::{Server, ServerConfig};
use serde_json::Value;
use tokio::{net::TcpStream, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Helper struct to manage an in-process server on an ephemeral port
pub struct TestServer {
    handle: JoinHandle<()>,
    pub port: u16,
    pub static_dir: tempfile::TempDir,
    pub files_dir: tempfile::TempDir,
}

impl TestServer {
    /// Start a server on 127.0.0.1 with fresh static and files directories
    pub async fn start() -> Self {
        let static_dir = tempfile::tempdir().unwrap();
        let files_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            static_dir.path().join("index.html"),
            "<html><body>Kangaroo</body></html>",
        )
        .unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port,
            static_dir: static_dir.path().to_path_buf(),
            files_dir: files_dir.path().to_path_buf(),
            public_url: format!("http://127.0.0.1:{}", port),
        };

        let server = Server::new(config);
        let handle = tokio::spawn(async move {
            server
                .serve(listener, std::future::pending())
                .await
                .unwrap();
        });

        TestServer {
            handle,
            port,
            static_dir,
            files_dir,
        }
    }

    /// Get the WebSocket URL for this server
    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/ws", self.port)
    }

    /// Get an HTTP URL for `path` on this server
    pub fn http_url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    /// Connect a new WebSocket client
    pub async fn connect(&self) -> TestClient {
        let (socket, _) = connect_async(self.ws_url()).await.unwrap();
        TestClient { socket }
    }

    /// Current member count of `room` as reported by `/api/rooms`
    pub async fn member_count(&self, room: &str) -> Option<u64> {
        let rooms: Vec<Value> = reqwest::get(self.http_url("/api/rooms"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        rooms
            .iter()
            .find(|r| r["name"] == room)
            .and_then(|r| r["member_count"].as_u64())
    }

    /// Poll `/api/rooms` until `room` has `expected` members
    pub async fn wait_for_members(&self, room: &str, expected: u64) {
        for _ in 0..100 {
            if self.member_count(room).await == Some(expected) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!(
            "room '{}' never reached {} members (now {:?})",
            room,
            expected,
            self.member_count(room).await
        );
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Stop the server task when the test ends
        self.handle.abort();
    }
}

/// Helper struct wrapping one WebSocket client connection
pub struct TestClient {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    pub async fn send(&mut self, payload: Value) {
        self.send_text(&payload.to_string()).await;
    }

    pub async fn send_text(&mut self, text: &str) {
        self.socket
            .send(Message::Text(text.to_string().into()))
            .await
            .unwrap();
    }

    /// Next text frame parsed as JSON
    pub async fn recv(&mut self) -> Value {
        loop {
            let msg = tokio::time::timeout(RECV_TIMEOUT, self.socket.next())
                .await
                .expect("timed out waiting for a frame")
                .expect("connection closed")
                .unwrap();
            if let Message::Text(text) = msg {
                return serde_json::from_str(text.as_str()).unwrap();
            }
        }
    }

    /// Assert that no frame arrives within a short grace period
    pub async fn assert_silent(&mut self) {
        let result = tokio::time::timeout(Duration::from_millis(200), self.socket.next()).await;
        assert!(result.is_err(), "unexpected frame: {:?}", result);
    }

    pub async fn close(mut self) {
        let _ = self.socket.close(None).await;
    }
}

pub fn system(message: &str) -> Value {
    serde_json::json!({"username": "Kangaroo", "message": message})
}
