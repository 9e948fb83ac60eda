//! Fake JSON-RPC node for transport tests.
//!
//! Serves HTTP/1.1 on a local port and answers each request through a
//! handler closure keyed on the method name.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::task::JoinHandle;

/// How the node answers one request.
pub(crate) enum Reply {
    Result(Value),
    Error { code: i64, message: String },
    /// Never answer.
    Hang,
}

type Handler = Arc<dyn Fn(&str, &Value) -> Reply + Send + Sync>;

pub(crate) struct MockNode {
    addr: SocketAddr,
    calls: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

/// Pick a free local port.
pub(crate) fn find_available_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

impl MockNode {
    /// Start a node on a free port.
    pub(crate) async fn start(
        handler: impl Fn(&str, &Value) -> Reply + Send + Sync + 'static,
    ) -> Self {
        Self::bind("127.0.0.1:0", handler).await
    }

    pub(crate) async fn bind(
        addr: impl ToSocketAddrs,
        handler: impl Fn(&str, &Value) -> Reply + Send + Sync + 'static,
    ) -> Self {
        let listener = TcpListener::bind(addr).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let handler: Handler = Arc::new(handler);

        let task = tokio::spawn({
            let calls = Arc::clone(&calls);
            async move {
                loop {
                    let Ok((stream, _)) = listener.accept().await else {
                        return;
                    };
                    tokio::spawn(serve(stream, Arc::clone(&handler), Arc::clone(&calls)));
                }
            }
        });

        Self { addr, calls, task }
    }

    pub(crate) fn url(&self) -> SecretString {
        SecretString::from(format!("http://{}", self.addr))
    }

    /// Number of requests received for `method`.
    pub(crate) fn calls(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|m| *m == method)
            .count()
    }
}

impl Drop for MockNode {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(mut stream: TcpStream, handler: Handler, calls: Arc<Mutex<Vec<String>>>) {
    let mut buf = Vec::new();
    loop {
        let Some(body) = read_request(&mut stream, &mut buf).await else {
            return;
        };
        let request: Value = serde_json::from_slice(&body).unwrap();
        let method = request["method"].as_str().unwrap_or_default().to_string();
        calls.lock().unwrap().push(method.clone());

        let payload = match handler(&method, &request["params"]) {
            Reply::Result(result) => json!({ "jsonrpc": "2.0", "id": request["id"], "result": result }),
            Reply::Error { code, message } => json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "error": { "code": code, "message": message },
            }),
            Reply::Hang => std::future::pending().await,
        };

        let body = payload.to_string();
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        );
        if stream.write_all(response.as_bytes()).await.is_err() {
            return;
        }
    }
}

/// Read one request off a keep-alive connection and return its body.
async fn read_request(stream: &mut TcpStream, buf: &mut Vec<u8>) -> Option<Vec<u8>> {
    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let mut chunk = [0u8; 4096];
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let length: usize = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0);

    while buf.len() < header_end + length {
        let mut chunk = [0u8; 4096];
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = buf[header_end..header_end + length].to_vec();
    buf.drain(..header_end + length);
    Some(body)
}
