//! REST endpoints of the HRIS backend, one module per resource.

pub mod check_clocks;
pub mod client;
pub mod dashboard;
pub mod employees;
pub mod leave;
pub mod schedules;
pub mod subscription;

pub use client::{ApiClient, Envelope, error_from_response};

use serde::Serialize;

/// Body of approve/reject calls.
#[derive(Debug, Serialize)]
pub(crate) struct ReviewNote<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'a str>,
}

impl<'a> ReviewNote<'a> {
    /// Blank notes are omitted.
    pub fn new(note: Option<&'a str>) -> Self {
        Self {
            note: note.map(str::trim).filter(|n| !n.is_empty()),
        }
    }
}

/// In-process HTTP server replaying canned responses.
#[cfg(test)]
pub(crate) mod mock {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::Mutex;

    use crate::config::ApiConfig;

    pub struct Reply {
        status: u16,
        body: String,
    }

    impl Reply {
        pub fn json(status: u16, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
            }
        }

        pub fn empty(status: u16) -> Self {
            Self::json(status, "")
        }
    }

    pub struct MockServer {
        addr: SocketAddr,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl MockServer {
        pub fn config(&self, token: &str) -> ApiConfig {
            ApiConfig {
                base_url: format!("http://{}/api/v1", self.addr),
                token: token.to_string(),
                timeout_secs: 5,
            }
        }

        /// Raw requests received so far (request line, headers and body).
        pub async fn requests(&self) -> Vec<String> {
            self.requests.lock().await.clone()
        }
    }

    async fn read_request(stream: &mut TcpStream) -> String {
        let mut data = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let n = stream.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&data);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if data.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }

        String::from_utf8_lossy(&data).into_owned()
    }

    /// Serve one reply per incoming connection, in order.
    pub async fn serve(replies: Vec<Reply>) -> MockServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = requests.clone();

        tokio::spawn(async move {
            for reply in replies {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let request = read_request(&mut stream).await;
                log.lock().await.push(request);

                let reason = reqwest::StatusCode::from_u16(reply.status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unknown");
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    reply.status,
                    reason,
                    reply.body.len(),
                    reply.body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        MockServer { addr, requests }
    }
}
