use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default request deadline. Backend answers can take a while when the
/// RAG chain behind it has to do real work.
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Classified outcome of a backend call that did not produce a response.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The endpoint could not be reached, or the request timed out.
    #[error("connection error: {0}")]
    Transport(String),
    /// The backend answered, but outside the expected contract
    /// (non-2xx status, or a body that is not the expected JSON).
    #[error("backend error: {0}")]
    Protocol(String),
}

/// Anything that can answer one chat message. The TUI and the one-shot
/// path both go through this seam, which also lets tests fake the backend.
#[async_trait]
pub trait ChatBackend {
    async fn send(&self, message: &str) -> Result<String, ApiError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: Option<String>,
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    /// Sends one message and waits for the full response; no retry, no
    /// streaming. A 2xx body missing the `response` field is passed through
    /// as an empty answer rather than treated as a protocol error.
    async fn send(&self, message: &str) -> Result<String, ApiError> {
        let url = format!("{}/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Protocol(format!("status {}: {}", status, body)));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::Protocol(format!("invalid response body: {}", e)))?;

        Ok(parsed.response.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;

    /// Reads one full HTTP request (headers plus content-length body).
    async fn read_request(stream: &mut TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&data).into_owned();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        if name.eq_ignore_ascii_case("content-length") {
                            value.trim().parse::<usize>().ok()
                        } else {
                            None
                        }
                    })
                    .unwrap_or(0);
                if data.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).into_owned()
    }

    /// Serves exactly one request with a canned raw response, handing the
    /// request bytes back for assertions.
    async fn spawn_backend(raw_response: String) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let request = read_request(&mut stream).await;
                let _ = tx.send(request);
                let _ = stream.write_all(raw_response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });
        (format!("http://{}", addr), rx)
    }

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        )
    }

    fn client(base_url: &str) -> ChatClient {
        ChatClient::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_send_success_extracts_response_field() {
        let body = r#"{"response": "Admission requires a completed application."}"#;
        let (base_url, request_rx) = spawn_backend(http_response("200 OK", body)).await;

        let answer = client(&base_url)
            .send("What are the admission requirements?")
            .await
            .unwrap();

        assert_eq!(answer, "Admission requires a completed application.");

        let request = request_rx.await.unwrap();
        assert!(request.starts_with("POST /chat "));
        assert!(request.contains(r#"{"message":"What are the admission requirements?"}"#));
    }

    #[tokio::test]
    async fn test_send_missing_response_field_is_empty_success() {
        let (base_url, _rx) = spawn_backend(http_response("200 OK", r#"{"status":"ok"}"#)).await;

        let answer = client(&base_url).send("hello").await.unwrap();
        assert_eq!(answer, "");
    }

    #[tokio::test]
    async fn test_send_non_2xx_is_protocol_error() {
        let body = r#"{"detail": "boom"}"#;
        let (base_url, _rx) =
            spawn_backend(http_response("500 Internal Server Error", body)).await;

        let err = client(&base_url).send("hello").await.unwrap_err();
        match err {
            ApiError::Protocol(msg) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("boom"));
            }
            other => panic!("expected protocol error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_malformed_body_is_protocol_error() {
        let (base_url, _rx) = spawn_backend(http_response("200 OK", "<html>oops</html>")).await;

        let err = client(&base_url).send("hello").await.unwrap_err();
        assert!(matches!(err, ApiError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_send_timeout_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            // Accept and hold the connection without ever answering.
            if let Ok((stream, _)) = listener.accept().await {
                tokio::time::sleep(Duration::from_secs(5)).await;
                drop(stream);
            }
        });

        let client = ChatClient::new(&base_url, Duration::from_millis(200)).unwrap();
        let err = client.send("hello").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[tokio::test]
    async fn test_send_unreachable_backend_is_transport_error() {
        // Grab a free port, then close the listener so nothing answers.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = client(&base_url).send("hello").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn test_new_strips_trailing_slash() {
        let client = ChatClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
