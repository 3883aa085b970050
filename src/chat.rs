use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::{sync::mpsc::Sender, sync::Arc, time::Duration};
use thiserror::Error;
use tokio::runtime::Handle;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub(crate) enum ChatError {
    #[error("chat request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("chat endpoint answered {0}")]
    Status(StatusCode),
    #[error("chat reply unreadable: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    reply: String,
}

/// Relays chat messages to an HTTP endpoint that answers `{"reply": ...}`.
pub(crate) struct HttpChatRelay {
    client: reqwest::Client,
    url: String,
}

impl HttpChatRelay {
    pub(crate) fn new(url: impl Into<String>) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ChatError::Transport)?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub(crate) async fn send(&self, message: &str) -> Result<String, ChatError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(ChatError::Transport)?;
        if !resp.status().is_success() {
            return Err(ChatError::Status(resp.status()));
        }
        let body: ChatReply = resp.json().await.map_err(ChatError::Decode)?;
        Ok(body.reply)
    }
}

/// Runs one chat turn on `rt` and posts the result to `tx`.
pub(crate) fn spawn_chat(
    rt: &Handle,
    relay: Arc<HttpChatRelay>,
    message: String,
    tx: Sender<Result<String, ChatError>>,
) {
    rt.spawn(async move {
        let result = relay.send(&message).await;
        tx.send(result).ok();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Answers a single HTTP request with `status` and `body`, returning the
    /// request body it received.
    fn one_shot_server(
        status: &'static str,
        body: &'static str,
    ) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/chat", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            let request_body = loop {
                let n = stream.read(&mut chunk).unwrap();
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let len = text[..end]
                        .lines()
                        .find_map(|l| {
                            let (k, v) = l.split_once(':')?;
                            if k.eq_ignore_ascii_case("content-length") {
                                v.trim().parse::<usize>().ok()
                            } else {
                                None
                            }
                        })
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + len || n == 0 {
                        break text[end + 4..].to_string();
                    }
                }
                if n == 0 {
                    break String::new();
                }
            };
            let resp = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(resp.as_bytes()).unwrap();
            request_body
        });
        (url, handle)
    }

    #[tokio::test]
    async fn reply_is_returned() {
        let (url, server) = one_shot_server("200 OK", r#"{"reply":"안녕하세요"}"#);
        let relay = HttpChatRelay::new(url).unwrap();
        let reply = relay.send("hi there").await.unwrap();
        assert_eq!(reply, "안녕하세요");
        let sent: serde_json::Value = serde_json::from_str(&server.join().unwrap()).unwrap();
        assert_eq!(sent["message"], "hi there");
    }

    #[tokio::test]
    async fn server_error_maps_to_status() {
        let (url, _server) = one_shot_server("500 Internal Server Error", "{}");
        let relay = HttpChatRelay::new(url).unwrap();
        let err = relay.send("hi").await.unwrap_err();
        assert!(matches!(err, ChatError::Status(s) if s == StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn garbage_body_maps_to_decode() {
        let (url, _server) = one_shot_server("200 OK", "not json");
        let relay = HttpChatRelay::new(url).unwrap();
        assert!(matches!(relay.send("hi").await, Err(ChatError::Decode(_))));
    }

    #[tokio::test]
    async fn refused_connection_maps_to_transport() {
        let port = {
            let l = TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        let relay = HttpChatRelay::new(format!("http://127.0.0.1:{port}/chat")).unwrap();
        assert!(matches!(relay.send("hi").await, Err(ChatError::Transport(_))));
    }
}
