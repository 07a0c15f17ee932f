//! Client for the narration backend.
//!
//! This crate provides:
//! - HTTP calls for transcript search and image generation
//! - The `/ws` feed subscription (pre-formatted JSON messages)
//! - The `/audio` uplink for raw PCM16 frames
//!
//! All of it is fire-and-forget plumbing around a backend the companion
//! does not control: feed messages the handler cannot use are its
//! problem to drop, and audio frames sent after the socket closes are
//! silently discarded.

use base64::Engine as _;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Errors from the narration backend clients.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("WebSocket error: {0}")]
    Socket(String),
}

/// HTTP client for the backend's request/response endpoints.
#[derive(Clone)]
pub struct NarratorClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ImageResponse {
    image: Option<String>,
    error: Option<String>,
}

impl NarratorClient {
    /// Create a client for a backend at `base_url`, e.g.
    /// `http://localhost:8000`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Search the session transcript. Returns the backend's result map
    /// (document lists keyed by result field).
    pub async fn search(
        &self,
        query: &str,
        event_type: Option<&str>,
    ) -> Result<HashMap<String, Vec<String>>, Error> {
        let mut request = self
            .client
            .get(format!("{}/search/", self.base_url))
            .query(&[("query", query)]);
        if let Some(event_type) = event_type {
            request = request.query(&[("event_type", event_type)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        response.json().await.map_err(|e| Error::Parse(e.to_string()))
    }

    /// Ask the backend to render an image for a scene prompt. Returns
    /// the decoded image bytes.
    pub async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, Error> {
        let response = self
            .client
            .post(format!("{}/generate-image/", self.base_url))
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        let body: ImageResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        if let Some(message) = body.error {
            return Err(Error::Api {
                status: 200,
                message,
            });
        }

        let encoded = body
            .image
            .ok_or_else(|| Error::Parse("response carried neither image nor error".to_string()))?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| Error::Parse(e.to_string()))
    }
}

/// Subscription to the backend's `/ws` narration feed.
///
/// The feed is one-directional: the backend pushes pre-formatted JSON
/// text messages and never expects a reply. `run` hands each text
/// payload to the handler as-is; classifying it is the handler's job.
pub struct FeedClient {
    url: String,
}

impl FeedClient {
    /// Create a feed client for a backend websocket URL, e.g.
    /// `ws://localhost:8000/ws`.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Connect and pump messages into `handler` until the backend
    /// closes the connection. There is no automatic reconnect.
    pub async fn run<F>(&self, mut handler: F) -> Result<(), Error>
    where
        F: FnMut(&str) + Send,
    {
        let (stream, _) = connect_async(&self.url)
            .await
            .map_err(|e| Error::Socket(e.to_string()))?;
        tracing::info!("Connected to narration feed at {}", self.url);

        let (_, mut read) = stream.split();
        while let Some(msg) = read.next().await {
            match msg {
                Ok(Message::Text(text)) => handler(&text),
                Ok(Message::Close(_)) => {
                    tracing::info!("Narration feed closed by backend");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Narration feed error: {}", e);
                    return Err(Error::Socket(e.to_string()));
                }
            }
        }
        Ok(())
    }
}

/// Uplink for raw audio frames on the backend's `/audio` socket.
///
/// Frames are PCM16 mono at 16 kHz, sent as little-endian binary
/// messages. The uplink is lossy on purpose: once the socket has
/// closed, further frames are dropped without error.
pub struct AudioSender {
    stream: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
}

impl AudioSender {
    /// Connect to the audio endpoint, e.g. `ws://localhost:8000/audio`.
    pub async fn connect(url: &str) -> Result<Self, Error> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| Error::Socket(e.to_string()))?;
        tracing::info!("Connected audio uplink at {}", url);
        Ok(Self {
            stream: Some(stream),
        })
    }

    /// Send one frame of samples. Frames offered after the socket
    /// closed are dropped silently.
    pub async fn send_frame(&mut self, samples: &[i16]) {
        let Some(stream) = self.stream.as_mut() else {
            return;
        };
        let payload = frame_to_bytes(samples);
        if let Err(e) = stream.send(Message::Binary(payload)).await {
            tracing::warn!("Audio uplink closed: {}", e);
            self.stream = None;
        }
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Close the uplink. Idempotent.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.close(None).await;
        }
    }
}

/// Encode PCM16 samples as little-endian bytes for the wire.
pub fn frame_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_to_bytes_little_endian() {
        let bytes = frame_to_bytes(&[0x0102, -1]);
        assert_eq!(bytes, vec![0x02, 0x01, 0xFF, 0xFF]);
    }

    #[test]
    fn test_frame_to_bytes_length() {
        assert_eq!(frame_to_bytes(&[0; 1600]).len(), 3200);
        assert!(frame_to_bytes(&[]).is_empty());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = NarratorClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_image_response_shapes() {
        let ok: ImageResponse = serde_json::from_str(r#"{"image":"aGk="}"#).unwrap();
        assert_eq!(ok.image.as_deref(), Some("aGk="));
        assert!(ok.error.is_none());

        let err: ImageResponse = serde_json::from_str(r#"{"error":"no key"}"#).unwrap();
        assert!(err.image.is_none());
        assert_eq!(err.error.as_deref(), Some("no key"));
    }
}
