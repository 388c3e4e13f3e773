//! Resilient device-status stream client.
//!
//! Maintains one long-lived streaming connection and reconnects after a
//! fixed back-off on any terminal event (transport error, end of input,
//! unauthorized) until externally cancelled. Stream disruptions are
//! invisible to the frame handler except as a gap in events.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::auth::EmporiaAuthManager;
use crate::config::{CONNECT_TIMEOUT, STREAM_RECONNECT_DELAY};
use crate::error::{Error, Result};
use crate::models::stream::StreamEvent;
use crate::transport::sse::{self, FrameBuffer};
use crate::transport::headers;

/// Byte stream of one established connection.
pub type BoxByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Connection seam for the stream client, so reconnect and back-off
/// behavior is testable without real network timing.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// Open one streaming connection with the given bearer token.
    ///
    /// An unauthorized rejection must surface as [`Error::Unauthorized`];
    /// the client re-authenticates and retries the connect immediately.
    async fn connect(&self, bearer_token: &str) -> Result<BoxByteStream>;
}

/// Shared transports delegate, so a `StreamClient` can hold an `Arc`ed
/// transport that the caller also keeps a handle to.
#[async_trait]
impl<T: StreamTransport + ?Sized> StreamTransport for Arc<T> {
    async fn connect(&self, bearer_token: &str) -> Result<BoxByteStream> {
        (**self).connect(bearer_token).await
    }
}

/// Real transport: a GET against the c-api stream endpoint with an
/// indefinite read timeout, since the stream idles between events.
pub struct HttpStreamTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpStreamTransport {
    pub fn new(url: String) -> Self {
        // Connect timeout only; no overall request timeout.
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self { client, url }
    }
}

#[async_trait]
impl StreamTransport for HttpStreamTransport {
    async fn connect(&self, bearer_token: &str) -> Result<BoxByteStream> {
        let response = self
            .client
            .get(&self.url)
            .headers(headers::stream_headers(bearer_token))
            .send()
            .await
            .map_err(Error::from_transport)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Unauthorized { message });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(Box::pin(response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| Error::Stream(format!("read error: {}", e)))
        })))
    }
}

/// Stream client state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Disconnected,
    Connecting,
    Streaming,
    Cancelled,
}

/// Long-running consumer of the device-status event stream.
///
/// Shares only the auth manager with request-issuing tasks; connection
/// state and the parse buffer are exclusively owned here.
pub struct StreamClient<T = HttpStreamTransport> {
    auth: Arc<EmporiaAuthManager>,
    transport: T,
    backoff: std::time::Duration,
}

impl<T: StreamTransport> StreamClient<T> {
    pub fn new(auth: Arc<EmporiaAuthManager>, transport: T) -> Self {
        Self {
            auth,
            transport,
            backoff: STREAM_RECONNECT_DELAY,
        }
    }

    /// Override the reconnect back-off.
    pub fn with_backoff(mut self, backoff: std::time::Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Run until cancelled.
    ///
    /// `handler` is invoked synchronously once per recognized
    /// `DEVICE_STATUS` frame; a slow handler naturally throttles stream
    /// consumption. Returns `Ok(())` when the cancellation signal is
    /// observed; connection failures are absorbed by the reconnect loop.
    pub async fn run<F>(&self, mut handler: F, cancel: CancellationToken) -> Result<()>
    where
        F: FnMut(StreamEvent) + Send,
    {
        let mut state = StreamState::Connecting;
        let mut connection: Option<BoxByteStream> = None;

        loop {
            match state {
                StreamState::Connecting => {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            state = StreamState::Disconnected;
                        }
                        attempt = self.establish() => match attempt {
                            Ok(stream) => {
                                debug!("Device status stream connected");
                                connection = Some(stream);
                                state = StreamState::Streaming;
                            }
                            Err(e) => {
                                warn!(error = %e, "Stream connect failed");
                                state = StreamState::Disconnected;
                            }
                        }
                    }
                }
                StreamState::Streaming => {
                    state = match connection.take() {
                        Some(stream) => self.consume(stream, &mut handler, &cancel).await,
                        None => StreamState::Disconnected,
                    };
                }
                StreamState::Disconnected => {
                    if cancel.is_cancelled() {
                        state = StreamState::Cancelled;
                        continue;
                    }
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            state = StreamState::Cancelled;
                        }
                        _ = tokio::time::sleep(self.backoff) => {
                            state = StreamState::Connecting;
                        }
                    }
                }
                StreamState::Cancelled => {
                    info!("Device status stream cancelled");
                    return Ok(());
                }
            }
        }
    }

    /// Open one connection, handling a connect-time 401 with a single
    /// immediate re-authentication (an expected, fast-recoverable case
    /// that skips the back-off).
    async fn establish(&self) -> Result<BoxByteStream> {
        self.auth.ensure_fresh().await?;
        let token = self.auth.bearer_token().await?;

        match self.transport.connect(&token).await {
            Ok(stream) => Ok(stream),
            Err(Error::Unauthorized { .. }) => {
                warn!("Stream connect unauthorized, re-authenticating");
                self.auth.authenticate().await?;
                let token = self.auth.bearer_token().await?;
                self.transport.connect(&token).await
            }
            Err(e) => Err(e),
        }
    }

    /// Consume one connection until a terminal event.
    async fn consume<F>(
        &self,
        mut stream: BoxByteStream,
        handler: &mut F,
        cancel: &CancellationToken,
    ) -> StreamState
    where
        F: FnMut(StreamEvent) + Send,
    {
        // Fresh parse buffer per connection attempt.
        let mut buffer = FrameBuffer::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return StreamState::Disconnected,
                chunk = stream.next() => match chunk {
                    Some(Ok(bytes)) => {
                        for line in buffer.extend(&bytes) {
                            if let Some(event) = sse::decode_frame(&line) {
                                if event.is_device_status() {
                                    handler(event);
                                } else {
                                    trace!(event_type = %event.event_type, "Ignoring event");
                                }
                            }
                        }
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "Stream read failed, reconnecting");
                        return StreamState::Disconnected;
                    }
                    None => {
                        info!("Stream ended, reconnecting");
                        return StreamState::Disconnected;
                    }
                }
            }
        }
    }
}

impl<T> std::fmt::Debug for StreamClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamClient")
            .field("backoff", &self.backoff)
            .finish()
    }
}
