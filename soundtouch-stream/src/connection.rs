//! Push connection to a device
//!
//! A [`Connector`] opens one duplex channel per device and hands back a
//! [`Transport`] for outbound frames. Everything the device sends arrives
//! through a [`ConnectionListener`]. Sends are fire and forget: nothing waits
//! for, or correlates, a response.
//!
//! [`WebSocketConnector`] is the production implementation. It speaks the
//! `gabbo` websocket sub-protocol on port 8080 and runs each connection as a
//! task on a tokio runtime, so the API it exposes stays synchronous.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use soundtouch_api::Frame;
use tokio::runtime::{Handle, Runtime};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::config::ConnectionConfig;
use crate::error::{Result, StreamError};

/// Close code reported when the stream ends without a close frame
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// Receives the events of one connection
///
/// Callbacks run on the connection's own task. `on_closed` and `on_failed`
/// are terminal: nothing else is delivered after either of them.
pub trait ConnectionListener: Send + Sync {
    fn on_opened(&self);
    fn on_message(&self, text: &str);
    fn on_closed(&self, code: u16, reason: &str);
    fn on_failed(&self, error: &StreamError);
}

/// Outbound half of an open (or opening) connection
pub trait Transport: Send + Sync {
    /// Queue a frame for sending
    ///
    /// Frames queued while the connection is still being established are
    /// sent once it opens.
    fn send(&self, frame: Frame) -> Result<()>;

    /// Close the connection; queued frames not yet written are dropped
    fn close(&self, reason: &str);
}

/// Opens connections to devices
///
/// `open` must return before the listener receives any callback.
pub trait Connector: Send + Sync {
    fn open(&self, host: &str, listener: Arc<dyn ConnectionListener>) -> Result<Box<dyn Transport>>;
}

#[derive(Debug)]
enum Outbound {
    Frame(Frame),
    Close(String),
}

/// Runtime the connection tasks are spawned on
enum RuntimeHandle {
    Ambient(Handle),
    Owned(Runtime),
}

impl RuntimeHandle {
    fn handle(&self) -> &Handle {
        match self {
            RuntimeHandle::Ambient(handle) => handle,
            RuntimeHandle::Owned(runtime) => runtime.handle(),
        }
    }
}

/// [`Connector`] speaking the SoundTouch websocket protocol
pub struct WebSocketConnector {
    config: ConnectionConfig,
    runtime: Option<RuntimeHandle>,
}

impl WebSocketConnector {
    /// Create a connector on the current tokio runtime, or on a dedicated
    /// background runtime when called outside of one
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        let runtime = match Handle::try_current() {
            Ok(handle) => RuntimeHandle::Ambient(handle),
            Err(_) => {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(1)
                    .thread_name("soundtouch-connection")
                    .enable_all()
                    .build()
                    .map_err(|e| StreamError::Connection(format!("failed to start runtime: {}", e)))?;
                RuntimeHandle::Owned(runtime)
            }
        };
        Ok(Self {
            config,
            runtime: Some(runtime),
        })
    }

    /// Create a connector spawning its tasks on the given runtime
    pub fn with_handle(config: ConnectionConfig, handle: Handle) -> Self {
        Self {
            config,
            runtime: Some(RuntimeHandle::Ambient(handle)),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }
}

impl Drop for WebSocketConnector {
    fn drop(&mut self) {
        if let Some(RuntimeHandle::Owned(runtime)) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl Connector for WebSocketConnector {
    fn open(&self, host: &str, listener: Arc<dyn ConnectionListener>) -> Result<Box<dyn Transport>> {
        let Some(runtime) = self.runtime.as_ref() else {
            return Err(StreamError::Connection("connector is shut down".to_string()));
        };

        let url = self.config.url_for(host);
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| StreamError::InvalidUrl(format!("{}: {}", url, e)))?;
        let protocol = HeaderValue::from_str(&self.config.protocol)
            .map_err(|e| StreamError::Connection(format!("invalid protocol header: {}", e)))?;
        request
            .headers_mut()
            .insert("Sec-WebSocket-Protocol", protocol);

        let (tx, rx) = mpsc::unbounded_channel();
        let config = self.config.clone();
        debug!(%url, "Opening websocket");
        runtime
            .handle()
            .spawn(run_connection(request, config, listener, rx));

        Ok(Box::new(WebSocketTransport {
            host: host.to_string(),
            tx,
        }))
    }
}

/// Outbound handle of a websocket connection
pub struct WebSocketTransport {
    host: String,
    tx: mpsc::UnboundedSender<Outbound>,
}

impl Transport for WebSocketTransport {
    fn send(&self, frame: Frame) -> Result<()> {
        debug!(host = %self.host, frame = frame.as_str(), "Sending frame");
        self.tx
            .send(Outbound::Frame(frame))
            .map_err(|_| StreamError::ChannelClosed)
    }

    fn close(&self, reason: &str) {
        debug!(host = %self.host, reason, "Closing websocket");
        let _ = self.tx.send(Outbound::Close(reason.to_string()));
    }
}

type ClientRequest = tokio_tungstenite::tungstenite::handshake::client::Request;

async fn run_connection(
    request: ClientRequest,
    config: ConnectionConfig,
    listener: Arc<dyn ConnectionListener>,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
) {
    let uri = request.uri().to_string();
    let socket = match tokio::time::timeout(config.connect_timeout, connect_async(request)).await {
        Ok(Ok((socket, _response))) => socket,
        Ok(Err(e)) => {
            error!(%uri, error = %e, "Websocket connection failed");
            listener.on_failed(&e.into());
            return;
        }
        Err(_) => {
            error!(%uri, "Websocket connection timed out");
            listener.on_failed(&StreamError::Timeout(config.connect_timeout));
            return;
        }
    };

    info!(%uri, "Websocket opened");
    listener.on_opened();

    let (mut sink, mut stream) = socket.split();
    let idle = tokio::time::sleep(config.read_timeout);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            command = outbound.recv() => match command {
                Some(Outbound::Frame(frame)) => {
                    if let Err(e) = sink.send(Message::Text(frame.into_text())).await {
                        error!(%uri, error = %e, "Failed to send frame");
                        let _ = sink.close().await;
                        listener.on_failed(&e.into());
                        break;
                    }
                }
                Some(Outbound::Close(reason)) => {
                    let frame = CloseFrame {
                        code: CloseCode::Error,
                        reason: reason.into(),
                    };
                    let _ = sink.send(Message::Close(Some(frame))).await;
                    let _ = sink.close().await;
                    break;
                }
                None => {
                    let _ = sink.close().await;
                    break;
                }
            },
            inbound = stream.next() => {
                idle.as_mut().reset(Instant::now() + config.read_timeout);
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        debug!(%uri, message = %text, "Received message");
                        listener.on_message(&text);
                    }
                    Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                        Ok(text) => listener.on_message(&text),
                        Err(_) => warn!(%uri, "Dropping non-UTF-8 binary message"),
                    },
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = frame
                            .map(|f| (u16::from(f.code), f.reason.into_owned()))
                            .unwrap_or((ABNORMAL_CLOSURE, String::new()));
                        info!(%uri, code, %reason, "Websocket closed by device");
                        listener.on_closed(code, &reason);
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!(%uri, error = %e, "Websocket error");
                        listener.on_failed(&e.into());
                        break;
                    }
                    None => {
                        info!(%uri, "Websocket stream ended");
                        listener.on_closed(ABNORMAL_CLOSURE, "stream ended");
                        break;
                    }
                }
            }
            _ = &mut idle => {
                warn!(%uri, timeout = ?config.read_timeout, "No message received, giving up");
                let _ = sink.close().await;
                listener.on_failed(&StreamError::Timeout(config.read_timeout));
                break;
            }
        }
    }
}
