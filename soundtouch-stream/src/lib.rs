//! # soundtouch-stream
//!
//! Push connection and response parsing for SoundTouch devices.
//!
//! A device keeps one websocket open and reports every state change over it
//! as a small XML document. This crate owns both halves of that channel:
//! [`connection`] opens the socket and delivers raw messages to a
//! [`ConnectionListener`], and [`parser`] turns each message into a list of
//! [`ModelUpdate`] values for the state layer to apply.

pub mod config;
pub mod connection;
pub mod error;
pub mod parser;

pub use config::ConnectionConfig;
pub use connection::{ConnectionListener, Connector, Transport, WebSocketConnector};
pub use error::{Result, StreamError};
pub use parser::{parse_message, ModelUpdate, NowPlayingField, ParserState};
