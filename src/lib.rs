// slotmq - in-memory multi-channel FIFO message queue over HTTP
//
// This library provides the queue core and the HTTP front end.
// Binary entry point is in src/main.rs

pub mod config;
pub mod error;
pub mod http;
pub mod queue;

pub use config::Config;
pub use error::{ConfigError, QueueError, Result};
pub use http::{HttpServer, MsgHandler, MsgResponse};
pub use queue::{Channel, ChannelStats, QueueManager, RingBuffer};
