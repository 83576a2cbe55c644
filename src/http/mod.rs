// HTTP front end: protocol handler and hyper transport

pub mod handler;
pub mod response;
pub mod server;

pub use handler::{MsgHandler, AUTH_HEADER, CHANNEL_HEADER, MSG_PATH};
pub use response::MsgResponse;
pub use server::{serve, HttpServer};
