use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::CONTENT_LENGTH;
use hyper::{HeaderMap, Method, Request, StatusCode};

use super::response::MsgResponse;
use crate::error::QueueError;
use crate::QueueManager;

/// The only routed resource.
pub const MSG_PATH: &str = "/msg";
pub const CHANNEL_HEADER: &str = "x-channel";
pub const AUTH_HEADER: &str = "x-auth";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Get,
    Add,
}

/// Validates requests against the `/msg` protocol and dispatches them to
/// the queue manager.
///
/// Checks run in a fixed order and the first failure decides the response:
/// route, method, auth, channel header, then the action itself.
pub struct MsgHandler {
    queue_manager: Arc<QueueManager>,
    auth_key: Option<String>,
}

impl MsgHandler {
    /// An empty `auth_key` is treated as no key.
    pub fn new(queue_manager: Arc<QueueManager>, auth_key: Option<String>) -> Self {
        Self {
            queue_manager,
            auth_key: auth_key.filter(|key| !key.is_empty()),
        }
    }

    pub async fn handle<B>(&self, req: Request<B>) -> MsgResponse
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();

        if parts.uri.path() != MSG_PATH {
            return MsgResponse::not_found();
        }

        let action = match parts.method {
            Method::GET => Action::Get,
            Method::POST => Action::Add,
            _ => return MsgResponse::not_found(),
        };

        if let Some(key) = &self.auth_key {
            if !is_authorized(&parts.headers, key) {
                return MsgResponse::text(StatusCode::FORBIDDEN, "invalid auth");
            }
        }

        let Some(channel) = channel_name(&parts.headers) else {
            return MsgResponse::text(StatusCode::BAD_REQUEST, "channel name required");
        };

        match action {
            Action::Get => self.get(channel),
            Action::Add => {
                let limit = self.queue_manager.slot_size();
                match read_message(&parts.headers, body, limit).await {
                    Ok(content) => self.add(channel, &content),
                    Err(response) => response,
                }
            }
        }
    }

    fn get(&self, channel: &str) -> MsgResponse {
        match self.queue_manager.remove(channel) {
            Some(message) => MsgResponse::message(message),
            None => MsgResponse::text(StatusCode::NOT_FOUND, "no message"),
        }
    }

    fn add(&self, channel: &str, content: &[u8]) -> MsgResponse {
        match self.queue_manager.add(channel, content) {
            Ok(()) => MsgResponse::ok(),
            Err(QueueError::CapacityExceeded { .. }) => {
                MsgResponse::text(StatusCode::SERVICE_UNAVAILABLE, "queue at capacity")
            }
            Err(QueueError::PayloadTooLarge { .. }) => message_too_large(),
            // geometry is validated when the manager is built
            Err(QueueError::SlotSizeExceeded { .. } | QueueError::StorageTooLarge { .. }) => {
                MsgResponse::text(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

/// Missing and wrong keys get the same answer.
fn is_authorized(headers: &HeaderMap, key: &str) -> bool {
    headers
        .get(AUTH_HEADER)
        .is_some_and(|value| value.as_bytes() == key.as_bytes())
}

fn channel_name(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(CHANNEL_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|name| !name.is_empty())
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

fn message_too_large() -> MsgResponse {
    MsgResponse::text(StatusCode::PAYLOAD_TOO_LARGE, "message too large")
}

// Read the whole body, capped at one slot, and check it against the
// declared content length.
async fn read_message<B>(
    headers: &HeaderMap,
    body: B,
    limit: usize,
) -> Result<Bytes, MsgResponse>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let content = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            return Err(message_too_large());
        }
        Err(_) => {
            return Err(MsgResponse::text(
                StatusCode::BAD_REQUEST,
                "unable to read message",
            ));
        }
    };

    if content.is_empty() {
        return Err(MsgResponse::text(StatusCode::BAD_REQUEST, "message required"));
    }
    if declared_length(headers) != Some(content.len()) {
        return Err(MsgResponse::text(
            StatusCode::BAD_REQUEST,
            "content length mismatch",
        ));
    }
    Ok(content)
}
