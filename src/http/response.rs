use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Response, StatusCode};

pub const TEXT_PLAIN: &str = "text/plain";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Transport-neutral response: status, content type, body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsgResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Bytes,
}

impl MsgResponse {
    pub fn text(status: StatusCode, body: &'static str) -> Self {
        Self {
            status,
            content_type: TEXT_PLAIN,
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    /// A dequeued message, returned verbatim.
    pub fn message(body: Bytes) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: OCTET_STREAM,
            body,
        }
    }

    pub fn ok() -> Self {
        Self::text(StatusCode::OK, "ok")
    }

    pub fn not_found() -> Self {
        Self::text(StatusCode::NOT_FOUND, "not found")
    }

    pub fn into_http(self) -> Response<Full<Bytes>> {
        let content_length = self.body.len();
        let mut response = Response::new(Full::new(self.body));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(self.content_type));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(content_length));
        response
    }
}
