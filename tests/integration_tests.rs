use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1::SendRequest;
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use slotmq::http::serve;
use slotmq::{MsgHandler, QueueManager};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct TestServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

async fn start_server(slot_size: usize, capacity: usize, auth_key: Option<&str>) -> TestServer {
    let manager = Arc::new(QueueManager::new(slot_size, capacity).unwrap());
    let handler = Arc::new(MsgHandler::new(manager, auth_key.map(str::to_string)));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown, rx) = oneshot::channel::<()>();

    let task = tokio::spawn(serve(listener, handler, async {
        let _ = rx.await;
    }));

    TestServer {
        addr,
        shutdown,
        task,
    }
}

async fn connect(addr: SocketAddr) -> SendRequest<Full<Bytes>> {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .unwrap();
    tokio::spawn(async move {
        let _ = conn.await;
    });
    sender
}

fn request(
    method: Method,
    channel: &str,
    auth: Option<&str>,
    body: &'static [u8],
) -> Request<Full<Bytes>> {
    let mut builder = Request::builder()
        .method(method)
        .uri("/msg")
        .header("host", "localhost")
        .header("x-channel", channel);
    if let Some(auth) = auth {
        builder = builder.header("x-auth", auth);
    }
    builder.body(Full::new(Bytes::from_static(body))).unwrap()
}

async fn send(
    sender: &mut SendRequest<Full<Bytes>>,
    req: Request<Full<Bytes>>,
) -> (StatusCode, String, Bytes) {
    let response = sender.send_request(req).await.unwrap();
    let status = response.status();
    let content_type = response.headers()[CONTENT_TYPE].to_str().unwrap().to_string();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, content_type, body)
}

#[tokio::test]
async fn test_end_to_end_round_trip() {
    let server = start_server(64, 10, None).await;
    let mut client = connect(server.addr).await;

    let (status, _, body) = send(&mut client, request(Method::GET, "ch1", None, b"")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(&body[..], b"no message");

    let (status, content_type, body) =
        send(&mut client, request(Method::POST, "ch1", None, b"Hello1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "text/plain");
    assert_eq!(&body[..], b"ok");

    let (status, content_type, body) =
        send(&mut client, request(Method::GET, "ch1", None, b"")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/octet-stream");
    assert_eq!(&body[..], b"Hello1");

    let (status, _, _) = send(&mut client, request(Method::GET, "ch1", None, b"")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_end_to_end_auth() {
    let server = start_server(64, 10, Some("auth123")).await;
    let mut client = connect(server.addr).await;

    let (status, _, body) = send(
        &mut client,
        request(Method::POST, "ch1", Some("auth123"), b"Hello1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"ok");

    let (status, _, body) = send(
        &mut client,
        request(Method::POST, "ch1", Some("wrong"), b"Hello1"),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(&body[..], b"invalid auth");

    let (status, _, body) = send(&mut client, request(Method::POST, "ch1", None, b"Hello1")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(&body[..], b"invalid auth");
}

#[tokio::test]
async fn test_end_to_end_wrong_path() {
    let server = start_server(64, 10, None).await;
    let mut client = connect(server.addr).await;

    let req = Request::builder()
        .uri("/")
        .header("host", "localhost")
        .body(Full::new(Bytes::new()))
        .unwrap();
    let (status, _, body) = send(&mut client, req).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(&body[..], b"not found");
}

#[tokio::test]
async fn test_end_to_end_limits() {
    let server = start_server(4, 1, None).await;
    let mut client = connect(server.addr).await;

    let (status, _, body) = send(&mut client, request(Method::POST, "ch1", None, b"12345")).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(&body[..], b"message too large");

    // the rejected body may leave that connection unusable
    let mut client = connect(server.addr).await;
    let (status, _, _) = send(&mut client, request(Method::POST, "ch1", None, b"1234")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = send(&mut client, request(Method::POST, "ch1", None, b"5678")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(&body[..], b"queue at capacity");
}

#[tokio::test]
async fn test_connections_share_channels() {
    let server = start_server(64, 100, None).await;
    let mut producer = connect(server.addr).await;
    let mut consumer = connect(server.addr).await;

    let bodies: [&'static [u8]; 3] = [b"first", b"second", b"third"];

    for body in bodies {
        let (status, _, _) = send(&mut producer, request(Method::POST, "jobs", None, body)).await;
        assert_eq!(status, StatusCode::OK);
    }

    for expected in bodies {
        let (status, _, body) = send(&mut consumer, request(Method::GET, "jobs", None, b"")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], expected);
    }
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let server = start_server(64, 10, None).await;

    server.shutdown.send(()).unwrap();
    server.task.await.unwrap();

    assert!(TcpStream::connect(server.addr).await.is_err());
}
