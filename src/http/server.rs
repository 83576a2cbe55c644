use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};

use super::handler::MsgHandler;

/// HTTP/1.1 front end for a [`MsgHandler`].
pub struct HttpServer {
    listen_addr: String,
    handler: Arc<MsgHandler>,
}

impl HttpServer {
    pub fn new(listen_addr: impl Into<String>, handler: Arc<MsgHandler>) -> Self {
        Self {
            listen_addr: listen_addr.into(),
            handler,
        }
    }

    /// Bind the configured address and serve until Ctrl-C.
    pub async fn run(self) -> std::io::Result<()> {
        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("slotmq listening on http://{}", listener.local_addr()?);

        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("unable to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        };
        serve(listener, self.handler, shutdown).await;
        Ok(())
    }
}

/// Accept connections on `listener` until `shutdown` resolves.
///
/// Connections already accepted keep running on their own tasks.
pub async fn serve<F>(listener: TcpListener, handler: Arc<MsgHandler>, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("shutting down listener");
                return;
            }
            accepted = listener.accept() => {
                let (socket, peer_addr) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::error!("accept error: {}", e);
                        continue;
                    }
                };
                tracing::debug!("new connection from {}", peer_addr);

                let handler = handler.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(socket, handler).await {
                        tracing::error!("connection error from {}: {}", peer_addr, e);
                    }
                });
            }
        }
    }
}

async fn handle_connection(
    socket: TcpStream,
    handler: Arc<MsgHandler>,
) -> Result<(), hyper::Error> {
    let service = service_fn(move |req: Request<Incoming>| {
        let handler = handler.clone();
        async move {
            let method = req.method().clone();
            let path = req.uri().path().to_string();
            let response = handler.handle(req).await;
            tracing::debug!("{} {} -> {}", method, path, response.status.as_u16());
            Ok::<_, Infallible>(response.into_http())
        }
    });

    http1::Builder::new()
        .serve_connection(TokioIo::new(socket), service)
        .await
}
