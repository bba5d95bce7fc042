pub mod error;
pub mod routes;
pub mod space;
pub mod telemetry;

use core::convert::Infallible;
use core::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::pin_mut;
use http::{Method, Request, Response};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use space_content_target::TargetApi;
use tokio::net::TcpListener;
use tokio::select;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::routes::space::space_content;
use crate::routes::{health, not_found};

/// Routes one request. Every outcome is a json response.
pub async fn handle<T: TargetApi, B>(target: &T, request: Request<B>) -> Response<Full<Bytes>> {
    if request.method() != Method::GET {
        return not_found();
    }

    let path = request.uri().path();
    if path == "/health" {
        return health();
    }
    match path.strip_prefix("/space/") {
        Some(space) => {
            let space = space.strip_suffix('/').unwrap_or(space);
            if space.is_empty() || space.contains('/') {
                return not_found();
            }
            let space = space.to_owned();
            space_content(target, &space).await
        }
        None => not_found(),
    }
}

/// Serves connections from `listener` until `shutdown` completes, then waits for the open
/// connections to finish their in flight requests.
pub async fn run_server<T: TargetApi + 'static>(
    listener: TcpListener,
    target: Arc<T>,
    shutdown: impl Future<Output = ()>,
) -> Result<(), AppError> {
    pin_mut!(shutdown);

    // tell the connections to shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let shutdown_tx = Arc::new(shutdown_tx);

    // wait for the connections to finish shutdown
    let (closed_tx, closed_rx) = watch::channel(());

    info!("listening on {}", listener.local_addr()?);

    #[allow(clippy::redundant_pub_crate)]
    loop {
        select! {
            accept = listener.accept() => {
                let (socket, remote_addr) = match accept {
                    Ok(accept) => accept,
                    Err(err) => {
                        warn!("failed to accept connection: {err}");
                        continue;
                    }
                };
                debug!("accepted connection from {remote_addr}");

                let target = Arc::clone(&target);
                let shutdown_tx = Arc::clone(&shutdown_tx);
                let closed_rx = closed_rx.clone();

                tokio::spawn(async move {
                    let hyper_service = service_fn(move |request: Request<Incoming>| {
                        let target = Arc::clone(&target);
                        async move { Ok::<_, Infallible>(handle(target.as_ref(), request).await) }
                    });

                    let builder = auto::Builder::new(TokioExecutor::new());
                    let connection = builder.serve_connection(TokioIo::new(socket), hyper_service);
                    pin_mut!(connection);

                    let result = select! {
                        result = connection.as_mut() => result,
                        () = shutdown_tx.closed() => {
                            connection.as_mut().graceful_shutdown();
                            connection.as_mut().await
                        }
                    };
                    if let Err(err) = result {
                        error!("failed to serve connection from {remote_addr}: {err:#}");
                    }

                    drop(closed_rx);
                });
            }
            () = &mut shutdown => {
                info!("shutting down");
                drop(shutdown_rx); // initiate shutdown
                drop(closed_rx);
                closed_tx.closed().await;
                break;
            }
        }
    }

    info!("all connections closed");
    Ok(())
}

/// Completes on Ctrl+C or SIGTERM.
#[allow(clippy::redundant_pub_crate)]
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = core::future::pending::<()>();

    select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
