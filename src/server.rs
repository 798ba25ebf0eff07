//! The event loop.
//!
//! [`TelemetryServer`] owns the router and the listening address. Starting
//! it spawns one dedicated `webserver` thread running a current-thread
//! tokio runtime, so every accept, dispatch and write for every connection
//! is serialised on that one thread. A slow provider call, such as a
//! magnetometer calibration, holds up all other connections until it
//! returns.
//!
//! A failed bind is reported through the [`ServerHandle`] but does not stop
//! the loop: it keeps ticking at the poll interval, serving nothing, until
//! it is shut down.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::api::build_router;
use crate::app_state::AppState;
use crate::config::ServerConfig;
use crate::domain::TelemetryProvider;
use crate::error::ServerError;
use crate::service::{DispatchOptions, Dispatcher};

/// HTTP / WebSocket telemetry server, constructed once at startup.
#[derive(Debug)]
pub struct TelemetryServer {
    config: ServerConfig,
    state: AppState,
}

impl TelemetryServer {
    /// Builds the server around `provider`.
    #[must_use]
    pub fn new(config: ServerConfig, provider: Arc<dyn TelemetryProvider>) -> Self {
        let options = DispatchOptions {
            key_style: config.key_style,
            unknown_topic_reply: config.unknown_topic_reply,
        };
        let dispatcher = Arc::new(Dispatcher::new(provider, options));
        Self {
            config,
            state: AppState { dispatcher },
        }
    }

    /// Returns the router the event loop serves.
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), self.config.cors_permissive)
    }

    /// Starts the event loop on its own thread and waits until the bind
    /// attempt has completed.
    ///
    /// A bind failure is not an error here; check
    /// [`ServerHandle::bind_error`].
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Runtime`] or [`ServerError::Thread`] if the
    /// runtime or thread cannot be created, and
    /// [`ServerError::ThreadPanicked`] if the loop dies before binding.
    pub fn spawn(self) -> Result<ServerHandle, ServerError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ServerError::Runtime)?;

        let router = self.router();
        let listen_addr = self.config.listen_addr;
        let poll_interval = self.config.poll_interval;
        let (ready_tx, ready_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tracing::info!(addr = %listen_addr, "starting webserver");
        let thread = std::thread::Builder::new()
            .name("webserver".to_string())
            .spawn(move || {
                runtime.block_on(event_loop(
                    listen_addr,
                    router,
                    poll_interval,
                    ready_tx,
                    shutdown_rx,
                ))
            })
            .map_err(ServerError::Thread)?;

        let bound = ready_rx.recv().map_err(|_| ServerError::ThreadPanicked)?;

        Ok(ServerHandle {
            bound,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    /// Starts the event loop and blocks the calling thread on it forever.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop cannot be started or exits abnormally.
    pub fn run(self) -> Result<(), ServerError> {
        self.spawn()?.wait()
    }
}

/// Control handle for a running event loop.
///
/// Dropping the handle shuts the loop down.
#[derive(Debug)]
pub struct ServerHandle {
    bound: Result<SocketAddr, ServerError>,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<Result<(), ServerError>>>,
}

impl ServerHandle {
    /// Address actually bound, if the bind succeeded.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.bound.as_ref().ok().copied()
    }

    /// The bind failure, if the loop is running without a listener.
    #[must_use]
    pub fn bind_error(&self) -> Option<&ServerError> {
        self.bound.as_ref().err()
    }

    /// Returns `true` if the loop holds a listener.
    #[must_use]
    pub fn is_serving(&self) -> bool {
        self.bound.is_ok()
    }

    /// Returns `true` while the event-loop thread is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    /// Signals the loop to stop and waits for the thread to exit.
    ///
    /// Open connections are allowed to finish first.
    ///
    /// # Errors
    ///
    /// Returns the loop's own error, or [`ServerError::ThreadPanicked`].
    pub fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.join()
    }

    /// Blocks until the loop exits, which without a shutdown is never.
    ///
    /// # Errors
    ///
    /// Returns the loop's own error, or [`ServerError::ThreadPanicked`].
    pub fn wait(mut self) -> Result<(), ServerError> {
        self.join()
    }

    fn join(&mut self) -> Result<(), ServerError> {
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| ServerError::ThreadPanicked)?,
            None => Ok(()),
        }
    }
}

async fn event_loop(
    addr: SocketAddr,
    router: Router,
    poll_interval: Duration,
    ready: mpsc::Sender<Result<SocketAddr, ServerError>>,
    shutdown: oneshot::Receiver<()>,
) -> Result<(), ServerError> {
    let listener = match bind(addr).await {
        Ok((listener, local)) => {
            let _ = ready.send(Ok(local));
            tracing::info!(addr = %local, "entering main loop");
            listener
        }
        Err(err) => {
            tracing::error!(%err, "bind failed; event loop running without a listener");
            let _ = ready.send(Err(err));
            idle(poll_interval, shutdown).await;
            return Ok(());
        }
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.await;
        })
        .await
        .map_err(ServerError::Serve)?;

    tracing::info!("webserver stopped");
    Ok(())
}

async fn bind(addr: SocketAddr) -> Result<(TcpListener, SocketAddr), ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let local = listener
        .local_addr()
        .map_err(|source| ServerError::Bind { addr, source })?;
    Ok((listener, local))
}

/// Degraded mode: keep polling with nothing to serve.
async fn idle(poll_interval: Duration, mut shutdown: oneshot::Receiver<()>) {
    let mut ticker = tokio::time::interval(poll_interval.max(Duration::from_millis(1)));
    loop {
        tokio::select! {
            _ = ticker.tick() => tracing::trace!("poll"),
            _ = &mut shutdown => break,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::sensor::FixedImu;

    fn loopback_config(addr: SocketAddr) -> ServerConfig {
        ServerConfig {
            listen_addr: addr,
            poll_interval: Duration::from_millis(10),
            ..ServerConfig::default()
        }
    }

    fn server(addr: SocketAddr) -> TelemetryServer {
        TelemetryServer::new(loopback_config(addr), Arc::new(FixedImu::sample()))
    }

    #[test]
    fn binds_ephemeral_port_and_shuts_down() {
        let Ok(handle) = server(SocketAddr::from(([127, 0, 0, 1], 0))).spawn() else {
            panic!("server failed to start");
        };
        assert!(handle.is_serving());
        assert!(handle.is_running());
        let Some(addr) = handle.local_addr() else {
            panic!("expected a bound address");
        };
        assert_ne!(addr.port(), 0);
        assert!(handle.shutdown().is_ok());
    }

    #[test]
    fn bind_failure_leaves_loop_polling() {
        let Ok(occupied) = std::net::TcpListener::bind("127.0.0.1:0") else {
            panic!("could not reserve a port");
        };
        let Ok(addr) = occupied.local_addr() else {
            panic!("no local addr");
        };

        let Ok(handle) = server(addr).spawn() else {
            panic!("spawn must survive a bind failure");
        };
        assert!(!handle.is_serving());
        assert!(handle.local_addr().is_none());
        assert!(matches!(handle.bind_error(), Some(ServerError::Bind { .. })));

        std::thread::sleep(Duration::from_millis(50));
        assert!(handle.is_running());
        assert!(handle.shutdown().is_ok());
        drop(occupied);
    }

    #[test]
    fn router_is_built_from_config() {
        let server = server(SocketAddr::from(([127, 0, 0, 1], 0)));
        let _router = server.router();
        assert_eq!(server.config.poll_interval, Duration::from_millis(10));
    }
}
