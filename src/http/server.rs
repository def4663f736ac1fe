//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the handler chain from configuration
//! - Wire up middleware (tracing, request ID)
//! - Register the shutdown coordinator before accepting connections
//! - Run the accept loop, serving HTTP/1.1 and HTTP/2 per connection
//! - Drain connections within the grace period on termination

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, extract::State, http::Request, response::Response, Router};
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto,
    service::TowerToHyperService,
};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{validate_config, ServerConfig};
use crate::error::HostError;
use crate::http::assets::StaticAssetHandler;
use crate::http::dispatcher::ApiDispatcher;
use crate::http::handler::HandlerRef;
use crate::http::request::MakeRequestUuid;
use crate::lifecycle::{LifecycleManager, ShutdownCoordinator, ShutdownState};
use crate::net::{ConnectionGuard, ConnectionPermit, ConnectionTracker, Listener};
use crate::routing::{build_handler_chain, HandlerChain};

/// Embedded HTTP front door for a service.
pub struct WebHost {
    config: ServerConfig,
    resources: Router,
    lifecycle: Arc<LifecycleManager>,
}

impl WebHost {
    /// `resources` answers every API route; `lifecycle` tells the host when
    /// to drain.
    pub fn new(config: ServerConfig, resources: Router, lifecycle: Arc<LifecycleManager>) -> Self {
        Self {
            config,
            resources,
            lifecycle,
        }
    }

    /// Never serve web assets, whatever the deployment flag says.
    pub fn disallow_web_hosting(mut self) -> Self {
        self.config.allowed_web_hosting = false;
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The dispatch chain this host will serve with.
    pub fn handler_chain(&self) -> HandlerChain {
        let api: HandlerRef = Arc::new(ApiDispatcher::new(
            self.resources.clone(),
            self.lifecycle.clone(),
        ));

        let assets = if self.config.web_hosting_active() {
            let handler: HandlerRef = Arc::new(StaticAssetHandler::new(
                &self.config.asset_dir,
                &self.config.offset_path,
            ));
            Some(handler)
        } else {
            None
        };

        build_handler_chain(
            &self.config.context_path(),
            &self.config.api_prefixes,
            api,
            assets,
        )
    }

    fn build_router(chain: HandlerChain) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(Arc::new(chain))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Bind the configured port and start serving.
    pub async fn start(self) -> Result<RunningHost, HostError> {
        let port = self.config.port;
        self.start_on(port).await
    }

    /// Bind `port` instead of the configured one and start serving.
    pub async fn start_on(self, port: u16) -> Result<RunningHost, HostError> {
        validate_config(&self.config)?;
        let listener = Listener::bind(port, self.config.max_connections).await?;
        self.serve(listener)
    }

    /// Start serving on an already bound listener.
    pub async fn start_with_listener(self, listener: TcpListener) -> Result<RunningHost, HostError> {
        validate_config(&self.config)?;
        let listener = Listener::from_tcp(listener, self.config.max_connections);
        self.serve(listener)
    }

    fn serve(self, listener: Listener) -> Result<RunningHost, HostError> {
        let local_addr = listener.local_addr()?;
        let app = Self::build_router(self.handler_chain());

        let coordinator = ShutdownCoordinator::register(
            &self.lifecycle,
            Duration::from_secs(self.config.grace_period_secs),
        );
        let tracker = ConnectionTracker::new();

        let task = tokio::spawn(accept_loop(
            listener,
            app,
            coordinator.clone(),
            tracker.clone(),
        ));

        let base_url = self.config.base_url(local_addr.port());
        tracing::info!("server started on {} with http/2 enabled", base_url);

        Ok(RunningHost {
            local_addr,
            base_url,
            coordinator,
            tracker,
            task,
        })
    }
}

/// Handle to a started host.
pub struct RunningHost {
    local_addr: SocketAddr,
    base_url: String,
    coordinator: ShutdownCoordinator,
    tracker: ConnectionTracker,
    task: JoinHandle<ShutdownState>,
}

impl RunningHost {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn shutdown_state(&self) -> ShutdownState {
        self.coordinator.state()
    }

    pub fn active_connections(&self) -> u64 {
        self.tracker.active_count()
    }

    /// Shutdown state updates, for components that must act on the drain
    /// outcome.
    pub fn subscribe_shutdown(&self) -> watch::Receiver<ShutdownState> {
        self.coordinator.subscribe()
    }

    /// Wait for the server to finish draining.
    pub async fn stopped(self) -> ShutdownState {
        match self.task.await {
            Ok(state) => state,
            Err(e) => {
                tracing::error!(error = %e, "Server task failed");
                ShutdownState::DrainFailed
            }
        }
    }
}

async fn dispatch(State(chain): State<Arc<HandlerChain>>, request: Request<Body>) -> Response {
    chain.dispatch(request).await
}

async fn accept_loop(
    listener: Listener,
    app: Router,
    coordinator: ShutdownCoordinator,
    tracker: ConnectionTracker,
) -> ShutdownState {
    let builder = auto::Builder::new(TokioExecutor::new());
    let mut connections = JoinSet::new();

    let drain_requested = coordinator.drain_requested();
    tokio::pin!(drain_requested);

    loop {
        tokio::select! {
            biased;

            _ = &mut drain_requested => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer_addr, permit)) => {
                    let guard = tracker.track();
                    connections.spawn(serve_connection(
                        builder.clone(),
                        stream,
                        app.clone(),
                        coordinator.drain_requested(),
                        peer_addr,
                        permit,
                        guard,
                    ));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Accept failed");
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
            },
            Some(joined) = connections.join_next(), if !connections.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!(error = %e, "Connection task failed");
                }
            }
        }
    }

    // No new connections from here on.
    drop(listener);
    tracing::info!(
        active_connections = tracker.active_count(),
        grace_period_secs = coordinator.grace_period().as_secs(),
        "Listener closed, draining connections"
    );

    let outcome = coordinator.drain(wait_for_connections(&mut connections)).await;

    if !connections.is_empty() {
        tracing::warn!(remaining = connections.len(), "Closing connections left after grace period");
        connections.shutdown().await;
    }

    tracing::info!("HTTP server stopped");
    outcome
}

/// Wait for every connection, reporting the first task failure only once
/// the others have finished.
async fn wait_for_connections(connections: &mut JoinSet<()>) -> Result<(), JoinError> {
    let mut first_failure = None;
    while let Some(joined) = connections.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "Connection task failed while draining");
            if first_failure.is_none() {
                first_failure = Some(e);
            }
        }
    }

    match first_failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

async fn serve_connection(
    builder: auto::Builder<TokioExecutor>,
    stream: TcpStream,
    app: Router,
    drain: impl Future<Output = ()>,
    peer_addr: SocketAddr,
    _permit: ConnectionPermit,
    guard: ConnectionGuard,
) {
    let service = TowerToHyperService::new(app);
    let conn = builder.serve_connection_with_upgrades(TokioIo::new(stream), service);
    tokio::pin!(conn);
    tokio::pin!(drain);

    let mut draining = false;
    loop {
        tokio::select! {
            result = conn.as_mut() => {
                if let Err(e) = result {
                    tracing::debug!(
                        connection_id = %guard.id(),
                        peer_addr = %peer_addr,
                        error = %e,
                        "Connection closed with error"
                    );
                }
                break;
            }
            _ = &mut drain, if !draining => {
                draining = true;
                conn.as_mut().graceful_shutdown();
            }
        }
    }
}
