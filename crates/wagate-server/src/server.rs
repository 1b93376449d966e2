//! `GatewayServer` — axum HTTP + WebSocket server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{State, WebSocketUpgrade};
use axum::response::{Html, Json, Response};
use axum::routing::{get, post};
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use wagate_client::MessagingClient;
use wagate_core::SharedSession;

use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::http;
use crate::shutdown::ShutdownCoordinator;
use crate::ws::bridge::LifecycleBridge;
use crate::ws::registry::SubscriberRegistry;
use crate::ws::session::run_ws_session;

/// Embedded landing page.
const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared state accessible from axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// External messaging client.
    pub client: Arc<dyn MessagingClient>,
    /// The process-wide session state.
    pub session: Arc<SharedSession>,
    /// Connected status subscribers.
    pub subscribers: Arc<SubscriberRegistry>,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// When the server started.
    pub start_time: Instant,
}

/// The gateway server.
pub struct GatewayServer {
    config: Arc<ServerConfig>,
    client: Arc<dyn MessagingClient>,
    session: Arc<SharedSession>,
    subscribers: Arc<SubscriberRegistry>,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
}

impl GatewayServer {
    /// Create a new server over a messaging client.
    pub fn new(config: ServerConfig, client: Arc<dyn MessagingClient>) -> Self {
        Self {
            config: Arc::new(config),
            client,
            session: Arc::new(SharedSession::new()),
            subscribers: Arc::new(SubscriberRegistry::new()),
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
        }
    }

    fn state(&self) -> AppState {
        AppState {
            config: self.config.clone(),
            client: self.client.clone(),
            session: self.session.clone(),
            subscribers: self.subscribers.clone(),
            shutdown: self.shutdown.clone(),
            start_time: self.start_time,
        }
    }

    /// Build the axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(landing_handler))
            .route("/send-message", post(http::send::send_message))
            .route("/info", post(http::info::client_info))
            .route("/health", get(health_handler))
            .route("/ws", get(ws_handler))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state())
    }

    /// Spawn the lifecycle bridge over the client's event channel.
    ///
    /// Subscribes once, for the process lifetime. The task exits when the
    /// client's event sender closes or the shutdown token cancels.
    pub fn spawn_bridge(&self) -> JoinHandle<()> {
        let bridge = LifecycleBridge::new(
            self.client.subscribe(),
            self.session.clone(),
            self.subscribers.clone(),
            self.config.ready_asset.clone(),
        );
        let token = self.shutdown.token();
        tokio::spawn(async move {
            tokio::select! {
                () = bridge.run() => {}
                () = token.cancelled() => {}
            }
        })
    }

    /// Bind and serve. Returns the bound address and the serve task; the
    /// task drains on shutdown-token cancellation.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener =
            tokio::net::TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;
        let app = self.router();
        let token = self.shutdown.token();
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(token.cancelled_owned())
                .await
            {
                tracing::error!(error = %e, "server task failed");
            }
        });
        Ok((addr, handle))
    }

    /// The process-wide session state.
    pub fn session(&self) -> &Arc<SharedSession> {
        &self.session
    }

    /// The subscriber registry.
    pub fn subscribers(&self) -> &Arc<SubscriberRegistry> {
        &self.subscribers
    }

    /// The shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// The server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// GET `/`
async fn landing_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET `/health`
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let resp = health::health_check(
        state.start_time,
        state.subscribers.connection_count(),
        state.session.status(),
    );
    Json(resp)
}

/// GET `/ws` — WebSocket upgrade.
async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws_session(socket, state))
}
