//! sitedash-ui library interface
//!
//! Exposes the dashboard service internals for integration testing.

pub mod api;
pub mod classifier;
pub mod error;
pub mod ingest;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod state;

pub use crate::error::{ApiError, ApiResult};

use crate::registry::IdentifierRegistry;
use crate::report::ReportBuilder;
use crate::state::DashboardState;
use axum::Router;
use chrono::{DateTime, Utc};
use sitedash_common::events::EventBus;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
///
/// `dashboard` is the sole owner of all entity collections; `registry`
/// holds only the code↔name maps. `work_guard` serializes ingestions and
/// report generations against each other: both span await points and the
/// commit sequence is not atomic across collections, so only one may run
/// at a time even on a single-threaded runtime.
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<RwLock<DashboardState>>,
    pub registry: Arc<RwLock<IdentifierRegistry>>,
    pub event_bus: EventBus,
    pub report_builder: Arc<ReportBuilder>,
    pub work_guard: Arc<Mutex<()>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// State seeded with the built-in dataset and a seed-only registry
    pub fn new(event_bus: EventBus) -> Self {
        let dashboard = DashboardState::seeded();
        let mut registry = IdentifierRegistry::new();
        registry.rebuild(&dashboard.projects);

        Self {
            dashboard: Arc::new(RwLock::new(dashboard)),
            registry: Arc::new(RwLock::new(registry)),
            event_bus,
            report_builder: Arc::new(ReportBuilder::new()),
            work_guard: Arc::new(Mutex::new(())),
            startup_time: Utc::now(),
        }
    }

    /// Replace the report builder (e.g. to install a slide renderer)
    pub fn with_report_builder(mut self, builder: ReportBuilder) -> Self {
        self.report_builder = Arc::new(builder);
        self
    }
}

/// Build application router
///
/// `static_assets` optionally mounts a directory of dashboard front-end
/// files at `/`.
pub fn build_router(state: AppState, static_assets: Option<PathBuf>) -> Router {
    use axum::routing::get;

    let mut router = Router::new()
        .merge(api::upload_routes())
        .merge(api::dashboard_routes())
        .merge(api::report_routes())
        .merge(api::health_routes())
        .route("/events", get(api::event_stream));

    if let Some(dir) = static_assets {
        router = router.fallback_service(tower_http::services::ServeDir::new(dir));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
