//! HTTP API handlers

mod dashboard;
mod health;
mod reports;
mod sse;
mod upload;

pub use dashboard::dashboard_routes;
pub use health::health_routes;
pub use reports::report_routes;
pub use sse::event_stream;
pub use upload::upload_routes;
