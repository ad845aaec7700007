use axum::{routing::get, Router};
use core_sim::SimulationConfig;

pub fn build_app(defaults: SimulationConfig) -> Router {
    api::app(defaults).route("/health", get(healthcheck))
}

async fn healthcheck() -> &'static str {
    "ok"
}
