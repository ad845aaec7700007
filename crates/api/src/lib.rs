pub mod routes;
pub mod state;

use axum::Router;
use core_sim::SimulationConfig;

pub fn app(defaults: SimulationConfig) -> Router {
    routes::router(state::AppState::new(defaults))
}
