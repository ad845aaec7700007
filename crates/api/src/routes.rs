use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use core_sim::{LoanModel, ReinvestmentPolicy, SimError, SimulationConfig};
use serde::{Deserialize, Serialize};
use strategy::{ALL_LOAN_MODELS, ALL_POLICIES};
use thiserror::Error;

use crate::state::{AppState, StartRunError, MAX_HORIZON_MONTHS};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/projections", post(start_projection))
        .route("/projections/:run_id", get(get_projection))
        .route("/policies", get(list_policies))
        .route("/defaults", get(defaults))
        .with_state(state)
}

/// Overrides applied on top of the server defaults. `leverage_ratio`, when
/// present, replaces `borrowed_amount`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectionRequest {
    pub initial_capital: Option<f64>,
    pub borrowed_amount: Option<f64>,
    pub leverage_ratio: Option<f64>,
    pub high_yield_annual_rate: Option<f64>,
    pub secondary_annual_rate: Option<f64>,
    pub borrow_annual_rate: Option<f64>,
    pub horizon_months: Option<u32>,
    pub horizon_years: Option<u32>,
    pub reinvestment_policy: Option<String>,
    pub loan_model: Option<String>,
}

impl ProjectionRequest {
    pub fn into_config(self, defaults: &SimulationConfig) -> Result<SimulationConfig, SimError> {
        let mut config = *defaults;

        if let Some(value) = self.initial_capital {
            config.initial_capital = value;
        }
        if let Some(value) = self.borrowed_amount {
            config.borrowed_amount = value;
        }
        if let Some(value) = self.high_yield_annual_rate {
            config.high_yield_annual_rate = value;
        }
        if let Some(value) = self.secondary_annual_rate {
            config.secondary_annual_rate = value;
        }
        if let Some(value) = self.borrow_annual_rate {
            config.borrow_annual_rate = value;
        }
        if let Some(value) = self.horizon_months {
            config.horizon_months = value;
        }
        if let Some(years) = self.horizon_years {
            config = config.with_horizon_years(years)?;
        }
        if let Some(name) = self.reinvestment_policy.as_deref() {
            config.reinvestment_policy = name.parse::<ReinvestmentPolicy>()?;
        }
        if let Some(name) = self.loan_model.as_deref() {
            config.loan_model = name.parse::<LoanModel>()?;
        }
        if let Some(ratio) = self.leverage_ratio {
            config = config.with_leverage_ratio(ratio)?;
        }

        Ok(config)
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidConfiguration(SimError),
    #[error("horizon of {0} months exceeds the limit of {max} months", max = MAX_HORIZON_MONTHS)]
    HorizonTooLong(u32),
    #[error("projection run {0} not found")]
    RunNotFound(u64),
    #[error("run id space exhausted")]
    RunIdOverflow,
}

impl From<StartRunError> for ApiError {
    fn from(err: StartRunError) -> Self {
        match err {
            StartRunError::RunIdOverflow => Self::RunIdOverflow,
            StartRunError::HorizonTooLong(months) => Self::HorizonTooLong(months),
            StartRunError::Simulation(err) => Self::InvalidConfiguration(err),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::InvalidConfiguration(_) | Self::HorizonTooLong(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::RunNotFound(_) => StatusCode::NOT_FOUND,
            Self::RunIdOverflow => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn start_projection(
    State(state): State<AppState>,
    Json(request): Json<ProjectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let config = request
        .into_config(state.defaults())
        .map_err(ApiError::InvalidConfiguration)?;
    let response = state.start_run(config).await?;
    tracing::info!(
        run_id = response.run_id,
        policy = config.reinvestment_policy.as_str(),
        months = config.horizon_months,
        "projection created"
    );
    let location = format!("/projections/{}", response.run_id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(response),
    ))
}

async fn get_projection(
    State(state): State<AppState>,
    Path(run_id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state
        .get_run(run_id)
        .await
        .ok_or(ApiError::RunNotFound(run_id))?;
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct PoliciesResponse {
    reinvestment_policies: Vec<&'static str>,
    loan_models: Vec<&'static str>,
}

async fn list_policies() -> Json<PoliciesResponse> {
    Json(PoliciesResponse {
        reinvestment_policies: ALL_POLICIES.iter().map(|policy| policy.as_str()).collect(),
        loan_models: ALL_LOAN_MODELS.iter().map(|model| model.as_str()).collect(),
    })
}

async fn defaults(State(state): State<AppState>) -> Json<SimulationConfig> {
    Json(*state.defaults())
}

#[cfg(test)]
mod tests {
    use core_sim::{ConfigIssue, LoanModel, ReinvestmentPolicy, SimError, SimulationConfig};
    use strategy::StrategyError;

    use super::ProjectionRequest;

    #[test]
    fn empty_request_uses_defaults() {
        let defaults = SimulationConfig::default();

        let config = ProjectionRequest::default().into_config(&defaults).unwrap();

        assert_eq!(config, defaults);
    }

    #[test]
    fn overrides_replace_default_fields() {
        let request = ProjectionRequest {
            initial_capital: Some(50_000.0),
            horizon_years: Some(2),
            reinvestment_policy: Some("combined".to_string()),
            loan_model: Some("simple-interest".to_string()),
            leverage_ratio: Some(2.0),
            ..ProjectionRequest::default()
        };

        let config = request.into_config(&SimulationConfig::default()).unwrap();

        assert_eq!(config.initial_capital, 50_000.0);
        assert_eq!(config.borrowed_amount, 100_000.0);
        assert_eq!(config.horizon_months, 24);
        assert_eq!(config.reinvestment_policy, ReinvestmentPolicy::Combined);
        assert_eq!(config.loan_model, LoanModel::SimpleInterest);
    }

    #[test]
    fn unknown_policy_is_invalid_configuration() {
        let request = ProjectionRequest {
            reinvestment_policy: Some("quarterly".to_string()),
            ..ProjectionRequest::default()
        };

        let err = request.into_config(&SimulationConfig::default()).unwrap_err();

        assert_eq!(
            err,
            SimError::InvalidConfiguration(ConfigIssue::Strategy(StrategyError::UnknownPolicy(
                "quarterly".to_string()
            )))
        );
    }
}
