//! HTTP surface of the dashboard, the page holds the edited tables and posts them
//! back on every change

use std::{net::SocketAddr, sync::Arc};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};
use crate::current::WaveformKind;
use crate::dashboard::{simulate_tables, Figure};
use crate::error::ParameterError;
use crate::neuron::SimulationSettings;
use crate::parameters::{CurrentRow, CurrentTable, ParameterRow, ParameterTable};


const INDEX_PAGE: &str = include_str!("index.html");

/// Largest number of integration steps a single request may ask for
pub const DEFAULT_MAX_STEPS: usize = 2_000_000;

/// Errors returned by the handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Inputs cannot be simulated, the page keeps its previous chart
    #[error(transparent)]
    Blocked(#[from] ParameterError),
    /// Request is well formed but cannot be served
    #[error("Bad request: {0}")]
    BadRequest(String),
    /// Simulation task failed
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, label) = match &self {
            ApiError::Blocked(_) => (StatusCode::UNPROCESSABLE_ENTITY, "blocked"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "error"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "error"),
        };

        (status, Json(json!({ "status": label, "error": self.to_string() }))).into_response()
    }
}

/// Tables served to a fresh page and the step limit of each request
#[derive(Debug, Clone)]
pub struct AppState {
    /// Default neuron parameter table
    pub parameters: ParameterTable,
    /// Default current table of every kind
    pub currents: CurrentTable,
    /// Largest number of integration steps a request may ask for
    pub max_steps: usize,
}

impl AppState {
    /// Serves the given tables with the default step limit
    pub fn new(parameters: ParameterTable, currents: CurrentTable) -> Self {
        AppState { parameters, currents, max_steps: DEFAULT_MAX_STEPS }
    }
}

#[derive(Debug, Deserialize)]
struct TablesQuery {
    kind: Option<String>,
}

#[derive(Debug, Serialize)]
struct TablesResponse {
    parameters: ParameterTable,
    currents: CurrentTable,
    kinds: Vec<String>,
}

/// Edited tables and the selected kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulateRequest {
    /// Neuron parameter rows
    pub parameters: Vec<ParameterRow>,
    /// Current rows, rows carrying kind flags are filtered by `kind` and rows
    /// without any flags are all used
    pub currents: Vec<CurrentRow>,
    /// Selected waveform kind
    pub kind: WaveformKind,
    /// Integration settings, the defaults when absent
    #[serde(default)]
    pub settings: Option<SimulationSettings>,
}

#[derive(Debug, Serialize)]
struct SimulateResponse {
    status: &'static str,
    figure: Figure,
}

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn tables(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TablesQuery>,
) -> Result<Json<TablesResponse>, ApiError> {
    let currents = match query.kind {
        Some(label) => {
            let kind = label.parse::<WaveformKind>()
                .map_err(|err| ApiError::BadRequest(err.to_string()))?;
            state.currents.filter(kind)
        },
        None => state.currents.clone(),
    };

    Ok(Json(TablesResponse {
        parameters: state.parameters.clone(),
        currents,
        kinds: WaveformKind::selectable().iter().map(|i| i.to_string()).collect(),
    }))
}

async fn simulate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SimulateRequest>,
) -> Result<Json<SimulateResponse>, ApiError> {
    let parameters = ParameterTable { rows: request.parameters };
    let currents = CurrentTable { rows: request.currents };
    let settings = request.settings.unwrap_or_default();
    let kind = request.kind;

    if let Some(duration) = parameters.get("simulation time") {
        if settings.dt > 0. && duration / settings.dt > state.max_steps as f64 {
            return Err(ApiError::BadRequest(
                format!("simulation of {} ms at dt {} ms exceeds {} steps", duration, settings.dt, state.max_steps)
            ));
        }
    }

    debug!(%kind, "simulating request");

    let result = tokio::task::spawn_blocking(move || {
        simulate_tables(&parameters, &currents.values_for(kind), kind, &settings)
    })
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    match result {
        Ok(result) => Ok(Json(SimulateResponse { status: "ok", figure: Figure::from_result(&result) })),
        Err(err) => {
            warn!(%kind, error = %err, "simulation request blocked");

            Err(ApiError::Blocked(err))
        },
    }
}

/// Builds the dashboard router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/tables", get(tables))
        .route("/api/simulate", post(simulate))
        .with_state(Arc::new(state))
}

/// Serves the dashboard on `127.0.0.1:port` until the process is stopped
pub async fn serve(state: AppState, port: u16) -> Result<(), std::io::Error> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "serving hodgkin huxley dashboard");

    axum::serve(listener, router(state)).await
}
