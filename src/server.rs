use crate::config::{Config, SolverConfig};
use crate::data::{EmptyDomain, SchedulingInput, SchedulingOutput, SolveStats, Warning};
use crate::error::{SolveError, SolveFailure};
use crate::solver;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info};
use serde::Serialize;
use std::io;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct AppState {
    pub solver: Arc<SolverConfig>,
}

#[derive(Debug, Serialize)]
pub struct SuccessBody {
    status: &'static str,
    #[serde(flatten)]
    output: SchedulingOutput,
}

#[derive(Debug, Serialize)]
pub struct FailureBody {
    status: &'static str,
    reason: &'static str,
    message: String,
    diagnostics: Vec<EmptyDomain>,
    warnings: Vec<Warning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<SolveStats>,
}

impl From<SolveFailure> for FailureBody {
    fn from(failure: SolveFailure) -> Self {
        let message = failure.to_string();
        let reason = failure.reason();
        let diagnostics = match failure.error {
            SolveError::EmptyDomains { diagnostics } => diagnostics,
            _ => Vec::new(),
        };
        Self {
            status: "failure",
            reason,
            message,
            diagnostics,
            warnings: failure.warnings,
            stats: Some(failure.stats),
        }
    }
}

async fn solve_handler(
    State(state): State<AppState>,
    Json(mut input): Json<SchedulingInput>,
) -> Result<Json<SuccessBody>, (StatusCode, Json<FailureBody>)> {
    input.assign_missing_slot_ids();
    let config = Arc::clone(&state.solver);

    // every request gets its own network on a blocking worker
    match tokio::task::spawn_blocking(move || solver::solve(&input, &config)).await {
        Ok(Ok(output)) => Ok(Json(SuccessBody {
            status: "success",
            output,
        })),
        Ok(Err(e)) => {
            info!("Solve request failed: {}", e);
            Err((StatusCode::UNPROCESSABLE_ENTITY, Json(FailureBody::from(e))))
        }
        Err(e) => {
            error!("Solver task did not complete: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(FailureBody {
                    status: "failure",
                    reason: "internal",
                    message: e.to_string(),
                    diagnostics: Vec::new(),
                    warnings: Vec::new(),
                    stats: None,
                }),
            ))
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/v1/schedule/solve", post(solve_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server(config: &Config) -> io::Result<()> {
    let app = router(AppState {
        solver: Arc::new(config.solver.clone()),
    });

    let listener = tokio::net::TcpListener::bind((config.bind_address(), config.port())).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
