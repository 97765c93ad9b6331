use crate::errors::EngineResult;
use crate::models::{evaluate, sample_surface, MarketParameters, PricingResult, SurfaceGrid};
use crate::state::{AppState, EvaluationSnapshot, ParameterUpdate};
use axum::extract::{Query, State};
use axum::response::Json;
use portable_atomic::Ordering::Relaxed;
use std::sync::Arc;

#[derive(Debug, serde::Serialize)]
pub struct PriceResponse {
    pub params: MarketParameters,
    pub result: PricingResult,
}

/// GET /api/price -- point evaluation; omitted inputs use configured defaults
pub async fn get_price(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ParameterUpdate>,
) -> EngineResult<Json<PriceResponse>> {
    let params = query.apply(&state.config.defaults)?;
    let result = evaluate(&params);
    state.counters.evaluations_run.fetch_add(1, Relaxed);
    Ok(Json(PriceResponse { params, result }))
}

/// GET /api/surface -- full 31x31 grid of the requested sensitivity (gamma by default)
pub async fn get_surface(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ParameterUpdate>,
) -> EngineResult<Json<SurfaceGrid>> {
    let params = query.apply(&state.config.defaults)?;
    let grid = sample_surface(&params, query.sensitivity.unwrap_or_default());
    state.counters.record_evaluation(&grid);
    Ok(Json(grid))
}

/// GET /api/state -- latest published evaluation (from watch channel, no lock)
pub async fn get_state(
    State(state): State<Arc<AppState>>,
) -> Json<EvaluationSnapshot> {
    let snapshot = state.snapshot_rx.borrow().clone();
    Json(snapshot)
}

/// GET /api/counters -- performance counters (lock-free reads)
pub async fn get_counters(
    State(state): State<Arc<AppState>>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "evaluations_run": state.counters.evaluations_run.load(Relaxed),
        "surface_cells_sampled": state.counters.surface_cells_sampled.load(Relaxed),
        "inputs_rejected": state.counters.inputs_rejected.load(Relaxed),
        "errors_recovered": state.counters.errors_recovered.load(Relaxed),
        "ws_messages_sent": state.counters.ws_messages_sent.load(Relaxed),
    }))
}
