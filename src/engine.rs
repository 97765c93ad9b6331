use crate::errors::{EngineError, EngineResult};
use crate::models::{MarketParameters, Sensitivity};
use crate::state::{AppState, EngineEvent, EvaluationSnapshot, WsMessage};
use portable_atomic::Ordering;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Owned by the engine task only; no locks.
struct EngineLocal {
    params: MarketParameters,
    sensitivity: Sensitivity,
    sequence: u64,
}

/// Core engine loop. Receives input changes, recomputes, publishes.
/// Every event produces one complete evaluation that supersedes the previous one.
pub async fn run_engine(state: Arc<AppState>, mut rx: mpsc::Receiver<EngineEvent>) {
    tracing::info!("engine task started");

    let initial = state.snapshot_rx.borrow().clone();
    let mut local = EngineLocal {
        params: initial.params,
        sensitivity: initial.surface.sensitivity,
        sequence: initial.sequence,
    };

    while let Some(event) = rx.recv().await {
        match process_event(event, &mut local, &state) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e @ EngineError::InvalidParameter { .. }) => {
                tracing::warn!(error = %e, "input rejected");
                state.counters.inputs_rejected.fetch_add(1, Ordering::Relaxed);
                state.broadcast(WsMessage::ValidationError {
                    field: e.field().map(str::to_string),
                    message: e.to_string(),
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "engine error");
                state.counters.errors_recovered.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    tracing::info!("engine task shutting down");
}

/// Returns Ok(false) when the loop should stop.
fn process_event(
    event: EngineEvent,
    local: &mut EngineLocal,
    state: &Arc<AppState>,
) -> EngineResult<bool> {
    match event {
        EngineEvent::ParametersChanged(update) => {
            // Validate before touching local state: a bad input leaves the
            // last good evaluation in place.
            let params = update.apply(&local.params)?;
            let sensitivity = update.sensitivity.unwrap_or(local.sensitivity);

            local.params = params;
            local.sensitivity = sensitivity;
            local.sequence += 1;

            let snapshot = EvaluationSnapshot::compute(params, sensitivity, local.sequence);
            state.counters.record_evaluation(&snapshot.surface);

            tracing::debug!(
                sequence = snapshot.sequence,
                spot = params.spot,
                strike = params.strike,
                ttm = params.time_to_maturity,
                vol = params.volatility,
                call = snapshot.result.call_price,
                %sensitivity,
                "recomputed"
            );

            state.broadcast(WsMessage::Evaluation(Box::new(snapshot.clone())));
            state
                .snapshot_tx
                .send(snapshot)
                .map_err(|_| EngineError::ChannelClosed("snapshot".into()))?;
            Ok(true)
        }

        EngineEvent::Shutdown => {
            tracing::info!("shutdown event received");
            Ok(false)
        }
    }
}
