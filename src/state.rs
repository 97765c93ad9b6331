use crate::config::AppConfig;
use crate::errors::EngineResult;
use crate::models::{evaluate, sample_surface, MarketParameters, PricingResult, Sensitivity, SurfaceGrid};
use portable_atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

// ── Input from the dashboard ──

/// A (possibly partial) change of inputs. Absent fields keep their
/// current value. Accepts both long names and the textbook symbols.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Deserialize)]
pub struct ParameterUpdate {
    #[serde(default, alias = "S")]
    pub spot: Option<f64>,
    #[serde(default, alias = "K")]
    pub strike: Option<f64>,
    #[serde(default, alias = "r")]
    pub rate: Option<f64>,
    #[serde(default, alias = "T")]
    pub ttm: Option<f64>,
    #[serde(default, alias = "sigma")]
    pub volatility: Option<f64>,
    #[serde(default)]
    pub sensitivity: Option<Sensitivity>,
}

impl ParameterUpdate {
    /// Merge onto `base` and validate the full parameter set.
    pub fn apply(&self, base: &MarketParameters) -> EngineResult<MarketParameters> {
        MarketParameters::new(
            self.spot.unwrap_or(base.spot),
            self.strike.unwrap_or(base.strike),
            self.rate.unwrap_or(base.risk_free_rate),
            self.ttm.unwrap_or(base.time_to_maturity),
            self.volatility.unwrap_or(base.volatility),
        )
    }
}

// ── Messages INTO the engine (bounded channel) ──

#[derive(Debug, Clone)]
pub enum EngineEvent {
    ParametersChanged(ParameterUpdate),
    Shutdown,
}

// ── Messages OUT of the engine ──

#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type")]
pub enum WsMessage {
    #[serde(rename = "evaluation")]
    Evaluation(Box<EvaluationSnapshot>),

    #[serde(rename = "validation_error")]
    ValidationError {
        field: Option<String>,
        message: String,
    },
}

// ── One complete recompute: point evaluation + surface ──

#[derive(Debug, Clone, serde::Serialize)]
pub struct EvaluationSnapshot {
    /// Monotonic recompute counter; a consumer keeps the highest it has seen.
    pub sequence: u64,
    pub evaluated_at: String,
    pub params: MarketParameters,
    pub result: PricingResult,
    pub surface: SurfaceGrid,
}

impl EvaluationSnapshot {
    pub fn compute(params: MarketParameters, sensitivity: Sensitivity, sequence: u64) -> Self {
        Self {
            sequence,
            evaluated_at: chrono::Utc::now().to_rfc3339(),
            params,
            result: evaluate(&params),
            surface: sample_surface(&params, sensitivity),
        }
    }
}

// ── Performance Counters (lock-free) ──

pub struct PerfCounters {
    pub evaluations_run: AtomicU64,
    pub surface_cells_sampled: AtomicU64,
    pub inputs_rejected: AtomicU64,
    pub errors_recovered: AtomicU64,
    pub ws_messages_sent: AtomicU64,
}

impl PerfCounters {
    pub fn new() -> Self {
        Self {
            evaluations_run: AtomicU64::new(0),
            surface_cells_sampled: AtomicU64::new(0),
            inputs_rejected: AtomicU64::new(0),
            errors_recovered: AtomicU64::new(0),
            ws_messages_sent: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_evaluation(&self, grid: &SurfaceGrid) {
        let cells: usize = grid.z.iter().map(Vec::len).sum();
        self.evaluations_run.fetch_add(1, Ordering::Relaxed);
        self.surface_cells_sampled.fetch_add(cells as u64, Ordering::Relaxed);
    }
}

// ── Application shared state (channels, not locks) ──

pub struct AppState {
    pub config: AppConfig,

    // Engine -> Dashboard: latest evaluation (watch = last write wins)
    pub snapshot_tx: watch::Sender<EvaluationSnapshot>,
    pub snapshot_rx: watch::Receiver<EvaluationSnapshot>,

    // Engine -> Dashboard: event stream (broadcast for WS clients)
    pub ws_tx: broadcast::Sender<WsMessage>,

    // WS clients -> Engine: bounded event channel
    pub engine_tx: mpsc::Sender<EngineEvent>,

    pub counters: PerfCounters,
}

impl AppState {
    /// Seeds the snapshot with an evaluation of the configured defaults,
    /// so `/api/state` is meaningful before the first input arrives.
    pub fn new(config: AppConfig, engine_tx: mpsc::Sender<EngineEvent>) -> Arc<Self> {
        let (ws_tx, _) = broadcast::channel(256);
        let initial = EvaluationSnapshot::compute(config.defaults, Sensitivity::default(), 0);
        let counters = PerfCounters::new();
        counters.record_evaluation(&initial.surface);
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);

        Arc::new(Self {
            config,
            snapshot_tx,
            snapshot_rx,
            ws_tx,
            engine_tx,
            counters,
        })
    }

    #[inline]
    pub fn broadcast(&self, msg: WsMessage) {
        self.counters.ws_messages_sent.fetch_add(1, Ordering::Relaxed);
        let _ = self.ws_tx.send(msg);
    }
}
