use crate::errors::{EngineError, EngineResult};
use crate::models::MarketParameters;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub dashboard_dir: PathBuf,
    /// Inputs the dashboard starts from, and the fallback for any
    /// parameter a request leaves out.
    pub defaults: MarketParameters,
}

impl AppConfig {
    pub fn from_env() -> EngineResult<Self> {
        dotenvy::dotenv().ok();

        let server_port = env_var_or("SERVER_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| EngineError::Config(format!("SERVER_PORT: {e}")))?;

        let defaults = MarketParameters::new(
            env_f64("DEFAULT_SPOT", "100")?,
            env_f64("DEFAULT_STRIKE", "100")?,
            env_f64("DEFAULT_RATE", "0.05")?,
            env_f64("DEFAULT_TTM", "1.0")?,
            env_f64("DEFAULT_VOLATILITY", "0.2")?,
        )
        .map_err(|e| EngineError::Config(format!("default parameters: {e}")))?;

        Ok(Self {
            server_port,
            dashboard_dir: PathBuf::from(env_var_or("DASHBOARD_DIR", "dashboard/dist")),
            defaults,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 3001,
            dashboard_dir: PathBuf::from("dashboard/dist"),
            defaults: MarketParameters {
                spot: 100.0,
                strike: 100.0,
                risk_free_rate: 0.05,
                time_to_maturity: 1.0,
                volatility: 0.2,
            },
        }
    }
}

fn env_f64(key: &str, default: &str) -> EngineResult<f64> {
    env_var_or(key, default)
        .parse::<f64>()
        .map_err(|e| EngineError::Config(format!("{key}: {e}")))
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
