//! Deployment request handling.
//!
//! A deployment compiles a blueprint with the keyword compiler, runs it and
//! wraps the resulting organism state with synthetic mesh metrics. The
//! metrics are random draws in fixed ranges; they are not measured.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, ExecutionOptions, OrganismId, OrganismState, Registry, Vm, compile};

pub const DEFAULT_STRATEGY: &str = "quantum_darwinism";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRequest {
    pub blueprint: String,
    /// Free-form label echoed back in the response.
    #[serde(default)]
    pub strategy: Option<String>,
}

impl DeploymentRequest {
    pub fn new(blueprint: impl Into<String>) -> Self {
        Self {
            blueprint: blueprint.into(),
            strategy: None,
        }
    }

    pub fn strategy(&self) -> &str {
        self.strategy.as_deref().unwrap_or(DEFAULT_STRATEGY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentMetrics {
    /// In [0.95, 0.999), four decimals.
    pub entanglement_fidelity: f64,
    /// In [128, 384).
    pub quantum_volume: u32,
    /// In [100, 150), one decimal.
    pub coherence_time: f64,
    /// In [0.001, 0.003), four decimals.
    pub gate_error_rate: f64,
}

impl DeploymentMetrics {
    pub fn sample<R: Rng>(rng: &mut R) -> Self {
        Self {
            entanglement_fidelity: round_to(0.95 + rng.r#gen::<f64>() * 0.049, 4),
            quantum_volume: 128 + (rng.r#gen::<f64>() * 256.0).floor() as u32,
            coherence_time: round_to(100.0 + rng.r#gen::<f64>() * 50.0, 1),
            gate_error_rate: round_to(0.001 + rng.r#gen::<f64>() * 0.002, 4),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentResponse {
    pub status: Status,
    pub deployment_url: String,
    pub metrics: DeploymentMetrics,
    pub organism_state: OrganismState,
    pub strategy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: Status,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            error: error.into(),
        }
    }
}

impl From<&Error> for ErrorResponse {
    fn from(error: &Error) -> Self {
        let mut message = error.to_string();
        if let Some(source) = std::error::Error::source(error) {
            message = format!("{}: {}", message, source);
        }
        ErrorResponse::new(message)
    }
}

/// Deploy a blueprint, stamping the URL with the current time.
pub fn deploy<R: Rng>(
    request: &DeploymentRequest,
    rng: &mut R,
) -> Result<DeploymentResponse, Error> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    deploy_at(request, rng, millis)
}

/// Deploy a blueprint with an explicit timestamp in milliseconds.
///
/// The VM is seeded from `rng`, so a seeded `rng` makes the whole response
/// reproducible.
pub fn deploy_at<R: Rng>(
    request: &DeploymentRequest,
    rng: &mut R,
    timestamp_millis: u64,
) -> Result<DeploymentResponse, Error> {
    let program = compile(&request.blueprint);
    let options = ExecutionOptions {
        seed: Some(rng.r#gen()),
        ..ExecutionOptions::default()
    };
    let organism_state = Vm::with_options(program, options).execute()?;

    let deployment_url = format!("qle://mesh-{}.dnalang.quantum", to_base36(timestamp_millis));
    debug!(%deployment_url, strategy = request.strategy(), "deployed");

    Ok(DeploymentResponse {
        status: Status::Success,
        deployment_url,
        metrics: DeploymentMetrics::sample(rng),
        organism_state,
        strategy: request.strategy().to_string(),
    })
}

/// Deploy a blueprint and register the resulting organism under `name`.
///
/// Nothing is registered when the deployment fails.
pub fn deploy_into<R: Rng>(
    request: &DeploymentRequest,
    rng: &mut R,
    registry: &mut Registry,
    name: &str,
) -> Result<(OrganismId, DeploymentResponse), Error> {
    let response = deploy(request, rng)?;
    let id = registry.register(name, response.organism_state.clone())?;
    Ok((id, response))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}
