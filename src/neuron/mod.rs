//! Neuron state, integration settings, and the Hodgkin Huxley model

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};
use serde::{Deserialize, Serialize};
use crate::error::ParameterError;

pub mod ion_channels;
pub mod hodgkin_huxley;


/// Membrane potential (mV) and gating variables of a neuron at a point in time,
/// also used to hold their time derivatives
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeuronState {
    /// Membrane potential (mV)
    pub v: f64,
    /// Sodium activation
    pub m: f64,
    /// Potassium activation
    pub n: f64,
    /// Sodium inactivation
    pub h: f64,
}

impl NeuronState {
    /// Returns `self + scale * other` elementwise
    pub fn add_scaled(&self, other: &NeuronState, scale: f64) -> NeuronState {
        NeuronState {
            v: self.v + scale * other.v,
            m: self.m + scale * other.m,
            n: self.n + scale * other.n,
            h: self.h + scale * other.h,
        }
    }
}

/// Fixed step scheme used to advance the neuron
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationMethod {
    /// Each variable is integrated exactly with the other variables frozen over the step
    #[default]
    ExponentialEuler,
    /// Classic fourth order Runge Kutta
    #[serde(alias = "rk4")]
    RungeKutta4,
}

impl Display for IntegrationMethod {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            IntegrationMethod::ExponentialEuler => write!(f, "exponential_euler"),
            IntegrationMethod::RungeKutta4 => write!(f, "rk4"),
        }
    }
}

impl FromStr for IntegrationMethod {
    type Err = ParameterError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string.trim().to_ascii_lowercase().as_str() {
            "exponential_euler" | "exponential-euler" | "exp_euler" => Ok(IntegrationMethod::ExponentialEuler),
            "rk4" | "runge_kutta" | "runge-kutta" | "runge_kutta4" => Ok(IntegrationMethod::RungeKutta4),
            _ => Err(ParameterError::invalid_range("method", format!("unknown integration method '{}'", string))),
        }
    }
}

/// Step size, reporting interval, and scheme of a simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Integration timestep (ms)
    pub dt: f64,
    /// Interval between recorded samples (ms), a whole multiple of `dt`
    pub record_interval: f64,
    /// Integration scheme
    pub method: IntegrationMethod,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            dt: 0.01,
            record_interval: 0.1,
            method: IntegrationMethod::ExponentialEuler,
        }
    }
}

impl SimulationSettings {
    /// Number of integration steps between recorded samples
    pub fn steps_per_record(&self) -> Result<usize, ParameterError> {
        if !(self.dt > 0.) || !self.dt.is_finite() {
            return Err(ParameterError::invalid_range("dt", "timestep must be positive"));
        }
        if !(self.record_interval > 0.) || !self.record_interval.is_finite() {
            return Err(ParameterError::invalid_range("record_interval", "reporting interval must be positive"));
        }

        let ratio = self.record_interval / self.dt;
        let steps = ratio.round();
        if steps < 1. || (ratio - steps).abs() > 1e-6 * ratio.max(1.) {
            return Err(
                ParameterError::invalid_range(
                    "record_interval",
                    format!("reporting interval ({}) must be a multiple of dt ({})", self.record_interval, self.dt),
                )
            );
        }

        Ok(steps as usize)
    }
}
