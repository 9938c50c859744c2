//! Voltage gated sodium and potassium channels along with the leak channel
//! of the Hodgkin Huxley model, voltages in (mV), rates in (1/ms), conductances in (mS)

use serde::{Deserialize, Serialize};


/// Below this magnitude `x / (exp(x) - 1)` is evaluated with its series expansion
const SINGULARITY_TOLERANCE: f64 = 1e-6;

/// Evaluates `x / (exp(x) - 1)` which tends to `1` as `x` approaches `0`
pub fn x_over_exp_m1(x: f64) -> f64 {
    if x.abs() < SINGULARITY_TOLERANCE {
        1. - x / 2. + x * x / 12.
    } else {
        x / x.exp_m1()
    }
}

/// `0.01 * (-60 - v) / (exp((-60 - v) / 10) - 1)`, equal to `0.1` at `v = -60`
pub fn alpha_n(v: f64) -> f64 {
    0.1 * x_over_exp_m1((-60. - v) / 10.)
}

/// `(v + 45) / 10 / (1 - exp(-(v + 45) / 10))`, equal to `1` at `v = -45`
pub fn alpha_m(v: f64) -> f64 {
    x_over_exp_m1(-(v + 45.) / 10.)
}

/// `0.07 * exp(-(v + 70) / 20)`
pub fn alpha_h(v: f64) -> f64 {
    0.07 * (-(v + 70.) / 20.).exp()
}

/// `0.125 * exp(-(v + 70) / 80)`
pub fn beta_n(v: f64) -> f64 {
    0.125 * (-(v + 70.) / 80.).exp()
}

/// `4 * exp(-(v + 70) / 18)`
pub fn beta_m(v: f64) -> f64 {
    4. * (-(v + 70.) / 18.).exp()
}

/// `1 / (exp(-(v + 40) / 10) + 1)`
pub fn beta_h(v: f64) -> f64 {
    1. / ((-(v + 40.) / 10.).exp() + 1.)
}

/// Which gating variable a [`BasicGatingVariable`] tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateType {
    /// Sodium activation
    M,
    /// Potassium activation
    N,
    /// Sodium inactivation
    H,
}

impl GateType {
    /// Opening and closing rates at a given voltage
    pub fn rates(&self, voltage: f64) -> (f64, f64) {
        match self {
            GateType::M => (alpha_m(voltage), beta_m(voltage)),
            GateType::N => (alpha_n(voltage), beta_n(voltage)),
            GateType::H => (alpha_h(voltage), beta_h(voltage)),
        }
    }

    /// Steady state value of the gate when the voltage is clamped
    pub fn steady_state(&self, voltage: f64) -> f64 {
        let (alpha, beta) = self.rates(voltage);

        alpha / (alpha + beta)
    }

    /// Time constant of the gate (ms) when the voltage is clamped
    pub fn time_constant(&self, voltage: f64) -> f64 {
        let (alpha, beta) = self.rates(voltage);

        1. / (alpha + beta)
    }
}

/// A gating variable with its most recently computed rates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasicGatingVariable {
    /// Which gate the variable is
    pub gate_type: GateType,
    /// Opening rate (1/ms)
    pub alpha: f64,
    /// Closing rate (1/ms)
    pub beta: f64,
    /// Current open probability, not clamped
    pub state: f64,
}

impl BasicGatingVariable {
    /// Creates a gate sitting at its steady state for the given voltage
    pub fn at_steady_state(gate_type: GateType, voltage: f64) -> Self {
        let mut gate = BasicGatingVariable { gate_type, alpha: 0., beta: 0., state: 0. };
        gate.update_rates(voltage);
        gate.init_state();

        gate
    }

    /// Sets the state to `alpha / (alpha + beta)`
    pub fn init_state(&mut self) {
        self.state = self.alpha / (self.alpha + self.beta);
    }

    /// Recomputes the rates for the given voltage
    pub fn update_rates(&mut self, voltage: f64) {
        let (alpha, beta) = self.gate_type.rates(voltage);
        self.alpha = alpha;
        self.beta = beta;
    }

    /// Rate of change of the state given the stored rates
    pub fn derivative(&self, state: f64) -> f64 {
        self.alpha * (1. - state) - self.beta * state
    }

    /// Advances the state with rates held constant over the step, this integrates
    /// the linear gate equation exactly
    pub fn update_exponential(&mut self, dt: f64) {
        let total = self.alpha + self.beta;
        let steady_state = self.alpha / total;

        self.state = steady_state + (self.state - steady_state) * (-total * dt).exp();
    }
}

/// Sodium channel, `gna * m^3 * h * (v - Ena)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NaIonChannel {
    /// Maximal conductance (mS)
    pub g_na: f64,
    /// Reversal potential (mV)
    pub e_na: f64,
    /// Activation gate
    pub m: BasicGatingVariable,
    /// Inactivation gate
    pub h: BasicGatingVariable,
}

impl NaIonChannel {
    /// Creates the channel with gates at steady state for `voltage`
    pub fn new(g_na: f64, e_na: f64, voltage: f64) -> Self {
        NaIonChannel {
            g_na,
            e_na,
            m: BasicGatingVariable::at_steady_state(GateType::M, voltage),
            h: BasicGatingVariable::at_steady_state(GateType::H, voltage),
        }
    }

    /// Conductance given gate states
    pub fn conductance(&self, m: f64, h: f64) -> f64 {
        self.g_na * m.powi(3) * h
    }

    /// Outward current (µA) at a voltage given gate states
    pub fn current(&self, voltage: f64, m: f64, h: f64) -> f64 {
        self.conductance(m, h) * (voltage - self.e_na)
    }
}

/// Potassium channel, `gk * n^4 * (v - Ek)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KIonChannel {
    /// Maximal conductance (mS)
    pub g_k: f64,
    /// Reversal potential (mV)
    pub e_k: f64,
    /// Activation gate
    pub n: BasicGatingVariable,
}

impl KIonChannel {
    /// Creates the channel with its gate at steady state for `voltage`
    pub fn new(g_k: f64, e_k: f64, voltage: f64) -> Self {
        KIonChannel {
            g_k,
            e_k,
            n: BasicGatingVariable::at_steady_state(GateType::N, voltage),
        }
    }

    /// Conductance given gate state
    pub fn conductance(&self, n: f64) -> f64 {
        self.g_k * n.powi(4)
    }

    /// Outward current (µA) at a voltage given gate state
    pub fn current(&self, voltage: f64, n: f64) -> f64 {
        self.conductance(n) * (voltage - self.e_k)
    }
}

/// Leak channel, `gl * (v - El)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeakChannel {
    /// Conductance (mS)
    pub g_l: f64,
    /// Reversal potential (mV)
    pub e_l: f64,
}

impl LeakChannel {
    /// Outward current (µA) at a voltage
    pub fn current(&self, voltage: f64) -> f64 {
        self.g_l * (voltage - self.e_l)
    }
}
