//! An implementation of a single compartment Hodgkin Huxley neuron driven by an
//! injected current waveform, along with the fixed step integrators used to run it

use std::collections::HashMap;
use serde::Serialize;
use tracing::debug;
use crate::current::CurrentWaveform;
use crate::error::ParameterError;
use crate::parameters::ParameterSet;
use super::{IntegrationMethod, NeuronState, SimulationSettings};
use super::ion_channels::{KIonChannel, LeakChannel, NaIonChannel};


/// Hodgkin Huxley neuron, voltages in (mV), conductances in (mS), capacitance in (µF),
/// currents in (µA) and time in (ms)
#[derive(Debug, Clone, PartialEq)]
pub struct HodgkinHuxleyNeuron {
    /// Membrane potential (mV)
    pub current_voltage: f64,
    /// Membrane capacitance (µF)
    pub c_m: f64,
    /// Sodium ion channel
    pub na_channel: NaIonChannel,
    /// Potassium ion channel
    pub k_channel: KIonChannel,
    /// Leak channel
    pub leak_channel: LeakChannel,
    /// Voltage threshold for spike calculation (mV)
    pub v_th: f64,
    /// Last timestep the neuron has spiked
    pub last_firing_time: Option<usize>,
    /// Whether the voltage was increasing in the last step
    pub was_increasing: bool,
    /// Whether the neuron is currently spiking
    pub is_spiking: bool,
}

impl Default for HodgkinHuxleyNeuron {
    fn default() -> Self {
        HodgkinHuxleyNeuron::new(&ParameterSet::default())
    }
}

impl HodgkinHuxleyNeuron {
    /// Creates a neuron at `v0` with every gate at its steady state for `v0`
    pub fn new(parameters: &ParameterSet) -> Self {
        let voltage = parameters.v_init;

        HodgkinHuxleyNeuron {
            current_voltage: voltage,
            c_m: parameters.c_m,
            na_channel: NaIonChannel::new(parameters.g_na, parameters.e_na, voltage),
            k_channel: KIonChannel::new(parameters.g_k, parameters.e_k, voltage),
            leak_channel: LeakChannel { g_l: parameters.g_l, e_l: parameters.e_l },
            v_th: 0.,
            last_firing_time: None,
            was_increasing: false,
            is_spiking: false,
        }
    }

    /// Returns the voltage and gating states
    pub fn state(&self) -> NeuronState {
        NeuronState {
            v: self.current_voltage,
            m: self.na_channel.m.state,
            n: self.k_channel.n.state,
            h: self.na_channel.h.state,
        }
    }

    fn set_state(&mut self, state: &NeuronState) {
        self.current_voltage = state.v;
        self.na_channel.m.state = state.m;
        self.k_channel.n.state = state.n;
        self.na_channel.h.state = state.h;
    }

    /// Recalculates the opening and closing rates of every gate at the current voltage
    pub fn update_gate_rates(&mut self) {
        self.na_channel.m.update_rates(self.current_voltage);
        self.na_channel.h.update_rates(self.current_voltage);
        self.k_channel.n.update_rates(self.current_voltage);
    }

    /// Time derivatives of each state variable given an input current
    pub fn derivatives(&self, state: &NeuronState, input_current: f64) -> NeuronState {
        let mut m = self.na_channel.m;
        let mut n = self.k_channel.n;
        let mut h = self.na_channel.h;
        m.update_rates(state.v);
        n.update_rates(state.v);
        h.update_rates(state.v);

        let i_na = self.na_channel.current(state.v, state.m, state.h);
        let i_k = self.k_channel.current(state.v, state.n);
        let i_leak = self.leak_channel.current(state.v);

        NeuronState {
            v: (input_current - i_na - i_k - i_leak) / self.c_m,
            m: m.derivative(state.m),
            n: n.derivative(state.n),
            h: h.derivative(state.h),
        }
    }

    /// Advances every variable by treating it as linear in itself with coefficients
    /// taken from the state at the start of the step, all variables are updated
    /// from the previous state
    fn update_exponential_euler(&mut self, input_current: f64, dt: f64) {
        self.update_gate_rates();

        let m = self.na_channel.m.state;
        let h = self.na_channel.h.state;
        let n = self.k_channel.n.state;

        let g_na = self.na_channel.conductance(m, h);
        let g_k = self.k_channel.conductance(n);
        let g_l = self.leak_channel.g_l;
        let g_total = g_na + g_k + g_l;

        let v_inf = (
            input_current
            + g_na * self.na_channel.e_na
            + g_k * self.k_channel.e_k
            + g_l * self.leak_channel.e_l
        ) / g_total;

        self.current_voltage = v_inf + (self.current_voltage - v_inf) * (-g_total * dt / self.c_m).exp();

        self.na_channel.m.update_exponential(dt);
        self.na_channel.h.update_exponential(dt);
        self.k_channel.n.update_exponential(dt);
    }

    /// Classic fourth order Runge Kutta step, current is sampled at `t`, `t + dt / 2`
    /// and `t + dt`
    fn update_runge_kutta(&mut self, waveform: &CurrentWaveform, t: f64, dt: f64) {
        let state = self.state();
        let half_current = waveform.current(t + dt / 2.);

        let k1 = self.derivatives(&state, waveform.current(t));
        let k2 = self.derivatives(&state.add_scaled(&k1, dt / 2.), half_current);
        let k3 = self.derivatives(&state.add_scaled(&k2, dt / 2.), half_current);
        let k4 = self.derivatives(&state.add_scaled(&k3, dt), waveform.current(t + dt));

        let next = NeuronState {
            v: state.v + dt / 6. * (k1.v + 2. * k2.v + 2. * k3.v + k4.v),
            m: state.m + dt / 6. * (k1.m + 2. * k2.m + 2. * k3.m + k4.m),
            n: state.n + dt / 6. * (k1.n + 2. * k2.n + 2. * k3.n + k4.n),
            h: state.h + dt / 6. * (k1.h + 2. * k2.h + 2. * k3.h + k4.h),
        };

        self.set_state(&next);
        self.update_gate_rates();
    }

    /// Advances the neuron by one step of `dt` starting at time `t`
    pub fn iterate(&mut self, waveform: &CurrentWaveform, t: f64, dt: f64, method: IntegrationMethod) {
        match method {
            IntegrationMethod::ExponentialEuler => self.update_exponential_euler(waveform.current(t), dt),
            IntegrationMethod::RungeKutta4 => self.update_runge_kutta(waveform, t, dt),
        }
    }

    fn handle_spiking(&mut self, last_voltage: f64) -> bool {
        let increasing_right_now = last_voltage < self.current_voltage;
        let threshold_crossed = self.current_voltage > self.v_th;
        let is_spiking = threshold_crossed && self.was_increasing && !increasing_right_now;

        self.is_spiking = is_spiking;
        self.was_increasing = increasing_right_now;

        is_spiking
    }

    /// Iterates the neuron and returns whether the voltage peaked above threshold
    /// during the step, `timestep` is recorded as the last firing time if so
    pub fn iterate_and_spike(
        &mut self,
        waveform: &CurrentWaveform,
        timestep: usize,
        dt: f64,
        method: IntegrationMethod,
    ) -> bool {
        let last_voltage = self.current_voltage;
        self.iterate(waveform, timestep as f64 * dt, dt, method);

        let is_spiking = self.handle_spiking(last_voltage);
        if is_spiking {
            self.last_firing_time = Some(timestep);
        }

        is_spiking
    }
}

/// One recorded row of a simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationSample {
    /// Time (ms)
    pub t: f64,
    /// Membrane potential (mV)
    pub v: f64,
    /// Sodium activation
    pub m: f64,
    /// Potassium activation
    pub n: f64,
    /// Sodium inactivation
    pub h: f64,
    /// Injected current (µA)
    #[serde(rename = "I")]
    pub current: f64,
}

/// Time series produced by [`simulate`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    /// Samples in order of time
    pub samples: Vec<SimulationSample>,
    /// Times (ms) at which the voltage peaked above the spike threshold
    pub spike_times: Vec<f64>,
}

impl SimulationResult {
    fn column(&self, field: impl Fn(&SimulationSample) -> f64) -> Vec<f64> {
        self.samples.iter().map(field).collect()
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no samples were recorded
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Recorded times (ms)
    pub fn times(&self) -> Vec<f64> {
        self.column(|i| i.t)
    }

    /// Recorded voltages (mV)
    pub fn voltages(&self) -> Vec<f64> {
        self.column(|i| i.v)
    }

    /// Recorded sodium activation
    pub fn m(&self) -> Vec<f64> {
        self.column(|i| i.m)
    }

    /// Recorded potassium activation
    pub fn n(&self) -> Vec<f64> {
        self.column(|i| i.n)
    }

    /// Recorded sodium inactivation
    pub fn h(&self) -> Vec<f64> {
        self.column(|i| i.h)
    }

    /// Recorded injected currents (µA)
    pub fn currents(&self) -> Vec<f64> {
        self.column(|i| i.current)
    }

    /// Last sample at or before `t`
    pub fn sample_at(&self, t: f64) -> Option<&SimulationSample> {
        self.samples.iter()
            .take_while(|i| i.t <= t + 1e-9)
            .last()
    }

    /// Samples with `t_start <= t <= t_end`
    pub fn window(&self, t_start: f64, t_end: f64) -> impl Iterator<Item = &SimulationSample> {
        self.samples.iter()
            .filter(move |i| i.t >= t_start && i.t <= t_end)
    }

    /// Writes `t,v,m,n,h,I` rows to the given writer
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for sample in &self.samples {
            csv_writer.serialize(sample)?;
        }
        csv_writer.flush()?;

        Ok(())
    }
}

/// Integrates the neuron over `[0, parameters.duration]` under `waveform`, sampling
/// `(t, v, m, n, h, I)` every `settings.record_interval` starting at `t = 0`
pub fn simulate(
    parameters: &ParameterSet,
    waveform: &CurrentWaveform,
    settings: &SimulationSettings,
) -> Result<SimulationResult, ParameterError> {
    parameters.validate()?;
    let steps_per_record = settings.steps_per_record()?;

    let dt = settings.dt;
    let total_steps = (parameters.duration / dt + 1e-9).floor() as usize;
    let record_interval = steps_per_record as f64 * dt;

    debug!(
        total_steps, steps_per_record, method = ?settings.method, kind = %waveform.kind(),
        "starting hodgkin huxley simulation"
    );

    let mut neuron = HodgkinHuxleyNeuron::new(parameters);
    let mut samples = Vec::with_capacity(total_steps / steps_per_record + 1);
    let mut spike_times = Vec::new();

    for timestep in 0..=total_steps {
        if timestep % steps_per_record == 0 {
            let t = (timestep / steps_per_record) as f64 * record_interval;
            let state = neuron.state();

            samples.push(SimulationSample {
                t,
                v: state.v,
                m: state.m,
                n: state.n,
                h: state.h,
                current: waveform.current(t),
            });
        }

        if timestep == total_steps {
            break;
        }

        if neuron.iterate_and_spike(waveform, timestep, dt, settings.method) {
            spike_times.push(timestep as f64 * dt);
        }
    }

    debug!(samples = samples.len(), spikes = spike_times.len(), "finished hodgkin huxley simulation");

    Ok(SimulationResult { samples, spike_times })
}

/// Takes in a static current as an input and iterates the given
/// neuron for a given number of steps, returns various state variables over time
/// including voltages and gating states, output hashmap has keys `"current_voltage"`,
/// `"m"`, `"n"`, and `"h"`
pub fn run_static_input_hodgkin_huxley(
    hodgkin_huxley_neuron: &mut HodgkinHuxleyNeuron,
    input: f64,
    dt: f64,
    iterations: usize,
    method: IntegrationMethod,
) -> HashMap<String, Vec<f64>> {
    let waveform = CurrentWaveform::Step { t_start: 0., t_end: f64::INFINITY, amplitude: input };

    let mut state_output = HashMap::new();
    state_output.insert("current_voltage".to_string(), vec![]);
    state_output.insert("m".to_string(), vec![]);
    state_output.insert("n".to_string(), vec![]);
    state_output.insert("h".to_string(), vec![]);

    for timestep in 0..iterations {
        let _is_spiking = hodgkin_huxley_neuron.iterate_and_spike(&waveform, timestep, dt, method);
        let state = hodgkin_huxley_neuron.state();

        state_output.get_mut("current_voltage").map(|val| val.push(state.v));
        state_output.get_mut("m").map(|val| val.push(state.m));
        state_output.get_mut("n").map(|val| val.push(state.n));
        state_output.get_mut("h").map(|val| val.push(state.h));
    }

    state_output
}
