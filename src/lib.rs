//! # Hodgkin Huxley dashboard
//!
//! A single compartment Hodgkin Huxley neuron driven by a step, ramp, or sinusoidal
//! current, with parameters taken from editable tables and results drawn as a three
//! panel figure (membrane potential, gating variables, and injected current).
//!
//! ## Example
//!
//! ```rust
//! use hodgkin_huxley_dashboard::current::CurrentWaveform;
//! use hodgkin_huxley_dashboard::error::HodgkinHuxleyError;
//! use hodgkin_huxley_dashboard::neuron::{hodgkin_huxley::simulate, SimulationSettings};
//! use hodgkin_huxley_dashboard::parameters::ParameterSet;
//!
//! fn main() -> Result<(), HodgkinHuxleyError> {
//!     let parameters = ParameterSet { duration: 100., ..ParameterSet::default() };
//!     let waveform = CurrentWaveform::step(10., 50., 7.)?;
//!
//!     let result = simulate(&parameters, &waveform, &SimulationSettings::default())?;
//!     assert!(!result.spike_times.is_empty());
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod current;
pub mod neuron;
pub mod parameters;
pub mod analysis;
pub mod dashboard;
pub mod config;
pub mod server;
