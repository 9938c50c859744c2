//! Summaries of simulated voltage traces and sweeps over stimulus amplitudes

use std::ops::Sub;
use rayon::prelude::*;
use serde::Serialize;
use crate::current::CurrentWaveform;
use crate::error::ParameterError;
use crate::neuron::{
    hodgkin_huxley::{simulate, SimulationResult},
    SimulationSettings,
};
use crate::parameters::ParameterSet;


fn diff<T: Sub<Output = T> + Copy>(x: &[T]) -> Vec<T> {
    (1..x.len()).map(|i| x[i] - x[i-1])
        .collect()
}

/// Returns indices of where voltages have peaked above `threshold`, a plateau
/// reports its middle index
pub fn find_peaks(voltages: &[f64], threshold: f64) -> Vec<usize> {
    let mut peaks = Vec::new();
    let mut plateau_start: Option<usize> = None;

    for i in 1..voltages.len().saturating_sub(1) {
        let rising = voltages[i] > voltages[i-1];
        let flat = voltages[i] == voltages[i-1];

        if rising {
            plateau_start = Some(i);
        } else if !flat {
            plateau_start = None;
        }

        if let Some(start) = plateau_start {
            if voltages[i] > voltages[i+1] && voltages[i] > threshold {
                peaks.push((start + i) / 2);
                plateau_start = None;
            }
        }
    }

    peaks
}

/// Summarizes the spiking of a single voltage trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionPotentialSummary {
    /// Number of spikes
    pub num_spikes: usize,
    /// Average time between consecutive spikes (ms), `0` with fewer than two spikes
    pub average_spike_time_difference: f64,
    /// Spikes per second over the simulated duration (Hz)
    pub firing_rate: f64,
    /// Highest recorded voltage (mV)
    pub max_voltage: f64,
    /// Lowest recorded voltage (mV)
    pub min_voltage: f64,
}

/// Generates an action potential summary from a simulation result
pub fn get_summary(result: &SimulationResult) -> ActionPotentialSummary {
    let spike_times = &result.spike_times;

    let average_spike_time_difference = if spike_times.len() > 1 {
        diff(spike_times).iter().sum::<f64>() / (spike_times.len() - 1) as f64
    } else {
        0.
    };

    let duration = result.samples.last().map_or(0., |i| i.t);
    let firing_rate = if duration > 0. {
        spike_times.len() as f64 / (duration * 1e-3)
    } else {
        0.
    };

    let voltages = result.voltages();

    ActionPotentialSummary {
        num_spikes: spike_times.len(),
        average_spike_time_difference,
        firing_rate,
        max_voltage: voltages.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        min_voltage: voltages.iter().copied().fold(f64::INFINITY, f64::min),
    }
}

/// Summary of one run of an amplitude sweep
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint {
    /// Step amplitude (µA)
    pub amplitude: f64,
    /// Spiking summary of the run
    pub summary: ActionPotentialSummary,
}

/// Runs an independent simulation for each step amplitude on `[t_start, t_end]`
/// in parallel, returns the points in the order of `amplitudes`
pub fn sweep_step_amplitudes(
    parameters: &ParameterSet,
    t_start: f64,
    t_end: f64,
    amplitudes: &[f64],
    settings: &SimulationSettings,
) -> Result<Vec<SweepPoint>, ParameterError> {
    amplitudes.par_iter()
        .map(|amplitude| {
            let waveform = CurrentWaveform::step(t_start, t_end, *amplitude)?;
            let result = simulate(parameters, &waveform, settings)?;

            Ok(SweepPoint { amplitude: *amplitude, summary: get_summary(&result) })
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_peaks_single_peak() {
        let voltages = [-70., -60., 10., 30., 20., -70., -75.];

        assert_eq!(find_peaks(&voltages, 0.), vec![3]);
    }

    #[test]
    fn test_find_peaks_ignores_subthreshold_bumps() {
        let voltages = [-70., -65., -70., -60., 25., 25., 25., 0., -70.];

        assert_eq!(find_peaks(&voltages, 0.), vec![5]);
    }

    #[test]
    fn test_diff() {
        assert_eq!(diff(&[1., 4., 9.]), vec![3., 5.]);
        assert!(diff::<f64>(&[]).is_empty());
    }
}
