//! Input current waveforms used to drive a neuron, every waveform is a pure function
//! of time (ms) returning an injected current (µA)

use std::{
    f64::consts::PI,
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};
use serde::{Deserialize, Serialize};
use crate::error::{ParameterError, TableError};


/// Parametric family a waveform belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveformKind {
    /// No current at any time
    Zero,
    /// Constant current over an interval
    Step,
    /// Linearly changing current over an interval
    Ramp,
    /// Sinusoidal current with a direct current offset over an interval
    #[serde(alias = "sin")]
    Sinusoid,
    /// Piecewise constant samples
    Tabulated,
}

impl WaveformKind {
    /// Names of the current table entries the kind consumes, in table order
    pub fn required_parameters(&self) -> &'static [&'static str] {
        match self {
            WaveformKind::Zero | WaveformKind::Tabulated => &[],
            WaveformKind::Step => &["start time", "end time", "amplitude"],
            WaveformKind::Ramp => &["start time", "end time", "amplitude start", "amplitude end"],
            WaveformKind::Sinusoid => &[
                "start time", "end time", "frequency", "direct current", "phase offset", "amplitude",
            ],
        }
    }

    /// Kinds offered by the selector
    pub fn selectable() -> [WaveformKind; 3] {
        [WaveformKind::Step, WaveformKind::Ramp, WaveformKind::Sinusoid]
    }
}

impl Display for WaveformKind {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let label = match self {
            WaveformKind::Zero => "zero",
            WaveformKind::Step => "step",
            WaveformKind::Ramp => "ramp",
            WaveformKind::Sinusoid => "sin",
            WaveformKind::Tabulated => "tabulated",
        };

        write!(f, "{}", label)
    }
}

impl FromStr for WaveformKind {
    type Err = TableError;

    /// Accepts selector labels as well as the numeric dropdown values `1`, `2` and `3`
    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string.trim().to_ascii_lowercase().as_str() {
            "zero" | "0" => Ok(WaveformKind::Zero),
            "step" | "1" => Ok(WaveformKind::Step),
            "ramp" | "2" => Ok(WaveformKind::Ramp),
            "sin" | "sinusoid" | "sinusoidal" | "3" => Ok(WaveformKind::Sinusoid),
            "tabulated" => Ok(WaveformKind::Tabulated),
            _ => Err(TableError::UnknownWaveformKind(String::from(string))),
        }
    }
}

/// Injected current as a function of time, times in (ms), currents in (µA),
/// frequency in (Hz), phase offset in (rad)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CurrentWaveform {
    /// Zero current
    Zero,
    /// `amplitude` on `[t_start, t_end]`
    Step {
        t_start: f64,
        t_end: f64,
        amplitude: f64,
    },
    /// Linear interpolation from `amplitude_start` to `amplitude_end` on `[t_start, t_end]`
    Ramp {
        t_start: f64,
        t_end: f64,
        amplitude_start: f64,
        amplitude_end: f64,
    },
    /// `direct_current + amplitude * sin(2π * frequency * (t - t_start) + phase_offset)`
    /// on `[t_start, t_end]`
    Sinusoid {
        t_start: f64,
        t_end: f64,
        amplitude: f64,
        frequency: f64,
        direct_current: f64,
        phase_offset: f64,
    },
    /// Piecewise constant samples, sample `i` holds on `[i * dt, (i + 1) * dt)`
    Tabulated {
        dt: f64,
        samples: Vec<f64>,
    },
}

fn check_finite(name: &str, value: f64) -> Result<f64, ParameterError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParameterError::invalid_range(name, format!("{} is not finite", value)))
    }
}

fn check_interval(t_start: f64, t_end: f64) -> Result<(), ParameterError> {
    check_finite("start time", t_start)?;
    check_finite("end time", t_end)?;

    if t_start < 0. {
        return Err(ParameterError::invalid_range("start time", "start time must not be negative"));
    }
    if t_start > t_end {
        return Err(
            ParameterError::invalid_range(
                "start time",
                format!("start time ({}) is after end time ({})", t_start, t_end),
            )
        );
    }

    Ok(())
}

impl CurrentWaveform {
    /// Returns a waveform that is zero everywhere
    pub fn zero() -> Self {
        CurrentWaveform::Zero
    }

    /// Returns a step of `amplitude` on `[t_start, t_end]`
    pub fn step(t_start: f64, t_end: f64, amplitude: f64) -> Result<Self, ParameterError> {
        check_interval(t_start, t_end)?;

        Ok(CurrentWaveform::Step {
            t_start,
            t_end,
            amplitude: check_finite("amplitude", amplitude)?,
        })
    }

    /// Returns a ramp from `amplitude_start` at `t_start` to `amplitude_end` at `t_end`
    pub fn ramp(
        t_start: f64,
        t_end: f64,
        amplitude_start: f64,
        amplitude_end: f64,
    ) -> Result<Self, ParameterError> {
        check_interval(t_start, t_end)?;

        Ok(CurrentWaveform::Ramp {
            t_start,
            t_end,
            amplitude_start: check_finite("amplitude start", amplitude_start)?,
            amplitude_end: check_finite("amplitude end", amplitude_end)?,
        })
    }

    /// Returns a sinusoid active on `[t_start, t_end]`, phase is measured from `t_start`
    pub fn sinusoid(
        t_start: f64,
        t_end: f64,
        amplitude: f64,
        frequency: f64,
        direct_current: f64,
        phase_offset: f64,
    ) -> Result<Self, ParameterError> {
        check_interval(t_start, t_end)?;

        Ok(CurrentWaveform::Sinusoid {
            t_start,
            t_end,
            amplitude: check_finite("amplitude", amplitude)?,
            frequency: check_finite("frequency", frequency)?,
            direct_current: check_finite("direct current", direct_current)?,
            phase_offset: check_finite("phase offset", phase_offset)?,
        })
    }

    /// Kind of the waveform
    pub fn kind(&self) -> WaveformKind {
        match self {
            CurrentWaveform::Zero => WaveformKind::Zero,
            CurrentWaveform::Step { .. } => WaveformKind::Step,
            CurrentWaveform::Ramp { .. } => WaveformKind::Ramp,
            CurrentWaveform::Sinusoid { .. } => WaveformKind::Sinusoid,
            CurrentWaveform::Tabulated { .. } => WaveformKind::Tabulated,
        }
    }

    /// Current (µA) at time `t` (ms)
    pub fn current(&self, t: f64) -> f64 {
        match *self {
            CurrentWaveform::Zero => 0.,
            CurrentWaveform::Step { t_start, t_end, amplitude } => {
                if t >= t_start && t <= t_end {
                    amplitude
                } else {
                    0.
                }
            },
            CurrentWaveform::Ramp { t_start, t_end, amplitude_start, amplitude_end } => {
                if t_end > t_start && t >= t_start && t <= t_end {
                    let fraction = (t - t_start) / (t_end - t_start);
                    amplitude_start + (amplitude_end - amplitude_start) * fraction
                } else {
                    0.
                }
            },
            CurrentWaveform::Sinusoid {
                t_start, t_end, amplitude, frequency, direct_current, phase_offset,
            } => {
                if t_end > t_start && t >= t_start && t <= t_end {
                    // frequency is in Hz while time is in ms
                    let phi = 2. * PI * frequency * (t - t_start) * 1e-3 + phase_offset;
                    direct_current + amplitude * phi.sin()
                } else {
                    0.
                }
            },
            CurrentWaveform::Tabulated { dt, ref samples } => {
                if t < 0. || dt <= 0. {
                    return 0.;
                }

                samples.get((t / dt).floor() as usize)
                    .copied()
                    .unwrap_or(0.)
            },
        }
    }

    /// Samples the waveform every `dt` over `[0, duration]` into a piecewise constant waveform,
    /// sampling at `1` ms gives the time array stimulus of a `1` ms clock
    pub fn discretize(&self, dt: f64, duration: f64) -> Result<Self, ParameterError> {
        if !(dt > 0.) || !dt.is_finite() {
            return Err(ParameterError::invalid_range("dt", "resolution must be positive"));
        }
        if !(duration >= 0.) || !duration.is_finite() {
            return Err(ParameterError::invalid_range("simulation time", "duration must not be negative"));
        }

        let num_samples = (duration / dt).round() as usize + 1;
        let samples = (0..num_samples)
            .map(|i| self.current(i as f64 * dt))
            .collect();

        Ok(CurrentWaveform::Tabulated { dt, samples })
    }
}

impl Default for CurrentWaveform {
    fn default() -> Self {
        CurrentWaveform::Zero
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("step".parse::<WaveformKind>().unwrap(), WaveformKind::Step);
        assert_eq!("2".parse::<WaveformKind>().unwrap(), WaveformKind::Ramp);
        assert_eq!(" Sin ".parse::<WaveformKind>().unwrap(), WaveformKind::Sinusoid);
        assert!("square".parse::<WaveformKind>().is_err());
    }

    #[test]
    fn test_kind_round_trips_through_display() {
        for kind in WaveformKind::selectable() {
            assert_eq!(kind.to_string().parse::<WaveformKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_degenerate_ramp_is_zero() {
        let ramp = CurrentWaveform::ramp(5., 5., 1., 2.).unwrap();

        assert_eq!(ramp.current(5.), 0.);
    }

    #[test]
    fn test_tabulated_holds_samples() {
        let step = CurrentWaveform::step(2., 4., 3.).unwrap();
        let tabulated = step.discretize(1., 10.).unwrap();

        assert_eq!(tabulated.current(1.5), 0.);
        assert_eq!(tabulated.current(2.5), 3.);
        assert_eq!(tabulated.current(4.9), 3.);
        assert_eq!(tabulated.current(5.), 0.);
        assert_eq!(tabulated.current(100.), 0.);
    }
}
