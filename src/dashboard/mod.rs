//! Presentation model of the dashboard, editing a table or selecting a waveform kind
//! recomputes the figure synchronously, and an input that cannot be simulated leaves
//! the previous figure in place

use serde::Serialize;
use tracing::{info, warn};
use crate::analysis::{find_peaks, get_summary, ActionPotentialSummary};
use crate::current::WaveformKind;
use crate::error::{ParameterError, TableError};
use crate::neuron::{
    hodgkin_huxley::{simulate, SimulationResult},
    SimulationSettings,
};
use crate::parameters::{
    build_waveform, default_tables, CurrentTable, ParameterMap, ParameterSet, ParameterTable,
};


/// A line or marker series drawn in one panel of the figure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    /// Legend label
    pub name: String,
    /// Panel the trace is drawn in, `1` is the top panel
    pub panel: usize,
    /// `lines` or `markers`
    pub mode: &'static str,
    /// Times (ms)
    pub x: Vec<f64>,
    /// Values
    pub y: Vec<f64>,
}

/// Three panels sharing the time axis, voltage on top, gating variables in the
/// middle, and injected current at the bottom
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    /// Shared x axis title
    pub x_title: &'static str,
    /// Y axis title of each panel from top to bottom
    pub panel_titles: [&'static str; 3],
    /// Series of every panel
    pub traces: Vec<Trace>,
    /// Spiking summary of the voltage trace
    pub summary: ActionPotentialSummary,
}

impl Figure {
    /// Builds the figure of a simulation
    pub fn from_result(result: &SimulationResult) -> Self {
        let times = result.times();
        let voltages = result.voltages();

        let peaks = find_peaks(&voltages, 0.);
        let spike_marker = Trace {
            name: String::from("spikes"),
            panel: 1,
            mode: "markers",
            x: peaks.iter().map(|i| times[*i]).collect(),
            y: peaks.iter().map(|i| voltages[*i]).collect(),
        };

        let line = |name: &str, panel: usize, y: Vec<f64>| Trace {
            name: String::from(name),
            panel,
            mode: "lines",
            x: times.clone(),
            y,
        };

        let traces = vec![
            line("V", 1, voltages.clone()),
            spike_marker,
            line("h", 2, result.h()),
            line("n", 2, result.n()),
            line("m", 2, result.m()),
            line("I", 3, result.currents()),
        ];

        Figure {
            x_title: "Time (ms)",
            panel_titles: ["V (mV)", "gating", "I (µA)"],
            traces,
            summary: get_summary(result),
        }
    }
}

/// Runs a simulation from the values of the neuron table and the values of the
/// current rows used by `kind`, missing or out of range values refuse to simulate
pub fn simulate_tables(
    parameters: &ParameterTable,
    current_values: &ParameterMap,
    kind: WaveformKind,
    settings: &SimulationSettings,
) -> Result<SimulationResult, ParameterError> {
    let waveform = build_waveform(kind, current_values)?;
    let parameter_set = ParameterSet::from_table(parameters)?;

    simulate(&parameter_set, &waveform, settings)
}

/// Outcome of an input change
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// The figure was recomputed
    Redrawn,
    /// The inputs cannot be simulated, the previous figure is kept
    Blocked(ParameterError),
}

/// Editable tables, the selected waveform kind, and the last drawn figure
#[derive(Debug, Clone)]
pub struct Dashboard {
    /// Neuron parameter table
    pub parameters: ParameterTable,
    /// Current table holding the rows of every kind
    pub currents: CurrentTable,
    /// Selected waveform kind
    pub kind: WaveformKind,
    /// Integration settings
    pub settings: SimulationSettings,
    figure: Option<Figure>,
}

impl Dashboard {
    /// Creates a dashboard that has not drawn anything yet
    pub fn new(parameters: ParameterTable, currents: CurrentTable, kind: WaveformKind) -> Self {
        Dashboard {
            parameters,
            currents,
            kind,
            settings: SimulationSettings::default(),
            figure: None,
        }
    }

    /// Creates a dashboard over the bundled tables with a step current selected
    pub fn from_default_tables() -> Result<Self, TableError> {
        let (parameters, currents) = default_tables()?;

        Ok(Dashboard::new(parameters, currents, WaveformKind::Step))
    }

    /// Rows of the current table shown for the selected kind
    pub fn visible_currents(&self) -> CurrentTable {
        self.currents.filter(self.kind)
    }

    /// Last successfully drawn figure
    pub fn figure(&self) -> Option<&Figure> {
        self.figure.as_ref()
    }

    /// Simulates the current inputs without touching the drawn figure
    pub fn compute(&self) -> Result<SimulationResult, ParameterError> {
        simulate_tables(&self.parameters, &self.currents.values(self.kind), self.kind, &self.settings)
    }

    /// Recomputes the figure, keeps the previous one if the inputs are blocked
    pub fn update(&mut self) -> Update {
        match self.compute() {
            Ok(result) => {
                let figure = Figure::from_result(&result);
                info!(
                    kind = %self.kind, samples = result.len(), spikes = figure.summary.num_spikes,
                    "redrew dashboard"
                );
                self.figure = Some(figure);

                Update::Redrawn
            },
            Err(err) => {
                warn!(kind = %self.kind, error = %err, "dashboard update blocked");

                Update::Blocked(err)
            },
        }
    }

    /// Selects a waveform kind and recomputes
    pub fn select_kind(&mut self, kind: WaveformKind) -> Update {
        self.kind = kind;
        self.update()
    }

    /// Edits a neuron parameter and recomputes
    pub fn edit_parameter(&mut self, name: &str, value: Option<f64>) -> Update {
        if !self.parameters.set(name, value) {
            warn!(name, "edited parameter is not in the table");
        }
        self.update()
    }

    /// Edits a current parameter of the selected kind and recomputes
    pub fn edit_current(&mut self, name: &str, value: Option<f64>) -> Update {
        if !self.currents.set(self.kind, name, value) {
            warn!(name, kind = %self.kind, "edited current parameter is not in the table");
        }
        self.update()
    }
}
