//! Run configuration read from a `.toml` file with a `[hodgkin_huxley]` table
//!
//! ```toml
//! [hodgkin_huxley]
//! table = "data/HH.csv"
//! kind = "step"
//! filename = "hodgkin_huxley.csv"
//! dt = 0.01
//! record_interval = 0.1
//! method = "exponential_euler"
//!
//! [hodgkin_huxley.parameters]
//! "simulation time" = 100
//!
//! [hodgkin_huxley.current]
//! "end time" = 50
//! amplitude = 7
//! ```

use std::{fs::read_to_string, path::{Path, PathBuf}};
use toml::Value;
use crate::current::WaveformKind;
use crate::error::ConfigError;
use crate::neuron::{IntegrationMethod, SimulationSettings};
use crate::parameters::{CurrentRow, CurrentTable, ParameterRow, ParameterTable, PARAMETER_NAMES};


fn parse_f64(value: &Value, field_name: &str) -> Result<f64, ConfigError> {
    value.as_float()
        .or_else(|| value.as_integer().map(|i| i as f64))
        .ok_or_else(|| ConfigError::WrongType { field: String::from(field_name), expected: "number" })
}

fn parse_string(value: &Value, field_name: &str) -> Result<String, ConfigError> {
    value.as_str()
        .map(String::from)
        .ok_or_else(|| ConfigError::WrongType { field: String::from(field_name), expected: "string" })
}

fn parse_value_with_default<T>(
    table: &Value,
    key: &str,
    parser: impl Fn(&Value, &str) -> Result<T, ConfigError>,
    default: T,
) -> Result<T, ConfigError> {
    table.get(key)
        .map_or(Ok(default), |value| parser(value, key))
}

fn parse_overrides(table: &Value, key: &str) -> Result<Vec<(String, f64)>, ConfigError> {
    let overrides = match table.get(key) {
        Some(value) => value.as_table()
            .ok_or_else(|| ConfigError::WrongType { field: String::from(key), expected: "table" })?,
        None => return Ok(vec![]),
    };

    overrides.iter()
        .map(|(name, value)| Ok((name.clone(), parse_f64(value, name)?)))
        .collect()
}

// `simulation_time` and `Simulation Time` both name the `simulation time` row
fn resolve_override(
    name: &str,
    known: &[&'static str],
    table: &'static str,
) -> Result<&'static str, ConfigError> {
    let spaced = name.trim().replace('_', " ");

    known.iter()
        .find(|i| i.eq_ignore_ascii_case(&spaced))
        .copied()
        .ok_or_else(|| ConfigError::UnknownOverride { table, name: String::from(name) })
}

/// Settings of a single simulation run from the command line
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Combined table to start from, the bundled table when absent
    pub table: Option<PathBuf>,
    /// Waveform kind to simulate
    pub kind: WaveformKind,
    /// Output `.csv` file
    pub filename: String,
    /// Integration settings
    pub settings: SimulationSettings,
    /// Resolution (ms) to sample the current at before simulating, if any
    pub discretize: Option<f64>,
    /// Neuron parameter values replacing table values
    pub parameter_overrides: Vec<(String, f64)>,
    /// Current values replacing table values of the selected kind
    pub current_overrides: Vec<(String, f64)>,
}

impl RunConfig {
    /// Parses the `[hodgkin_huxley]` table of a toml document
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Value = toml::from_str(content)?;
        let table = config.get("hodgkin_huxley")
            .ok_or_else(|| ConfigError::MissingKey(String::from("hodgkin_huxley")))?;

        let table_path = match table.get("table") {
            Some(value) => Some(PathBuf::from(parse_string(value, "table")?)),
            None => None,
        };

        let kind_label = parse_value_with_default(table, "kind", parse_string, String::from("step"))?;
        let kind = kind_label.parse::<WaveformKind>()
            .map_err(|_| ConfigError::WrongType { field: String::from("kind"), expected: "step, ramp, or sin" })?;

        let filename = match table.get("filename") {
            Some(value) => parse_string(value, "filename")?,
            None => return Err(ConfigError::MissingKey(String::from("filename"))),
        };

        let defaults = SimulationSettings::default();
        let method_label = parse_value_with_default(table, "method", parse_string, defaults.method.to_string())?;
        let settings = SimulationSettings {
            dt: parse_value_with_default(table, "dt", parse_f64, defaults.dt)?,
            record_interval: parse_value_with_default(table, "record_interval", parse_f64, defaults.record_interval)?,
            method: method_label.parse::<IntegrationMethod>()
                .map_err(|_| ConfigError::WrongType { field: String::from("method"), expected: "exponential_euler or rk4" })?,
        };

        let discretize = match table.get("discretize") {
            Some(value) => Some(parse_f64(value, "discretize")?),
            None => None,
        };

        Ok(RunConfig {
            table: table_path,
            kind,
            filename,
            settings,
            discretize,
            parameter_overrides: parse_overrides(table, "parameters")?,
            current_overrides: parse_overrides(table, "current")?,
        })
    }

    /// Reads and parses a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        RunConfig::from_toml(&read_to_string(path)?)
    }

    /// Writes the overrides into the tables, a name the table lacks is appended as a
    /// new row, names the run does not read are rejected
    pub fn apply(&self, parameters: &mut ParameterTable, currents: &mut CurrentTable) -> Result<(), ConfigError> {
        for (name, value) in &self.parameter_overrides {
            let name = resolve_override(name, &PARAMETER_NAMES, "parameters")?;
            if !parameters.set(name, Some(*value)) {
                parameters.rows.push(ParameterRow { parameter: String::from(name), unit: String::new(), value: Some(*value) });
            }
        }

        for (name, value) in &self.current_overrides {
            let name = resolve_override(name, self.kind.required_parameters(), "current")?;
            if !currents.set(self.kind, name, Some(*value)) {
                currents.rows.push(CurrentRow {
                    parameter: String::from(name),
                    unit: String::new(),
                    value: Some(*value),
                    step: self.kind == WaveformKind::Step,
                    ramp: self.kind == WaveformKind::Ramp,
                    sin: self.kind == WaveformKind::Sinusoid,
                });
            }
        }

        Ok(())
    }
}
