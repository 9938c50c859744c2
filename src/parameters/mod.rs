//! Editable parameter and current tables, and their conversion into a validated
//! [`ParameterSet`] and [`CurrentWaveform`]
//!
//! Tables are made of `(parameter, unit, value)` rows, current rows additionally
//! carry `step`, `ramp`, and `sin` flags marking which waveform kinds use them.
//! A value that is blank or not a number is kept in the table as absent and only
//! becomes an error once a simulation needs it.

use std::{
    collections::HashMap,
    fmt::{Formatter, Result as FmtResult},
    fs::File,
    io::Read,
    path::Path,
};
use serde::{
    de::{self, Deserializer, Visitor},
    Deserialize, Serialize,
};
use crate::current::{CurrentWaveform, WaveformKind};
use crate::error::{ParameterError, TableError};


/// Combined parameter and current table shipped with the dashboard
pub const DEFAULT_TABLE: &str = include_str!("../../data/HH.csv");

/// Names the neuron parameter table is searched for
pub const PARAMETER_NAMES: [&str; 9] = ["El", "Ek", "Ena", "gl", "gk", "gna", "C", "v0", "simulation time"];

/// Parses a table cell as a finite number, anything else is absent
pub fn parse_value(cell: &str) -> Option<f64> {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|i| i.is_finite())
}

/// Parses a boolean-like table cell, `1`, `true`, and `yes` are set
pub fn parse_flag(cell: &str) -> bool {
    let cell = cell.trim().to_ascii_lowercase();

    matches!(cell.as_str(), "true" | "yes" | "y") || parse_value(&cell).is_some_and(|i| i != 0.)
}

struct LenientNumberVisitor;

impl<'de> Visitor<'de> for LenientNumberVisitor {
    type Value = Option<f64>;

    fn expecting(&self, formatter: &mut Formatter) -> FmtResult {
        formatter.write_str("a number, a numeric string, or null")
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(Some(value).filter(|i| i.is_finite()))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(Some(value as f64))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Some(value as f64))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(parse_value(value))
    }

    fn visit_bool<E: de::Error>(self, _value: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(LenientNumberVisitor)
    }
}

fn deserialize_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    deserializer.deserialize_any(LenientNumberVisitor)
}

struct LenientFlagVisitor;

impl<'de> Visitor<'de> for LenientFlagVisitor {
    type Value = bool;

    fn expecting(&self, formatter: &mut Formatter) -> FmtResult {
        formatter.write_str("a boolean, a number, or a string")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(value)
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(value != 0.)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(value != 0)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(value != 0)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(parse_flag(value))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(false)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(false)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(LenientFlagVisitor)
    }
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    deserializer.deserialize_any(LenientFlagVisitor)
}

/// Values looked up by name, a name whose row is blank or not a number is
/// known but absent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterMap {
    values: HashMap<String, Option<f64>>,
}

impl ParameterMap {
    /// Value of `name` if it is present
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied().flatten()
    }

    /// Value of `name`, or [`ParameterError::MissingParameter`] if it is absent
    pub fn require(&self, name: &str) -> Result<f64, ParameterError> {
        self.get(name).ok_or_else(|| ParameterError::missing(name))
    }

    /// Whether a row named `name` exists, with or without a value
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Sets `name` to `value`
    pub fn insert(&mut self, name: &str, value: f64) {
        self.values.insert(String::from(name), Some(value));
    }

    /// Removes `name`, returning its value if it had one
    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.values.remove(name).flatten()
    }

    /// Number of present values
    pub fn len(&self) -> usize {
        self.values.values().filter(|i| i.is_some()).count()
    }

    /// Whether no values are present
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn from_rows<'a>(rows: impl Iterator<Item = (&'a str, Option<f64>)>) -> Self {
        let mut values = HashMap::new();
        for (name, value) in rows {
            // the first row carrying a name decides it, even when that row is blank
            values.entry(String::from(name)).or_insert(value);
        }

        ParameterMap { values }
    }
}

/// A `(parameter, unit, value)` row of the neuron parameter table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRow {
    /// Name used for lookups
    pub parameter: String,
    /// Display unit
    #[serde(default)]
    pub unit: String,
    /// Edited value
    #[serde(default, deserialize_with = "deserialize_value")]
    pub value: Option<f64>,
}

/// A row of the current table, flags mark which waveform kinds use the row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentRow {
    /// Name used for lookups
    pub parameter: String,
    /// Display unit
    #[serde(default)]
    pub unit: String,
    /// Edited value
    #[serde(default, deserialize_with = "deserialize_value")]
    pub value: Option<f64>,
    /// Used by step currents
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub step: bool,
    /// Used by ramp currents
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub ramp: bool,
    /// Used by sinusoidal currents
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub sin: bool,
}

impl CurrentRow {
    /// Whether the row belongs to the given waveform kind
    pub fn belongs_to(&self, kind: WaveformKind) -> bool {
        match kind {
            WaveformKind::Step => self.step,
            WaveformKind::Ramp => self.ramp,
            WaveformKind::Sinusoid => self.sin,
            WaveformKind::Zero | WaveformKind::Tabulated => false,
        }
    }
}

/// Neuron parameter table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterTable {
    /// Rows in display order
    pub rows: Vec<ParameterRow>,
}

impl ParameterTable {
    /// Name to value mapping of the table
    pub fn values(&self) -> ParameterMap {
        ParameterMap::from_rows(self.rows.iter().map(|i| (i.parameter.as_str(), i.value)))
    }

    /// Value of the first row named `name`
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values().get(name)
    }

    /// Edits every row named `name`, returns whether a row was found
    pub fn set(&mut self, name: &str, value: Option<f64>) -> bool {
        let mut found = false;
        for row in self.rows.iter_mut().filter(|i| i.parameter == name) {
            row.value = value;
            found = true;
        }

        found
    }
}

/// Current table holding the rows of every waveform kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrentTable {
    /// Rows in display order
    pub rows: Vec<CurrentRow>,
}

impl CurrentTable {
    /// Rows used by `kind`, as shown when the kind is selected
    pub fn filter(&self, kind: WaveformKind) -> CurrentTable {
        CurrentTable {
            rows: self.rows.iter()
                .filter(|i| i.belongs_to(kind))
                .cloned()
                .collect(),
        }
    }

    /// Name to value mapping of the rows used by `kind`
    pub fn values(&self, kind: WaveformKind) -> ParameterMap {
        ParameterMap::from_rows(
            self.rows.iter()
                .filter(|i| i.belongs_to(kind))
                .map(|i| (i.parameter.as_str(), i.value))
        )
    }

    /// Name to value mapping of every row regardless of kind
    pub fn all_values(&self) -> ParameterMap {
        ParameterMap::from_rows(self.rows.iter().map(|i| (i.parameter.as_str(), i.value)))
    }

    /// Whether any row is marked as used by some kind
    pub fn has_flags(&self) -> bool {
        self.rows.iter().any(|i| i.step || i.ramp || i.sin)
    }

    /// Values for `kind` from a table that may or may not carry kind flags, flagged
    /// rows are filtered by `kind` and a table without any flags is taken as is
    pub fn values_for(&self, kind: WaveformKind) -> ParameterMap {
        if self.has_flags() {
            self.values(kind)
        } else {
            self.all_values()
        }
    }

    /// Edits the rows named `name` that are used by `kind`, returns whether a row was found
    pub fn set(&mut self, kind: WaveformKind, name: &str, value: Option<f64>) -> bool {
        let mut found = false;
        for row in self.rows.iter_mut().filter(|i| i.parameter == name && i.belongs_to(kind)) {
            row.value = value;
            found = true;
        }

        found
    }
}

#[derive(Debug, Deserialize)]
struct CombinedRow {
    category: String,
    parameter: String,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    step: String,
    #[serde(default)]
    ramp: String,
    #[serde(default)]
    sin: String,
}

/// Reads a combined table with `category,parameter,unit,value,step,ramp,sin` columns,
/// `par` rows make up the parameter table and `cur` rows the current table
pub fn read_tables<R: Read>(reader: R) -> Result<(ParameterTable, CurrentTable), TableError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut parameters = ParameterTable::default();
    let mut currents = CurrentTable::default();

    for row in csv_reader.deserialize::<CombinedRow>() {
        let row = row?;

        match row.category.to_ascii_lowercase().as_str() {
            "par" => parameters.rows.push(ParameterRow {
                parameter: row.parameter,
                unit: row.unit,
                value: parse_value(&row.value),
            }),
            "cur" => currents.rows.push(CurrentRow {
                parameter: row.parameter,
                unit: row.unit,
                value: parse_value(&row.value),
                step: parse_flag(&row.step),
                ramp: parse_flag(&row.ramp),
                sin: parse_flag(&row.sin),
            }),
            _ => return Err(TableError::UnknownCategory(row.category)),
        }
    }

    Ok((parameters, currents))
}

/// Reads a combined table from a file, see [`read_tables`]
pub fn load_tables(path: impl AsRef<Path>) -> Result<(ParameterTable, CurrentTable), TableError> {
    read_tables(File::open(path)?)
}

/// Tables of [`DEFAULT_TABLE`]
pub fn default_tables() -> Result<(ParameterTable, CurrentTable), TableError> {
    read_tables(DEFAULT_TABLE.as_bytes())
}

/// Neuron parameters of a simulation, voltages in (mV), conductances in (mS),
/// capacitance in (µF), duration in (ms)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Leak reversal potential (mV)
    pub e_l: f64,
    /// Potassium reversal potential (mV)
    pub e_k: f64,
    /// Sodium reversal potential (mV)
    pub e_na: f64,
    /// Leak conductance (mS)
    pub g_l: f64,
    /// Maximal potassium conductance (mS)
    pub g_k: f64,
    /// Maximal sodium conductance (mS)
    pub g_na: f64,
    /// Membrane capacitance (µF)
    pub c_m: f64,
    /// Initial membrane potential (mV)
    pub v_init: f64,
    /// Total simulated time (ms)
    pub duration: f64,
}

impl Default for ParameterSet {
    fn default() -> Self {
        ParameterSet {
            e_l: -59.,
            e_k: -82.,
            e_na: 45.,
            g_l: 0.003,
            g_k: 0.36,
            g_na: 1.2,
            c_m: 0.01,
            v_init: -65.,
            duration: 200.,
        }
    }
}

impl ParameterSet {
    /// Builds the set from table values, every name in [`PARAMETER_NAMES`] is required
    pub fn from_values(values: &ParameterMap) -> Result<Self, ParameterError> {
        let parameters = ParameterSet {
            e_l: values.require("El")?,
            e_k: values.require("Ek")?,
            e_na: values.require("Ena")?,
            g_l: values.require("gl")?,
            g_k: values.require("gk")?,
            g_na: values.require("gna")?,
            c_m: values.require("C")?,
            v_init: values.require("v0")?,
            duration: values.require("simulation time")?,
        };
        parameters.validate()?;

        Ok(parameters)
    }

    /// Builds the set from a parameter table
    pub fn from_table(table: &ParameterTable) -> Result<Self, ParameterError> {
        ParameterSet::from_values(&table.values())
    }

    /// Checks that conductances, capacitance, and duration are positive and every value is finite
    pub fn validate(&self) -> Result<(), ParameterError> {
        let values = [
            ("El", self.e_l), ("Ek", self.e_k), ("Ena", self.e_na), ("gl", self.g_l), ("gk", self.g_k),
            ("gna", self.g_na), ("C", self.c_m), ("v0", self.v_init), ("simulation time", self.duration),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                return Err(ParameterError::invalid_range(name, format!("{} is not finite", value)));
            }
        }

        let positive = [
            ("gl", self.g_l), ("gk", self.g_k), ("gna", self.g_na), ("C", self.c_m), ("simulation time", self.duration),
        ];
        for (name, value) in positive {
            if value <= 0. {
                return Err(ParameterError::invalid_range(name, format!("must be positive, got {}", value)));
            }
        }

        Ok(())
    }
}

/// Builds a waveform of `kind` from current table values, refuses with
/// [`ParameterError::MissingParameter`] when a required value is absent
pub fn build_waveform(kind: WaveformKind, values: &ParameterMap) -> Result<CurrentWaveform, ParameterError> {
    if let Some(missing) = kind.required_parameters().iter().find(|i| values.get(i).is_none()) {
        return Err(ParameterError::missing(missing));
    }

    match kind {
        WaveformKind::Zero => Ok(CurrentWaveform::zero()),
        WaveformKind::Step => CurrentWaveform::step(
            values.require("start time")?,
            values.require("end time")?,
            values.require("amplitude")?,
        ),
        WaveformKind::Ramp => CurrentWaveform::ramp(
            values.require("start time")?,
            values.require("end time")?,
            values.require("amplitude start")?,
            values.require("amplitude end")?,
        ),
        WaveformKind::Sinusoid => CurrentWaveform::sinusoid(
            values.require("start time")?,
            values.require("end time")?,
            values.require("amplitude")?,
            values.require("frequency")?,
            values.require("direct current")?,
            values.require("phase offset")?,
        ),
        WaveformKind::Tabulated => Err(
            ParameterError::invalid_range("kind", "tabulated currents cannot be built from a table")
        ),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value(" -59 "), Some(-59.));
        assert_eq!(parse_value("0.003"), Some(0.003));
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("abc"), None);
        assert_eq!(parse_value("NaN"), None);
        assert_eq!(parse_value("inf"), None);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("1.0"));
        assert!(parse_flag("True"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_first_row_decides_value() {
        let table = ParameterTable {
            rows: vec![
                ParameterRow { parameter: String::from("C"), unit: String::from("uF"), value: None },
                ParameterRow { parameter: String::from("C"), unit: String::from("uF"), value: Some(0.01) },
            ],
        };

        assert_eq!(table.get("C"), None);
        assert!(table.values().contains("C"));
        assert!(!table.values().contains("Ek"));
        assert!(table.values().is_empty());
    }

    #[test]
    fn test_unflagged_rows_used_for_any_kind() {
        let row = |name: &str, value: f64, step: bool, sin: bool| CurrentRow {
            parameter: String::from(name),
            unit: String::new(),
            value: Some(value),
            step,
            ramp: false,
            sin,
        };

        let flagged = CurrentTable {
            rows: vec![row("amplitude", 7., true, false), row("amplitude", 3., false, true)],
        };
        assert_eq!(flagged.values_for(WaveformKind::Sinusoid).get("amplitude"), Some(3.));
        assert_eq!(flagged.values_for(WaveformKind::Step).get("amplitude"), Some(7.));

        let unflagged = CurrentTable { rows: vec![row("amplitude", 3., false, false)] };
        assert_eq!(unflagged.values_for(WaveformKind::Sinusoid).get("amplitude"), Some(3.));
    }

    #[test]
    fn test_json_rows_accept_strings_and_nulls() {
        let rows: Vec<ParameterRow> = serde_json::from_str(
            r#"[
                {"parameter": "El", "unit": "mV", "value": -59},
                {"parameter": "Ek", "unit": "mV", "value": "-82"},
                {"parameter": "C", "unit": "uF", "value": null},
                {"parameter": "gl", "unit": "mS", "value": "x"}
            ]"#
        ).unwrap();

        assert_eq!(rows[0].value, Some(-59.));
        assert_eq!(rows[1].value, Some(-82.));
        assert_eq!(rows[2].value, None);
        assert_eq!(rows[3].value, None);
    }

    #[test]
    fn test_json_current_rows_accept_numeric_flags() {
        let row: CurrentRow = serde_json::from_str(
            r#"{"parameter": "amplitude", "unit": "uA", "value": 7, "step": 1, "ramp": 0, "sin": false}"#
        ).unwrap();

        assert!(row.step);
        assert!(!row.ramp);
        assert!(!row.sin);
    }
}
