use thiserror::Error;


/// Error set for parameters that cannot be turned into a simulation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    /// A required named value is absent from its table or could not be parsed
    #[error("Parameter '{0}' is missing or is not a number")]
    MissingParameter(String),
    /// A value is present but outside of its allowed range
    #[error("Parameter '{name}' is out of range: {reason}")]
    InvalidRange {
        /// Name of the offending parameter
        name: String,
        /// Why the value was rejected
        reason: String,
    },
}

impl ParameterError {
    /// Shorthand for a missing parameter error
    pub fn missing(name: &str) -> Self {
        ParameterError::MissingParameter(String::from(name))
    }

    /// Shorthand for a range error
    pub fn invalid_range(name: &str, reason: impl Into<String>) -> Self {
        ParameterError::InvalidRange { name: String::from(name), reason: reason.into() }
    }
}

/// Error set for reading parameter and current tables
#[derive(Debug, Error)]
pub enum TableError {
    /// Table file could not be opened or read
    #[error("Cannot read table: {0}")]
    Io(#[from] std::io::Error),
    /// Table rows are malformed
    #[error("Cannot parse table: {0}")]
    Csv(#[from] csv::Error),
    /// Row category is neither `par` nor `cur`
    #[error("Unknown row category '{0}' (expected 'par' or 'cur')")]
    UnknownCategory(String),
    /// Waveform kind label cannot be recognized
    #[error("Unknown waveform kind '{0}' (expected step, ramp, or sin)")]
    UnknownWaveformKind(String),
}

/// Error set for run configuration files
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Cannot read config: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration file is not valid toml
    #[error("Cannot parse config: {0}")]
    Toml(#[from] toml::de::Error),
    /// A required table or key is not present
    #[error("'{0}' value not found")]
    MissingKey(String),
    /// An override names a value the run does not read
    #[error("Unknown {table} override '{name}'")]
    UnknownOverride {
        /// Override table the name was found in
        table: &'static str,
        /// Offending name
        name: String,
    },
    /// A key is present but has the wrong type
    #[error("Cannot parse {field} as {expected}")]
    WrongType {
        /// Key that failed to parse
        field: String,
        /// Type the key should have
        expected: &'static str,
    },
}

/// A set of errors that may occur when using the library
#[derive(Debug, Error)]
pub enum HodgkinHuxleyError {
    /// Errors related to simulation parameters
    #[error(transparent)]
    ParameterRelatedError(#[from] ParameterError),
    /// Errors related to tables
    #[error(transparent)]
    TableRelatedError(#[from] TableError),
    /// Errors related to configuration
    #[error(transparent)]
    ConfigRelatedError(#[from] ConfigError),
    /// Errors writing output
    #[error("Cannot write output: {0}")]
    OutputRelatedError(#[from] std::io::Error),
}

impl From<csv::Error> for HodgkinHuxleyError {
    fn from(err: csv::Error) -> HodgkinHuxleyError {
        HodgkinHuxleyError::TableRelatedError(TableError::Csv(err))
    }
}
