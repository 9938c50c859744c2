use std::{
    fs::File,
    io::BufWriter,
    path::PathBuf,
};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use hodgkin_huxley_dashboard::{
    analysis::sweep_step_amplitudes,
    config::RunConfig,
    error::HodgkinHuxleyError,
    neuron::{hodgkin_huxley::simulate, IntegrationMethod, SimulationSettings},
    parameters::{build_waveform, default_tables, load_tables, CurrentTable, ParameterSet, ParameterTable},
    current::WaveformKind,
    server::{serve, AppState},
};


#[derive(Debug, Parser)]
#[command(name = "hh-dashboard", version, about = "Hodgkin Huxley neuron dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serves the interactive dashboard
    Serve {
        /// Port to listen on
        #[arg(long, default_value_t = 8000)]
        port: u16,
        /// Combined parameter and current table, the bundled table if not given
        #[arg(long)]
        table: Option<PathBuf>,
    },
    /// Runs one simulation described by a `.toml` file and writes it as `.csv`
    Run {
        /// Run configuration
        config: PathBuf,
    },
    /// Runs step currents of several amplitudes in parallel and prints their spiking
    Sweep {
        /// Combined parameter and current table, the bundled table if not given
        #[arg(long)]
        table: Option<PathBuf>,
        /// Step amplitudes (µA)
        #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
        amplitudes: Vec<f64>,
        /// Integration timestep (ms)
        #[arg(long, default_value_t = 0.01)]
        dt: f64,
        /// Integration scheme, `exponential_euler` or `rk4`
        #[arg(long, default_value = "exponential_euler")]
        method: String,
    },
}

fn tables(path: Option<&PathBuf>) -> Result<(ParameterTable, CurrentTable), HodgkinHuxleyError> {
    let tables = match path {
        Some(path) => load_tables(path)?,
        None => default_tables()?,
    };

    Ok(tables)
}

fn run(config: &RunConfig) -> Result<(), HodgkinHuxleyError> {
    let (mut parameters, mut currents) = tables(config.table.as_ref())?;
    config.apply(&mut parameters, &mut currents)?;

    let parameter_set = ParameterSet::from_table(&parameters)?;
    let mut waveform = build_waveform(config.kind, &currents.values(config.kind))?;
    if let Some(resolution) = config.discretize {
        waveform = waveform.discretize(resolution, parameter_set.duration)?;
    }

    let result = simulate(&parameter_set, &waveform, &config.settings)?;

    let file = BufWriter::new(File::create(&config.filename)?);
    result.write_csv(file)?;

    info!(
        filename = %config.filename, samples = result.len(), spikes = result.spike_times.len(),
        "finished run"
    );

    Ok(())
}

fn sweep(
    table: Option<&PathBuf>,
    amplitudes: &[f64],
    settings: &SimulationSettings,
) -> Result<(), HodgkinHuxleyError> {
    let (parameters, currents) = tables(table)?;
    let parameter_set = ParameterSet::from_table(&parameters)?;
    let values = currents.values(WaveformKind::Step);

    let points = sweep_step_amplitudes(
        &parameter_set,
        values.require("start time")?,
        values.require("end time")?,
        amplitudes,
        settings,
    )?;

    println!("amplitude,num_spikes,firing_rate,average_spike_time_difference,max_voltage");
    for point in points {
        println!(
            "{},{},{},{},{}",
            point.amplitude,
            point.summary.num_spikes,
            point.summary.firing_rate,
            point.summary.average_spike_time_difference,
            point.summary.max_voltage,
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), HodgkinHuxleyError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Cli::parse().command {
        Command::Serve { port, table } => {
            let (parameters, currents) = tables(table.as_ref())?;
            serve(AppState::new(parameters, currents), port).await?;
        },
        Command::Run { config } => {
            let config = RunConfig::from_file(&config)?;
            info!(kind = %config.kind, method = %config.settings.method, "starting run");
            tokio::task::block_in_place(|| run(&config))?;
        },
        Command::Sweep { table, amplitudes, dt, method } => {
            let settings = SimulationSettings {
                dt,
                record_interval: dt * 10.,
                method: method.parse::<IntegrationMethod>()?,
            };
            tokio::task::block_in_place(|| sweep(table.as_ref(), &amplitudes, &settings))?;
        },
    }

    Ok(())
}
