use std::{
    fs::File,
    io::{BufWriter, Write},
};
extern crate hodgkin_huxley_dashboard;
use hodgkin_huxley_dashboard::{
    current::CurrentWaveform,
    error::HodgkinHuxleyError,
    neuron::{hodgkin_huxley::simulate, IntegrationMethod, SimulationSettings},
    parameters::ParameterSet,
};


// Runs the same step current through both integrators and writes both voltage
// traces to a .csv file at the working directory
fn main() -> Result<(), HodgkinHuxleyError> {
    let parameters = ParameterSet { duration: 100., ..ParameterSet::default() };
    let waveform = CurrentWaveform::step(10., 50., 7.)?;

    let exponential_euler = simulate(&parameters, &waveform, &SimulationSettings::default())?;
    let runge_kutta = simulate(
        &parameters,
        &waveform,
        &SimulationSettings { method: IntegrationMethod::RungeKutta4, ..SimulationSettings::default() },
    )?;

    let mut file = BufWriter::new(File::create("step_current.csv")?);

    writeln!(file, "t,exponential_euler,rk4,I")?;
    for (euler, rk4) in exponential_euler.samples.iter().zip(runge_kutta.samples.iter()) {
        writeln!(file, "{},{},{},{}", euler.t, euler.v, rk4.v, euler.current)?;
    }

    println!(
        "spikes: exponential euler {}, rk4 {}",
        exponential_euler.spike_times.len(),
        runge_kutta.spike_times.len(),
    );

    Ok(())
}
