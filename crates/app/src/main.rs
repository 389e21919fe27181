//! Steering simulation demo
//!
//! Usage: `steer-sim-app [--verbose] [scenario.json]`
//!
//! The scenario file is a `SimulationConfig` in JSON (angles in degrees,
//! gravity as a number or preset name); missing fields take their defaults.
//! Without a file the lunar rover scenario below is used.

use std::error::Error;
use std::fs;

use control::PidPreset;
use log::{debug, info, warn};
use mechanics::FrictionModel;
use serde::Serialize;
use session::{SessionRegistry, SimulationConfig, SweepParameter, SweepRequest};
use simcore::{GravityPreset, STABILITY_TIME_STEP, VehicleParams};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

// Scenario
const TARGET_ANGLE_DEG: f64 = 15.0;
const RUN_DURATION: f64 = 10.0; // s
const SWEEP_DURATION: f64 = 5.0; // s
const SWEEP_FRICTION: [f64; 4] = [0.3, 0.5, 0.7, 0.9];

#[derive(Serialize)]
struct Report<'a> {
    config: &'a SimulationConfig,
    final_state: simcore::VehicleState,
    statistics: session::SummaryStatistics,
    friction_sweep: session::SweepReport,
}

fn lunar_rover() -> SimulationConfig {
    SimulationConfig::new(VehicleParams::new(500.0, GravityPreset::Moon.acceleration(), 0.7))
        .with_pid_gains(PidPreset::Balanced)
        .with_initial_velocity(10.0)
        .with_time_step(0.1)
}

fn load_config(path: Option<&str>) -> Result<SimulationConfig, Box<dyn Error>> {
    match path {
        Some(path) => {
            info!("loading scenario from {path}");
            let text = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(lunar_rover()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    let path = args.iter().find(|a| !a.starts_with('-')).map(String::as_str);

    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto)?;

    let config = load_config(path)?;
    let friction = FrictionModel::from_params(&config.vehicle);
    info!(
        "vehicle: {} kg, g = {} m/s^2, mu = {}, grip envelope {:.1} N",
        config.vehicle.mass, config.vehicle.gravity, config.vehicle.friction_coefficient, friction.max_friction_force
    );

    if config.time_step > STABILITY_TIME_STEP {
        warn!(
            "time step {} s is above {STABILITY_TIME_STEP} s, heading/position integration may diverge",
            config.time_step
        );
    }

    let registry = SessionRegistry::new();
    let (id, _) = registry.create(config.clone())?;
    info!("created simulation {id}");
    let target = TARGET_ANGLE_DEG.to_radians();

    let trace = registry.run(id, RUN_DURATION, target)?;
    let slip_steps = trace.iter().filter(|s| !s.diagnostics.can_turn).count();
    if slip_steps > 0 {
        warn!("tires past the friction limit for {slip_steps} of {} steps", trace.len());
    }

    let (final_state, _) = registry.snapshot(id)?;
    let statistics = registry.statistics(id)?;
    info!(
        "after {RUN_DURATION} s: steering {:.2} deg (target {TARGET_ANGLE_DEG} deg), heading {:.1} deg",
        final_state.steering_angle.to_degrees(),
        final_state.heading.to_degrees()
    );

    let request = SweepRequest::new(
        SweepParameter::FrictionCoefficient,
        SWEEP_FRICTION.to_vec(),
        SWEEP_DURATION,
        target,
    )
    .with_base_config(config.clone());
    debug!("sweeping friction over {SWEEP_FRICTION:?} for {SWEEP_DURATION} s each");
    let friction_sweep = registry.parameter_sweep(&request)?;
    info!(
        "friction sweep: {}/{} iterations completed",
        friction_sweep.successful_iterations, friction_sweep.total_iterations
    );

    registry.delete(id)?;
    info!("deleted simulation {id}");

    let report = Report {
        config: &config,
        final_state,
        statistics,
        friction_sweep,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
