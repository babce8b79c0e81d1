// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use franka_hw_test::{
    ControlLoop, ControllerRegistry, ControllerResult, MockFrankaHw, ParameterStore,
    RealtimeConfig, JOINT_TORQUE_LIMITS_CONTROLLER,
};

/// Runs the joint torque limits test controller against the mock hardware and prints the
/// commands which arrive at the hardware.
///
/// The controller commands efforts beyond the limit of every joint, so the printed values are
/// what a torque limiter in front of the robot has to catch.
#[derive(Parser, Debug)]
#[clap(author, version, name = "joint_torque_limits")]
struct CommandLineArguments {
    /// Parameter file (TOML) with `robot_description` and `mock_franka_hw_node.joint_names`
    #[clap(long, default_value = "demos/mock_franka_hw.toml")]
    pub config: PathBuf,
    /// URDF file which replaces the `robot_description` of the parameter file
    #[clap(long)]
    pub urdf: Option<PathBuf>,
    /// Number of control cycles to run
    #[clap(long, default_value_t = 10)]
    pub cycles: u32,
    /// Control period in milliseconds
    #[clap(long, default_value_t = 1)]
    pub period_ms: u64,
    /// Use this option to run the control loop with realtime priority
    #[clap(long, action)]
    pub realtime: bool,
}

fn main() -> ControllerResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = CommandLineArguments::parse();

    let mut params = ParameterStore::from_file(&args.config)?;
    if let Some(urdf) = &args.urdf {
        let description = std::fs::read_to_string(urdf).map_err(|e| {
            franka_hw_test::ControllerException::ConfigurationUnavailable {
                message: format!("could not read {}: {}", urdf.display(), e),
            }
        })?;
        params.set_param("robot_description", description);
    }
    let robot_hw = MockFrankaHw::from_params(&params)?;
    let registry = ControllerRegistry::with_builtin_controllers();
    let controller = registry.create_controller(JOINT_TORQUE_LIMITS_CONTROLLER)?;
    let realtime_config = match args.realtime {
        true => RealtimeConfig::Enforce,
        false => RealtimeConfig::Ignore,
    };
    let mut control_loop = ControlLoop::new(
        robot_hw,
        controller,
        &params,
        Duration::from_millis(args.period_ms),
        realtime_config,
    )?;
    control_loop.run(args.cycles);
    control_loop.stop();

    let robot_hw = control_loop.robot_hw();
    for (name, command) in robot_hw.joint_names().iter().zip(robot_hw.commands()) {
        println!("{}: {:.3} Nm", name, command);
    }
    Ok(())
}
