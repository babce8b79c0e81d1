// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later
use std::time::Duration;

use franka_hw_test::{
    ControlLoop, ControllerException, ControllerRegistry, MockFrankaHw, ParameterStore,
    RealtimeConfig, UrdfModel, JOINT_TORQUE_LIMITS_CONTROLLER,
};

const PANDA_PARAMS: &str = include_str!("../demos/mock_franka_hw.toml");

fn control_loop(params: &ParameterStore) -> Result<ControlLoop<MockFrankaHw>, ControllerException> {
    let robot_hw = MockFrankaHw::from_params(params)?;
    let controller = ControllerRegistry::with_builtin_controllers()
        .create_controller(JOINT_TORQUE_LIMITS_CONTROLLER)?;
    ControlLoop::new(
        robot_hw,
        controller,
        params,
        Duration::from_millis(1),
        RealtimeConfig::Ignore,
    )
}

fn two_joint_params() -> ParameterStore {
    let mut params = ParameterStore::new();
    params.set_param(
        "robot_description",
        r#"<robot name="test">
            <joint name="j1" type="revolute"><limit effort="10" lower="-1" upper="1" velocity="1"/></joint>
            <joint name="j2" type="continuous"><limit effort="20" velocity="1"/></joint>
        </robot>"#,
    );
    params.set_param("/mock_franka_hw_node/joint_names", vec!["j1", "j2"]);
    params.set_param("/joint_torque_limits_controller/jitter_bound", 3.0f64);
    params
}

#[test]
fn two_joint_scenario() {
    let mut control_loop = control_loop(&two_joint_params()).unwrap();

    control_loop.spin_once();
    let commands = control_loop.robot_hw().commands();
    assert!((-13.0..=-10.).contains(&commands[0]), "{:?}", commands);
    assert!((-23.0..=-20.).contains(&commands[1]), "{:?}", commands);

    control_loop.spin_once();
    let commands = control_loop.robot_hw().commands();
    assert!((10.0..=13.).contains(&commands[0]), "{:?}", commands);
    assert!((20.0..=23.).contains(&commands[1]), "{:?}", commands);
}

#[test]
fn panda_commands_exceed_every_limit() {
    let params = ParameterStore::from_toml_str(PANDA_PARAMS).unwrap();
    let description = params.get_string("robot_description").unwrap().unwrap();
    let model = UrdfModel::from_str(&description).unwrap();
    let mut control_loop = control_loop(&params).unwrap();
    let joint_names = control_loop.robot_hw().joint_names();
    assert_eq!(joint_names.len(), 7);

    let mut signs = Vec::new();
    for _ in 0..200 {
        control_loop.spin_once();
        let commands = control_loop.robot_hw().commands();
        for (name, command) in joint_names.iter().zip(commands.iter()) {
            let max_effort = model.joint(name).unwrap().limits.unwrap().effort;
            let excess = command.abs() - max_effort;
            assert!((0. ..3.).contains(&excess), "{}: {}", name, command);
        }
        let sign = commands[0].is_sign_positive();
        assert!(commands.iter().all(|c| c.is_sign_positive() == sign));
        signs.push(sign);
    }
    for k in 0..signs.len() - 2 {
        assert_ne!(signs[k], signs[k + 1]);
        assert_eq!(signs[k], signs[k + 2]);
    }
    assert_eq!(control_loop.time(), Duration::from_millis(200));
}

#[test]
fn seeded_runs_are_reproducible() {
    let mut params = two_joint_params();
    params.set_param("/joint_torque_limits_controller/seed", 5i64);
    let mut a = control_loop(&params).unwrap();
    let mut b = control_loop(&params).unwrap();
    for _ in 0..20 {
        a.spin_once();
        b.spin_once();
        assert_eq!(a.robot_hw().commands(), b.robot_hw().commands());
    }
}

#[test]
fn unknown_joint_prevents_start() {
    let mut params = two_joint_params();
    params.set_param("/mock_franka_hw_node/joint_names", vec!["j1", "j2", "j3"]);
    match control_loop(&params) {
        Err(ControllerException::LimitResolutionFailure { joint, .. }) => assert_eq!(joint, "j3"),
        Err(e) => panic!("unexpected error {}", e),
        Ok(_) => panic!("controller must not start"),
    }
}

#[test]
fn hardware_without_effort_interface_prevents_start() {
    let params = two_joint_params();
    let controller = ControllerRegistry::with_builtin_controllers()
        .create_controller(JOINT_TORQUE_LIMITS_CONTROLLER)
        .unwrap();
    let result = ControlLoop::new(
        MockFrankaHw::without_effort_interface(&["j1", "j2"]),
        controller,
        &params,
        Duration::from_millis(1),
        RealtimeConfig::Ignore,
    );
    assert!(matches!(
        result,
        Err(ControllerException::InterfaceUnavailable { .. })
    ));
}
