// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the joint limit descriptor and the sources it can be resolved from.
use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::exception::{ControllerException, ControllerResult};
use crate::urdf::{UrdfJoint, UrdfJointType, UrdfModel};

/// Torque, velocity and position limits of a single joint.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Default)]
pub struct JointLimits {
    /// Lower position limit in \[rad\] or \[m\]. Only meaningful if `has_position_limits`.
    pub min_position: f64,
    /// Upper position limit in \[rad\] or \[m\]. Only meaningful if `has_position_limits`.
    pub max_position: f64,
    /// Maximum velocity in \[rad/s\] or \[m/s\].
    pub max_velocity: f64,
    /// Maximum effort in \[Nm\] or \[N\].
    pub max_effort: f64,
    pub has_position_limits: bool,
    pub has_velocity_limits: bool,
    pub has_effort_limits: bool,
    /// Set for continuous joints, whose position wraps around.
    pub angle_wraparound: bool,
}

impl JointLimits {
    /// Creates limits which only bound the effort, e.g. for tests or hand-written configs.
    pub fn with_max_effort(max_effort: f64) -> Self {
        JointLimits {
            max_effort,
            has_effort_limits: true,
            ..JointLimits::default()
        }
    }
}

/// Extracts the limits of a URDF joint.
///
/// Revolute and prismatic joints get position limits from `lower`/`upper`, continuous joints
/// are marked as wrapping around. Velocity and effort limits are always taken over.
/// # Errors
/// * LimitResolutionFailure if the joint has no `<limit>` element.
pub fn get_joint_limits(urdf_joint: &UrdfJoint) -> ControllerResult<JointLimits> {
    let limits = urdf_joint
        .limits
        .as_ref()
        .ok_or_else(|| ControllerException::LimitResolutionFailure {
            joint: urdf_joint.name.clone(),
            message: "joint has no <limit> element".to_string(),
        })?;
    let has_position_limits = matches!(
        urdf_joint.joint_type,
        UrdfJointType::Revolute | UrdfJointType::Prismatic
    );
    Ok(JointLimits {
        min_position: if has_position_limits { limits.lower } else { 0. },
        max_position: if has_position_limits { limits.upper } else { 0. },
        max_velocity: limits.velocity,
        max_effort: limits.effort,
        has_position_limits,
        has_velocity_limits: true,
        has_effort_limits: true,
        angle_wraparound: urdf_joint.joint_type == UrdfJointType::Continuous,
    })
}

/// Anything which can provide the limits of a joint by its name.
pub trait JointLimitsSource {
    /// Resolves the limits of the joint called `joint_name`.
    /// # Errors
    /// * LimitResolutionFailure if the joint is unknown or has no limits.
    fn joint_limits(&self, joint_name: &str) -> ControllerResult<JointLimits>;
}

impl JointLimitsSource for UrdfModel {
    fn joint_limits(&self, joint_name: &str) -> ControllerResult<JointLimits> {
        let joint =
            self.joint(joint_name)
                .ok_or_else(|| ControllerException::LimitResolutionFailure {
                    joint: joint_name.to_string(),
                    message: format!("robot {} has no such joint", self.name()),
                })?;
        get_joint_limits(joint)
    }
}

impl JointLimitsSource for HashMap<String, JointLimits> {
    fn joint_limits(&self, joint_name: &str) -> ControllerResult<JointLimits> {
        self.get(joint_name)
            .copied()
            .ok_or_else(|| ControllerException::LimitResolutionFailure {
                joint: joint_name.to_string(),
                message: "no limits configured".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::exception::ControllerException;
    use crate::joint_limits::{get_joint_limits, JointLimits, JointLimitsSource};
    use crate::urdf::{UrdfJoint, UrdfJointLimit, UrdfJointType, UrdfModel};

    fn joint(joint_type: UrdfJointType) -> UrdfJoint {
        UrdfJoint {
            name: "j".to_string(),
            joint_type,
            limits: Some(UrdfJointLimit {
                lower: -1.5,
                upper: 2.5,
                effort: 40.,
                velocity: 2.,
            }),
        }
    }

    #[test]
    fn revolute_joint_has_position_limits() {
        let limits = get_joint_limits(&joint(UrdfJointType::Revolute)).unwrap();
        assert!(limits.has_position_limits);
        assert!(!limits.angle_wraparound);
        assert_eq!(limits.min_position, -1.5);
        assert_eq!(limits.max_position, 2.5);
        assert_eq!(limits.max_velocity, 2.);
        assert_eq!(limits.max_effort, 40.);
    }

    #[test]
    fn continuous_joint_wraps_around() {
        let limits = get_joint_limits(&joint(UrdfJointType::Continuous)).unwrap();
        assert!(!limits.has_position_limits);
        assert!(limits.angle_wraparound);
        assert!(limits.has_effort_limits);
        assert_eq!(limits.max_effort, 40.);
    }

    #[test]
    fn joint_without_limits_fails() {
        let mut j = joint(UrdfJointType::Revolute);
        j.limits = None;
        assert!(matches!(
            get_joint_limits(&j),
            Err(ControllerException::LimitResolutionFailure { .. })
        ));
    }

    #[test]
    fn urdf_source_resolves_by_name() {
        let model = UrdfModel::from_str(
            r#"<robot name="r">
                <joint name="a" type="prismatic"><limit effort="5" velocity="1"/></joint>
            </robot>"#,
        )
        .unwrap();
        assert_eq!(model.joint_limits("a").unwrap().max_effort, 5.);
        match model.joint_limits("b") {
            Err(ControllerException::LimitResolutionFailure { joint, .. }) => {
                assert_eq!(joint, "b")
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn map_source_resolves_by_name() {
        let mut source = HashMap::new();
        source.insert("a".to_string(), JointLimits::with_max_effort(3.));
        assert_eq!(source.joint_limits("a").unwrap().max_effort, 3.);
        assert!(source.joint_limits("b").is_err());
    }
}
