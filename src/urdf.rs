// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains a minimal reader for the joint section of a URDF robot description.
//!
//! Only what is needed to resolve joint limits is kept: the robot name and, for every joint,
//! its name, its type and its optional `<limit>` element. Links, geometry and everything
//! else are skipped.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::exception::{create_urdf_exception, ControllerResult};

/// Kinematic type of a URDF joint.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UrdfJointType {
    Revolute,
    Continuous,
    Prismatic,
    Fixed,
    Floating,
    Planar,
}

impl UrdfJointType {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "revolute" => Some(UrdfJointType::Revolute),
            "continuous" => Some(UrdfJointType::Continuous),
            "prismatic" => Some(UrdfJointType::Prismatic),
            "fixed" => Some(UrdfJointType::Fixed),
            "floating" => Some(UrdfJointType::Floating),
            "planar" => Some(UrdfJointType::Planar),
            _ => None,
        }
    }
}

/// Content of a `<limit>` element.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct UrdfJointLimit {
    /// Lower position limit in \[rad\] or \[m\].
    pub lower: f64,
    /// Upper position limit in \[rad\] or \[m\].
    pub upper: f64,
    /// Maximum effort in \[Nm\] or \[N\].
    pub effort: f64,
    /// Maximum velocity in \[rad/s\] or \[m/s\].
    pub velocity: f64,
}

/// A joint of the robot description.
#[derive(Debug, Clone, PartialEq)]
pub struct UrdfJoint {
    pub name: String,
    pub joint_type: UrdfJointType,
    /// `None` if the joint has no `<limit>` element.
    pub limits: Option<UrdfJointLimit>,
}

/// Joint-level view of a URDF robot description.
#[derive(Debug, Clone, Default)]
pub struct UrdfModel {
    name: String,
    joints: Vec<UrdfJoint>,
    index: HashMap<String, usize>,
}

impl UrdfModel {
    /// Parses a robot description from its XML text.
    ///
    /// # Errors
    /// * UrdfException if the XML is malformed, has no `<robot>` element, a joint misses its
    ///   name or type, a joint type is unknown or a joint name appears twice.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(xml: &str) -> ControllerResult<UrdfModel> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        parse_document(&mut reader)
    }

    /// Reads and parses a robot description file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ControllerResult<UrdfModel> {
        let xml = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            create_urdf_exception(format!(
                "could not read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        UrdfModel::from_str(&xml)
    }

    /// Name of the robot.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All joints in document order.
    pub fn joints(&self) -> &[UrdfJoint] {
        &self.joints
    }

    /// Looks up a joint by name.
    pub fn joint(&self, name: &str) -> Option<&UrdfJoint> {
        self.index.get(name).map(|&i| &self.joints[i])
    }

    fn add_joint(&mut self, joint: UrdfJoint) -> ControllerResult<()> {
        if self.index.contains_key(&joint.name) {
            return Err(create_urdf_exception(format!(
                "duplicate joint name: {}",
                joint.name
            )));
        }
        self.index.insert(joint.name.clone(), self.joints.len());
        self.joints.push(joint);
        Ok(())
    }
}

fn parse_document<R: BufRead>(reader: &mut Reader<R>) -> ControllerResult<UrdfModel> {
    let mut buf = Vec::new();
    let mut model: Option<UrdfModel> = None;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"robot" => {
                model = Some(parse_robot(reader, e)?);
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"robot" => {
                model = Some(UrdfModel {
                    name: get_attribute(e, "name")?,
                    ..UrdfModel::default()
                });
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(create_urdf_exception(e)),
        }
        buf.clear();
    }
    model.ok_or_else(|| create_urdf_exception("missing <robot> element"))
}

fn parse_robot<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
) -> ControllerResult<UrdfModel> {
    let mut model = UrdfModel {
        name: get_attribute(start, "name")?,
        ..UrdfModel::default()
    };
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let element = e.name().as_ref().to_vec();
                if element.as_slice() == b"joint" {
                    let joint = parse_joint(reader, e)?;
                    model.add_joint(joint)?;
                } else {
                    skip_element(reader, &element)?;
                }
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"joint" => {
                let joint = UrdfJoint {
                    name: get_attribute(e, "name")?,
                    joint_type: parse_joint_type(e)?,
                    limits: None,
                };
                model.add_joint(joint)?;
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"robot" => break,
            Ok(Event::Eof) => return Err(create_urdf_exception("unexpected EOF in robot")),
            Ok(_) => {}
            Err(e) => return Err(create_urdf_exception(e)),
        }
        buf.clear();
    }
    Ok(model)
}

fn parse_joint<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
) -> ControllerResult<UrdfJoint> {
    let name = get_attribute(start, "name")?;
    let joint_type = parse_joint_type(start)?;
    let mut limits = None;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) if e.name().as_ref() == b"limit" => {
                limits = Some(parse_limit(e)?);
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"joint" => break,
            Ok(Event::Eof) => return Err(create_urdf_exception("unexpected EOF in joint")),
            Ok(_) => {}
            Err(e) => return Err(create_urdf_exception(e)),
        }
        buf.clear();
    }
    Ok(UrdfJoint {
        name,
        joint_type,
        limits,
    })
}

fn parse_joint_type(e: &BytesStart) -> ControllerResult<UrdfJointType> {
    let value = get_attribute(e, "type")?;
    UrdfJointType::parse(&value)
        .ok_or_else(|| create_urdf_exception(format!("unknown joint type: {}", value)))
}

// URDF requires effort and velocity on <limit>, lower and upper default to zero.
fn parse_limit(e: &BytesStart) -> ControllerResult<UrdfJointLimit> {
    Ok(UrdfJointLimit {
        lower: parse_float_attribute(e, "lower")?.unwrap_or(0.),
        upper: parse_float_attribute(e, "upper")?.unwrap_or(0.),
        effort: parse_float_attribute(e, "effort")?
            .ok_or_else(|| create_urdf_exception("missing attribute effort on limit"))?,
        velocity: parse_float_attribute(e, "velocity")?
            .ok_or_else(|| create_urdf_exception("missing attribute velocity on limit"))?,
    })
}

fn get_attribute_opt(e: &BytesStart, name: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == name.as_bytes())
        .and_then(|attr| String::from_utf8(attr.value.to_vec()).ok())
}

fn get_attribute(e: &BytesStart, name: &str) -> ControllerResult<String> {
    get_attribute_opt(e, name).ok_or_else(|| {
        create_urdf_exception(format!(
            "missing attribute {} on {}",
            name,
            String::from_utf8_lossy(e.name().as_ref())
        ))
    })
}

fn parse_float_attribute(e: &BytesStart, name: &str) -> ControllerResult<Option<f64>> {
    get_attribute_opt(e, name)
        .map(|value| {
            value.trim().parse::<f64>().map_err(|_| {
                create_urdf_exception(format!("invalid value for {}: {}", name, value))
            })
        })
        .transpose()
}

fn skip_element<R: BufRead>(reader: &mut Reader<R>, name: &[u8]) -> ControllerResult<()> {
    let mut buf = Vec::new();
    let mut depth = 1;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == name => depth += 1,
            Ok(Event::End(ref e)) if e.name().as_ref() == name => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Ok(Event::Eof) => return Err(create_urdf_exception("unexpected EOF")),
            Ok(_) => {}
            Err(e) => return Err(create_urdf_exception(e)),
        }
        buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use crate::exception::ControllerException;
    use crate::urdf::{UrdfJointType, UrdfModel};

    const ARM: &str = r#"<?xml version="1.0"?>
        <robot name="panda">
            <link name="panda_link0">
                <visual><geometry><mesh filename="link0.dae"/></geometry></visual>
            </link>
            <link name="panda_link1"/>
            <joint name="panda_joint1" type="revolute">
                <origin rpy="0 0 0" xyz="0 0 0.333"/>
                <parent link="panda_link0"/>
                <child link="panda_link1"/>
                <axis xyz="0 0 1"/>
                <limit effort="87" lower="-2.8973" upper="2.8973" velocity="2.1750"/>
            </joint>
            <joint name="wheel" type="continuous">
                <parent link="panda_link0"/>
                <child link="panda_link1"/>
                <limit effort="12" velocity="3.0"/>
            </joint>
            <joint name="panda_hand_joint" type="fixed">
                <parent link="panda_link1"/>
                <child link="panda_hand"/>
            </joint>
        </robot>"#;

    #[test]
    fn parses_joint_limits() {
        let model = UrdfModel::from_str(ARM).unwrap();
        assert_eq!(model.name(), "panda");
        assert_eq!(model.joints().len(), 3);
        let joint = model.joint("panda_joint1").unwrap();
        assert_eq!(joint.joint_type, UrdfJointType::Revolute);
        let limits = joint.limits.unwrap();
        assert_eq!(limits.effort, 87.);
        assert_eq!(limits.lower, -2.8973);
        assert_eq!(limits.upper, 2.8973);
        assert_eq!(limits.velocity, 2.175);
    }

    #[test]
    fn missing_lower_upper_default_to_zero() {
        let model = UrdfModel::from_str(ARM).unwrap();
        let limits = model.joint("wheel").unwrap().limits.unwrap();
        assert_eq!(limits.lower, 0.);
        assert_eq!(limits.upper, 0.);
        assert_eq!(limits.effort, 12.);
    }

    #[test]
    fn joint_without_limit_element() {
        let model = UrdfModel::from_str(ARM).unwrap();
        let joint = model.joint("panda_hand_joint").unwrap();
        assert_eq!(joint.joint_type, UrdfJointType::Fixed);
        assert!(joint.limits.is_none());
        assert!(model.joint("panda_joint8").is_none());
    }

    #[test]
    fn rejects_unknown_joint_type() {
        let xml = r#"<robot name="r"><joint name="j" type="hinge"/></robot>"#;
        assert!(matches!(
            UrdfModel::from_str(xml),
            Err(ControllerException::UrdfException { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_joints() {
        let xml = r#"<robot name="r">
            <joint name="j" type="fixed"/>
            <joint name="j" type="fixed"/>
        </robot>"#;
        assert!(UrdfModel::from_str(xml).is_err());
    }

    #[test]
    fn rejects_limit_without_effort() {
        let xml = r#"<robot name="r">
            <joint name="j" type="revolute"><limit lower="-1" upper="1" velocity="1"/></joint>
        </robot>"#;
        assert!(UrdfModel::from_str(xml).is_err());
    }

    #[test]
    fn rejects_documents_without_robot() {
        assert!(UrdfModel::from_str("<model name=\"x\"/>").is_err());
        assert!(UrdfModel::from_str("<robot name=\"x\"><joint").is_err());
        assert!(UrdfModel::from_file("/nonexistent/robot.urdf").is_err());
    }
}
