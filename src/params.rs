// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the parameter store controllers read their configuration from.
//!
//! Parameters live in a TOML document and are addressed with slash-separated names,
//! so `/mock_franka_hw_node/joint_names` refers to
//! ```toml
//! [mock_franka_hw_node]
//! joint_names = ["panda_joint1", "panda_joint2"]
//! ```
//! A leading slash is ignored.
use std::path::Path;

use serde::de::DeserializeOwned;
use toml::{Table, Value};

use crate::exception::{ControllerException, ControllerResult};

/// Hierarchical key-value store backed by a TOML table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterStore {
    root: Table,
}

fn split_name(name: &str) -> Vec<&str> {
    name.split('/').filter(|part| !part.is_empty()).collect()
}

fn configuration_error(message: String) -> ControllerException {
    ControllerException::ConfigurationUnavailable { message }
}

fn insert(table: &mut Table, parts: &[&str], value: Value) {
    match parts {
        [] => {}
        [last] => {
            table.insert(last.to_string(), value);
        }
        [first, rest @ ..] => {
            let entry = table
                .entry(first.to_string())
                .or_insert(Value::Table(Table::new()));
            if !entry.is_table() {
                *entry = Value::Table(Table::new());
            }
            if let Value::Table(child) = entry {
                insert(child, rest, value);
            }
        }
    }
}

impl ParameterStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        ParameterStore::default()
    }

    /// Parses a TOML document.
    /// # Errors
    /// * ConfigurationUnavailable if the document is not valid TOML.
    pub fn from_toml_str(document: &str) -> ControllerResult<Self> {
        let root: Table = toml::from_str(document)
            .map_err(|e| configuration_error(format!("invalid parameter document: {}", e)))?;
        Ok(ParameterStore { root })
    }

    /// Reads and parses a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ControllerResult<Self> {
        let document = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            configuration_error(format!("could not read {}: {}", path.as_ref().display(), e))
        })?;
        ParameterStore::from_toml_str(&document)
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        let parts = split_name(name);
        let (last, path) = parts.split_last()?;
        let mut table = &self.root;
        for part in path {
            table = table.get(*part)?.as_table()?;
        }
        table.get(*last)
    }

    /// Returns true if a parameter of any type is stored under `name`.
    pub fn has_param(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Deserializes the parameter `name` into `T`.
    ///
    /// Returns `Ok(None)` if the parameter does not exist.
    /// # Errors
    /// * ConfigurationUnavailable if the parameter exists but cannot be converted into `T`.
    pub fn get_param<T: DeserializeOwned>(&self, name: &str) -> ControllerResult<Option<T>> {
        self.lookup(name)
            .map(|value| {
                value.clone().try_into::<T>().map_err(|e| {
                    configuration_error(format!("could not parse parameter {}: {}", name, e))
                })
            })
            .transpose()
    }

    pub fn get_string(&self, name: &str) -> ControllerResult<Option<String>> {
        self.get_param(name)
    }

    pub fn get_string_list(&self, name: &str) -> ControllerResult<Option<Vec<String>>> {
        self.get_param(name)
    }

    /// Reads a floating point parameter. Integers are accepted as well.
    pub fn get_f64(&self, name: &str) -> ControllerResult<Option<f64>> {
        match self.lookup(name) {
            None => Ok(None),
            Some(Value::Float(value)) => Ok(Some(*value)),
            Some(Value::Integer(value)) => Ok(Some(*value as f64)),
            Some(other) => Err(configuration_error(format!(
                "parameter {} is a {}, expected a number",
                name,
                other.type_str()
            ))),
        }
    }

    /// Reads a non-negative integer parameter.
    pub fn get_u64(&self, name: &str) -> ControllerResult<Option<u64>> {
        match self.lookup(name) {
            None => Ok(None),
            Some(Value::Integer(value)) if *value >= 0 => Ok(Some(*value as u64)),
            Some(other) => Err(configuration_error(format!(
                "parameter {} must be a non-negative integer, got {}",
                name, other
            ))),
        }
    }

    /// Stores `value` under `name`, creating intermediate tables as needed.
    pub fn set_param<V: Into<Value>>(&mut self, name: &str, value: V) {
        insert(&mut self.root, &split_name(name), value.into());
    }
}
