//! Robot configuration, user routines and program files

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Hardware description used for defaults and setup code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub left_motor_port: String,
    pub right_motor_port: String,
    /// Wheel diameter in mm
    pub wheel_diameter: f64,
    /// Distance between the wheels in mm
    pub axle_track: f64,
    /// Straight speed in mm/s
    pub speed: f64,
    pub acceleration: f64,
    /// Turn rate in deg/s
    pub turn_rate: f64,
    pub turn_acceleration: f64,
    /// Attachment motor speed in deg/s
    pub motor_speed: f64,
    pub attachment1_port: Option<String>,
    pub attachment2_port: Option<String>,
    pub color_sensor_port: Option<String>,
    pub ultrasonic_port: Option<String>,
    pub force_port: Option<String>,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            left_motor_port: "A".to_string(),
            right_motor_port: "B".to_string(),
            wheel_diameter: 56.0,
            axle_track: 112.0,
            speed: 200.0,
            acceleration: 700.0,
            turn_rate: 150.0,
            turn_acceleration: 300.0,
            motor_speed: 200.0,
            attachment1_port: None,
            attachment2_port: None,
            color_sensor_port: None,
            ultrasonic_port: None,
            force_port: None,
        }
    }
}

impl RobotConfig {
    /// Variable names of the configured attachment motors.
    pub fn motor_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if port_in_use(self.attachment1_port.as_deref()).is_some() {
            names.push("attachment1".to_string());
        }
        if port_in_use(self.attachment2_port.as_deref()).is_some() {
            names.push("attachment2".to_string());
        }
        names
    }
}

/// A port counts as configured unless it is missing, empty or "None".
pub fn port_in_use(port: Option<&str>) -> Option<&str> {
    port.filter(|p| !p.is_empty() && *p != "None")
}

/// User-defined subroutine emitted as a function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineDefinition {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub body: String,
}

/// Everything needed to compile one program
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramSpec {
    #[serde(default)]
    pub config: RobotConfig,
    #[serde(default)]
    pub routines: Vec<RoutineDefinition>,
    #[serde(default)]
    pub commands: Vec<String>,
}

impl ProgramSpec {
    pub fn routine_names(&self) -> Vec<String> {
        self.routines.iter().map(|r| r.name.clone()).collect()
    }
}

fn read_document<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading {}: {}", what, path.display()))?;
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        serde_json::from_str(&raw).with_context(|| format!("parsing json: {}", path.display()))
    } else {
        serde_yaml::from_str(&raw).with_context(|| format!("parsing yaml: {}", path.display()))
    }
}

/// Load a program file (YAML, or JSON by extension).
pub fn load_program_file(path: impl AsRef<Path>) -> anyhow::Result<ProgramSpec> {
    read_document(path.as_ref(), "program")
}

/// Load a robot configuration file (YAML, or JSON by extension).
pub fn load_robot_config(path: impl AsRef<Path>) -> anyhow::Result<RobotConfig> {
    read_document(path.as_ref(), "robot config")
}

/// Load a list of routines (YAML, or JSON by extension).
pub fn load_routines(path: impl AsRef<Path>) -> anyhow::Result<Vec<RoutineDefinition>> {
    read_document(path.as_ref(), "routines")
}
