//! Request and response shapes of a preview call

use crate::error::{PreviewError, Result};
use crate::simulator::{calculate_path, generate_path_points};
use crate::types::{CalculatedPath, PreviewPoint};
use serde::{Deserialize, Serialize};

pub const MAX_COMMANDS: usize = 500;
pub const MIN_POINTS_PER_SEGMENT: i64 = 2;
pub const MAX_POINTS_PER_SEGMENT: i64 = 200;

/// Drive rates used when replaying a program
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewDefaults {
    /// mm/s
    pub speed: f64,
    /// deg/s
    pub turn_rate: f64,
}

impl Default for PreviewDefaults {
    fn default() -> Self {
        Self {
            speed: 200.0,
            turn_rate: 150.0,
        }
    }
}

fn default_points_per_segment() -> i64 {
    20
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub commands: Vec<String>,
    #[serde(default)]
    pub start_position: PreviewPoint,
    #[serde(default)]
    pub defaults: PreviewDefaults,
    #[serde(default = "default_points_per_segment")]
    pub points_per_segment: i64,
}

impl PreviewRequest {
    pub fn new(commands: Vec<String>) -> Self {
        Self {
            commands,
            start_position: PreviewPoint::default(),
            defaults: PreviewDefaults::default(),
            points_per_segment: default_points_per_segment(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let PreviewDefaults { speed, turn_rate } = self.defaults;
        let usable = |rate: f64| rate.is_finite() && rate > 0.0;
        if !usable(speed) || !usable(turn_rate) {
            return Err(PreviewError::InvalidSpeedOrTurnRate { speed, turn_rate });
        }
        if !(MIN_POINTS_PER_SEGMENT..=MAX_POINTS_PER_SEGMENT).contains(&self.points_per_segment) {
            return Err(PreviewError::InvalidPointsPerSegment(self.points_per_segment));
        }
        if self.commands.is_empty() || self.commands.len() > MAX_COMMANDS {
            return Err(PreviewError::InvalidCommandCount(self.commands.len()));
        }
        if self.start_position.timestamp < 0.0 {
            return Err(PreviewError::NegativeTimestamp(self.start_position.timestamp));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub path: CalculatedPath,
    pub points: Vec<PreviewPoint>,
}

/// Validate a request, then compute its path and sampled points.
pub fn calculate_preview(request: &PreviewRequest) -> Result<PreviewResponse> {
    request.validate()?;

    let path = calculate_path(
        &request.commands,
        request.start_position,
        request.defaults.speed,
        request.defaults.turn_rate,
    );
    let points = generate_path_points(&path, request.points_per_segment);
    tracing::debug!(
        segments = path.segments.len(),
        points = points.len(),
        total_time = path.total_time,
        "preview calculated"
    );

    Ok(PreviewResponse { path, points })
}
