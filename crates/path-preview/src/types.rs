use serde::{Deserialize, Serialize};

/// Pose on the preview canvas at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PreviewPoint {
    /// Canvas pixels
    pub x: f64,
    /// Canvas pixels, growing downwards
    pub y: f64,
    /// Heading in degrees, 0 pointing up
    pub angle: f64,
    /// Milliseconds since the start of the program
    pub timestamp: f64,
}

impl PreviewPoint {
    pub fn new(x: f64, y: f64, angle: f64, timestamp: f64) -> Self {
        Self {
            x,
            y,
            angle,
            timestamp,
        }
    }

    pub fn with_timestamp(self, timestamp: f64) -> Self {
        Self { timestamp, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Straight,
    Turn,
    Wait,
}

/// Motion produced by a single statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewSegment {
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    pub start_point: PreviewPoint,
    pub end_point: PreviewPoint,
    /// Statement the segment was computed from
    pub command: String,
}

impl PreviewSegment {
    pub fn duration(&self) -> f64 {
        self.end_point.timestamp - self.start_point.timestamp
    }
}

/// Every segment of a program, with running totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedPath {
    pub segments: Vec<PreviewSegment>,
    /// Milliseconds
    pub total_time: f64,
    pub end_position: PreviewPoint,
}
