//! path-preview: simulated drivebase path for generated programs
//!
//! Replays `robot.straight`, `robot.turn` and `wait` statements to produce
//! timed segments and evenly sampled poses for drawing on a canvas.

pub mod error;
pub mod request;
pub mod simulator;
pub mod types;

pub use error::{PreviewError, Result};
pub use request::{calculate_preview, PreviewDefaults, PreviewRequest, PreviewResponse};
pub use simulator::{
    calculate_path, calculate_path_for_program, generate_path_points, position_at_time,
    SCALE_MM_TO_PX,
};
pub use types::{CalculatedPath, PreviewPoint, PreviewSegment, SegmentKind};

/// Initialize the path preview
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Initializing path preview");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert!(init().is_ok());
    }
}
