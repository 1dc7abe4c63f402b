use thiserror::Error;

pub type Result<T, E = PreviewError> = core::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreviewError {
    #[error("speed and turn rate must be positive (speed {speed}, turn rate {turn_rate})")]
    InvalidSpeedOrTurnRate { speed: f64, turn_rate: f64 },
    #[error("points per segment must be between 2 and 200, got {0}")]
    InvalidPointsPerSegment(i64),
    #[error("expected 1 to 500 commands, got {0}")]
    InvalidCommandCount(usize),
    #[error("start timestamp must not be negative, got {0}")]
    NegativeTimestamp(f64),
}
