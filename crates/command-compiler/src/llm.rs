//! Language model fallback boundary
//!
//! The compiler never talks to a provider itself. Callers hand in a
//! [`CodeCompleter`]; this module builds the prompts and cleans up replies.

use crate::config::RobotConfig;
use crate::error::{ProviderError, Result};
use serde::Serialize;

/// Instructions sent ahead of every conversion prompt.
pub const SYSTEM_PROMPT: &str = "You are a Pybricks Python code generator for LEGO SPIKE Prime robots.

Convert natural language commands to Pybricks Python code. The robot uses:
- DriveBase `robot` for movement (robot.straight(), robot.turn(), robot.drive())
- Individual Motor objects for attachments
- ColorSensor, UltrasonicSensor, ForceSensor

Output ONLY valid Python code, no explanations. Each command should be a single line or small block.

Examples:
- \"move forward 200mm\" -> robot.straight(200)
- \"turn right 90 degrees\" -> robot.turn(90)
- \"wait 1 second\" -> wait(1000)
- \"run grabber 180 degrees\" -> grabber.run_angle(200, 180)
- \"wait until color is red\" -> while color_sensor.color() != Color.RED: wait(10)
";

/// Code returned by a provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completion {
    pub code: String,
    pub tokens_used: u32,
}

impl Completion {
    /// Build a completion from raw provider text, removing markdown fences.
    pub fn from_raw(text: &str, tokens_used: u32) -> Result<Self> {
        let code = strip_code_fences(text);
        if code.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(Self { code, tokens_used })
    }
}

/// A language model able to turn a prompt into Pybricks code
///
/// Implementations send [`SYSTEM_PROMPT`] as the system message ahead of
/// every prompt.
pub trait CodeCompleter: Send + Sync {
    /// Provider name, used in logs
    fn name(&self) -> &str;

    fn complete(&self, prompt: &str) -> Result<Completion>;

    /// Friendlier wording for a clarification, or `default_message` verbatim
    /// when the provider fails.
    fn explain(&self, command: &str, field: &str, default_message: &str) -> String {
        match self.complete(&clarification_prompt(command, field)) {
            Ok(completion) => completion.code.trim().to_string(),
            Err(err) => {
                tracing::warn!(provider = self.name(), %err, "clarification hint unavailable");
                default_message.to_string()
            }
        }
    }
}

/// Prompt asking for code for a command the rules could not compile.
pub fn fallback_prompt(command: &str, config: &RobotConfig) -> String {
    format!(
        "Robot configuration:\n\
         - Left motor: Port {}\n\
         - Right motor: Port {}\n\
         - Wheel diameter: {}mm\n\
         - Axle track: {}mm\n\
         - Default speed: {}mm/s\n\n\
         Convert this command to Pybricks Python code: {}",
        config.left_motor_port,
        config.right_motor_port,
        config.wheel_diameter,
        config.axle_track,
        config.speed,
        command
    )
}

/// Prompt asking for a short hint about a missing parameter.
pub fn clarification_prompt(command: &str, field: &str) -> String {
    format!(
        "The user typed: \"{command}\"

This command is missing the {field}. Generate a brief, helpful hint (max 15 words) explaining what's needed and give an example. Format: \"[what's missing] - e.g., [example]\"

Examples of good responses:
- \"Distance needed - e.g., move forward 200mm\"
- \"Angle needed - e.g., turn left 90 degrees\"
- \"Duration needed - e.g., wait 2 seconds\"

Respond with ONLY the hint, nothing else."
    )
}

/// Remove a surrounding ```python / ``` fence and outer whitespace.
pub fn strip_code_fences(text: &str) -> String {
    let mut code = text.trim();
    if let Some(rest) = code.strip_prefix("```python") {
        code = rest;
    } else if let Some(rest) = code.strip_prefix("```") {
        code = rest;
    }
    if let Some(rest) = code.strip_suffix("```") {
        code = rest;
    }
    code.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl CodeCompleter for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn complete(&self, _prompt: &str) -> Result<Completion> {
            Err(ProviderError::Status {
                status: 502,
                message: "bad gateway".into(),
            })
        }
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```python\nrobot.turn(90)\n```"), "robot.turn(90)");
        assert_eq!(strip_code_fences("```\nwait(10)```"), "wait(10)");
        assert_eq!(strip_code_fences("  robot.stop()  "), "robot.stop()");
    }

    #[test]
    fn test_empty_completion_is_an_error() {
        assert_eq!(
            Completion::from_raw("```python\n```", 12),
            Err(ProviderError::EmptyResponse)
        );
        let completion = Completion::from_raw("robot.stop()", 3).unwrap();
        assert_eq!(completion.tokens_used, 3);
    }

    #[test]
    fn test_fallback_prompt_describes_robot() {
        let prompt = fallback_prompt("do a dance", &RobotConfig::default());
        assert!(prompt.starts_with("Robot configuration:\n- Left motor: Port A\n"));
        assert!(prompt.contains("- Axle track: 112mm\n"));
        assert!(prompt.ends_with("\n\nConvert this command to Pybricks Python code: do a dance"));
    }

    #[test]
    fn test_explain_falls_back_to_default_message() {
        let hint = Failing.explain("move forward", "distance", "How far should the robot move?");
        assert_eq!(hint, "How far should the robot move?");
    }

    #[test]
    fn test_clarification_prompt_names_field() {
        let prompt = clarification_prompt("turn left", "angle");
        assert!(prompt.starts_with("The user typed: \"turn left\"\n\nThis command is missing the angle."));
    }
}
