//! Batch compilation of a list of commands into one program

use crate::codegen::{generate_program, GeneratedProgram};
use crate::config::{ProgramSpec, RobotConfig};
use crate::llm::{fallback_prompt, CodeCompleter};
use crate::parser::{
    parse_command, Clarification, CommandType, Outcome, ParseResult, ParseStatus,
};
use serde::Serialize;

/// Outcome of one command in a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandReport {
    pub original: String,
    pub status: ParseStatus,
    pub code: Option<String>,
    pub clarification: Option<Clarification>,
    pub error: Option<String>,
    pub command_type: Option<CommandType>,
    pub confidence: f32,
}

impl CommandReport {
    fn new(original: &str, result: &ParseResult) -> Self {
        Self {
            original: original.to_string(),
            status: result.status(),
            code: result.code().map(str::to_string),
            clarification: result.clarification().cloned(),
            error: result.error_message().map(str::to_string),
            command_type: result.command_type,
            confidence: result.confidence,
        }
    }
}

/// Reports for every command plus the assembled program
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledProgram {
    pub results: Vec<CommandReport>,
    pub program: GeneratedProgram,
}

impl CompiledProgram {
    /// Whether every command compiled to code.
    pub fn is_complete(&self) -> bool {
        self.results.iter().all(|r| r.status == ParseStatus::Parsed)
    }
}

/// Ask the completer for code the rules could not produce.
///
/// Returns `None` when the provider fails; the caller keeps the original
/// result.
pub fn llm_fallback(
    command: &str,
    config: &RobotConfig,
    completer: &dyn CodeCompleter,
) -> Option<ParseResult> {
    match completer.complete(&fallback_prompt(command, config)) {
        Ok(completion) => {
            tracing::debug!(
                provider = completer.name(),
                tokens = completion.tokens_used,
                "language model compiled {:?}",
                command
            );
            Some(ParseResult::success(completion.code, CommandType::Llm, 0.85))
        }
        Err(err) => {
            tracing::warn!(provider = completer.name(), %err, "language model fallback failed");
            None
        }
    }
}

/// Compile every command of a program and assemble the result.
///
/// Blank commands are skipped. Commands the rules cannot compile go to the
/// completer when one is supplied; clarification messages are reworded by it.
pub fn compile_program(
    spec: &ProgramSpec,
    completer: Option<&dyn CodeCompleter>,
) -> CompiledProgram {
    let motor_names = spec.config.motor_names();
    let routine_names = spec.routine_names();

    let mut results = Vec::new();
    let mut codes: Vec<String> = Vec::new();
    let mut uses_multitask = false;

    for command in spec.commands.iter().map(|c| c.trim()) {
        if command.is_empty() {
            continue;
        }

        let mut result = parse_command(command, &spec.config, &motor_names, &routine_names);

        if let Some(completer) = completer {
            if result.status() == ParseStatus::NeedsLlm {
                if let Some(llm) = llm_fallback(command, &spec.config, completer) {
                    result = llm;
                }
            }
            if let Outcome::NeedsClarification(clarification) = &mut result.outcome {
                clarification.message =
                    completer.explain(command, &clarification.field, &clarification.message);
            }
        }

        results.push(CommandReport::new(command, &result));
        if let Some(code) = result.code() {
            codes.push(code.to_string());
            uses_multitask |= result.command_type == Some(CommandType::Multitask);
        }
    }

    tracing::info!(
        commands = results.len(),
        compiled = codes.len(),
        "compiled program"
    );

    let program = generate_program(&spec.config, &codes, &spec.routines, uses_multitask);
    CompiledProgram { results, program }
}

/// Validation of a single command against the default robot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Validation {
    pub valid: bool,
    pub error: Option<String>,
    pub clarification: Option<Clarification>,
}

pub fn validate_command(command: &str) -> Validation {
    let result = parse_command(command, &RobotConfig::default(), &[], &[]);
    Validation {
        valid: result.is_success(),
        error: result.error_message().map(str::to_string),
        clarification: result.clarification().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoutineDefinition;

    fn spec(commands: &[&str]) -> ProgramSpec {
        ProgramSpec {
            commands: commands.iter().map(|c| c.to_string()).collect(),
            ..ProgramSpec::default()
        }
    }

    #[test]
    fn test_compile_without_completer() {
        let compiled = compile_program(
            &spec(&["move forward 200mm", "  ", "dance", "turn left 90 degrees"]),
            None,
        );
        assert_eq!(compiled.results.len(), 3);
        assert_eq!(compiled.results[1].status, ParseStatus::NeedsLlm);
        assert!(!compiled.is_complete());
        assert!(compiled
            .program
            .full
            .ends_with("# Main program\nrobot.straight(200)\nrobot.turn(-90)"));
        assert!(compiled.program.imports.contains("DriveBase"));
        assert!(!compiled.program.imports.contains("multitask"));
    }

    #[test]
    fn test_multitask_switches_tool_imports() {
        let compiled = compile_program(&spec(&["move forward 100mm and turn right 90"]), None);
        assert!(compiled.is_complete());
        assert!(compiled
            .program
            .imports
            .contains("from pybricks.tools import wait, multitask, run_task"));
    }

    #[test]
    fn test_routines_are_called_and_defined() {
        let mut program = spec(&["square with 150"]);
        program.routines.push(RoutineDefinition {
            name: "square".into(),
            parameters: vec!["size".into()],
            body: "robot.straight(size)\nrobot.turn(90)".into(),
        });
        let compiled = compile_program(&program, None);
        assert_eq!(compiled.results[0].code.as_deref(), Some("square(150)"));
        assert!(compiled.program.full.contains("def square(size):\n    robot.straight(size)"));
        assert!(compiled.program.full.ends_with("# Main program\nsquare(150)"));
    }

    #[test]
    fn test_attachment_names_resolve() {
        let mut program = spec(&["run attachment1 90", "stop attachment1"]);
        program.config.attachment1_port = Some("C".into());
        let compiled = compile_program(&program, None);
        assert_eq!(
            compiled.program.main,
            "attachment1.run_angle(200, 90)\nattachment1.stop()"
        );
        assert!(compiled.program.setup.contains("attachment1 = Motor(Port.C)"));
    }

    #[cfg(feature = "mock")]
    #[test]
    fn test_completer_fills_unparsed_commands() {
        use crate::mock::MockCompleter;

        let mock = MockCompleter::replying("```python\nrobot.turn(360)\n```");
        let compiled = compile_program(&spec(&["move forward 10mm", "dance"]), Some(&mock));
        let report = &compiled.results[1];
        assert_eq!(report.status, ParseStatus::Parsed);
        assert_eq!(report.command_type, Some(CommandType::Llm));
        assert_eq!(report.code.as_deref(), Some("robot.turn(360)"));
        assert_eq!(report.confidence, 0.85);
        // only the unparsed command reached the provider
        assert_eq!(mock.calls(), 1);
        assert!(compiled.is_complete());
    }

    #[cfg(feature = "mock")]
    #[test]
    fn test_failed_provider_keeps_original_results() {
        use crate::mock::MockCompleter;

        let mock = MockCompleter::unavailable();
        let compiled = compile_program(&spec(&["dance", "move forward"]), Some(&mock));
        assert_eq!(compiled.results[0].status, ParseStatus::NeedsLlm);
        assert_eq!(
            compiled.results[1].clarification.as_ref().map(|c| c.message.as_str()),
            Some("How far should the robot move?")
        );
        assert_eq!(compiled.program.main, "# Add your commands here\npass");
    }

    #[cfg(feature = "mock")]
    #[test]
    fn test_clarifications_are_reworded() {
        use crate::mock::MockCompleter;

        let mock = MockCompleter::replying("Distance needed - e.g., move forward 200mm");
        let compiled = compile_program(&spec(&["move forward"]), Some(&mock));
        let clarification = compiled.results[0].clarification.as_ref().unwrap();
        assert_eq!(clarification.field, "distance");
        assert_eq!(clarification.message, "Distance needed - e.g., move forward 200mm");
    }

    #[test]
    fn test_validate_command() {
        let ok = validate_command("wait 2 seconds");
        assert!(ok.valid);
        assert_eq!(ok.error, None);

        let missing = validate_command("turn left");
        assert!(!missing.valid);
        assert_eq!(missing.clarification.map(|c| c.field), Some("angle".to_string()));

        let unknown = validate_command("dance");
        assert!(!unknown.valid);
        assert_eq!(unknown.error.as_deref(), Some("Could not parse command"));
    }
}
