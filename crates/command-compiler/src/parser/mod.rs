//! Command parser for natural language robot instructions
//!
//! A sentence is tokenized once and handed to an ordered list of recognizers.
//! Each recognizer either declines (`None`) or produces the final
//! [`ParseResult`]; the first one that answers wins. Loops and parallel
//! commands parse their sub-phrases recursively, one level deep at most.

mod compound;
mod motion;
mod routine;
mod sensor;

use crate::config::RobotConfig;
use crate::tokenizer::{tokenize, Token, TokenKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How deep loop bodies and parallel halves may nest.
pub const MAX_NESTING: usize = 1;

/// Kind of command a sentence compiled to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    Move,
    Turn,
    PreciseTurn,
    Wait,
    Motor,
    Stop,
    SetSpeed,
    Loop,
    Sensor,
    SensorMove,
    LineFollow,
    Parallel,
    Multitask,
    RoutineCall,
    /// Produced by the language model fallback
    Llm,
}

impl CommandType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::Move => "move",
            CommandType::Turn => "turn",
            CommandType::PreciseTurn => "precise_turn",
            CommandType::Wait => "wait",
            CommandType::Motor => "motor",
            CommandType::Stop => "stop",
            CommandType::SetSpeed => "set_speed",
            CommandType::Loop => "loop",
            CommandType::Sensor => "sensor",
            CommandType::SensorMove => "sensor_move",
            CommandType::LineFollow => "line_follow",
            CommandType::Parallel => "parallel",
            CommandType::Multitask => "multitask",
            CommandType::RoutineCall => "routine_call",
            CommandType::Llm => "llm",
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of value a clarification asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClarificationKind {
    Distance,
    Angle,
    Duration,
}

/// Request for a parameter the sentence left out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clarification {
    pub field: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ClarificationKind,
}

/// The single outcome of parsing one sentence
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Success { code: String },
    NeedsClarification(Clarification),
    Error { message: String },
}

/// Result of parsing a command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseResult {
    #[serde(flatten)]
    pub outcome: Outcome,
    /// Confidence score (0.0 to 1.0)
    pub confidence: f32,
    pub command_type: Option<CommandType>,
    /// Set when the language model should take over or refine the result
    pub needs_llm: bool,
}

/// Summary status reported back to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStatus {
    Parsed,
    NeedsClarification,
    NeedsLlm,
    Error,
}

impl ParseResult {
    pub fn success(code: impl Into<String>, command_type: CommandType, confidence: f32) -> Self {
        Self {
            outcome: Outcome::Success { code: code.into() },
            confidence,
            command_type: Some(command_type),
            needs_llm: false,
        }
    }

    pub fn clarify(field: &str, message: impl Into<String>, kind: ClarificationKind) -> Self {
        Self {
            outcome: Outcome::NeedsClarification(Clarification {
                field: field.to_string(),
                message: message.into(),
                kind,
            }),
            confidence: 0.7,
            command_type: None,
            needs_llm: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Error {
                message: message.into(),
            },
            confidence: 0.0,
            command_type: None,
            needs_llm: false,
        }
    }

    /// Nothing matched; hand the sentence to the language model.
    pub fn unrecognized() -> Self {
        Self {
            needs_llm: true,
            ..Self::error("Could not parse command")
        }
    }

    pub fn with_command_type(mut self, command_type: CommandType) -> Self {
        self.command_type = Some(command_type);
        self
    }

    pub fn with_needs_llm(mut self) -> Self {
        self.needs_llm = true;
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    pub fn code(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success { code } => Some(code),
            _ => None,
        }
    }

    pub fn clarification(&self) -> Option<&Clarification> {
        match &self.outcome {
            Outcome::NeedsClarification(c) => Some(c),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Error { message } => Some(message),
            _ => None,
        }
    }

    pub fn status(&self) -> ParseStatus {
        match &self.outcome {
            Outcome::Success { .. } => ParseStatus::Parsed,
            Outcome::NeedsClarification(_) => ParseStatus::NeedsClarification,
            Outcome::Error { .. } if self.needs_llm => ParseStatus::NeedsLlm,
            Outcome::Error { .. } => ParseStatus::Error,
        }
    }
}

/// Everything a recognizer may look at
pub struct ParseContext<'a> {
    pub input: &'a str,
    pub tokens: &'a [Token],
    pub config: &'a RobotConfig,
    pub motor_names: &'a [String],
    pub routine_names: &'a [String],
    /// Number of enclosing loop/parallel commands
    pub depth: usize,
}

impl<'a> ParseContext<'a> {
    pub fn first(&self, kind: TokenKind) -> Option<&'a Token> {
        self.tokens.iter().find(|t| t.kind == kind)
    }

    pub fn position(&self, kind: TokenKind) -> Option<usize> {
        self.tokens.iter().position(|t| t.kind == kind)
    }

    pub fn has(&self, kind: TokenKind) -> bool {
        self.tokens.iter().any(|t| t.kind == kind)
    }

    /// Whether any verb token normalizes to one of `verbs`.
    pub fn has_verb(&self, verbs: &[&str]) -> bool {
        self.tokens
            .iter()
            .any(|t| t.kind == TokenKind::Verb && verbs.contains(&t.text()))
    }

    pub fn numbers(&self) -> impl Iterator<Item = &'a Token> {
        self.tokens.iter().filter(|t| t.kind == TokenKind::Number)
    }

    /// Normalized direction of the first direction token.
    pub fn direction(&self) -> Option<&'a str> {
        self.first(TokenKind::Direction)
            .map(|t| t.normalized.as_deref().unwrap_or(""))
    }

    /// Motor variable referenced by the sentence: a motor word, else a known
    /// motor name.
    pub fn motor(&self) -> Option<&'a str> {
        if let Some(t) = self.first(TokenKind::Motor) {
            return Some(t.raw.as_str());
        }
        self.tokens.iter().find_map(|t| {
            self.motor_names
                .iter()
                .find(|name| name.eq_ignore_ascii_case(&t.raw))
                .map(|name| name.as_str())
        })
    }

    /// Parse a sub-phrase one level deeper, with routine lookup disabled.
    pub fn parse_nested(&self, input: &str) -> ParseResult {
        let tokens = tokenize(input);
        let cx = ParseContext {
            input,
            tokens: &tokens,
            config: self.config,
            motor_names: self.motor_names,
            routine_names: &[],
            depth: self.depth + 1,
        };
        run_recognizers(&cx)
    }
}

type Recognizer = fn(&ParseContext<'_>) -> Option<ParseResult>;

/// Recognizers in priority order; more specific patterns come first.
const RECOGNIZERS: &[(&str, Recognizer)] = &[
    ("routine_call", routine::parse_routine_call),
    ("multitask", compound::parse_multitask),
    ("repeat", compound::parse_repeat),
    ("sensor_wait", sensor::parse_sensor_wait),
    ("line_follow", sensor::parse_line_follow),
    ("parallel", compound::parse_parallel),
    ("stop", motion::parse_stop),
    ("set_speed", motion::parse_set_speed),
    ("motor", motion::parse_motor),
    ("precise_turn", motion::parse_precise_turn),
    ("turn", motion::parse_turn),
    ("move", motion::parse_move),
    ("wait", motion::parse_wait),
];

fn run_recognizers(cx: &ParseContext<'_>) -> ParseResult {
    if cx.tokens.is_empty() {
        return ParseResult::error("Empty command");
    }
    for (name, recognizer) in RECOGNIZERS {
        if let Some(result) = recognizer(cx) {
            tracing::debug!(
                recognizer = name,
                depth = cx.depth,
                status = ?result.status(),
                "parsed {:?}",
                cx.input
            );
            return result;
        }
    }
    tracing::debug!(depth = cx.depth, "no recognizer matched {:?}", cx.input);
    ParseResult::unrecognized()
}

/// Parse a single natural language command.
pub fn parse_command(
    input: &str,
    config: &RobotConfig,
    motor_names: &[String],
    routine_names: &[String],
) -> ParseResult {
    let tokens = tokenize(input);
    let cx = ParseContext {
        input,
        tokens: &tokens,
        config,
        motor_names,
        routine_names,
        depth: 0,
    };
    run_recognizers(&cx)
}

/// Parse several commands in order; each is independent of the others.
pub fn parse_commands<S: AsRef<str>>(
    commands: &[S],
    config: &RobotConfig,
    motor_names: &[String],
    routine_names: &[String],
) -> Vec<ParseResult> {
    commands
        .iter()
        .map(|c| parse_command(c.as_ref(), config, motor_names, routine_names))
        .collect()
}

/// Indent every line after the first, for splicing into an indented block.
pub(crate) fn indent_continuation(code: &str) -> String {
    code.split('\n').collect::<Vec<_>>().join("\n    ")
}
