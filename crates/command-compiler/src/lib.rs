//! command-compiler: natural language to Pybricks code
//!
//! Sentences such as "move forward 200mm" or "turn left precisely 90 degrees"
//! are tokenized, matched against a fixed set of command recognizers and
//! compiled into Pybricks Python statements. A complete program (imports,
//! hardware setup, routines and main body) is assembled from the results.
//! Sentences the rules cannot handle can be passed to a [`CodeCompleter`].

pub mod codegen;
pub mod compile;
pub mod config;
pub mod error;
pub mod fuzzy;
pub mod lexicon;
pub mod llm;
pub mod parser;
pub mod suggest;
pub mod tokenizer;

#[cfg(feature = "mock")]
pub mod mock;

pub use codegen::{generate_program, GeneratedProgram};
pub use compile::{compile_program, validate_command, CommandReport, CompiledProgram, Validation};
pub use config::{load_program_file, ProgramSpec, RobotConfig, RoutineDefinition};
pub use error::ProviderError;
pub use llm::{CodeCompleter, Completion};
pub use parser::{
    parse_command, parse_commands, Clarification, ClarificationKind, CommandType, ParseResult,
    ParseStatus,
};
pub use suggest::{suggest, Suggestion};
pub use tokenizer::{tokenize, Token, TokenKind};

/// Initialize the command compiler
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Initializing command compiler");
    Ok(())
}
