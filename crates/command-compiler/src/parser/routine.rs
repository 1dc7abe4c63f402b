//! Calls to user routines: "run mission1", "square with 200"

use super::{CommandType, ParseContext, ParseResult};
use crate::lexicon as lx;
use crate::tokenizer::TokenKind;
use regex::Regex;
use std::sync::OnceLock;

fn identifier_regex() -> &'static Regex {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER.get_or_init(|| {
        Regex::new(r"^[a-z][a-z0-9_]*").expect("Invalid regex pattern - this is a bug")
    })
}

fn argument_regex() -> &'static Regex {
    static ARGUMENT: OnceLock<Regex> = OnceLock::new();
    ARGUMENT.get_or_init(|| {
        Regex::new(r"-?[0-9]+(?:\.[0-9]+)?").expect("Invalid regex pattern - this is a bug")
    })
}

/// Text after the routine name, minus a leading "with".
fn parameters(rest: &str) -> &str {
    let rest = rest.trim();
    rest.strip_prefix("with ").map(str::trim).unwrap_or(rest)
}

fn match_known<'r>(input: &str, routines: &'r [String]) -> Option<(&'r str, String)> {
    for routine in routines {
        let name = routine.to_lowercase();
        if name.is_empty() {
            continue;
        }
        if let Some(rest) = input.strip_prefix(name.as_str()) {
            return Some((routine.as_str(), parameters(rest).to_string()));
        }
        for prefix in lx::CALL_PREFIXES {
            if let Some(rest) = input
                .strip_prefix(prefix)
                .and_then(|s| s.strip_prefix(name.as_str()))
            {
                return Some((routine.as_str(), parameters(rest).to_string()));
            }
        }
    }
    None
}

pub(super) fn parse_routine_call(cx: &ParseContext<'_>) -> Option<ParseResult> {
    let input = cx.input.trim().to_lowercase();

    let (name, params) = match match_known(&input, cx.routine_names) {
        Some((name, params)) => (name.to_string(), params),
        None => {
            // "run <identifier>" is taken as a call to a routine defined elsewhere
            let rest = lx::CALL_PREFIXES
                .iter()
                .find_map(|prefix| input.strip_prefix(prefix))?
                .trim();
            let identifier = identifier_regex().find(rest)?.as_str();
            if cx.has(TokenKind::Motor) || cx.motor().is_some() {
                return None;
            }
            if lx::contains(lx::RESERVED_ROUTINE_WORDS, identifier) {
                return None;
            }
            (
                identifier.to_string(),
                parameters(&rest[identifier.len()..]).to_string(),
            )
        }
    };

    let args: Vec<&str> = argument_regex()
        .find_iter(&params)
        .map(|m| m.as_str())
        .collect();
    let code = format!("{}({})", name, args.join(", "));
    Some(ParseResult::success(code, CommandType::RoutineCall, 0.95))
}
