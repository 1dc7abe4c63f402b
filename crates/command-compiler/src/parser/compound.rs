//! Commands that wrap other commands: loops and parallel tasks

use super::{
    indent_continuation, ClarificationKind, CommandType, ParseContext, ParseResult, MAX_NESTING,
};
use crate::lexicon as lx;
use crate::tokenizer::TokenKind;

const NESTING_ERROR: &str = "Nested compound commands are not supported";

fn nesting_exceeded(cx: &ParseContext<'_>) -> bool {
    cx.depth >= MAX_NESTING
}

/// Split "A while B", "simultaneously A and B", "A and B at the same time"
/// or "A and B" into its two halves.
fn split_tasks(lower: &str) -> Option<(String, String)> {
    let has_while = lower.contains(" while ");
    let has_simultaneously = lower.contains("simultaneously");
    let has_same_time = lower.contains("at the same time");
    let has_and = lower.contains(" and ")
        && lx::MULTITASK_ACTION_WORDS
            .iter()
            .any(|w| lower.contains(w));

    let (first, second) = if has_while {
        let parts: Vec<&str> = lower.split(" while ").collect();
        if parts.len() != 2 {
            return None;
        }
        (parts[0].to_string(), parts[1].to_string())
    } else if has_simultaneously || has_same_time {
        let phrase = if has_simultaneously {
            "simultaneously"
        } else {
            "at the same time"
        };
        let rest = lower.replace(phrase, "");
        let (a, b) = rest.trim().split_once(" and ")?;
        (a.to_string(), b.to_string())
    } else if has_and {
        let (a, b) = lower.split_once(" and ")?;
        (a.to_string(), b.to_string())
    } else {
        return None;
    };

    let (first, second) = (first.trim().to_string(), second.trim().to_string());
    if first.is_empty() || second.is_empty() {
        return None;
    }
    Some((first, second))
}

pub(super) fn parse_multitask(cx: &ParseContext<'_>) -> Option<ParseResult> {
    let lower = cx.input.to_lowercase();
    let (first, second) = split_tasks(&lower)?;
    if nesting_exceeded(cx) {
        return Some(ParseResult::error(NESTING_ERROR));
    }

    let task_code = |desc: &str| {
        let result = cx.parse_nested(desc);
        match result.code() {
            Some(code) => indent_continuation(code),
            None => format!("# TODO: {}", desc),
        }
    };

    let code = format!(
        "# Parallel execution: {first} AND {second}\n\
         async def task1():\n    {}\n\n\
         async def task2():\n    {}\n\n\
         await multitask(task1(), task2())",
        task_code(&first),
        task_code(&second),
    );
    Some(ParseResult::success(code, CommandType::Multitask, 0.85))
}

/// Text of the loop body, keeping the caller's capitalization.
fn loop_body(input: &str) -> String {
    let lower = input.to_lowercase();
    // Lowercasing can change byte offsets outside ASCII
    let source = if lower.len() == input.len() {
        input
    } else {
        lower.as_str()
    };

    let start = lower
        .find("times:")
        .map(|i| i + "times:".len())
        .or_else(|| lower.find("times :").map(|i| i + "times :".len()))
        .or_else(|| source.find(": ").map(|i| i + 2))
        .or_else(|| source.find(':').map(|i| i + 1));

    match start {
        Some(i) => source.get(i..).unwrap_or_default().trim().to_string(),
        None => String::new(),
    }
}

pub(super) fn parse_repeat(cx: &ParseContext<'_>) -> Option<ParseResult> {
    if !cx.has(TokenKind::Repeat) {
        return None;
    }
    if nesting_exceeded(cx) {
        return Some(ParseResult::error(NESTING_ERROR));
    }

    let Some(number) = cx.numbers().next() else {
        return Some(
            ParseResult::clarify(
                "count",
                "How many times should the action repeat?",
                ClarificationKind::Distance,
            )
            .with_command_type(CommandType::Loop),
        );
    };
    let count = match number.numeric_value.unwrap_or(0.0) {
        v if v == 0.0 => 1,
        v => v as i64,
    };

    let action = loop_body(cx.input);
    if action.is_empty() {
        return Some(ParseResult::success(
            format!("for i in range({count}):\n    # Add commands here\n    pass"),
            CommandType::Loop,
            0.7,
        ));
    }

    let body = cx.parse_nested(&action);
    let result = match body.code() {
        Some(code) => ParseResult::success(
            format!("for i in range({count}):\n    {}", indent_continuation(code)),
            CommandType::Loop,
            0.9,
        ),
        None => ParseResult::success(
            format!("for i in range({count}):\n    # {action}\n    pass"),
            CommandType::Loop,
            0.75,
        ),
    };
    Some(result)
}

pub(super) fn parse_parallel(cx: &ParseContext<'_>) -> Option<ParseResult> {
    if !cx.has(TokenKind::Parallel) {
        return None;
    }
    let code = "async def task1():\n    # First action\n    pass\n\n\
                async def task2():\n    # Second action\n    pass\n\n\
                await multitask(task1(), task2())";
    Some(ParseResult::success(code, CommandType::Parallel, 0.7).with_needs_llm())
}
