//! Single motion commands: move, turn, wait, motors, stop and speed settings

use super::{ClarificationKind, CommandType, ParseContext, ParseResult};
use crate::lexicon as lx;
use crate::tokenizer::{Token, TokenKind};

/// Second number given as a speed, either after a speed word or after "at".
///
/// Needs at least two numbers in the sentence; `primary` is the number
/// already used as the distance or angle.
fn rate_override(cx: &ParseContext<'_>, primary: Option<&Token>) -> Option<f64> {
    if cx.numbers().count() < 2 {
        return None;
    }
    let value = if let Some(speed_at) = cx.position(TokenKind::Speed) {
        cx.tokens[speed_at..]
            .iter()
            .find(|t| t.is(TokenKind::Number))
            .and_then(|t| t.numeric_value)
    } else {
        let at = cx.tokens.iter().position(|t| t.raw == "at")?;
        cx.tokens[at..]
            .iter()
            .find(|t| t.is(TokenKind::Number) && !primary.is_some_and(|p| std::ptr::eq(p, *t)))
            .and_then(|t| t.numeric_value)
    };
    value.filter(|v| *v != 0.0)
}

pub(super) fn parse_stop(cx: &ParseContext<'_>) -> Option<ParseResult> {
    if !cx.has_verb(lx::STOP_VERBS) {
        return None;
    }
    Some(match cx.motor() {
        Some(motor) => ParseResult::success(format!("{motor}.stop()"), CommandType::Stop, 0.9),
        None => ParseResult::success("robot.stop()", CommandType::Stop, 0.85),
    })
}

pub(super) fn parse_set_speed(cx: &ParseContext<'_>) -> Option<ParseResult> {
    if !cx.has(TokenKind::Speed) || cx.has_verb(lx::MOVE_VERBS) {
        return None;
    }
    // "turn right slowly" is a turn, unless a set verb says otherwise
    if cx.has_verb(lx::TURN_VERBS)
        && cx.has(TokenKind::Direction)
        && !cx.has_verb(lx::SET_VERBS)
    {
        return None;
    }

    let Some(number) = cx.numbers().next() else {
        return Some(
            ParseResult::clarify(
                "speed",
                "What speed should be set? (mm/s)",
                ClarificationKind::Distance,
            )
            .with_command_type(CommandType::SetSpeed),
        );
    };
    let value = match number.numeric_value.unwrap_or(0.0) {
        v if v == 0.0 => 100,
        v => v as i64,
    };

    let setting = if cx
        .tokens
        .iter()
        .any(|t| lx::contains(lx::TURN_RATE_WORDS, &t.raw))
    {
        "turn_rate"
    } else {
        "straight_speed"
    };
    Some(ParseResult::success(
        format!("robot.settings({setting}={value})"),
        CommandType::SetSpeed,
        0.9,
    ))
}

pub(super) fn parse_motor(cx: &ParseContext<'_>) -> Option<ParseResult> {
    if !cx.has_verb(lx::RUN_VERBS) {
        return None;
    }
    let motor = cx.motor()?;

    let Some(angle) = cx.numbers().next().and_then(|t| t.numeric_value) else {
        return Some(
            ParseResult::clarify(
                "angle",
                format!("How many degrees should the {motor} motor run?"),
                ClarificationKind::Angle,
            )
            .with_command_type(CommandType::Motor),
        );
    };
    let speed = cx.config.motor_speed as i64;
    Some(ParseResult::success(
        format!("{motor}.run_angle({speed}, {})", angle as i64),
        CommandType::Motor,
        0.85,
    ))
}

pub(super) fn parse_precise_turn(cx: &ParseContext<'_>) -> Option<ParseResult> {
    if !cx.has_verb(lx::TURN_VERBS) || !cx.has(TokenKind::Precise) {
        return None;
    }
    let direction = cx.direction();
    if matches!(direction, Some(d) if d != "left" && d != "right") {
        return None;
    }

    let Some(angle) = cx.numbers().next().and_then(|t| t.numeric_value) else {
        return Some(
            ParseResult::clarify(
                "angle",
                "What angle should the robot turn precisely?",
                ClarificationKind::Angle,
            )
            .with_command_type(CommandType::PreciseTurn),
        );
    };
    let mut angle = angle as i64;
    if direction == Some("left") {
        angle = -angle;
    }

    let code = format!(
        "# Precise turn using gyro feedback
target_angle = hub.imu.heading() + {angle}
while abs(hub.imu.heading() - target_angle) > 1:
    error = target_angle - hub.imu.heading()
    speed = max(30, min(200, abs(error) * 2))
    if error > 0:
        left.run(-speed)
        right.run(speed)
    else:
        left.run(speed)
        right.run(-speed)
    wait(10)
robot.stop()"
    );
    Some(ParseResult::success(code, CommandType::PreciseTurn, 0.9))
}

pub(super) fn parse_turn(cx: &ParseContext<'_>) -> Option<ParseResult> {
    let direction = cx.direction();
    if !cx.has_verb(lx::TURN_VERBS) && direction.is_none() {
        return None;
    }
    if matches!(direction, Some(d) if d != "left" && d != "right") {
        return None;
    }

    let angle_token = cx.numbers().next();
    let rate = rate_override(cx, angle_token);
    let Some(angle) = angle_token.and_then(|t| t.numeric_value) else {
        return Some(
            ParseResult::clarify(
                "angle",
                "What angle should the robot turn?",
                ClarificationKind::Angle,
            )
            .with_command_type(CommandType::Turn),
        );
    };

    let angle = if direction == Some("left") { -angle } else { angle };
    let code = match rate {
        Some(rate) => format!(
            "robot.settings(turn_rate={})\nrobot.turn({})",
            rate as i64, angle as i64
        ),
        None => format!("robot.turn({})", angle as i64),
    };
    Some(ParseResult::success(code, CommandType::Turn, 0.95))
}

pub(super) fn parse_move(cx: &ParseContext<'_>) -> Option<ParseResult> {
    let direction = cx.direction();
    if !cx.has_verb(lx::MOVE_VERBS) && direction.is_none() {
        return None;
    }
    if matches!(direction, Some(d) if d != "forward" && d != "backward") {
        return None;
    }

    let unit = cx.first(TokenKind::Unit);
    // The number right before the unit wins over the first number
    let distance_token = cx
        .position(TokenKind::Unit)
        .and_then(|at| cx.tokens[..at].iter().rev().find(|t| t.is(TokenKind::Number)))
        .or_else(|| cx.numbers().next());
    let speed = rate_override(cx, distance_token);

    let Some(mut distance) = distance_token.and_then(|t| t.numeric_value) else {
        return Some(
            ParseResult::clarify(
                "distance",
                "How far should the robot move?",
                ClarificationKind::Distance,
            )
            .with_command_type(CommandType::Move),
        );
    };
    if let Some(unit) = unit {
        distance *= lx::distance_factor(unit.text()).unwrap_or(1.0);
    }
    if direction == Some("backward") {
        distance = -distance;
    }

    let code = match speed {
        Some(speed) => format!(
            "robot.settings(straight_speed={})\nrobot.straight({})",
            speed as i64, distance as i64
        ),
        None => format!("robot.straight({})", distance as i64),
    };
    Some(ParseResult::success(code, CommandType::Move, 0.95))
}

pub(super) fn parse_wait(cx: &ParseContext<'_>) -> Option<ParseResult> {
    if !cx.has_verb(lx::WAIT_VERBS) {
        return None;
    }

    let Some(duration) = cx.numbers().next().and_then(|t| t.numeric_value) else {
        return Some(
            ParseResult::clarify(
                "duration",
                "How long should the robot wait?",
                ClarificationKind::Duration,
            )
            .with_command_type(CommandType::Wait),
        );
    };
    // A bare number means seconds
    let factor = cx
        .first(TokenKind::Unit)
        .map(|unit| lx::time_factor(unit.text()).unwrap_or(1000.0))
        .unwrap_or(1000.0);
    Some(ParseResult::success(
        format!("wait({})", (duration * factor) as i64),
        CommandType::Wait,
        0.9,
    ))
}
