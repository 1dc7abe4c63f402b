//! Sensor driven commands: waiting on a reading and following a line

use super::{CommandType, ParseContext, ParseResult};
use crate::lexicon as lx;
use crate::tokenizer::TokenKind;

/// mm/s used while driving towards a sensor condition.
const SENSOR_DRIVE_SPEED: i64 = 200;

/// Reading expression for a sensor word.
fn sensor_reading(sensor: &str) -> &'static str {
    match sensor {
        "light" | "color" => "color_sensor.reflection()",
        "distance" | "ultrasonic" => "distance_sensor.distance()",
        "force" => "force_sensor.force()",
        "gyro" => "hub.imu.heading()",
        _ => "sensor.reflection()",
    }
}

/// Operator that keeps the wait loop spinning.
///
/// "until" waits while the condition does not hold yet; "while" keeps the
/// operator as written.
fn loop_condition(comparison: &str, is_while: bool) -> &str {
    if is_while {
        comparison
    } else if comparison == ">" {
        "<="
    } else {
        ">="
    }
}

pub(super) fn parse_sensor_wait(cx: &ParseContext<'_>) -> Option<ParseResult> {
    let has_until = cx.has(TokenKind::Until);
    let has_while = cx.has(TokenKind::While);
    if !has_until && !has_while {
        return None;
    }
    if !cx.has(TokenKind::Sensor) && !cx.has(TokenKind::Color) {
        return None;
    }

    let direction = cx.direction();
    let moving =
        cx.has_verb(lx::MOVE_VERBS) || matches!(direction, Some("forward") | Some("backward"));
    let mut speed = SENSOR_DRIVE_SPEED;
    if direction == Some("backward") {
        speed = -speed;
    }

    if let Some(color) = cx.first(TokenKind::Color) {
        let color = color.text().to_uppercase();
        let wait_loop = format!("while color_sensor.color() != Color.{color}:\n    wait(10)");
        return Some(if moving {
            ParseResult::success(
                format!(
                    "# Drive until color detected\nrobot.drive({speed}, 0)\n{wait_loop}\nrobot.stop()"
                ),
                CommandType::SensorMove,
                0.9,
            )
        } else {
            ParseResult::success(wait_loop, CommandType::Sensor, 0.85)
        });
    }

    let sensor = cx.first(TokenKind::Sensor)?;
    let number = cx.numbers().next()?;
    let value = match number.numeric_value.unwrap_or(0.0) {
        v if v == 0.0 => 50,
        v => v as i64,
    };
    let comparison = cx
        .first(TokenKind::Comparison)
        .map(|t| t.text())
        .unwrap_or(">");
    let condition = loop_condition(comparison, has_while);
    let wait_loop = format!(
        "while {} {} {}:\n    wait(10)",
        sensor_reading(sensor.text()),
        condition,
        value
    );

    Some(if moving {
        ParseResult::success(
            format!(
                "# Drive until sensor condition met\nrobot.drive({speed}, 0)\n{wait_loop}\nrobot.stop()"
            ),
            CommandType::SensorMove,
            0.9,
        )
    } else {
        ParseResult::success(wait_loop, CommandType::Sensor, 0.85)
    })
}

pub(super) fn parse_line_follow(cx: &ParseContext<'_>) -> Option<ParseResult> {
    if !cx.has(TokenKind::Follow) || !cx.has(TokenKind::Line) {
        return None;
    }

    let mut distance = cx
        .numbers()
        .next()
        .and_then(|t| t.numeric_value)
        .unwrap_or(0.0);
    if let Some(unit) = cx.first(TokenKind::Unit) {
        distance *= lx::distance_factor(unit.text()).unwrap_or(1.0);
    }

    // the loop keeps its stop-condition line even when it is empty
    let stop_condition = if distance > 0.0 {
        format!("if robot.distance() >= {}:\n        break", distance as i64)
    } else if cx.has(TokenKind::Until) {
        "# Add stop condition".to_string()
    } else {
        String::new()
    };
    let lines = [
        "# Line following - adjust threshold and speed as needed".to_string(),
        "threshold = 50".to_string(),
        "while True:".to_string(),
        "    error = left_light.reflection() - threshold".to_string(),
        "    correction = error * 1.0  # Adjust gain as needed".to_string(),
        "    left.run(200 - correction)".to_string(),
        "    right.run(200 + correction)".to_string(),
        format!("    {stop_condition}"),
        "    wait(10)".to_string(),
        "robot.stop()".to_string(),
    ];

    Some(ParseResult::success(
        lines.join("\n"),
        CommandType::LineFollow,
        0.75,
    ))
}
