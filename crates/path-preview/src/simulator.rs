//! Kinematic replay of drivebase statements
//!
//! Only `robot.straight(mm)`, `robot.turn(deg)` and `wait(ms)` move the
//! preview; every other statement is skipped. Distances are drawn at
//! [`SCALE_MM_TO_PX`] pixels per millimeter and heading 0 points up the canvas.

use crate::types::{CalculatedPath, PreviewPoint, PreviewSegment, SegmentKind};
use regex::Regex;
use std::sync::OnceLock;

pub const SCALE_MM_TO_PX: f64 = 0.5;

struct Patterns {
    straight: Regex,
    turn: Regex,
    wait: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        straight: Regex::new(r"robot\.straight\((-?[0-9]+(?:\.[0-9]+)?)\)")
            .expect("Invalid regex pattern - this is a bug"),
        turn: Regex::new(r"robot\.turn\((-?[0-9]+(?:\.[0-9]+)?)\)")
            .expect("Invalid regex pattern - this is a bug"),
        wait: Regex::new(r"wait\(([0-9]+(?:\.[0-9]+)?)\)")
            .expect("Invalid regex pattern - this is a bug"),
    })
}

fn capture(re: &Regex, command: &str) -> Option<f64> {
    re.captures(command)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Map any angle into [0, 360).
pub fn normalize_angle(angle: f64) -> f64 {
    let normalized = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Interpolate between two headings along the shorter arc.
pub fn interpolate_angle(start: f64, end: f64, progress: f64) -> f64 {
    let mut diff = end - start;
    if diff > 180.0 {
        diff -= 360.0;
    }
    if diff <= -180.0 {
        diff += 360.0;
    }
    normalize_angle(start + diff * progress)
}

fn rate_or_unit(rate: f64) -> f64 {
    if rate > 0.0 {
        rate
    } else {
        1.0
    }
}

fn segment(kind: SegmentKind, start: PreviewPoint, end: PreviewPoint, command: &str) -> PreviewSegment {
    PreviewSegment {
        kind,
        start_point: start,
        end_point: end,
        command: command.to_string(),
    }
}

pub fn straight_segment(start: PreviewPoint, distance: f64, speed: f64, command: &str) -> PreviewSegment {
    let heading = (start.angle - 90.0).to_radians();
    let end = PreviewPoint {
        x: start.x + distance * SCALE_MM_TO_PX * heading.cos(),
        y: start.y + distance * SCALE_MM_TO_PX * heading.sin(),
        angle: start.angle,
        timestamp: start.timestamp + distance.abs() / rate_or_unit(speed) * 1000.0,
    };
    segment(SegmentKind::Straight, start, end, command)
}

pub fn turn_segment(start: PreviewPoint, angle: f64, turn_rate: f64, command: &str) -> PreviewSegment {
    let end = PreviewPoint {
        angle: normalize_angle(start.angle + angle),
        timestamp: start.timestamp + angle.abs() / rate_or_unit(turn_rate) * 1000.0,
        ..start
    };
    segment(SegmentKind::Turn, start, end, command)
}

pub fn wait_segment(start: PreviewPoint, duration: f64, command: &str) -> PreviewSegment {
    let end = start.with_timestamp(start.timestamp + duration);
    segment(SegmentKind::Wait, start, end, command)
}

/// Segment for one statement, or `None` when it does not move the robot.
pub fn command_to_segment(
    command: &str,
    start: PreviewPoint,
    speed: f64,
    turn_rate: f64,
) -> Option<PreviewSegment> {
    let p = patterns();
    if let Some(distance) = capture(&p.straight, command) {
        return Some(straight_segment(start, distance, speed, command));
    }
    if let Some(angle) = capture(&p.turn, command) {
        return Some(turn_segment(start, angle, turn_rate, command));
    }
    if let Some(duration) = capture(&p.wait, command) {
        return Some(wait_segment(start, duration, command));
    }
    None
}

/// Replay statements in order from `start`.
///
/// Segment timestamps always count from zero, whatever the timestamp of
/// `start`.
pub fn calculate_path<S: AsRef<str>>(
    commands: &[S],
    start: PreviewPoint,
    speed: f64,
    turn_rate: f64,
) -> CalculatedPath {
    let mut segments = Vec::new();
    let mut current = start;
    let mut total_time = 0.0;

    for command in commands.iter().map(AsRef::as_ref) {
        let Some(mut seg) = command_to_segment(command, current, speed, turn_rate) else {
            tracing::debug!("preview skipping {:?}", command);
            continue;
        };
        let duration = seg.duration();
        seg.start_point.timestamp = total_time;
        total_time += duration;
        seg.end_point.timestamp = total_time;

        current = seg.end_point;
        segments.push(seg);
    }

    CalculatedPath {
        segments,
        total_time,
        end_position: current,
    }
}

/// Replay a whole program text line by line.
pub fn calculate_path_for_program(
    program: &str,
    start: PreviewPoint,
    speed: f64,
    turn_rate: f64,
) -> CalculatedPath {
    let lines: Vec<&str> = program.lines().collect();
    calculate_path(&lines, start, speed, turn_rate)
}

fn lerp(start: &PreviewPoint, end: &PreviewPoint, progress: f64, timestamp: f64) -> PreviewPoint {
    PreviewPoint {
        x: start.x + (end.x - start.x) * progress,
        y: start.y + (end.y - start.y) * progress,
        angle: interpolate_angle(start.angle, end.angle, progress),
        timestamp,
    }
}

/// Pose at `timestamp` milliseconds.
pub fn position_at_time(path: &CalculatedPath, timestamp: f64) -> PreviewPoint {
    if path.segments.is_empty() {
        return PreviewPoint::default();
    }

    let active = path.segments.iter().find(|s| {
        s.start_point.timestamp <= timestamp && timestamp <= s.end_point.timestamp
    });
    match active {
        Some(seg) => {
            let duration = seg.duration();
            let progress = if duration == 0.0 {
                1.0
            } else {
                ((timestamp - seg.start_point.timestamp) / duration).clamp(0.0, 1.0)
            };
            lerp(&seg.start_point, &seg.end_point, progress, timestamp)
        }
        None => path.end_position,
    }
}

/// `points_per_segment + 1` evenly spaced poses per segment, boundaries
/// included.
pub fn generate_path_points(path: &CalculatedPath, points_per_segment: i64) -> Vec<PreviewPoint> {
    if points_per_segment <= 0 {
        return Vec::new();
    }

    let n = points_per_segment as f64;
    path.segments
        .iter()
        .flat_map(|seg| {
            (0..=points_per_segment).map(move |i| {
                let progress = i as f64 / n;
                let timestamp = seg.start_point.timestamp + seg.duration() * progress;
                lerp(&seg.start_point, &seg.end_point, progress, timestamp)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    fn start() -> PreviewPoint {
        PreviewPoint::new(100.0, 100.0, 0.0, 0.0)
    }

    #[test]
    fn test_straight_turn_wait() {
        let path = calculate_path(
            &["robot.straight(200)", "robot.turn(90)", "wait(500)"],
            start(),
            200.0,
            150.0,
        );
        assert_eq!(path.segments.len(), 3);
        assert!(approx(path.total_time, 2100.0));
        assert!(approx(path.end_position.x, 100.0));
        assert!(approx(path.end_position.y, 0.0));
        assert!(approx(path.end_position.angle, 90.0));
        assert!(approx(path.end_position.timestamp, 2100.0));

        let kinds: Vec<_> = path.segments.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SegmentKind::Straight, SegmentKind::Turn, SegmentKind::Wait]);
    }

    #[test]
    fn test_heading_rotates_displacement() {
        // heading 90 drives to the right, backwards at 180 drives down
        let path = calculate_path(&["robot.turn(90)", "robot.straight(100)"], start(), 100.0, 90.0);
        assert!(approx(path.end_position.x, 150.0));
        assert!(approx(path.end_position.y, 100.0));

        let path = calculate_path(&["robot.straight(-100)"], start(), 100.0, 90.0);
        assert!(approx(path.end_position.y, 150.0));
        assert!(approx(path.total_time, 1000.0));
    }

    #[test]
    fn test_segment_times_are_rebased() {
        let late_start = PreviewPoint::new(0.0, 0.0, 0.0, 5000.0);
        let path = calculate_path(&["wait(250)", "wait(250)"], late_start, 200.0, 150.0);
        assert!(approx(path.segments[0].start_point.timestamp, 0.0));
        assert!(approx(path.segments[1].start_point.timestamp, 250.0));
        assert!(approx(path.total_time, 500.0));
        for seg in &path.segments {
            assert!(seg.end_point.timestamp >= seg.start_point.timestamp);
        }
    }

    #[test]
    fn test_unmatched_lines_are_skipped() {
        let path = calculate_path(
            &["hub = PrimeHub()", "arm.run_angle(200, 90)", "robot.turn(-90)"],
            start(),
            200.0,
            90.0,
        );
        assert_eq!(path.segments.len(), 1);
        assert!(approx(path.end_position.angle, 270.0));
        assert!(approx(path.total_time, 1000.0));
    }

    #[test]
    fn test_non_positive_rates_use_unit_divisor() {
        let path = calculate_path(&["robot.straight(2)", "robot.turn(3)"], start(), 0.0, -5.0);
        assert!(approx(path.total_time, 5000.0));
    }

    #[test]
    fn test_replay_is_deterministic() {
        let commands = ["robot.straight(150)", "robot.turn(-45)", "wait(300)", "robot.straight(-20)"];
        let first = calculate_path(&commands, start(), 180.0, 120.0);
        let second = calculate_path(&commands, start(), 180.0, 120.0);
        assert_eq!(first, second);
        assert_eq!(generate_path_points(&first, 7), generate_path_points(&second, 7));
    }

    #[test]
    fn test_empty_path() {
        let path = calculate_path::<&str>(&[], start(), 200.0, 150.0);
        assert!(path.segments.is_empty());
        assert_eq!(path.total_time, 0.0);
        assert_eq!(path.end_position, start());
        assert_eq!(position_at_time(&path, 10.0), PreviewPoint::default());
        assert!(generate_path_points(&path, 10).is_empty());
    }

    #[test]
    fn test_position_at_time() {
        let path = calculate_path(&["robot.straight(200)"], start(), 200.0, 150.0);
        let mid = position_at_time(&path, 500.0);
        assert!(approx(mid.x, 100.0));
        assert!(approx(mid.y, 50.0));
        assert!(approx(mid.angle, 0.0));
        assert!(approx(mid.timestamp, 500.0));

        // past the end
        assert_eq!(position_at_time(&path, 5000.0), path.end_position);
    }

    #[test]
    fn test_angle_interpolation_takes_short_arc() {
        assert!(approx(interpolate_angle(350.0, 10.0, 0.5), 0.0));
        assert!(approx(interpolate_angle(10.0, 350.0, 0.5), 0.0));
        assert!(approx(interpolate_angle(0.0, 90.0, 0.5), 45.0));
        // half a turn is taken clockwise
        assert!(approx(interpolate_angle(180.0, 0.0, 0.5), 270.0));
        assert!(approx(interpolate_angle(0.0, 180.0, 0.5), 90.0));
    }

    #[test]
    fn test_normalize_angle() {
        assert_eq!(normalize_angle(-90.0), 270.0);
        assert_eq!(normalize_angle(720.0), 0.0);
        assert_eq!(normalize_angle(45.0), 45.0);
        assert!(normalize_angle(-1e-20) < 360.0);
    }

    #[test]
    fn test_generate_path_points() {
        let path = calculate_path(&["robot.straight(200)", "robot.turn(90)"], start(), 200.0, 180.0);
        let points = generate_path_points(&path, 10);
        assert_eq!(points.len(), 22);
        assert!(approx(points[0].timestamp, 0.0));
        assert!(approx(points[21].timestamp, path.total_time));
        assert!(approx(points[10].y, 0.0));
        assert!(generate_path_points(&path, 0).is_empty());
        assert!(generate_path_points(&path, -3).is_empty());
    }

    #[test]
    fn test_program_text() {
        let program = "from pybricks.tools import wait\n\n# Main program\nrobot.straight(100)\nfor i in range(2):\n    robot.turn(90)\nwait(1000)";
        let path = calculate_path_for_program(program, start(), 100.0, 90.0);
        assert_eq!(path.segments.len(), 3);
        assert!(approx(path.total_time, 3000.0));
        assert_eq!(path.segments[1].command, "    robot.turn(90)");
    }
}
