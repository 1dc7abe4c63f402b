//! Pybricks program assembly
//!
//! Turns the code of individually compiled commands into a complete program:
//! imports, hardware setup, user routines and the main body.

use crate::config::{port_in_use, RobotConfig, RoutineDefinition};
use serde::Serialize;

/// A generated program, split into its sections
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedProgram {
    pub imports: String,
    pub setup: String,
    pub routines: String,
    pub main: String,
    /// All sections joined into one runnable file
    pub full: String,
}

/// Whether any command drives the robot base or its wheel motors.
pub fn needs_drivebase<S: AsRef<str>>(commands: &[S]) -> bool {
    commands.iter().flat_map(|c| c.as_ref().lines()).any(|line| {
        line.trim().starts_with("robot.") || line.contains("left_motor") || line.contains("right_motor")
    })
}

/// Render a float the way the generated Python spells it.
fn python_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

pub fn generate_imports(
    config: &RobotConfig,
    uses_multitask: bool,
    needs_drivebase: bool,
    uses_color: bool,
) -> String {
    let mut devices = vec!["Motor"];
    if port_in_use(config.color_sensor_port.as_deref()).is_some() {
        devices.push("ColorSensor");
    }
    if port_in_use(config.ultrasonic_port.as_deref()).is_some() {
        devices.push("UltrasonicSensor");
    }
    if port_in_use(config.force_port.as_deref()).is_some() {
        devices.push("ForceSensor");
    }

    let mut parameters = vec!["Port", "Direction", "Stop"];
    if uses_color {
        parameters.push("Color");
    }

    let mut imports = vec![
        "from pybricks.hubs import PrimeHub".to_string(),
        format!("from pybricks.pupdevices import {}", devices.join(", ")),
        format!("from pybricks.parameters import {}", parameters.join(", ")),
    ];
    if needs_drivebase {
        imports.push("from pybricks.robotics import DriveBase".to_string());
    }
    if uses_multitask {
        imports.push("from pybricks.tools import wait, multitask, run_task".to_string());
    } else {
        imports.push("from pybricks.tools import wait".to_string());
    }
    imports.join("\n")
}

/// Hardware initialization for the hub, drivebase, attachments and sensors.
pub fn generate_setup(config: &RobotConfig, needs_drivebase: bool) -> String {
    let mut lines: Vec<String> = vec![
        "# Initialize hub".into(),
        "hub = PrimeHub()".into(),
        String::new(),
    ];

    if needs_drivebase {
        lines.push("# Motor setup".into());
        lines.push(format!(
            "left_motor = Motor(Port.{}, Direction.COUNTERCLOCKWISE)",
            config.left_motor_port
        ));
        lines.push(format!(
            "right_motor = Motor(Port.{}, Direction.CLOCKWISE)",
            config.right_motor_port
        ));
        lines.push(String::new());
        lines.push("# DriveBase setup".into());
        lines.push(format!(
            "robot = DriveBase(left_motor, right_motor, wheel_diameter={}, axle_track={})",
            python_float(config.wheel_diameter),
            python_float(config.axle_track)
        ));
        lines.push(format!(
            "robot.settings(straight_speed={}, straight_acceleration={}, turn_rate={}, turn_acceleration={})",
            config.speed as i64,
            config.acceleration as i64,
            config.turn_rate as i64,
            config.turn_acceleration as i64
        ));
        lines.push(String::new());
    }

    if let Some(port) = port_in_use(config.attachment1_port.as_deref()) {
        lines.push("# Attachment motors".into());
        lines.push(format!("attachment1 = Motor(Port.{port})"));
        if let Some(port) = port_in_use(config.attachment2_port.as_deref()) {
            lines.push(format!("attachment2 = Motor(Port.{port})"));
        }
        lines.push(String::new());
    }

    let sensors: Vec<String> = [
        ("color_sensor", "ColorSensor", &config.color_sensor_port),
        ("distance_sensor", "UltrasonicSensor", &config.ultrasonic_port),
        ("force_sensor", "ForceSensor", &config.force_port),
    ]
    .into_iter()
    .filter_map(|(var, class, port)| {
        port_in_use(port.as_deref()).map(|port| format!("{var} = {class}(Port.{port})"))
    })
    .collect();
    if !sensors.is_empty() {
        lines.push("# Sensors".into());
        lines.extend(sensors);
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Function definitions for the user's routines; empty when there are none.
pub fn generate_routines(routines: &[RoutineDefinition]) -> String {
    if routines.is_empty() {
        return String::new();
    }

    let mut lines = vec!["# Routines/Functions".to_string()];
    for routine in routines {
        lines.push(format!(
            "def {}({}):",
            routine.name,
            routine.parameters.join(", ")
        ));
        let body: Vec<&str> = routine
            .body
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if body.is_empty() {
            lines.push("    pass".to_string());
        } else {
            lines.extend(body.into_iter().map(|l| format!("    {l}")));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

pub fn generate_main<S: AsRef<str>>(commands: &[S]) -> String {
    if commands.is_empty() {
        return "# Add your commands here\npass".to_string();
    }
    commands
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assemble a complete program from compiled command code.
pub fn generate_program<S: AsRef<str>>(
    config: &RobotConfig,
    commands: &[S],
    routines: &[RoutineDefinition],
    uses_multitask: bool,
) -> GeneratedProgram {
    let drivebase = needs_drivebase(commands);
    let uses_color = commands.iter().any(|c| c.as_ref().contains("Color."));

    let imports = generate_imports(config, uses_multitask, drivebase, uses_color);
    let setup = generate_setup(config, drivebase);
    let routines = generate_routines(routines);
    let main = generate_main(commands);

    let mut parts: Vec<&str> = vec![imports.as_str(), "", setup.as_str()];
    if !routines.is_empty() {
        parts.extend(["", routines.as_str()]);
    }
    parts.extend(["", "# Main program", main.as_str()]);
    let full = parts.join("\n");

    tracing::debug!(
        commands = commands.len(),
        drivebase,
        uses_multitask,
        "generated program"
    );

    GeneratedProgram {
        imports,
        setup,
        routines,
        main,
        full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drivebase_detection() {
        assert!(needs_drivebase(&["robot.straight(100)"]));
        assert!(needs_drivebase(&["# Drive until color detected\nrobot.drive(200, 0)"]));
        assert!(needs_drivebase(&["    left_motor.run(10)"]));
        assert!(!needs_drivebase(&["wait(1000)", "arm.run_angle(200, 90)"]));
        assert!(!needs_drivebase::<&str>(&[]));
    }

    #[test]
    fn test_imports() {
        let config = RobotConfig::default();
        let imports = generate_imports(&config, false, true, false);
        assert_eq!(
            imports,
            "from pybricks.hubs import PrimeHub\n\
             from pybricks.pupdevices import Motor\n\
             from pybricks.parameters import Port, Direction, Stop\n\
             from pybricks.robotics import DriveBase\n\
             from pybricks.tools import wait"
        );

        let config = RobotConfig {
            color_sensor_port: Some("E".into()),
            force_port: Some("None".into()),
            ..RobotConfig::default()
        };
        let imports = generate_imports(&config, true, false, true);
        assert!(imports.contains("from pybricks.pupdevices import Motor, ColorSensor\n"));
        assert!(imports.contains("Port, Direction, Stop, Color"));
        assert!(imports.contains("wait, multitask, run_task"));
        assert!(!imports.contains("DriveBase"));
    }

    #[test]
    fn test_setup_with_drivebase() {
        let setup = generate_setup(&RobotConfig::default(), true);
        assert_eq!(
            setup,
            "# Initialize hub\n\
             hub = PrimeHub()\n\
             \n\
             # Motor setup\n\
             left_motor = Motor(Port.A, Direction.COUNTERCLOCKWISE)\n\
             right_motor = Motor(Port.B, Direction.CLOCKWISE)\n\
             \n\
             # DriveBase setup\n\
             robot = DriveBase(left_motor, right_motor, wheel_diameter=56.0, axle_track=112.0)\n\
             robot.settings(straight_speed=200, straight_acceleration=700, turn_rate=150, turn_acceleration=300)\n"
        );
    }

    #[test]
    fn test_setup_guards_each_device() {
        let config = RobotConfig {
            attachment1_port: Some("C".into()),
            attachment2_port: Some("D".into()),
            ultrasonic_port: Some("F".into()),
            color_sensor_port: Some(String::new()),
            ..RobotConfig::default()
        };
        let setup = generate_setup(&config, false);
        assert!(!setup.contains("DriveBase"));
        assert!(setup.contains("# Attachment motors\nattachment1 = Motor(Port.C)\nattachment2 = Motor(Port.D)\n"));
        assert!(setup.contains("# Sensors\ndistance_sensor = UltrasonicSensor(Port.F)\n"));
        assert!(!setup.contains("color_sensor"));

        // attachment2 alone is not set up
        let config = RobotConfig {
            attachment2_port: Some("D".into()),
            ..RobotConfig::default()
        };
        assert!(!generate_setup(&config, false).contains("attachment2"));
    }

    #[test]
    fn test_routines() {
        let routines = vec![
            RoutineDefinition {
                name: "square".into(),
                parameters: vec!["size".into()],
                body: "  robot.straight(size)\n\n  robot.turn(90)  ".into(),
            },
            RoutineDefinition {
                name: "noop".into(),
                parameters: vec![],
                body: "   ".into(),
            },
        ];
        assert_eq!(
            generate_routines(&routines),
            "# Routines/Functions\ndef square(size):\n    robot.straight(size)\n    robot.turn(90)\n\ndef noop():\n    pass\n"
        );
        assert_eq!(generate_routines(&[]), "");
    }

    #[test]
    fn test_main_placeholder() {
        assert_eq!(generate_main::<String>(&[]), "# Add your commands here\npass");
        assert_eq!(generate_main(&["wait(10)", "robot.stop()"]), "wait(10)\nrobot.stop()");
    }

    #[test]
    fn test_full_program_layout() {
        let program = generate_program(
            &RobotConfig::default(),
            &["robot.straight(200)"],
            &[],
            false,
        );
        assert!(program.full.starts_with(&program.imports));
        assert!(program
            .full
            .ends_with("\n\n# Main program\nrobot.straight(200)"));
        assert!(program.full.contains(&format!("{}\n\n{}", program.imports, program.setup)));
        assert!(!program.full.contains("# Routines/Functions"));

        let routines = vec![RoutineDefinition {
            name: "grab".into(),
            parameters: vec![],
            body: "arm.run_angle(200, 90)".into(),
        }];
        let program = generate_program(&RobotConfig::default(), &["grab()"], &routines, false);
        assert!(program
            .full
            .contains("\n\n# Routines/Functions\ndef grab():\n    arm.run_angle(200, 90)\n\n\n# Main program\ngrab()"));
        assert!(!program.full.contains("DriveBase"));
    }
}
