use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use command_compiler as cc;
use command_compiler::mock::MockCompleter;
use command_compiler::{CodeCompleter, ParseResult, ParseStatus, ProgramSpec, RobotConfig};
use path_preview::{PreviewDefaults, PreviewPoint, PreviewRequest};

#[derive(Parser, Debug)]
#[command(
    name = "brick",
    version,
    about = "Compile robot commands written in plain English into Pybricks programs",
    disable_help_subcommand = true
)]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Robot configuration, from a file and/or individual overrides
#[derive(Args, Debug, Default)]
struct RobotArgs {
    /// Robot configuration file (YAML, or JSON by extension)
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    left_port: Option<String>,
    #[arg(long)]
    right_port: Option<String>,
    /// Wheel diameter in mm
    #[arg(long)]
    wheel_diameter: Option<f64>,
    /// Axle track in mm
    #[arg(long)]
    axle_track: Option<f64>,
    /// Straight speed in mm/s
    #[arg(long)]
    speed: Option<f64>,
    /// Turn rate in deg/s
    #[arg(long)]
    turn_rate: Option<f64>,
    #[arg(long)]
    attachment1_port: Option<String>,
    #[arg(long)]
    attachment2_port: Option<String>,
    #[arg(long)]
    color_sensor_port: Option<String>,
    #[arg(long)]
    ultrasonic_port: Option<String>,
    #[arg(long)]
    force_port: Option<String>,
    /// Routine definitions file (YAML, or JSON by extension)
    #[arg(long)]
    routines: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show how a sentence is tokenized
    Tokenize {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Parse one sentence into code
    Parse {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        #[command(flatten)]
        robot: RobotArgs,
    },
    /// Compile a list of sentences into a complete program
    Compile {
        /// Program file with config, routines and commands (YAML or JSON)
        #[arg(long)]
        file: Option<PathBuf>,
        /// Sentence to compile; may be repeated and is added after the file's commands
        #[arg(long = "command", short = 'c')]
        commands: Vec<String>,
        #[command(flatten)]
        robot: RobotArgs,
        /// Answer language model requests with this fixed code (offline)
        #[arg(long)]
        mock_reply: Option<String>,
        /// Write the program here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Check whether a sentence compiles with the default robot
    Validate {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Autocomplete suggestions for partially typed text
    Suggest {
        #[arg(default_value = "")]
        text: String,
        /// Cursor byte offset; defaults to the end of the text
        #[arg(long)]
        cursor: Option<usize>,
    },
    /// Simulate the drivebase path of generated statements
    Preview {
        /// Program file to replay line by line
        #[arg(long)]
        file: Option<PathBuf>,
        /// Statements to replay, e.g. "robot.straight(200)"
        statements: Vec<String>,
        /// Treat the statements as sentences and compile them first
        #[arg(long, action = ArgAction::SetTrue)]
        natural: bool,
        // drive rates come from the resolved --speed and --turn-rate
        #[command(flatten)]
        robot: RobotArgs,
        /// Sampled points per segment
        #[arg(long, default_value_t = 20)]
        points: i64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        start_x: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        start_y: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        start_angle: f64,
    },
}

fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    cc::init().map_err(|e| anyhow::anyhow!("initializing command compiler: {e}"))?;
    path_preview::init().map_err(|e| anyhow::anyhow!("initializing path preview: {e}"))?;
    let json = cli.json;

    match cli.command {
        Commands::Tokenize { text } => tokenize(&text.join(" "), json),
        Commands::Parse { text, robot } => parse(&text.join(" "), &robot, json),
        Commands::Compile {
            file,
            commands,
            robot,
            mock_reply,
            out,
        } => compile(
            file.as_deref(),
            commands,
            &robot,
            mock_reply,
            out.as_deref(),
            json,
        ),
        Commands::Validate { text } => validate(&text.join(" "), json),
        Commands::Suggest { text, cursor } => suggest(&text, cursor, json),
        Commands::Preview {
            file,
            statements,
            natural,
            robot,
            points,
            start_x,
            start_y,
            start_angle,
        } => {
            let mut lines = match &file {
                Some(path) => fs::read_to_string(path)
                    .with_context(|| format!("reading program: {}", path.display()))?
                    .lines()
                    .map(str::to_string)
                    .collect(),
                None => Vec::new(),
            };
            if natural {
                lines.extend(compile_sentences(statements, &robot)?);
            } else {
                lines.extend(statements);
            }
            let config = robot.resolve(RobotConfig::default())?;
            let request = PreviewRequest {
                commands: lines,
                start_position: PreviewPoint::new(start_x, start_y, start_angle, 0.0),
                defaults: PreviewDefaults {
                    speed: config.speed,
                    turn_rate: config.turn_rate,
                },
                points_per_segment: points,
            };
            preview(&request, json)
        }
    }
}

fn setup_tracing() {
    // Best-effort; avoid panics if already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn status_label(status: ParseStatus) -> &'static str {
    match status {
        ParseStatus::Parsed => "parsed",
        ParseStatus::NeedsClarification => "needs clarification",
        ParseStatus::NeedsLlm => "needs language model",
        ParseStatus::Error => "error",
    }
}

impl RobotArgs {
    /// Layer the config file and overrides on top of `base`.
    fn resolve(&self, base: RobotConfig) -> Result<RobotConfig> {
        let mut config = match &self.config {
            Some(path) => cc::config::load_robot_config(path)?,
            None => base,
        };

        let ports = [
            (&self.left_port, &mut config.left_motor_port),
            (&self.right_port, &mut config.right_motor_port),
        ];
        for (value, slot) in ports {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }
        let optional_ports = [
            (&self.attachment1_port, &mut config.attachment1_port),
            (&self.attachment2_port, &mut config.attachment2_port),
            (&self.color_sensor_port, &mut config.color_sensor_port),
            (&self.ultrasonic_port, &mut config.ultrasonic_port),
            (&self.force_port, &mut config.force_port),
        ];
        for (value, slot) in optional_ports {
            if value.is_some() {
                *slot = value.clone();
            }
        }
        let numbers = [
            (self.wheel_diameter, &mut config.wheel_diameter),
            (self.axle_track, &mut config.axle_track),
            (self.speed, &mut config.speed),
            (self.turn_rate, &mut config.turn_rate),
        ];
        for (value, slot) in numbers {
            if let Some(value) = value {
                *slot = value;
            }
        }
        Ok(config)
    }

    fn routines(&self) -> Result<Option<Vec<cc::RoutineDefinition>>> {
        self.routines
            .as_ref()
            .map(cc::config::load_routines)
            .transpose()
    }
}

fn tokenize(text: &str, json: bool) -> Result<()> {
    let tokens = cc::tokenize(text);
    if json {
        return print_json(&tokens);
    }
    for token in &tokens {
        match token.numeric_value {
            Some(value) => println!("{}\t{}\t{}", token.kind, token.raw, value),
            None => println!("{}\t{}\t{}", token.kind, token.raw, token.text()),
        }
    }
    Ok(())
}

fn print_result(result: &ParseResult) {
    let command_type = result
        .command_type
        .map(|t| t.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{} ({}, confidence {:.2})",
        status_label(result.status()),
        command_type,
        result.confidence
    );
    if let Some(code) = result.code() {
        println!("{}", code);
    }
    if let Some(clarification) = result.clarification() {
        println!("{}: {}", clarification.field, clarification.message);
    }
    if let Some(message) = result.error_message() {
        println!("{}", message);
    }
}

fn parse(text: &str, robot: &RobotArgs, json: bool) -> Result<()> {
    let config = robot.resolve(RobotConfig::default())?;
    let routine_names: Vec<String> = robot
        .routines()?
        .unwrap_or_default()
        .into_iter()
        .map(|r| r.name)
        .collect();

    let result = cc::parse_command(text, &config, &config.motor_names(), &routine_names);
    if json {
        return print_json(&result);
    }
    print_result(&result);
    Ok(())
}

fn compile(
    file: Option<&Path>,
    commands: Vec<String>,
    robot: &RobotArgs,
    mock_reply: Option<String>,
    out: Option<&Path>,
    json: bool,
) -> Result<()> {
    let mut spec = match file {
        Some(path) => cc::load_program_file(path)?,
        None => ProgramSpec::default(),
    };
    spec.config = robot.resolve(spec.config)?;
    if let Some(routines) = robot.routines()? {
        spec.routines = routines;
    }
    spec.commands.extend(commands);
    if spec.commands.iter().all(|c| c.trim().is_empty()) {
        bail!("no commands to compile; pass --file or --command");
    }

    let completer = mock_reply.map(MockCompleter::replying);
    let compiled = cc::compile_program(
        &spec,
        completer.as_ref().map(|c| c as &dyn CodeCompleter),
    );
    info!(
        commands = compiled.results.len(),
        complete = compiled.is_complete(),
        "compile finished"
    );

    if let Some(path) = out {
        fs::write(path, &compiled.program.full)
            .with_context(|| format!("writing program: {}", path.display()))?;
    }
    if json {
        return print_json(&compiled);
    }

    for report in compiled
        .results
        .iter()
        .filter(|r| r.status != ParseStatus::Parsed)
    {
        let detail = report
            .clarification
            .as_ref()
            .map(|c| c.message.as_str())
            .or(report.error.as_deref())
            .unwrap_or("no rule matched");
        eprintln!(
            "{}: {} ({})",
            report.original,
            status_label(report.status),
            detail
        );
    }
    if out.is_none() {
        println!("{}", compiled.program.full);
    }
    Ok(())
}

fn validate(text: &str, json: bool) -> Result<()> {
    let validation = cc::validate_command(text);
    if json {
        return print_json(&validation);
    }
    if validation.valid {
        println!("valid");
    } else if let Some(clarification) = &validation.clarification {
        println!("incomplete: {}", clarification.message);
    } else {
        println!(
            "invalid: {}",
            validation.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

fn suggest(text: &str, cursor: Option<usize>, json: bool) -> Result<()> {
    let suggestions = cc::suggest(text, cursor.unwrap_or(text.len()));
    if json {
        return print_json(&suggestions);
    }
    for s in &suggestions {
        println!("{}\t{:?}", s.label, s.text);
    }
    Ok(())
}

/// Main-program lines for a list of sentences, compiled with the robot from `robot`.
fn compile_sentences(sentences: Vec<String>, robot: &RobotArgs) -> Result<Vec<String>> {
    let spec = ProgramSpec {
        config: robot.resolve(RobotConfig::default())?,
        routines: robot.routines()?.unwrap_or_default(),
        commands: sentences,
    };
    let compiled = cc::compile_program(&spec, None);
    Ok(compiled
        .results
        .iter()
        .filter_map(|r| r.code.as_deref())
        .flat_map(str::lines)
        .map(str::to_string)
        .collect())
}

fn preview(request: &PreviewRequest, json: bool) -> Result<()> {
    let response = path_preview::calculate_preview(request)?;
    if json {
        return print_json(&response);
    }
    for segment in &response.path.segments {
        let (start, end) = (segment.start_point, segment.end_point);
        println!(
            "{:>8.0}ms  {:<8} ({:.1}, {:.1}, {:.0}) -> ({:.1}, {:.1}, {:.0})  {}",
            start.timestamp,
            format!("{:?}", segment.kind).to_lowercase(),
            start.x,
            start.y,
            start.angle,
            end.x,
            end.y,
            end.angle,
            segment.command.trim()
        );
    }
    let end = response.path.end_position;
    println!(
        "total {:.0}ms, end at ({:.1}, {:.1}) heading {:.0}, {} points",
        response.path.total_time,
        end.x,
        end.y,
        end.angle,
        response.points.len()
    );
    Ok(())
}
