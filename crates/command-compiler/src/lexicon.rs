//! Word classes and unit tables used by the tokenizer and recognizers
//!
//! Color names follow the Pybricks `Color` constants. Distances are converted
//! to millimeters and durations to milliseconds.

pub const MOVE_VERBS: &[&str] = &["move", "go", "drive", "travel", "advance", "proceed"];
pub const FORWARD_WORDS: &[&str] = &["forward", "forwards", "ahead", "straight", "front"];
pub const BACKWARD_WORDS: &[&str] = &["backward", "backwards", "back", "reverse", "behind"];
pub const TURN_VERBS: &[&str] = &["turn", "rotate", "spin", "pivot", "swing"];
pub const LEFT_WORDS: &[&str] = &["left", "counterclockwise", "ccw"];
pub const RIGHT_WORDS: &[&str] = &["right", "clockwise", "cw"];
pub const WAIT_VERBS: &[&str] = &["wait", "pause", "delay", "sleep", "hold"];
pub const RUN_VERBS: &[&str] = &["run", "spin", "rotate", "move", "activate", "start"];
pub const STOP_VERBS: &[&str] = &["stop", "halt", "brake", "freeze", "end"];
pub const SET_VERBS: &[&str] = &["set", "change", "configure", "adjust", "use", "make"];
pub const MOTOR_WORDS: &[&str] = &[
    "motor",
    "arm",
    "claw",
    "gripper",
    "lift",
    "attachment",
    "grabber",
    "lever",
];

pub const ARC_VERBS: &[&str] = &["arc", "curve", "sweep", "bend"];
pub const HOLD_WORDS: &[&str] = &["hold", "lock", "maintain", "keep"];
pub const BEEP_VERBS: &[&str] = &["beep", "sound", "play", "tone", "buzz"];
pub const DISPLAY_VERBS: &[&str] = &["display", "show", "print", "write", "draw"];
pub const LIGHT_VERBS: &[&str] = &["light", "led", "illuminate", "glow"];
pub const HUB_WORDS: &[&str] = &["hub", "prime", "spike", "brick"];
pub const ON_WORDS: &[&str] = &["on", "enable", "activate"];
pub const OFF_WORDS: &[&str] = &["off", "disable", "deactivate"];
pub const HEADING_WORDS: &[&str] = &["heading", "direction", "orientation", "angle", "yaw"];
pub const RESET_WORDS: &[&str] = &["reset", "zero", "clear", "calibrate"];

pub const REPEAT_VERBS: &[&str] = &["repeat", "loop", "do"];
pub const TIMES_WORDS: &[&str] = &["times", "iterations", "loops"];
pub const DEFINE_VERBS: &[&str] = &["define", "create", "make", "build"];
pub const MISSION_WORDS: &[&str] = &["mission", "routine", "program", "task"];
pub const CALL_VERBS: &[&str] = &["call", "execute", "start", "begin", "launch"];

pub const SENSOR_WORDS: &[&str] = &[
    "sensor",
    "light",
    "color",
    "distance",
    "ultrasonic",
    "force",
    "gyro",
];
pub const UNTIL_WORDS: &[&str] = &["until", "till", "when"];
pub const WHILE_WORDS: &[&str] = &["while", "during", "as"];
pub const CONDITION_WORDS: &[&str] = &["sees", "detects", "reads", "measures", "is"];
pub const COMPARISON_WORDS: &[&str] = &[
    "greater", "less", "more", "above", "below", "equals", "equal",
];

pub const LINE_WORDS: &[&str] = &["line", "edge", "border"];
pub const FOLLOW_VERBS: &[&str] = &["follow", "track", "trace"];

pub const PARALLEL_WORDS: &[&str] = &[
    "simultaneously",
    "together",
    "parallel",
    "concurrently",
    "while",
];
pub const PRECISE_WORDS: &[&str] = &["precisely", "exactly", "accurate", "carefully", "gyro"];

pub const IF_WORDS: &[&str] = &["if", "when"];
pub const THEN_WORDS: &[&str] = &["then"];
pub const ELSE_WORDS: &[&str] = &["else", "otherwise"];

/// Distance units, multiplier to millimeters.
pub const DISTANCE_UNITS: &[(&str, f64)] = &[
    ("mm", 1.0),
    ("millimeter", 1.0),
    ("millimeters", 1.0),
    ("millimetre", 1.0),
    ("millimetres", 1.0),
    ("cm", 10.0),
    ("centimeter", 10.0),
    ("centimeters", 10.0),
    ("centimetre", 10.0),
    ("centimetres", 10.0),
    ("m", 1000.0),
    ("meter", 1000.0),
    ("meters", 1000.0),
    ("metre", 1000.0),
    ("metres", 1000.0),
];

/// Time units, multiplier to milliseconds.
pub const TIME_UNITS: &[(&str, f64)] = &[
    ("ms", 1.0),
    ("millisecond", 1.0),
    ("milliseconds", 1.0),
    ("s", 1000.0),
    ("sec", 1000.0),
    ("second", 1000.0),
    ("seconds", 1000.0),
    ("min", 60000.0),
    ("minute", 60000.0),
    ("minutes", 60000.0),
];

pub const ANGLE_UNITS: &[&str] = &["degree", "degrees", "deg"];

pub const COLORS: &[&str] = &[
    "red", "orange", "yellow", "green", "cyan", "blue", "violet", "magenta", "white", "gray",
    "grey", "black", "none",
];

pub const SPEED_WORDS: &[&str] = &["speed", "velocity", "rate", "fast", "slow", "quickly", "slowly"];

pub const FILLER_WORDS: &[&str] = &[
    "for", "to", "the", "a", "an", "of", "by", "at", "in", "on", "and", "then",
];

/// Words never fuzzy matched onto verbs.
pub const VERB_BLACKLIST: &[&str] = &["speed", "slow", "fast", "quick", "rate"];

/// Prefixes that introduce a routine call.
pub const CALL_PREFIXES: &[&str] = &["run ", "call ", "execute ", "start "];

/// Identifiers that are never guessed as routine names.
pub const RESERVED_ROUTINE_WORDS: &[&str] = &[
    "forward", "backward", "left", "right", "motor", "speed", "arm", "grabber",
];

/// Vocabulary that makes a plain " and " look like two concurrent actions.
pub const MULTITASK_ACTION_WORDS: &[&str] = &["move", "drive", "turn", "run", "motor"];

/// Words that mark a set-speed command as a turn-rate change.
pub const TURN_RATE_WORDS: &[&str] = &["turn", "turning", "rotation"];

const ALL_VERB_GROUPS: &[&[&str]] = &[
    MOVE_VERBS,
    TURN_VERBS,
    WAIT_VERBS,
    RUN_VERBS,
    STOP_VERBS,
    SET_VERBS,
    FOLLOW_VERBS,
    CALL_VERBS,
];

const ALL_DIRECTION_GROUPS: &[&[&str]] = &[FORWARD_WORDS, BACKWARD_WORDS, LEFT_WORDS, RIGHT_WORDS];

/// Every verb, in lookup order (duplicates kept).
pub fn all_verbs() -> &'static [&'static str] {
    static ALL: std::sync::OnceLock<Vec<&'static str>> = std::sync::OnceLock::new();
    ALL.get_or_init(|| ALL_VERB_GROUPS.iter().flat_map(|g| g.iter().copied()).collect())
}

/// Every direction word, in lookup order.
pub fn all_directions() -> &'static [&'static str] {
    static ALL: std::sync::OnceLock<Vec<&'static str>> = std::sync::OnceLock::new();
    ALL.get_or_init(|| {
        ALL_DIRECTION_GROUPS
            .iter()
            .flat_map(|g| g.iter().copied())
            .collect()
    })
}

/// Every unit word: distance, then time, then angle.
pub fn all_units() -> &'static [&'static str] {
    static ALL: std::sync::OnceLock<Vec<&'static str>> = std::sync::OnceLock::new();
    ALL.get_or_init(|| {
        DISTANCE_UNITS
            .iter()
            .chain(TIME_UNITS.iter())
            .map(|(name, _)| *name)
            .chain(ANGLE_UNITS.iter().copied())
            .collect()
    })
}

pub fn contains(words: &[&str], word: &str) -> bool {
    words.iter().any(|w| *w == word)
}

/// Millimeter multiplier for a distance unit.
pub fn distance_factor(unit: &str) -> Option<f64> {
    lookup(DISTANCE_UNITS, unit)
}

/// Millisecond multiplier for a time unit.
pub fn time_factor(unit: &str) -> Option<f64> {
    lookup(TIME_UNITS, unit)
}

fn lookup(table: &[(&str, f64)], unit: &str) -> Option<f64> {
    table
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, factor)| *factor)
}

/// Map a comparison word onto its operator.
pub fn normalize_comparison(word: &str) -> &str {
    match word {
        "greater" | "more" | "above" => ">",
        "less" | "below" => "<",
        "equals" | "equal" => "==",
        other => other,
    }
}

/// Map any direction word onto `forward`, `backward`, `left` or `right`.
pub fn normalize_direction(word: &str) -> &str {
    if contains(FORWARD_WORDS, word) {
        "forward"
    } else if contains(BACKWARD_WORDS, word) {
        "backward"
    } else if contains(LEFT_WORDS, word) {
        "left"
    } else if contains(RIGHT_WORDS, word) {
        "right"
    } else {
        word
    }
}
