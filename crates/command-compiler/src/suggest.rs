//! Autocomplete suggestions for a partially typed command

use serde::Serialize;

/// Most suggestions returned for one request.
pub const MAX_SUGGESTIONS: usize = 10;

/// Group a suggestion belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Movement,
    Turn,
    Wait,
    Motor,
    Control,
    Sensor,
    Hub,
    Distance,
    Angle,
    Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    /// Text to insert
    pub text: &'static str,
    /// Text to display
    pub label: &'static str,
    pub category: Category,
}

struct Template(&'static str, &'static str, Category);

const COMMAND_TEMPLATES: &[Template] = &[
    Template("move forward ", "move forward [distance]", Category::Movement),
    Template("move backward ", "move backward [distance]", Category::Movement),
    Template("turn left ", "turn left [angle]", Category::Turn),
    Template("turn right ", "turn right [angle]", Category::Turn),
    Template("arc left ", "arc left [radius] [angle]", Category::Movement),
    Template("arc right ", "arc right [radius] [angle]", Category::Movement),
    Template("drive at ", "drive at [speed] [turn_rate]", Category::Movement),
    Template("wait ", "wait [duration]", Category::Wait),
    Template("wait until ", "wait until [condition]", Category::Sensor),
    Template("run ", "run [motor] [angle]", Category::Motor),
    Template("run motor for ", "run motor for [time]", Category::Motor),
    Template("run motor until stalled", "run until stalled", Category::Motor),
    Template("hold motor", "hold motor position", Category::Motor),
    Template("stop", "stop robot", Category::Control),
    Template("brake", "brake robot", Category::Control),
    Template("set speed to ", "set speed to [value]", Category::Control),
    Template("repeat ", "repeat [n] times: [action]", Category::Control),
    Template("follow line ", "follow line [condition]", Category::Sensor),
    Template("wait until color is ", "wait until color is [color]", Category::Sensor),
    Template("wait until distance < ", "wait until distance < [mm]", Category::Sensor),
    Template("move until ", "move until [condition]", Category::Sensor),
    Template("turn left precisely ", "turn precisely [angle]", Category::Turn),
    Template("turn right precisely ", "turn precisely [angle]", Category::Turn),
    Template("beep", "beep [frequency] [duration]", Category::Hub),
    Template("display ", "display [text/image]", Category::Hub),
    Template("reset heading", "reset gyro heading", Category::Hub),
    Template("hub light on ", "hub light on [color]", Category::Hub),
    Template("hub light off", "turn hub light off", Category::Hub),
    Template("light on ", "light on [color]", Category::Hub),
    Template("light off", "turn light off", Category::Hub),
];

const DISTANCE_COMPLETIONS: &[&str] = &[
    "50mm", "100mm", "200mm", "300mm", "500mm", "10cm", "20cm", "50cm", "1m",
];
const ANGLE_COMPLETIONS: &[&str] = &[
    "15 degrees",
    "30 degrees",
    "45 degrees",
    "90 degrees",
    "180 degrees",
    "360 degrees",
];
const DURATION_COMPLETIONS: &[&str] = &["500ms", "1 second", "2 seconds", "3 seconds", "5 seconds"];

/// Number of templates offered when nothing more specific applies.
const DEFAULT_TEMPLATE_COUNT: usize = 5;

const MOVE_CONTEXT: &[&str] = &["move", "forward", "backward", "straight"];
const TURN_CONTEXT: &[&str] = &["turn", "rotate", "spin"];
const WAIT_CONTEXT: &[&str] = &["wait", "pause", "delay"];

impl Template {
    fn suggestion(&self) -> Suggestion {
        Suggestion {
            text: self.0,
            label: self.1,
            category: self.2,
        }
    }
}

fn values(items: &[&'static str], category: Category) -> Vec<Suggestion> {
    items
        .iter()
        .map(|&item| Suggestion {
            text: item,
            label: item,
            category,
        })
        .collect()
}

fn default_templates() -> Vec<Suggestion> {
    COMMAND_TEMPLATES
        .iter()
        .take(DEFAULT_TEMPLATE_COUNT)
        .map(Template::suggestion)
        .collect()
}

/// Suggestions for `text` with the cursor at byte offset `cursor`.
///
/// Context words typed so far decide between distances, angles, durations
/// and command templates.
pub fn suggest(text: &str, cursor: usize) -> Vec<Suggestion> {
    let text = text.to_lowercase();
    let mut end = cursor.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let before = text[..end].trim();
    let mentions = |words: &[&str]| words.iter().any(|w| before.contains(w));

    let mut suggestions = if before.is_empty() {
        default_templates()
    } else if mentions(MOVE_CONTEXT) {
        values(DISTANCE_COMPLETIONS, Category::Distance)
    } else if mentions(TURN_CONTEXT) {
        values(ANGLE_COMPLETIONS, Category::Angle)
    } else if mentions(WAIT_CONTEXT) {
        values(DURATION_COMPLETIONS, Category::Duration)
    } else {
        let last_word = before.split_whitespace().last().unwrap_or_default();
        let matching: Vec<Suggestion> = COMMAND_TEMPLATES
            .iter()
            .filter(|t| t.0.starts_with(last_word))
            .map(Template::suggestion)
            .collect();
        if matching.is_empty() {
            default_templates()
        } else {
            matching
        }
    };

    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(suggestions: &[Suggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.text).collect()
    }

    #[test]
    fn test_empty_input_offers_templates() {
        let suggestions = suggest("", 0);
        assert_eq!(
            texts(&suggestions),
            vec!["move forward ", "move backward ", "turn left ", "turn right ", "arc left "]
        );
    }

    #[test]
    fn test_context_completions() {
        let distances = suggest("move forward ", 13);
        assert_eq!(distances.len(), 9);
        assert!(distances.iter().all(|s| s.category == Category::Distance));

        let angles = suggest("Turn left ", 10);
        assert_eq!(angles[0].text, "15 degrees");
        assert_eq!(angles[0].category, Category::Angle);

        assert_eq!(suggest("pause ", 6)[1].text, "1 second");
    }

    #[test]
    fn test_cursor_limits_context() {
        // only "wait" is before the cursor
        let suggestions = suggest("wait move", 4);
        assert_eq!(suggestions[0].category, Category::Duration);
        // cursor past the end is clamped
        assert_eq!(suggest("wait", 99)[0].category, Category::Duration);
    }

    #[test]
    fn test_prefix_filtering() {
        let suggestions = suggest("re", 2);
        assert_eq!(texts(&suggestions), vec!["repeat ", "reset heading"]);

        let many = suggest("hub light", 9);
        assert!(many.len() <= MAX_SUGGESTIONS);

        // nothing matches "xyz", fall back to the default templates
        assert_eq!(suggest("xyz", 3).len(), DEFAULT_TEMPLATE_COUNT);
    }
}
