//! Sentence tokenizer
//!
//! Splits a sentence into typed tokens using the word classes in
//! [`crate::lexicon`], falling back to fuzzy matching for typos.

use crate::fuzzy::best_match;
use crate::lexicon as lx;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Semantic class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Verb,
    Direction,
    Number,
    Unit,
    Color,
    Motor,
    Speed,
    /// Unclassified or filler word
    Word,
    Repeat,
    Times,
    Define,
    Mission,
    Sensor,
    Condition,
    Comparison,
    Until,
    While,
    Parallel,
    Precise,
    If,
    Then,
    Else,
    Line,
    Follow,
    Call,
    Arc,
    Beep,
    Display,
    Reset,
    Hold,
    Heading,
    On,
    Off,
    Hub,
    Light,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        f.write_str(&s)
    }
}

/// One classified word of the input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Lowercased text as it appeared in the sentence
    pub raw: String,
    /// Canonical spelling, when the class has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized: Option<String>,
    /// Parsed value, present only for numbers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_value: Option<f64>,
}

impl Token {
    fn new(kind: TokenKind, raw: &str, normalized: Option<&str>) -> Self {
        Self {
            kind,
            raw: raw.to_string(),
            normalized: normalized.map(str::to_string),
            numeric_value: None,
        }
    }

    fn number(raw: &str, value: f64) -> Self {
        Self {
            kind: TokenKind::Number,
            raw: raw.to_string(),
            normalized: None,
            numeric_value: Some(value),
        }
    }

    /// Normalized form if present, otherwise the raw word.
    pub fn text(&self) -> &str {
        self.normalized.as_deref().unwrap_or(&self.raw)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

const PUNCTUATION: &[char] = &[',', ':', ';', '!', '?'];

fn number_regex() -> &'static Regex {
    static NUMBER_REGEX: OnceLock<Regex> = OnceLock::new();
    NUMBER_REGEX.get_or_init(|| {
        Regex::new(r"^(-?[0-9]+(?:\.[0-9]+)?)([a-z]*)$")
            .expect("Invalid regex pattern - this is a bug")
    })
}

/// Convert a sentence into tokens. Never fails; empty input yields no tokens.
pub fn tokenize(input: &str) -> Vec<Token> {
    let cleaned: String = input
        .to_lowercase()
        .chars()
        .map(|c| if PUNCTUATION.contains(&c) { ' ' } else { c })
        .collect();

    let mut tokens = Vec::new();
    for word in cleaned.split_whitespace() {
        if let Some(caps) = number_regex().captures(word) {
            let num = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            if let Ok(value) = num.parse::<f64>() {
                tokens.push(Token::number(num, value));
                let suffix = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
                if !suffix.is_empty() {
                    tokens.push(classify_word(suffix));
                }
                continue;
            }
        }
        tokens.push(classify_word(word));
    }
    tokens
}

/// Lexicons checked before the general verb/direction tables, in priority order.
const CATEGORICAL: &[(&[&str], TokenKind, Option<&str>)] = &[
    (lx::REPEAT_VERBS, TokenKind::Repeat, Some("repeat")),
    (lx::TIMES_WORDS, TokenKind::Times, Some("times")),
    (lx::DEFINE_VERBS, TokenKind::Define, Some("define")),
    (lx::MISSION_WORDS, TokenKind::Mission, Some("mission")),
    // sensor and condition words keep their own spelling
    (lx::SENSOR_WORDS, TokenKind::Sensor, None),
    (lx::UNTIL_WORDS, TokenKind::Until, Some("until")),
    (lx::WHILE_WORDS, TokenKind::While, Some("while")),
    (lx::CONDITION_WORDS, TokenKind::Condition, None),
];

const CATEGORICAL_AFTER_COMPARISON: &[(&[&str], TokenKind, &str)] = &[
    (lx::PARALLEL_WORDS, TokenKind::Parallel, "parallel"),
    (lx::PRECISE_WORDS, TokenKind::Precise, "precise"),
    (lx::IF_WORDS, TokenKind::If, "if"),
    (lx::THEN_WORDS, TokenKind::Then, "then"),
    (lx::ELSE_WORDS, TokenKind::Else, "else"),
    (lx::LINE_WORDS, TokenKind::Line, "line"),
    (lx::FOLLOW_VERBS, TokenKind::Follow, "follow"),
    (lx::CALL_VERBS, TokenKind::Call, "call"),
    (lx::ARC_VERBS, TokenKind::Arc, "arc"),
    (lx::BEEP_VERBS, TokenKind::Beep, "beep"),
    (lx::DISPLAY_VERBS, TokenKind::Display, "display"),
    (lx::RESET_WORDS, TokenKind::Reset, "reset"),
    (lx::HOLD_WORDS, TokenKind::Hold, "hold"),
    (lx::HEADING_WORDS, TokenKind::Heading, "heading"),
    (lx::ON_WORDS, TokenKind::On, "on"),
    (lx::OFF_WORDS, TokenKind::Off, "off"),
    (lx::HUB_WORDS, TokenKind::Hub, "hub"),
    (lx::LIGHT_VERBS, TokenKind::Light, "light"),
];

/// Classify a single lowercase word.
pub fn classify_word(word: &str) -> Token {
    // "and" is kept as a connective and never fuzzy matched
    if word == "and" {
        return Token::new(TokenKind::Word, word, Some(word));
    }
    if lx::contains(lx::FILLER_WORDS, word) {
        return Token::new(TokenKind::Word, word, None);
    }

    for (words, kind, normalized) in CATEGORICAL {
        if lx::contains(words, word) {
            return Token::new(*kind, word, Some(normalized.unwrap_or(word)));
        }
    }

    if lx::contains(lx::COMPARISON_WORDS, word) {
        return Token::new(
            TokenKind::Comparison,
            word,
            Some(lx::normalize_comparison(word)),
        );
    }

    for (words, kind, normalized) in CATEGORICAL_AFTER_COMPARISON {
        if lx::contains(words, word) {
            return Token::new(*kind, word, Some(normalized));
        }
    }

    if lx::contains(lx::all_verbs(), word) {
        return Token::new(TokenKind::Verb, word, Some(word));
    }
    if lx::contains(lx::all_directions(), word) {
        return Token::new(
            TokenKind::Direction,
            word,
            Some(lx::normalize_direction(word)),
        );
    }
    if lx::contains(lx::all_units(), word) {
        return Token::new(TokenKind::Unit, word, Some(word));
    }
    if lx::contains(lx::COLORS, word) {
        let color = if word == "grey" { "gray" } else { word };
        return Token::new(TokenKind::Color, word, Some(color));
    }
    if lx::contains(lx::MOTOR_WORDS, word) {
        return Token::new(TokenKind::Motor, word, Some(word));
    }
    if lx::contains(lx::SPEED_WORDS, word) {
        return Token::new(TokenKind::Speed, word, Some("speed"));
    }

    fuzzy_classify(word).unwrap_or_else(|| Token::new(TokenKind::Word, word, None))
}

fn fuzzy_classify(word: &str) -> Option<Token> {
    if word.chars().count() >= 4 && !lx::contains(lx::VERB_BLACKLIST, word) {
        // Verbs only match one edit away and must share the first letter,
        // otherwise "dance" would become "advance".
        if let Some((verb, _)) = best_match(word, lx::all_verbs(), 1) {
            if verb.chars().next() == word.chars().next() {
                return Some(Token::new(TokenKind::Verb, word, Some(verb)));
            }
        }
        if let Some((direction, _)) = best_match(word, lx::all_directions(), 2) {
            return Some(Token::new(
                TokenKind::Direction,
                word,
                Some(lx::normalize_direction(direction)),
            ));
        }
    }

    if let Some((unit, _)) = best_match(word, lx::all_units(), 2) {
        return Some(Token::new(TokenKind::Unit, word, Some(unit)));
    }
    if let Some((color, _)) = best_match(word, lx::COLORS, 2) {
        return Some(Token::new(TokenKind::Color, word, Some(color)));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_basic_tokenize() {
        assert_eq!(
            kinds("move forward 100mm"),
            vec![
                TokenKind::Verb,
                TokenKind::Direction,
                TokenKind::Number,
                TokenKind::Unit
            ]
        );
        let tokens = tokenize("move forward 100mm");
        assert_eq!(tokens[2].numeric_value, Some(100.0));
        assert_eq!(tokens[3].text(), "mm");
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
        assert!(tokenize(",,;!?").is_empty());
    }

    #[test]
    fn test_numeric_value_only_on_numbers() {
        for token in tokenize("Turn LEFT 90.5 degrees, then wait 2s; go -3cm!") {
            assert_eq!(token.numeric_value.is_some(), token.kind == TokenKind::Number);
        }
    }

    #[test]
    fn test_negative_and_decimal_numbers() {
        let tokens = tokenize("move -12.5cm");
        assert_eq!(tokens[1].numeric_value, Some(-12.5));
        assert_eq!(tokens[2].kind, TokenKind::Unit);
        assert_eq!(tokens[2].text(), "cm");
    }

    #[test]
    fn test_colors_and_grey() {
        let tokens = tokenize("detect black color");
        assert!(tokens
            .iter()
            .any(|t| t.kind == TokenKind::Color && t.text() == "black"));
        // "color" is a sensor word, which wins over the color table
        assert_eq!(tokens[2].kind, TokenKind::Sensor);

        let grey = tokenize("detect grey");
        let color = grey.iter().find(|t| t.kind == TokenKind::Color);
        assert_eq!(color.map(|t| t.text()), Some("gray"));
    }

    #[test]
    fn test_sensor_and_comparison() {
        let tokens = tokenize("light sensor greater than 50");
        assert_eq!(tokens[0].kind, TokenKind::Sensor);
        assert_eq!(tokens[1].kind, TokenKind::Sensor);
        assert_eq!(tokens[2].kind, TokenKind::Comparison);
        assert_eq!(tokens[2].text(), ">");
    }

    #[test]
    fn test_filler_and_connective() {
        let tokens = tokenize("the and");
        assert_eq!(tokens[0].kind, TokenKind::Word);
        assert_eq!(tokens[0].normalized, None);
        assert_eq!(tokens[1].kind, TokenKind::Word);
        assert_eq!(tokens[1].normalized.as_deref(), Some("and"));
    }

    #[test]
    fn test_fuzzy_verbs_and_directions() {
        let tokens = tokenize("moove forwrd");
        assert_eq!(tokens[0].kind, TokenKind::Verb);
        assert_eq!(tokens[0].text(), "move");
        assert_eq!(tokens[1].kind, TokenKind::Direction);
        assert_eq!(tokens[1].text(), "forward");
    }

    #[test]
    fn test_fuzzy_verb_requires_first_letter() {
        let tokens = tokenize("dance");
        assert_eq!(tokens[0].kind, TokenKind::Word);
    }

    #[test]
    fn test_priority_of_categorical_tables() {
        // "hold" is both a wait verb and a hold word; the hold class wins
        assert_eq!(kinds("hold")[0], TokenKind::Hold);
        // "start" is a call verb before it is a run verb
        assert_eq!(kinds("start")[0], TokenKind::Call);
        // "while" is a while word before it is a parallel word
        assert_eq!(kinds("while")[0], TokenKind::While);
        assert_eq!(kinds("precisely")[0], TokenKind::Precise);
    }
}
