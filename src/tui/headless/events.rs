//! Event DSL for headless mode.
//!
//! One event per comma- or newline-separated item: `key:f5`, `key:ctrl+q`,
//! `type:SELECT 1`, `wait:200ms`, `resize:120x40`, `snapshot:name`,
//! `assert:contains:text`, `assert:not-contains:text`,
//! `assert:matches:regex`, `assert:state:row_count>=4`.
//! Lines starting with `#` are comments.

use super::HeadlessState;
use crate::error::{AppError, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A check against the rendered screen or the state snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum Assertion {
    /// Screen contains text, ignoring case.
    Contains(String),
    /// Screen does not contain text, ignoring case.
    NotContains(String),
    /// Screen matches a regular expression.
    Matches(String),
    /// State field compared against a value with `=`, `>=`, `<=`, `>` or `<`.
    State {
        field: String,
        op: CompareOp,
        value: String,
    },
}

/// Comparison used by state assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ge,
    Le,
    Gt,
    Lt,
}

impl CompareOp {
    /// Operators in match order; two-character forms first.
    const ALL: [(&'static str, CompareOp); 5] = [
        (">=", CompareOp::Ge),
        ("<=", CompareOp::Le),
        (">", CompareOp::Gt),
        ("<", CompareOp::Lt),
        ("=", CompareOp::Eq),
    ];

    fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Lt => "<",
        }
    }

    /// Numbers compare numerically; anything else supports only equality.
    fn holds(&self, actual: &str, expected: &str) -> bool {
        if let (Ok(a), Ok(e)) = (actual.parse::<f64>(), expected.parse::<f64>()) {
            return match self {
                Self::Eq => a == e,
                Self::Ge => a >= e,
                Self::Le => a <= e,
                Self::Gt => a > e,
                Self::Lt => a < e,
            };
        }
        *self == Self::Eq && actual == expected
    }
}

impl Assertion {
    /// Checks the assertion.
    pub fn check(&self, screen: &str, state: &HeadlessState) -> bool {
        match self {
            Self::Contains(text) => screen.to_lowercase().contains(&text.to_lowercase()),
            Self::NotContains(text) => !screen.to_lowercase().contains(&text.to_lowercase()),
            Self::Matches(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(screen))
                .unwrap_or(false),
            Self::State { field, op, value } => state
                .field(field)
                .is_some_and(|actual| op.holds(&actual, value)),
        }
    }

    fn parse(value: &str) -> Result<Self> {
        let (kind, rest) = value.split_once(':').ok_or_else(|| {
            AppError::config(format!(
                "Invalid assertion syntax: '{}'. Expected assert:type:value",
                value
            ))
        })?;

        match kind.trim().to_lowercase().as_str() {
            "contains" => Ok(Self::Contains(rest.to_string())),
            "not-contains" => Ok(Self::NotContains(rest.to_string())),
            "matches" => Ok(Self::Matches(rest.to_string())),
            "state" => CompareOp::ALL
                .iter()
                .find_map(|(symbol, op)| {
                    rest.split_once(symbol).map(|(field, value)| Self::State {
                        field: field.trim().to_string(),
                        op: *op,
                        value: value.trim().to_string(),
                    })
                })
                .ok_or_else(|| {
                    AppError::config(format!(
                        "Invalid state assertion: '{}'. Expected field=value or field>=value",
                        rest
                    ))
                }),
            other => Err(AppError::config(format!(
                "Unknown assertion type: '{}'. Valid types: contains, not-contains, matches, state",
                other
            ))),
        }
    }
}

/// A scripted event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A key press.
    Key(KeyEvent),
    /// Text typed into the focused panel, one key per character.
    Type(String),
    /// Sleep, then let remote fetches settle.
    Wait(Duration),
    /// Resize the virtual terminal.
    Resize(u16, u16),
    /// Named marker in frames output.
    Snapshot(String),
    Assert(Assertion),
}

impl FromStr for Event {
    type Err = AppError;

    fn from_str(input: &str) -> Result<Self> {
        let input = input.trim();
        let (kind, value) = input.split_once(':').ok_or_else(|| {
            AppError::config(format!(
                "Invalid event syntax: '{}'. Expected format: type:value",
                input
            ))
        })?;

        match kind.trim().to_lowercase().as_str() {
            "key" => parse_key(value.trim()).map(Self::Key),
            "type" => Ok(Self::Type(value.to_string())),
            "wait" => parse_duration(value).map(Self::Wait),
            "resize" => parse_size(value).map(|(w, h)| Self::Resize(w, h)),
            "snapshot" => Ok(Self::Snapshot(value.trim().to_string())),
            "assert" => Assertion::parse(value.trim()).map(Self::Assert),
            other => Err(AppError::config(format!(
                "Unknown event type: '{}'. Valid types: key, type, wait, resize, snapshot, assert",
                other
            ))),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => {
                write!(f, "key:")?;
                for (modifier, name) in [
                    (KeyModifiers::CONTROL, "ctrl+"),
                    (KeyModifiers::ALT, "alt+"),
                    (KeyModifiers::SHIFT, "shift+"),
                ] {
                    if key.modifiers.contains(modifier) {
                        write!(f, "{}", name)?;
                    }
                }
                write!(f, "{}", key_name(&key.code))
            }
            Self::Type(text) => write!(f, "type:{}", text),
            Self::Wait(d) => write!(f, "wait:{}ms", d.as_millis()),
            Self::Resize(w, h) => write!(f, "resize:{}x{}", w, h),
            Self::Snapshot(name) => write!(f, "snapshot:{}", name),
            Self::Assert(Assertion::Contains(t)) => write!(f, "assert:contains:{}", t),
            Self::Assert(Assertion::NotContains(t)) => write!(f, "assert:not-contains:{}", t),
            Self::Assert(Assertion::Matches(p)) => write!(f, "assert:matches:{}", p),
            Self::Assert(Assertion::State { field, op, value }) => {
                write!(f, "assert:state:{}{}{}", field, op.symbol(), value)
            }
        }
    }
}

/// Named keys understood by `key:` events.
const NAMED_KEYS: [(&str, KeyCode); 14] = [
    ("enter", KeyCode::Enter),
    ("esc", KeyCode::Esc),
    ("tab", KeyCode::Tab),
    ("backspace", KeyCode::Backspace),
    ("delete", KeyCode::Delete),
    ("up", KeyCode::Up),
    ("down", KeyCode::Down),
    ("left", KeyCode::Left),
    ("right", KeyCode::Right),
    ("home", KeyCode::Home),
    ("end", KeyCode::End),
    ("pageup", KeyCode::PageUp),
    ("pagedown", KeyCode::PageDown),
    ("space", KeyCode::Char(' ')),
];

fn key_name(code: &KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::F(n) => format!("f{}", n),
        other => NAMED_KEYS
            .iter()
            .find(|(_, code)| code == other)
            .map_or("unknown", |(name, _)| *name)
            .to_string(),
    }
}

/// Parses `enter`, `f5`, `ctrl+q`, `shift+tab`, `s`.
fn parse_key(value: &str) -> Result<KeyEvent> {
    let mut parts: Vec<&str> = value.split('+').collect();
    // "ctrl++" and "+" name the plus key itself
    let key = if value.ends_with("++") || value == "+" {
        parts.retain(|p| !p.is_empty());
        "+"
    } else {
        parts.pop().unwrap_or_default()
    };

    let mut modifiers = KeyModifiers::empty();
    for part in parts {
        modifiers |= match part.to_lowercase().as_str() {
            "ctrl" | "control" => KeyModifiers::CONTROL,
            "alt" => KeyModifiers::ALT,
            "shift" => KeyModifiers::SHIFT,
            _ => {
                return Err(AppError::config(format!(
                    "Unknown modifier: '{}'. Valid modifiers: ctrl, alt, shift",
                    part
                )))
            }
        };
    }

    Ok(KeyEvent::new(parse_key_code(key)?, modifiers))
}

fn parse_key_code(s: &str) -> Result<KeyCode> {
    let lower = s.to_lowercase();

    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        if (1..=12).contains(&n) {
            return Ok(KeyCode::F(n));
        }
    }

    let alias = match lower.as_str() {
        "return" => "enter",
        "escape" => "esc",
        "bs" => "backspace",
        "del" => "delete",
        "pgup" => "pageup",
        "pgdn" => "pagedown",
        other => other,
    };
    if let Some((_, code)) = NAMED_KEYS.iter().find(|(name, _)| *name == alias) {
        return Ok(*code);
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(KeyCode::Char(c)),
        _ => Err(AppError::config(format!(
            "Unknown key: '{}'. Use single characters or named keys like enter, esc, tab, f5",
            s
        ))),
    }
}

/// Parses `100ms`, `2s` or a bare millisecond count.
fn parse_duration(value: &str) -> Result<Duration> {
    let value = value.trim().to_lowercase();
    let invalid = || AppError::config(format!("Invalid duration: '{}'", value));

    if let Some(ms) = value.strip_suffix("ms") {
        ms.parse().map(Duration::from_millis).map_err(|_| invalid())
    } else if let Some(secs) = value.strip_suffix('s') {
        secs.parse().map(Duration::from_secs).map_err(|_| invalid())
    } else {
        value.parse().map(Duration::from_millis).map_err(|_| invalid())
    }
}

/// Parses `WIDTHxHEIGHT`.
pub fn parse_size(value: &str) -> Result<(u16, u16)> {
    let (w, h) = value.trim().split_once('x').ok_or_else(|| {
        AppError::config(format!(
            "Invalid size format: '{}'. Expected WIDTHxHEIGHT",
            value
        ))
    })?;
    let width = w
        .parse()
        .map_err(|_| AppError::config(format!("Invalid width: '{}'", w)))?;
    let height = h
        .parse()
        .map_err(|_| AppError::config(format!("Invalid height: '{}'", h)))?;
    Ok((width, height))
}

/// Parses a whole script.
pub fn parse_script(input: &str) -> Result<Vec<Event>> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect()
}
