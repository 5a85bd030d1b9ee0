//! Keyword-cascade reply rules.
//!
//! Rules are evaluated in order and the first match wins:
//! arithmetic, greeting, well-being, capabilities, gratitude, time/date,
//! then a fallback that echoes the input.

use std::fmt::Display;
use std::sync::LazyLock;

use chrono::{DateTime, Local, TimeZone};
use regex::Regex;

use super::arithmetic::{evaluate, format_number, is_expression_char};

/// Which rule produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Arithmetic,
    ArithmeticClarification,
    Greeting,
    WellBeing,
    Capabilities,
    Gratitude,
    TimeDate,
    Fallback,
}

pub const GREETING_REPLY: &str = "Hello! How can I help you today?";

pub const WELL_BEING_REPLY: &str =
    "I'm doing well, thanks for asking! I'm here and ready to help. How about you?";

pub const CAPABILITIES_REPLY: &str = "I can help with a few things:\n\
- Simple math, like \"what is 12 x 4?\" or \"(3 + 5) / 2\"\n\
- Telling you the current time and date\n\
- Friendly conversation\n\
Just type a message to get started!";

pub const GRATITUDE_REPLY: &str =
    "You're welcome! Let me know if there's anything else I can do for you.";

pub const CLARIFICATION_REPLY: &str = "That looks like a calculation, but I couldn't work it out. \
Could you write it like \"12 x 4\" or \"(3 + 5) / 2\"?";

static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").expect("valid regex"));

static OPERATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[*+/×-]|\d\s*x\s*\d|\bx\b").expect("valid regex")
});

static PRODUCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*[x×*]\s*(\d+(?:\.\d+)?)").expect("valid regex")
});

static GREETING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(hello|hi|hey|greetings|good (morning|afternoon|evening))\b")
        .expect("valid regex")
});

static WELL_BEING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bhow (are you|are things|is it going|do you do)\b|\bhow's it going\b")
        .expect("valid regex")
});

static CAPABILITIES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bwhat (can|do) you do\b|\bhelp\b|\bcapabilit(y|ies)\b")
        .expect("valid regex")
});

static GRATITUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bthank(s| you)?\b|\bthx\b|\bappreciate").expect("valid regex")
});

static TIME_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(time|date|today|what day)\b").expect("valid regex")
});

/// Generate a reply using the local clock.
pub fn generate_reply(text: &str) -> String {
    generate_reply_at(text, &Local::now())
}

/// Generate a reply as of `now`.
pub fn generate_reply_at<Tz>(text: &str, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    classify_and_reply(text, now).1
}

/// Generate a reply and report which rule matched.
pub fn classify_and_reply<Tz>(text: &str, now: &DateTime<Tz>) -> (ReplyKind, String)
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if DIGIT.is_match(text) && OPERATOR.is_match(text) {
        return arithmetic_reply(text);
    }
    if GREETING.is_match(text) {
        return (ReplyKind::Greeting, GREETING_REPLY.to_string());
    }
    if WELL_BEING.is_match(text) {
        return (ReplyKind::WellBeing, WELL_BEING_REPLY.to_string());
    }
    if CAPABILITIES.is_match(text) {
        return (ReplyKind::Capabilities, CAPABILITIES_REPLY.to_string());
    }
    if GRATITUDE.is_match(text) {
        return (ReplyKind::Gratitude, GRATITUDE_REPLY.to_string());
    }
    if TIME_DATE.is_match(text) {
        let reply = format!(
            "It's currently {} on {}.",
            now.format("%-I:%M %p"),
            now.format("%A, %B %-d, %Y")
        );
        return (ReplyKind::TimeDate, reply);
    }

    (ReplyKind::Fallback, fallback_reply(text))
}

fn arithmetic_reply(text: &str) -> (ReplyKind, String) {
    if let Some(caps) = PRODUCT.captures(text) {
        let lhs = caps[1].parse::<f64>();
        let rhs = caps[2].parse::<f64>();
        if let (Ok(lhs), Ok(rhs)) = (lhs, rhs) {
            let product = lhs * rhs;
            if product.is_finite() {
                return (
                    ReplyKind::Arithmetic,
                    format!(
                        "{} × {} = {}",
                        format_number(lhs),
                        format_number(rhs),
                        format_number(product)
                    ),
                );
            }
        }
    }

    let expression: String = text.chars().filter(|c| is_expression_char(*c)).collect();
    match evaluate(&expression) {
        Ok(value) => (
            ReplyKind::Arithmetic,
            format!("The answer is {}.", format_number(value)),
        ),
        Err(e) => {
            tracing::debug!(expression = %expression, error = %e, "Arithmetic evaluation failed");
            (
                ReplyKind::ArithmeticClarification,
                CLARIFICATION_REPLY.to_string(),
            )
        }
    }
}

fn fallback_reply(text: &str) -> String {
    format!(
        "You said: \"{}\". I'm a simple assistant, so I don't understand everything yet. \
Try asking me \"what is 12 x 4?\", \"what time is it?\" or \"what can you do?\"",
        text.trim()
    )
}
