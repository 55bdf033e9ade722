use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Delivery window advertised by a listing or accepted by a product.
///
/// Free-text windows such as `"20 min"`, `"1-3 hours"` or `"2 days"` are
/// reduced to their upper bound in minutes, which is what "not slower than"
/// compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeliveryTime {
    minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryTimeError {
    #[error("Unrecognized delivery time: {0:?}")]
    Unrecognized(String),
}

impl DeliveryTime {
    pub fn from_minutes(minutes: u32) -> Self {
        Self { minutes }
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn is_not_slower_than(&self, limit: &DeliveryTime) -> bool {
        self.minutes <= limit.minutes
    }
}

enum Token {
    Number(f64),
    Word(String),
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut number = String::new();
    let mut word = String::new();

    for ch in text.chars() {
        if ch.is_ascii_digit() || (ch == '.' && !number.is_empty()) {
            if !word.is_empty() {
                tokens.push(Token::Word(std::mem::take(&mut word)));
            }
            number.push(ch);
        } else if ch.is_alphabetic() {
            if let Ok(n) = std::mem::take(&mut number).parse() {
                tokens.push(Token::Number(n));
            }
            word.push(ch);
        } else {
            if let Ok(n) = std::mem::take(&mut number).parse() {
                tokens.push(Token::Number(n));
            }
            if !word.is_empty() {
                tokens.push(Token::Word(std::mem::take(&mut word)));
            }
        }
    }
    if let Ok(n) = number.parse() {
        tokens.push(Token::Number(n));
    }
    if !word.is_empty() {
        tokens.push(Token::Word(word));
    }
    tokens
}

fn unit_minutes(word: &str) -> Option<f64> {
    match word {
        "m" | "min" | "mins" | "minute" | "minutes" => Some(1.0),
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(60.0),
        "d" | "day" | "days" => Some(60.0 * 24.0),
        "w" | "wk" | "week" | "weeks" => Some(60.0 * 24.0 * 7.0),
        _ => None,
    }
}

impl FromStr for DeliveryTime {
    type Err = DeliveryTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_lowercase();
        if text.starts_with("instant") {
            return Ok(Self::from_minutes(0));
        }

        let mut pending: Vec<f64> = Vec::new();
        let mut upper: Option<f64> = None;

        // Each number is measured in the next unit word: "1-3 hours", "30 mins - 1 hour".
        for token in tokenize(&text) {
            match token {
                Token::Number(n) => pending.push(n),
                Token::Word(w) => {
                    let Some(factor) = unit_minutes(&w) else { continue };
                    for n in pending.drain(..) {
                        let minutes = n * factor;
                        upper = Some(upper.map_or(minutes, |u: f64| u.max(minutes)));
                    }
                }
            }
        }

        match upper {
            Some(minutes) => Ok(Self::from_minutes(minutes.ceil() as u32)),
            None => Err(DeliveryTimeError::Unrecognized(s.to_string())),
        }
    }
}

impl TryFrom<String> for DeliveryTime {
    type Error = DeliveryTimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeliveryTime> for String {
    fn from(value: DeliveryTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DeliveryTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.minutes;
        if m == 0 {
            write!(f, "instant")
        } else if m % (60 * 24) == 0 {
            write!(f, "{} days", m / (60 * 24))
        } else if m % 60 == 0 {
            write!(f, "{} hours", m / 60)
        } else {
            write!(f, "{} min", m)
        }
    }
}
