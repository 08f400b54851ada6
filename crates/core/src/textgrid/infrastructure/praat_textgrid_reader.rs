use std::fs;
use std::path::Path;

use crate::textgrid::domain::textgrid::{Interval, IntervalTier, TextGrid};
use crate::textgrid::domain::textgrid_error::TextGridError;

const INTERVAL_TIER_CLASS: &str = "IntervalTier";

#[derive(Debug, PartialEq)]
enum Token {
    Number(f64),
    Text(String),
    Flag(String),
}

/// Reads Praat TextGrid text files, long or short format.
///
/// Both formats carry the same sequence of numbers, quoted strings and
/// `<flags>`; the long format only adds `key =` labels and `[n]:` item
/// headers, which are skipped. Only interval tiers are supported.
pub struct PraatTextGridReader;

impl PraatTextGridReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read(&self, path: &Path) -> Result<TextGrid, TextGridError> {
        let contents = fs::read_to_string(path).map_err(|e| TextGridError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.parse(&contents)
    }

    pub fn parse(&self, contents: &str) -> Result<TextGrid, TextGridError> {
        let mut tokens = tokenize(contents)?.into_iter();

        let file_type = expect_text(&mut tokens, "file type")?;
        if !file_type.starts_with("ooTextFile") {
            return Err(TextGridError::Parse(format!(
                "unexpected file type '{file_type}'"
            )));
        }
        let class = expect_text(&mut tokens, "object class")?;
        if class != "TextGrid" {
            return Err(TextGridError::Parse(format!(
                "unexpected object class '{class}'"
            )));
        }

        let start = expect_number(&mut tokens, "xmin")?;
        let end = expect_number(&mut tokens, "xmax")?;
        let mut grid = TextGrid::with_bounds(start, end);

        match tokens.next() {
            Some(Token::Flag(flag)) if flag == "exists" => {}
            Some(Token::Flag(_)) => return Ok(grid),
            other => {
                return Err(TextGridError::Parse(format!(
                    "expected <exists>, found {other:?}"
                )))
            }
        }

        let size = expect_count(&mut tokens, "tier count")?;
        for _ in 0..size {
            let class = expect_text(&mut tokens, "tier class")?;
            if class != INTERVAL_TIER_CLASS {
                return Err(TextGridError::UnsupportedTier(class));
            }
            let name = expect_text(&mut tokens, "tier name")?;
            let tier_start = expect_number(&mut tokens, "tier xmin")?;
            let tier_end = expect_number(&mut tokens, "tier xmax")?;
            let mut tier = IntervalTier::with_bounds(name, tier_start, tier_end);

            let count = expect_count(&mut tokens, "interval count")?;
            for _ in 0..count {
                let xmin = expect_number(&mut tokens, "interval xmin")?;
                let xmax = expect_number(&mut tokens, "interval xmax")?;
                let label = expect_text(&mut tokens, "interval text")?;
                tier.push(Interval::new(xmin, xmax, label));
            }
            grid.push_tier(tier);
        }
        Ok(grid)
    }
}

impl Default for PraatTextGridReader {
    fn default() -> Self {
        Self::new()
    }
}

fn tokenize(contents: &str) -> Result<Vec<Token>, TextGridError> {
    let mut tokens = Vec::new();
    let mut chars = contents.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '"' {
            chars.next();
            let mut text = String::new();
            loop {
                match chars.next() {
                    Some('"') if chars.peek() == Some(&'"') => {
                        chars.next();
                        text.push('"');
                    }
                    Some('"') => break,
                    Some(ch) => text.push(ch),
                    None => {
                        return Err(TextGridError::Parse("unterminated string".to_string()))
                    }
                }
            }
            tokens.push(Token::Text(text));
        } else if c == '[' {
            // item and interval indices
            for ch in chars.by_ref() {
                if ch == ']' {
                    break;
                }
            }
        } else if c == '<' {
            chars.next();
            let flag: String = chars.by_ref().take_while(|&ch| ch != '>').collect();
            tokens.push(Token::Flag(flag));
        } else {
            let mut word = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() || ch == '"' || ch == '[' || ch == '<' {
                    break;
                }
                word.push(ch);
                chars.next();
            }
            if c.is_ascii_digit() || c == '-' || c == '.' {
                let value = word
                    .parse::<f64>()
                    .map_err(|_| TextGridError::Parse(format!("invalid number '{word}'")))?;
                tokens.push(Token::Number(value));
            }
        }
    }
    Ok(tokens)
}

fn expect_text(
    tokens: &mut impl Iterator<Item = Token>,
    what: &str,
) -> Result<String, TextGridError> {
    match tokens.next() {
        Some(Token::Text(text)) => Ok(text),
        other => Err(TextGridError::Parse(format!(
            "expected {what}, found {other:?}"
        ))),
    }
}

fn expect_number(
    tokens: &mut impl Iterator<Item = Token>,
    what: &str,
) -> Result<f64, TextGridError> {
    match tokens.next() {
        Some(Token::Number(value)) => Ok(value),
        other => Err(TextGridError::Parse(format!(
            "expected {what}, found {other:?}"
        ))),
    }
}

fn expect_count(
    tokens: &mut impl Iterator<Item = Token>,
    what: &str,
) -> Result<usize, TextGridError> {
    let value = expect_number(tokens, what)?;
    if value < 0.0 || value.fract() != 0.0 {
        return Err(TextGridError::Parse(format!("invalid {what} {value}")));
    }
    Ok(value as usize)
}
