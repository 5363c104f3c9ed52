use std::collections::BTreeMap;

use thiserror::Error;

/// Largest number of significant digits an f64 can meaningfully carry.
pub const MAX_PRECISION: usize = 17;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("empty expression")]
    Empty,
    #[error("{0}")]
    Syntax(String),
}

/// Parses and computes an infix arithmetic expression.
///
/// The session only depends on this: a string goes in, a result string or an
/// [`EvaluationError`] comes out.
pub trait Evaluator {
    fn evaluate(&self, expression: &str) -> Result<String, EvaluationError>;
}

/// Floating point evaluator with conventional calculator formatting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandardEvaluator {
    /// Round results to this many significant digits before formatting.
    pub precision: Option<usize>,
}

impl StandardEvaluator {
    pub fn new(precision: Option<usize>) -> Self {
        Self { precision }
    }

    fn namespace() -> BTreeMap<String, f64> {
        // lets a non-finite result be typed back in after resuming from it
        let mut namespace = BTreeMap::new();
        namespace.insert("Infinity".to_string(), f64::INFINITY);
        namespace.insert("NaN".to_string(), f64::NAN);
        namespace
    }
}

impl Evaluator for StandardEvaluator {
    fn evaluate(&self, expression: &str) -> Result<String, EvaluationError> {
        let expression = expression.trim();
        if expression.is_empty() {
            return Err(EvaluationError::Empty);
        }

        let mut namespace = Self::namespace();
        match fasteval::ez_eval(expression, &mut namespace) {
            Ok(value) => Ok(format_number(value, self.precision)),
            Err(err) => Err(EvaluationError::Syntax(describe(&err))),
        }
    }
}

/// Format a number the way a pocket calculator shows it.
///
/// Integers carry no decimal point, fractions use the shortest representation
/// that round-trips, very large and very small magnitudes switch to exponent
/// notation, and non-finite values are spelled out.
pub fn format_number(value: f64, precision: Option<usize>) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };
    }

    let value = match precision {
        Some(digits) => round_significant(value, digits),
        None => value,
    };

    // also folds -0
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if !(1e-7..1e21).contains(&magnitude) {
        format!("{value:e}")
    } else {
        format!("{value}")
    }
}

fn round_significant(value: f64, digits: usize) -> f64 {
    let digits = digits.clamp(1, MAX_PRECISION);
    format!("{:.*e}", digits - 1, value)
        .parse()
        .unwrap_or(value)
}

/// Turn a fasteval error such as `EofWhileParsing("value")` into
/// `eof while parsing value`.
fn describe(err: &fasteval::Error) -> String {
    let raw = format!("{err:?}");
    let (kind, detail) = match raw.split_once('(') {
        Some((kind, rest)) => (kind, rest.trim_end_matches(')').trim_matches('"')),
        None => (raw.as_str(), ""),
    };

    let mut message = String::new();
    for (i, c) in kind.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            message.push(' ');
        }
        message.extend(c.to_lowercase());
    }
    if !detail.is_empty() {
        message.push_str(": ");
        message.push_str(detail);
    }
    message
}
