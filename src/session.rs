use std::fmt;

use itertools::Itertools;
use tracing::{debug, warn};

use crate::evaluator::Evaluator;
use crate::glyph::{self, Operator};
use crate::markup;

pub const RESULT_PREFIX: &str = "=";
pub const ERROR_PREFIX: &str = "Error: ";

/// Left operand used when an operator follows an error and nothing has ever
/// evaluated successfully.
pub const FALLBACK_OPERAND: &str = "0";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// A digit, decimal point, parenthesis, or a resumed result value.
    Fragment(String),
    Operator(Operator),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Fragment(text) => f.write_str(text),
            Token::Operator(op) => write!(f, "{op}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    AppendFragment(char),
    AppendOperator(Operator),
    Backspace,
    Clear,
    Evaluate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum State {
    Composing,
    Result,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Value { raw: String, markup: String },
    Error { message: String },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    tokens: Vec<Token>,
    outcome: Option<Outcome>,
    last_good_result: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn last_good_result(&self) -> Option<&str> {
        self.last_good_result.as_deref()
    }

    pub fn state(&self) -> State {
        if self.outcome.is_some() {
            State::Result
        } else {
            State::Composing
        }
    }

    /// The next digit starts over; the next operator resumes from the result.
    pub fn needs_reset(&self) -> bool {
        self.state() == State::Result
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, Some(Outcome::Error { .. }))
    }

    /// The expression exactly as typed, display glyphs included.
    pub fn expression(&self) -> String {
        self.tokens.iter().join("")
    }

    /// The expression in the syntax the evaluator accepts.
    pub fn evaluable_expression(&self) -> String {
        glyph::to_evaluator_syntax(&self.expression())
    }

    /// Empty while composing, otherwise `["=", value]` or `["Error: ", message]`.
    pub fn result_tokens(&self) -> Vec<String> {
        match &self.outcome {
            None => vec![],
            Some(Outcome::Value { markup, .. }) => {
                vec![RESULT_PREFIX.to_string(), markup.clone()]
            }
            Some(Outcome::Error { message }) => {
                vec![ERROR_PREFIX.to_string(), message.clone()]
            }
        }
    }

    /// Only fragments with letters in them become literal text, so operators
    /// next to a resumed `Infinity` still render as math.
    pub fn expression_markup(&self) -> String {
        self.tokens
            .iter()
            .map(|token| match token {
                Token::Fragment(text) => markup::math_or_text(text),
                Token::Operator(op) => op.glyph().to_string(),
            })
            .join("")
    }

    pub fn result_markup(&self) -> String {
        match &self.outcome {
            None => String::new(),
            Some(Outcome::Value { markup, .. }) => format!("{RESULT_PREFIX}{markup}"),
            Some(Outcome::Error { message }) => markup::error(ERROR_PREFIX, message),
        }
    }

    fn composing(&self, tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            outcome: None,
            last_good_result: self.last_good_result.clone(),
        }
    }

    fn resume_operand(&self) -> String {
        if let Some(last) = &self.last_good_result {
            return last.clone();
        }
        match &self.outcome {
            Some(Outcome::Value { raw, .. }) => raw.clone(),
            _ => FALLBACK_OPERAND.to_string(),
        }
    }

    fn append_fragment(&self, c: char) -> Self {
        let fragment = Token::Fragment(c.to_string());
        if self.needs_reset() {
            return self.composing(vec![fragment]);
        }
        let mut tokens = self.tokens.clone();
        tokens.push(fragment);
        self.composing(tokens)
    }

    fn append_operator(&self, op: Operator) -> Self {
        if self.needs_reset() {
            let operand = self.resume_operand();
            return self.composing(vec![Token::Fragment(operand), Token::Operator(op)]);
        }
        let mut tokens = self.tokens.clone();
        tokens.push(Token::Operator(op));
        self.composing(tokens)
    }

    fn backspace(&self) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.pop();
        self.composing(tokens)
    }

    fn clear(&self) -> Self {
        self.composing(vec![])
    }

    fn evaluate(&self, evaluator: &dyn Evaluator) -> Self {
        let expression = self.evaluable_expression();
        match evaluator.evaluate(&expression) {
            Ok(raw) => Self {
                tokens: self.tokens.clone(),
                outcome: Some(Outcome::Value {
                    markup: markup::math_or_text(&raw),
                    raw: raw.clone(),
                }),
                last_good_result: Some(raw),
            },
            Err(err) => {
                warn!(%expression, error = %err, "evaluation failed");
                Self {
                    tokens: self.tokens.clone(),
                    outcome: Some(Outcome::Error {
                        message: err.to_string(),
                    }),
                    last_good_result: self.last_good_result.clone(),
                }
            }
        }
    }
}

/// Apply one action to `session` and return the session that replaces it.
///
/// Callers never patch a [`Session`]; every keystroke goes through here.
pub fn reduce(session: &Session, action: Action, evaluator: &dyn Evaluator) -> Session {
    let next = match action {
        Action::AppendFragment(c) => session.append_fragment(c),
        Action::AppendOperator(op) => session.append_operator(op),
        Action::Backspace => session.backspace(),
        Action::Clear => session.clear(),
        Action::Evaluate => session.evaluate(evaluator),
    };
    debug!(
        ?action,
        from = %session.state(),
        to = %next.state(),
        expression = %next.expression(),
        "session transition"
    );
    next
}
