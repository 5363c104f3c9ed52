use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::glyph::Operator;
use crate::session::Action;

/// Map a key press to the action it triggers, if any.
///
/// `( ) + *` are accepted with or without SHIFT reported, since terminals
/// disagree on it. CONTROL and ALT chords map to nothing, except the deletion
/// keys which always erase.
pub fn map_key(key: &KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    if matches!(key.code, KeyCode::Backspace | KeyCode::Delete) {
        return Some(Action::Backspace);
    }

    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }

    match key.code {
        KeyCode::Enter => Some(Action::Evaluate),
        KeyCode::Char(c) => map_char(c),
        _ => None,
    }
}

fn map_char(c: char) -> Option<Action> {
    match c {
        '0'..='9' | '.' | '(' | ')' => Some(Action::AppendFragment(c)),
        '+' => Some(Action::AppendOperator(Operator::Add)),
        '-' => Some(Action::AppendOperator(Operator::Subtract)),
        '*' | 'x' => Some(Action::AppendOperator(Operator::Multiply)),
        '/' => Some(Action::AppendOperator(Operator::Divide)),
        '=' => Some(Action::Evaluate),
        'c' | 'C' => Some(Action::Clear),
        c => Operator::from_glyph(c).map(Action::AppendOperator),
    }
}

/// Translate typed text into actions, skipping whitespace.
///
/// Returns the first character that has no mapping as the error.
pub fn actions_for(input: &str) -> Result<Vec<Action>, char> {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| map_char(c).ok_or(c))
        .collect()
}

/// Esc or Ctrl+C leave the application.
pub fn is_quit(key: &KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    key.code == KeyCode::Esc
        || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
}
