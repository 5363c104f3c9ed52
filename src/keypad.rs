use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::glyph::Operator;
use crate::session::Action;

pub const ROWS: usize = 5;
pub const COLUMNS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Digit(char),
    Point,
    OpenParen,
    CloseParen,
    Operator(Operator),
    Backspace,
    Clear,
    Equals,
}

pub const LAYOUT: [[Key; COLUMNS]; ROWS] = [
    [
        Key::Clear,
        Key::OpenParen,
        Key::CloseParen,
        Key::Operator(Operator::Divide),
    ],
    [
        Key::Digit('7'),
        Key::Digit('8'),
        Key::Digit('9'),
        Key::Operator(Operator::Multiply),
    ],
    [
        Key::Digit('4'),
        Key::Digit('5'),
        Key::Digit('6'),
        Key::Operator(Operator::Subtract),
    ],
    [
        Key::Digit('1'),
        Key::Digit('2'),
        Key::Digit('3'),
        Key::Operator(Operator::Add),
    ],
    [Key::Digit('0'), Key::Point, Key::Backspace, Key::Equals],
];

impl Key {
    pub fn label(self) -> String {
        match self {
            Key::Digit(c) => c.to_string(),
            Key::Point => ".".to_string(),
            Key::OpenParen => "(".to_string(),
            Key::CloseParen => ")".to_string(),
            Key::Operator(op) => op.glyph().to_string(),
            Key::Backspace => "⌫".to_string(),
            Key::Clear => "AC".to_string(),
            Key::Equals => "=".to_string(),
        }
    }

    pub fn action(self) -> Action {
        match self {
            Key::Digit(c) => Action::AppendFragment(c),
            Key::Point => Action::AppendFragment('.'),
            Key::OpenParen => Action::AppendFragment('('),
            Key::CloseParen => Action::AppendFragment(')'),
            Key::Operator(op) => Action::AppendOperator(op),
            Key::Backspace => Action::Backspace,
            Key::Clear => Action::Clear,
            Key::Equals => Action::Evaluate,
        }
    }

    /// The keypad button that dispatches `action`, if there is one.
    pub fn for_action(action: Action) -> Option<Key> {
        LAYOUT
            .iter()
            .flatten()
            .copied()
            .find(|key| key.action() == action)
    }
}

/// Keypad state: which button to highlight. Draws twenty buttons in a 5 × 4 grid.
#[derive(Debug, Default, Clone)]
pub struct Keypad {
    last_pressed: Option<Key>,
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_pressed(&self) -> Option<Key> {
        self.last_pressed
    }

    pub fn mark(&mut self, key: Option<Key>) {
        self.last_pressed = key;
    }

    /// Every button together with the cell it occupies inside `area`.
    pub fn cells(area: Rect) -> Vec<(Key, Rect)> {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Ratio(1, ROWS as u32); ROWS])
            .split(area);

        LAYOUT
            .iter()
            .zip(rows.iter())
            .flat_map(|(keys, row)| {
                let columns = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Ratio(1, COLUMNS as u32); COLUMNS])
                    .split(*row);
                keys.iter()
                    .copied()
                    .zip(columns.iter().copied())
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// The button under terminal cell (`column`, `row`) when the keypad is
    /// drawn into `area`.
    pub fn hit_test(area: Rect, column: u16, row: u16) -> Option<Key> {
        Self::cells(area)
            .into_iter()
            .find(|(_, cell)| {
                column >= cell.x
                    && column < cell.x + cell.width
                    && row >= cell.y
                    && row < cell.y + cell.height
            })
            .map(|(key, _)| key)
    }
}

fn key_style(key: Key) -> Style {
    match key {
        Key::Equals => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        Key::Clear | Key::Backspace => Style::default().fg(Color::Red),
        Key::Operator(_) | Key::OpenParen | Key::CloseParen => Style::default().fg(Color::Cyan),
        Key::Digit(_) | Key::Point => Style::default().add_modifier(Modifier::BOLD),
    }
}

impl Widget for &Keypad {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (key, cell) in Keypad::cells(area) {
            let mut style = key_style(key);
            if self.last_pressed == Some(key) {
                style = style.add_modifier(Modifier::REVERSED);
            }

            let label = Paragraph::new(key.label())
                .style(style)
                .alignment(Alignment::Center);

            // too small for a border: label only
            if cell.height < 3 {
                label.render(cell, buf);
            } else {
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray));
                let inner = block.inner(cell);
                block.render(cell, buf);
                let middle = Rect {
                    y: inner.y + inner.height.saturating_sub(1) / 2,
                    height: 1.min(inner.height),
                    ..inner
                };
                label.render(middle, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keypad_has_twenty_distinct_controls() {
        let keys: HashSet<String> = LAYOUT.iter().flatten().map(|k| k.label()).collect();
        assert_eq!(keys.len(), 20);
        for label in [
            "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", ".", "+", "-", "×", "÷", "(", ")",
            "⌫", "AC", "=",
        ] {
            assert!(keys.contains(label), "missing {label}");
        }
    }

    #[test]
    fn every_key_round_trips_through_its_action() {
        for key in LAYOUT.iter().flatten().copied() {
            assert_eq!(Key::for_action(key.action()), Some(key));
        }
    }

    #[test]
    fn actions_without_a_button() {
        assert_eq!(Key::for_action(Action::AppendFragment('q')), None);
    }

    #[test]
    fn cells_tile_the_area() {
        let area = Rect::new(0, 0, 40, 20);
        let cells = Keypad::cells(area);
        assert_eq!(cells.len(), ROWS * COLUMNS);
        let covered: u32 = cells
            .iter()
            .map(|(_, c)| c.width as u32 * c.height as u32)
            .sum();
        assert_eq!(covered, 40 * 20);
    }

    #[test]
    fn hit_test_finds_corners() {
        let area = Rect::new(2, 3, 40, 20);
        assert_eq!(Keypad::hit_test(area, 2, 3), Some(Key::Clear));
        assert_eq!(Keypad::hit_test(area, 41, 22), Some(Key::Equals));
        assert_eq!(Keypad::hit_test(area, 2, 22), Some(Key::Digit('0')));
        assert_eq!(
            Keypad::hit_test(area, 41, 3),
            Some(Key::Operator(Operator::Divide))
        );
    }

    #[test]
    fn hit_test_outside_is_none() {
        let area = Rect::new(2, 3, 40, 20);
        assert_eq!(Keypad::hit_test(area, 0, 0), None);
        assert_eq!(Keypad::hit_test(area, 42, 10), None);
        assert_eq!(Keypad::hit_test(area, 10, 23), None);
    }

    #[test]
    fn renders_labels_in_small_and_large_areas() {
        let keypad = Keypad::new();
        for area in [Rect::new(0, 0, 20, 5), Rect::new(0, 0, 40, 20)] {
            let mut buf = Buffer::empty(area);
            (&keypad).render(area, &mut buf);
            let content: String = buf.content.iter().map(|c| c.symbol()).collect();
            assert!(content.contains("AC"));
            assert!(content.contains('÷'));
            assert!(content.contains('⌫'));
        }
    }

    #[test]
    fn last_pressed_is_highlighted() {
        let mut keypad = Keypad::new();
        keypad.mark(Some(Key::Equals));
        assert_eq!(keypad.last_pressed(), Some(Key::Equals));

        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        (&keypad).render(area, &mut buf);
        let cell = Keypad::cells(area)
            .into_iter()
            .find(|(k, _)| *k == Key::Equals)
            .map(|(_, c)| c)
            .unwrap();
        let styled = (cell.x..cell.x + cell.width)
            .any(|x| buf[(x, cell.y)].modifier.contains(Modifier::REVERSED));
        assert!(styled);
    }
}
