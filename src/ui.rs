use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

use crate::app::App;

const HORIZONTAL_MARGIN: u16 = 1;
const HELP: &str = "0-9 . ( ) + - * /  = evaluate  ⌫ erase  c clear  esc quit";

/// Where each part of the calculator goes inside the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppLayout {
    pub frame: Rect,
    pub expression: Rect,
    pub result: Rect,
    pub keypad: Rect,
    pub help: Rect,
}

pub fn layout(area: Rect, show_keypad: bool) -> AppLayout {
    let inner = Block::default().borders(Borders::ALL).inner(area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(1), // expression
            Constraint::Length(1), // result
            Constraint::Length(1), // spacer
            Constraint::Min(0),    // keypad
            Constraint::Length(1), // help
        ])
        .split(inner);

    let keypad = if show_keypad {
        chunks[3]
    } else {
        Rect {
            height: 0,
            ..chunks[3]
        }
    };

    AppLayout {
        frame: area,
        expression: chunks[0],
        result: chunks[1],
        keypad,
        help: chunks[4],
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let parts = layout(area, self.config.show_keypad);
        let session = self.session();

        let state_style = if session.is_error() {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                " calcpad ",
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .title(
                Line::from(Span::styled(format!(" {} ", session.state()), state_style))
                    .alignment(Alignment::Right),
            )
            .render(parts.frame, buf);

        self.expression_field.render(parts.expression, buf);
        self.result_field.render(parts.result, buf);

        if parts.keypad.height > 0 {
            self.keypad.render(parts.keypad, buf);
        }

        Paragraph::new(Span::styled(
            HELP,
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(parts.help, buf);
    }
}

/// Draw the whole screen and remember its size for mouse hit-testing.
pub fn ui(app: &mut App, f: &mut Frame) {
    app.viewport = f.area();
    f.render_widget(&*app, f.area());
}
