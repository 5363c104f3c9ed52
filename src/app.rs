use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::evaluator::StandardEvaluator;
use crate::keymap;
use crate::keypad::{Key, Keypad};
use crate::render::{MathField, RenderOptions};
use crate::runtime::CalcEvent;
use crate::session::{reduce, Action, Session};
use crate::ui;

/// Everything the calculator screen needs: the current session, the
/// evaluator it runs against, and the display components fed from it.
#[derive(Debug)]
pub struct App {
    pub config: Config,
    session: Session,
    evaluator: StandardEvaluator,
    pub keypad: Keypad,
    pub expression_field: MathField,
    pub result_field: MathField,
    /// Area of the last drawn frame, used to hit-test mouse clicks.
    pub viewport: Rect,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        let config = config.normalized();
        let options = RenderOptions {
            throw_on_error: config.throw_on_error,
        };
        let mut app = Self {
            evaluator: StandardEvaluator::new(config.precision),
            config,
            session: Session::new(),
            keypad: Keypad::new(),
            expression_field: MathField::new(options),
            result_field: MathField::new(options),
            viewport: Rect::default(),
            should_quit: false,
        };
        app.refresh_fields();
        app
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Run one action through the session and update the display.
    pub fn dispatch(&mut self, action: Action) {
        self.session = reduce(&self.session, action, &self.evaluator);
        self.keypad.mark(Key::for_action(action));
        self.refresh_fields();
    }

    pub fn on_key(&mut self, key: &KeyEvent) -> bool {
        if keymap::is_quit(key) {
            info!("quit requested");
            self.should_quit = true;
            return true;
        }
        match keymap::map_key(key) {
            Some(action) => {
                self.dispatch(action);
                true
            }
            None => false,
        }
    }

    pub fn on_mouse(&mut self, mouse: &MouseEvent) -> bool {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) || !self.config.show_keypad {
            return false;
        }
        let keypad_area = ui::layout(self.viewport, self.config.show_keypad).keypad;
        match Keypad::hit_test(keypad_area, mouse.column, mouse.row) {
            Some(key) => {
                debug!(?key, "keypad click");
                self.dispatch(key.action());
                true
            }
            None => false,
        }
    }

    /// Handle one runtime event. Returns whether the screen needs redrawing.
    pub fn handle(&mut self, event: &CalcEvent) -> bool {
        match event {
            CalcEvent::Key(key) => self.on_key(key),
            CalcEvent::Mouse(mouse) => self.on_mouse(mouse),
            CalcEvent::Resize => true,
            CalcEvent::Idle | CalcEvent::Closed => false,
        }
    }

    fn refresh_fields(&mut self) {
        let result_style = if self.session.is_error() {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        };
        self.expression_field
            .set_style(Style::default().add_modifier(Modifier::DIM));
        self.result_field.set_style(result_style);

        if let Err(err) = self
            .expression_field
            .set_source(&self.session.expression_markup())
        {
            warn!(error = %err, "expression line did not render");
        }
        if let Err(err) = self.result_field.set_source(&self.session.result_markup()) {
            warn!(error = %err, "result line did not render");
        }
    }
}
