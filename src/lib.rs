// Library surface for the binary, headless/integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod evaluator;
pub mod glyph;
pub mod keymap;
pub mod keypad;
pub mod logging;
pub mod markup;
pub mod render;
pub mod runtime;
pub mod session;
pub mod ui;

pub use app::App;
pub use config::Config;
pub use session::{reduce, Action, Session};
