use calcpad::{
    app::App,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    evaluator::{Evaluator, StandardEvaluator},
    keymap, logging,
    runtime::{CalcEvent, CalcEventSource, CrosstermEventSource, Runner},
    session::{reduce, Action, Session},
    ui::ui,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    process::ExitCode,
    time::Duration,
};
use tracing::{error, info};

const POLL_INTERVAL_MS: u64 = 250;

/// keypad calculator with a live expression line and typeset results
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A keypad calculator for the terminal. Type or click an expression, press = to evaluate, and keep going from the result."
)]
pub struct Cli {
    /// evaluate an expression, print the result and exit
    #[clap(short = 'e', long = "eval")]
    expression: Option<String>,

    /// round results to this many significant digits (1-17)
    #[clap(short = 'p', long)]
    precision: Option<usize>,

    /// hide the on-screen keypad
    #[clap(long)]
    no_keypad: bool,

    /// report malformed display markup instead of showing it raw
    #[clap(long)]
    throw_on_error: bool,

    /// config file to read (and write with --save-config)
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// persist the effective settings to the config file
    #[clap(long)]
    save_config: bool,

    /// log file (filter with CALCPAD_LOG, e.g. CALCPAD_LOG=calcpad=debug)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Overlay command line flags on the stored configuration
    fn apply_to(&self, mut config: Config) -> Config {
        if self.precision.is_some() {
            config.precision = self.precision;
        }
        if self.no_keypad {
            config.show_keypad = false;
        }
        if self.throw_on_error {
            config.throw_on_error = true;
        }
        config.normalized()
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

/// Run typed text through a fresh session and evaluate it.
fn eval_once(input: &str, evaluator: &dyn Evaluator) -> Result<String, String> {
    let actions =
        keymap::actions_for(input).map_err(|c| format!("unsupported character '{c}'"))?;

    let mut session = actions
        .into_iter()
        .fold(Session::new(), |s, action| reduce(&s, action, evaluator));
    if !session.needs_reset() {
        session = reduce(&session, Action::Evaluate, evaluator);
    }

    match (session.is_error(), session.result_tokens().as_slice()) {
        (false, _) => Ok(session.last_good_result().unwrap_or_default().to_string()),
        (true, [prefix, message]) => Err(format!("{prefix}{message}")),
        (true, _) => Err("evaluation failed".to_string()),
    }
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().or_else(AppDirs::log_path);
    if let Some(path) = &log_path {
        if let Err(err) = logging::init(path) {
            eprintln!("logging disabled: {err}");
        }
    }

    let store = cli.config_store();
    let config = cli.apply_to(store.load());
    info!(?config, config_path = %store.path().display(), "starting");

    if cli.save_config {
        store.save(&config)?;
    }

    if let Some(expression) = &cli.expression {
        let evaluator = StandardEvaluator::new(config.precision);
        return Ok(match eval_once(expression, &evaluator) {
            Ok(result) => {
                println!("{result}");
                ExitCode::SUCCESS
            }
            Err(message) => {
                eprintln!("{message}");
                ExitCode::FAILURE
            }
        });
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(POLL_INTERVAL_MS),
    );
    let outcome = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &outcome {
        error!(error = %err, "terminal loop failed");
    }
    info!("exiting");
    outcome.map(|()| ExitCode::SUCCESS)
}

fn start_tui<B: Backend, E: CalcEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui(app, f))?;

    while !app.should_quit() {
        let event = runner.step();
        if let CalcEvent::Closed = event {
            return Err("terminal event stream closed".into());
        }
        if app.handle(&event) && !app.should_quit() {
            terminal.draw(|f| ui(app, f))?;
        }
    }

    Ok(())
}
