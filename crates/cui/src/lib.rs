mod actions;
mod app;
mod input;
mod view;

use anyhow::{Context, Result};
use app::App;
use crossterm::event::{self, Event as CEvent, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, ExecutableCommand};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::fs::File;
use std::io::{self, stdout, IsTerminal};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PACKCLICK_LOG";

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub seed: Option<u64>,
    pub save_path: Option<PathBuf>,
    pub assets_dir: PathBuf,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            seed: None,
            save_path: packclick_data::default_save_path(),
            assets_dir: PathBuf::from("assets"),
        }
    }
}

pub fn run(options: LaunchOptions) -> Result<()> {
    init_file_logging();
    let mut app = App::bootstrap(&options.assets_dir, options.save_path, options.seed)?;

    ensure_interactive_terminal()?;

    enable_raw_mode().map_err(|err| {
        anyhow::anyhow!(
            "failed to enable raw mode; ensure the process owns an interactive terminal: {err}"
        )
    })?;
    let mut stdout = stdout();
    stdout
        .execute(EnterAlternateScreen)
        .context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let run_result = run_loop(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;
    run_result
}

pub fn run_with_args(args: &[String]) -> Result<()> {
    let options = parse_options(args);
    run(options)
}

pub fn parse_options(args: &[String]) -> LaunchOptions {
    let mut options = LaunchOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--seed" => {
                if let Some(value) = args.get(idx + 1) {
                    options.seed = value.parse::<u64>().ok();
                    idx += 1;
                }
            }
            "--save" => {
                if let Some(value) = args.get(idx + 1) {
                    options.save_path = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            "--assets" => {
                if let Some(value) = args.get(idx + 1) {
                    options.assets_dir = PathBuf::from(value);
                    idx += 1;
                }
            }
            _ => {}
        }
        idx += 1;
    }
    options
}

/// Routes tracing output to a file in the temp dir; the alternate screen owns
/// stdout and stderr while the UI runs.
fn init_file_logging() {
    let path = std::env::temp_dir().join("packclick-cui.log");
    let Ok(file) = File::create(&path) else {
        return;
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(120);
    while !app.should_quit {
        terminal.draw(|frame| view::draw(frame, app))?;
        if event::poll(tick_rate)? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let action = input::map_key(key);
                actions::dispatch(app, action);
            }
        } else {
            app.on_tick();
        }
    }
    Ok(())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("leave alternate screen")?;
    terminal.show_cursor().context("show cursor")?;
    Ok(())
}

fn ensure_interactive_terminal() -> Result<()> {
    if io::stdin().is_terminal() && io::stdout().is_terminal() {
        return Ok(());
    }
    anyhow::bail!(
        "packclick-cui requires an interactive TTY (run directly in a terminal, not a piped/headless shell)"
    );
}
