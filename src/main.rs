mod app;
mod config;
mod domain;
mod input;
mod logging;
mod persistence;
mod store;
mod ticker;
mod ui;

use anyhow::{Context, Result};
use app::AppState;
use clap::{Parser, Subcommand};
use config::{load_config, save_config, Config};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use domain::format_elapsed;
use persistence::{config_file, ensure_dir, get_data_dir, init_local_dir, log_file, DirStore, TaskGateway};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use store::{SystemClock, TaskStore};
use ticker::{Ticker, TICK_INTERVAL};
use tracing::info;

#[derive(Parser)]
#[command(name = "tasktick")]
#[command(about = "A small terminal task timer with subtasks, due dates and average completion times", long_about = None)]
struct Cli {
    /// Data directory (defaults to $TASKTICK_DIR, a local .tasktick, or ~/.tasktick)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .tasktick directory in the current directory
    Init,
    /// Print average finished time per task name
    Stats {
        /// Only show this task name
        name: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => {
            logging::init_stderr_logging();
            let current_dir = std::env::current_dir().context("Could not determine current directory")?;
            let dir = init_local_dir(&current_dir)?;
            save_config(config_file(&dir), &Config::default())?;
            println!("Initialized tasktick directory: {}", dir.display());
            println!();
            println!("Run 'tasktick' from here to track tasks in this directory.");
            Ok(())
        }
        Some(Commands::Stats { name }) => {
            logging::init_stderr_logging();
            let dir = get_data_dir(cli.dir.as_deref())?;
            print_stats(&dir, name.as_deref());
            Ok(())
        }
        None => run_tui(cli.dir.as_deref()),
    }
}

fn print_stats(dir: &Path, name: Option<&str>) {
    let store = TaskStore::open(TaskGateway::new(DirStore::new(dir)), SystemClock);

    if let Some(name) = name {
        match store.average_finished_time(name) {
            Some(avg) => println!("{}: {}", name, format_elapsed(avg)),
            None => println!("{}: no data", name),
        }
        return;
    }

    let summaries = store.finished_summaries();
    if summaries.is_empty() {
        println!("No finished tasks yet.");
        return;
    }

    let width = summaries.iter().map(|s| s.name.chars().count()).max().unwrap_or(0);
    for summary in summaries {
        println!(
            "{:<width$}  {}  ({} finished)",
            summary.name,
            format_elapsed(summary.average_secs),
            summary.finished_count,
            width = width
        );
    }
}

fn run_tui(dir_override: Option<&Path>) -> Result<()> {
    let dir = get_data_dir(dir_override)?;
    ensure_dir(&dir)?;
    logging::init_file_logging(&log_file(&dir))?;

    eprintln!("Using tasktick directory: {}", dir.display());

    let config = load_config(config_file(&dir));
    info!(dir = %dir.display(), ?config, "starting");

    let store = TaskStore::open(TaskGateway::new(DirStore::new(&dir)), SystemClock);
    let mut app = AppState::new(store, config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = app.shutdown() {
        eprintln!("Error saving state: {:#}", e);
    }

    if let Err(err) = result {
        eprintln!("Error: {:#}", err);
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    let mut ticker = Ticker::new(TICK_INTERVAL, Instant::now());
    let mut redraw = true;

    loop {
        // Redraw after input, and after ticks/mutations that changed the store
        let changed = app.store.take_changed();
        if redraw || changed {
            terminal.draw(|f| ui::render(f, app))?;
            redraw = false;
        }

        if event::poll(ticker.time_until_next(Instant::now()))? {
            match event::read()? {
                // Only process key press events (ignore key release)
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if input::handle_key(app, key) {
                        return Ok(());
                    }
                    redraw = true;
                }
                Event::Resize(_, _) => redraw = true,
                _ => {}
            }
        }

        if ticker.fire_if_due(Instant::now()) {
            app.tick();
        }
    }
}
