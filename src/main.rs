mod app;
mod config;
mod data;
mod error;
mod grid;
mod model;
mod parser;
mod refresh;
mod theme;
mod ui;

use std::{
    env,
    fs::{self, OpenOptions},
    io,
    path::Path,
    sync::Mutex,
    time::Duration,
};

use anyhow::{Context, Result};
use app::{Action, App};
use clap::Parser;
use config::Args;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use data::SheetClient;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use refresh::{run_refresh_loop, LoadEvent, RefreshCommand};
use theme::PrefsStore;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    // The terminal belongs to the UI, so diagnostics go to a file.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_path())?;

    let source = args.source();
    let prefs = PrefsStore::new(args.prefs_path());
    let theme = prefs.load_theme(env::var("COLORFGBG").ok().as_deref());
    info!(doc = %source.doc_id, sheet = ?source.sheet, interval = args.interval, "starting");

    let title = match &source.sheet {
        Some(sheet) => format!("Schedule · {}", sheet),
        None => "Schedule".to_string(),
    };
    let mut app = App::new(title, theme);

    // Background loads talk to the UI loop over channels only.
    let (cmd_tx, cmd_rx) = mpsc::channel::<RefreshCommand>(8);
    let (ev_tx, mut ev_rx) = mpsc::channel::<LoadEvent>(16);
    let client = SheetClient::new(args.timeout());
    tokio::spawn(run_refresh_loop(client, source, args.interval(), cmd_rx, ev_tx));

    // Setup terminal
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &mut ev_rx, &cmd_tx, &prefs).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %err, "ui loop failed");
        println!("{:?}", err)
    }

    Ok(())
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: &mut mpsc::Receiver<LoadEvent>,
    commands: &mpsc::Sender<RefreshCommand>,
    prefs: &PrefsStore,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match app.on_key(key.code) {
                        Some(Action::Refresh) => {
                            // A full queue already holds a pending refresh.
                            let _ = commands.try_send(RefreshCommand::Now);
                        }
                        Some(Action::SaveTheme(theme)) => {
                            if let Err(e) = prefs.save_theme(theme) {
                                warn!(error = %e, "could not save theme");
                            }
                        }
                        None => {}
                    }
                }
            }
        }

        while let Ok(event) = rx.try_recv() {
            app.apply(event);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
