use bouncetime::{
    app::App,
    app_dirs::AppDirs,
    clock::SystemClock,
    config::{Config, ConfigStore, FileConfigStore},
    controller::SessionController,
    format::format_duration,
    log_store::DurationLog,
    log_worker::LogWorker,
    runtime::{CrosstermEventSource, FixedTicker, Runner},
    store::SqliteStore,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{info, LevelFilter};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::OpenOptions,
    io::{self, stdin, Write},
    path::PathBuf,
};

/// time an activity while the elapsed time bounces around the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Start a timer, watch the elapsed time bounce around the screen, stop it, and keep a log of every session."
)]
pub struct Cli {
    /// animation frames per second
    #[clap(long)]
    fps: Option<u32>,

    /// slowest label speed, in cells per frame
    #[clap(long)]
    min_speed: Option<f64>,

    /// fastest label speed, in cells per frame
    #[clap(long)]
    max_speed: Option<f64>,

    /// SQLite file holding the duration log
    #[clap(long)]
    db: Option<PathBuf>,

    /// print the duration log and exit
    #[clap(long)]
    list: bool,

    /// write the effective settings to the config file and exit
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Command line values take precedence over the config file
    fn merge_into(&self, mut config: Config) -> Config {
        if let Some(fps) = self.fps {
            config.fps = fps;
        }
        if let Some(min_speed) = self.min_speed {
            config.min_speed = min_speed;
        }
        if let Some(max_speed) = self.max_speed {
            config.max_speed = max_speed;
        }
        if let Some(db) = &self.db {
            config.db_path = Some(db.clone());
        }
        config
    }
}

fn db_path(config: &Config) -> PathBuf {
    config
        .db_path
        .clone()
        .or_else(AppDirs::db_path)
        .unwrap_or_else(|| PathBuf::from("bouncetime.db"))
}

/// Logs go to a file; the terminal belongs to the UI
fn init_logging() {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    let file = AppDirs::log_path().and_then(|path| {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok()?;
        }
        OpenOptions::new().create(true).append(true).open(path).ok()
    });

    match file {
        Some(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.filter_level(LevelFilter::Off);
        }
    }

    let _ = builder.try_init();
}

fn print_log(config: &Config) -> Result<(), Box<dyn Error>> {
    let log = DurationLog::new(SqliteStore::open(db_path(config))?);
    let records = log.load_all();

    let mut out = io::stdout().lock();
    if records.is_empty() {
        writeln!(out, "No sessions logged yet.")?;
    }
    for (idx, record) in records.iter().enumerate() {
        writeln!(out, "#{}: {}", idx + 1, format_duration(record.duration as i64))?;
        writeln!(out, "    Start: {}", record.start)?;
        writeln!(out, "    End: {}", record.end)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    let config = cli.merge_into(FileConfigStore::new().load());

    if cli.save_config {
        let store = FileConfigStore::new();
        store.save(&config)?;
        println!("Saved config to {}", store.path().display());
        return Ok(());
    }

    if cli.list {
        return print_log(&config);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = SqliteStore::open(db_path(&config))?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &config, store);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    config: &Config,
    store: SqliteStore,
) -> Result<(), Box<dyn Error>> {
    let event_source = CrosstermEventSource::new();
    let worker = LogWorker::spawn(DurationLog::new(store), event_source.sender());
    let controller = SessionController::new(
        SystemClock,
        StdRng::from_entropy(),
        config.bounce_config(),
    );
    let mut app = App::new(controller, worker);

    let size = terminal.size()?;
    app.resize(size.width, size.height);

    let mut runner = Runner::new(event_source, FixedTicker::from_fps(config.fps));
    info!("Terminal UI started at {} fps", config.fps);

    terminal.draw(|f| f.render_widget(&app, f.area()))?;

    while !app.should_quit() {
        runner.sync(app.wants_clock_ticks(), app.wants_frames());

        if let Some(event) = runner.step() {
            app.handle_event(event);
            terminal.draw(|f| f.render_widget(&app, f.area()))?;
        }
    }

    runner.sync(false, false);
    info!("Terminal UI closed");

    Ok(())
}
