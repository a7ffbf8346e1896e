use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use simplelog::{Config, LevelFilter, WriteLogger};

use pagewise::{
    App, Document,
    event_source::KeyboardEventSource,
    panic_handler, run_app_with_event_source, settings,
    terminal::TerminalSession,
    theme::{self, ThemeId},
};

/// Read a chaptered document one chapter at a time.
#[derive(Parser, Debug)]
#[command(name = "pagewise", version, about)]
struct Args {
    /// Document to open (.yaml, .yml, .json or .toml). Opens the bundled
    /// sample when omitted.
    file: Option<PathBuf>,

    /// Color theme for this session
    #[arg(long)]
    theme: Option<String>,

    /// Where to write the log
    #[arg(long, default_value = "pagewise.log")]
    log_file: PathBuf,

    /// Log at debug level
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    WriteLogger::init(
        level,
        Config::default(),
        File::create(&args.log_file)
            .with_context(|| format!("Failed to create log file {}", args.log_file.display()))?,
    )?;

    panic_handler::initialize_panic_handler();
    info!("Starting pagewise");

    settings::load_settings();
    apply_theme(args.theme.as_deref());

    let document = match &args.file {
        Some(path) => Document::from_path(path)?,
        None => Document::sample()?,
    };

    let mut app = App::new(document);
    let res = {
        let mut session = TerminalSession::acquire()?;
        let mut event_source = KeyboardEventSource;
        run_app_with_event_source(session.terminal(), &mut app, &mut event_source)
    };

    if let Err(err) = &res {
        error!("Application error: {err:?}");
    }

    info!("Shutting down pagewise");
    res
}

fn apply_theme(cli_theme: Option<&str>) {
    let requested = cli_theme
        .map(str::to_string)
        .unwrap_or_else(settings::get_theme_name);
    match ThemeId::from_name(&requested) {
        Some(id) => {
            theme::set_theme(id);
            if cli_theme.is_some() {
                settings::set_theme_name(id.name());
            }
        }
        None => warn!(
            "Unknown theme {requested:?}, keeping {}",
            theme::current_theme_id().name()
        ),
    }
}
