//! Main entry point for the playlist-selector CLI application.

use clap::Parser;
use log::{debug, error, info, warn};
use playlist_selector::config::{GeneratorSettings, Settings};
use playlist_selector::error::Result;
use playlist_selector::generator::generate;
use playlist_selector::session::{Session, SessionOutcome};
use playlist_selector::source;
use playlist_selector::store::SessionPaths;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

/// Command-line arguments for the playlist-selector application.
#[derive(Parser, Debug)]
#[command(
    name = "playlist-selector",
    version,
    about = "Pick the groups and channels to keep from an IPTV playlist",
    long_about = "Load an M3U playlist from a file or URL, choose groups and channels \
                  page by page, and save the selection for the playlist generator."
)]
struct Args {
    /// Playlist file path or http(s) URL (default: first *.m3u in the playlist directory)
    source: Option<String>,

    /// Settings file (default: the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log verbosity level: 0=error, 1=warn, 2=info, 3=debug, 4=trace
    #[arg(short, long, default_value_t = 1)]
    log: u8,

    /// Do not offer to reuse the saved selection
    #[arg(short, long)]
    fresh: bool,

    /// Save the selection but do not run the generator
    #[arg(long)]
    no_generate: bool,

    /// Write a default settings file and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.log {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    debug!("Log level set to {:?}", log_level);

    if let Err(e) = run(args).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    if args.init_config {
        let path = match &args.config {
            Some(path) => path.clone(),
            None => Settings::get_config_path()?,
        };
        if Settings::create_default_if_missing(&path)? {
            println!("Wrote default settings to {}", path.display());
        } else {
            println!("Settings already exist at {}", path.display());
        }
        return Ok(());
    }

    // An explicit --config must load; the default location falls back.
    let settings = match args.config.as_deref() {
        Some(path) => Settings::load(Some(path))?,
        None => Settings::load(None).unwrap_or_else(|e| {
            warn!("Failed to load settings: {}. Using defaults.", e);
            Settings::new()
        }),
    };

    let generator = if args.no_generate {
        None
    } else {
        settings.generator.as_ref()
    };

    let stdout = io::stdout();
    let color = stdout.is_terminal();
    let mut session = Session::new(&settings, io::stdin().lock(), stdout).with_color(color);

    let source = session.resolve_source(args.source.as_deref()).await?;
    info!("Using source {}", source);
    let acquired = source::acquire(&source, &settings).await?;

    if let Some(generator) = generator {
        if !args.fresh {
            let paths = SessionPaths::for_playlist(&acquired.path);
            if session.offer_resume(&paths)?.is_some() {
                return hand_off(generator, &paths.config);
            }
        }
    }

    match session.run(&acquired)? {
        SessionOutcome::NoGroupsKept => Ok(()),
        SessionOutcome::Saved { config_path, .. } => match generator {
            Some(generator) => hand_off(generator, &config_path),
            None => {
                println!("Selection saved. Generator not run.");
                Ok(())
            }
        },
    }
}

/// Run the generator on the saved config and publish its results.
fn hand_off(generator: &GeneratorSettings, config_path: &Path) -> Result<()> {
    println!("\nRunning {}...", generator.program);
    let written = generate(generator, config_path)?;
    for path in &written {
        println!("  Copied: {}", path.display());
    }
    println!("Done! All output -> {}", generator.output_dir);
    Ok(())
}
