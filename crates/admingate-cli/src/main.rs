//! admingate CLI - inspect and enforce admin session state.
//!
//! Runs the page-load enforcement flow against a file-backed storage dump,
//! the same flow the browser runs against local storage. Useful for
//! reproducing invalidation decisions from a captured storage snapshot.

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use admingate_core::{
    enforce, schedule_redirect, FileStorage, MemoryStorage, Navigator, Outcome, PageLocation,
    SessionReport,
};

const USAGE: &str = "\
admingate - admin session diagnostics

USAGE:
    admingate [--storage <file>] [--path <location>] [--report-only]

OPTIONS:
    --storage <file>    Storage snapshot to operate on
                        (default: <cache dir>/admingate/storage.json)
    --path <location>   Page location to evaluate, e.g. /admin/reports?x=1
                        (default: /admin)
    --report-only       Print the session report without enforcing
    --help              Show this help
";

struct Args {
    storage: Option<PathBuf>,
    path: String,
    report_only: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        storage: None,
        path: "/admin".to_string(),
        report_only: false,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--storage" => {
                let value = iter.next().context("--storage requires a file path")?;
                args.storage = Some(PathBuf::from(value));
            }
            "--path" => {
                args.path = iter.next().context("--path requires a location")?;
            }
            "--report-only" => args.report_only = true,
            "--help" | "-h" => {
                print!("{}", USAGE);
                std::process::exit(0);
            }
            other => bail!("unknown argument: {} (try --help)", other),
        }
    }
    Ok(args)
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Prints the navigation instead of performing it; the CLI has no page to
/// move
struct AnnouncingNavigator;

impl Navigator for AnnouncingNavigator {
    fn navigate(&self, location: &str) {
        println!("navigate -> {}", location);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args = parse_args()?;

    let mut storage = match args.storage {
        Some(ref path) => {
            FileStorage::open(path).with_context(|| format!("failed to open {}", path.display()))?
        }
        None => FileStorage::open_default().context("failed to open default storage")?,
    };
    info!(path = %storage.path().display(), "opened storage snapshot");

    let now = Utc::now();
    print!("{}", SessionReport::collect(&storage, now));

    if args.report_only {
        return Ok(());
    }

    // The redirect slot lives in a per-run transient area, like the
    // session-scoped storage it stands in for
    let mut transient = MemoryStorage::new();
    let page = PageLocation::parse(&args.path);

    match enforce(&mut storage, &mut transient, &page, now) {
        Outcome::Preserved => println!("session preserved"),
        Outcome::Cleared { reason, redirect } => {
            println!("session cleared: {:?}", reason);
            if let Some(redirect) = redirect {
                println!("redirect target recorded: {}", redirect.attempted);
                schedule_redirect(&AnnouncingNavigator, &redirect).await;
            }
        }
        Outcome::Skipped => println!("enforcement skipped after unexpected error"),
    }

    Ok(())
}
