use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use log::info;
use quiz_core::Clock;
use services::{AppServices, QuestionSourceConfig, QuizEngine, SourceKind};
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSource { raw: String },
    InvalidSize { raw: String },
    InvalidTimeout { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSource { raw } => {
                write!(f, "invalid --source value: {raw} (expected http or local)")
            }
            ArgsError::InvalidSize { raw } => write!(f, "invalid --size value: {raw}"),
            ArgsError::InvalidTimeout { raw } => write!(f, "invalid --timeout value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    services: AppServices,
}

impl UiApp for DesktopApp {
    fn quiz_engine(&self) -> Arc<QuizEngine> {
        self.services.quiz_engine()
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- [--source http|local] [--api <url>] [--db <sqlite_url>] \
         [--size <n>] [--timeout <secs>]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --source local");
    eprintln!("  --api http://127.0.0.1:8000");
    eprintln!("  --db sqlite:quiz.sqlite3");
    eprintln!("  --size 10");
    eprintln!("  --timeout 10");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_SOURCE, QUIZ_API_URL, QUIZ_DB_URL, QUIZ_SESSION_SIZE, QUIZ_HTTP_TIMEOUT_SECS");
    eprintln!("  RUST_LOG controls log verbosity");
}

/// Apply command-line overrides on top of the environment configuration.
fn parse_args(
    mut config: QuestionSourceConfig,
    args: &mut impl Iterator<Item = String>,
) -> Result<Option<QuestionSourceConfig>, ArgsError> {
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--source" => {
                let value = require_value(args, "--source")?;
                config.kind = value
                    .parse::<SourceKind>()
                    .map_err(|_| ArgsError::InvalidSource { raw: value.clone() })?;
            }
            "--api" => {
                config.api_url = require_value(args, "--api")?;
            }
            "--db" => {
                let value = require_value(args, "--db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value });
                }
                config.db_url = value;
            }
            "--size" => {
                let value = require_value(args, "--size")?;
                config.session_size = match value.parse::<usize>() {
                    Ok(size) if size > 0 => size,
                    _ => return Err(ArgsError::InvalidSize { raw: value }),
                };
            }
            "--timeout" => {
                let value = require_value(args, "--timeout")?;
                config.http_timeout = match value.parse::<u64>() {
                    Ok(secs) if secs > 0 => Duration::from_secs(secs),
                    _ => return Err(ArgsError::InvalidTimeout { raw: value }),
                };
            }
            "--help" | "-h" => return Ok(None),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Some(config))
}

fn normalize_sqlite_url(raw: &str) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw.to_string();
    }

    let trimmed = raw.trim();
    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let Some(mut config) = parse_args(QuestionSourceConfig::from_env(), &mut args).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?
    else {
        print_usage();
        return Ok(());
    };

    if config.kind == SourceKind::Local {
        config.db_url = normalize_sqlite_url(&config.db_url);
        prepare_sqlite_file(&config.db_url)?;
    }

    info!(
        "starting quiz with {} source (session size {})",
        config.kind, config.session_size
    );
    let services = AppServices::from_config(&config, Clock::system()).await?;
    let app: Arc<dyn UiApp> = Arc::new(DesktopApp { services });
    let context = build_app_context(&app);

    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Quiz")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
