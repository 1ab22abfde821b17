//! Entry point for the bwdash TUI. Parses args, sets up diagnostics, runs the App.

use std::env;
use std::fs::OpenOptions;
use std::sync::Arc;
use std::time::Duration;

use bwdash::app::App;
use bwdash::fetch::HttpSource;
use bwdash::prefs::config_dir;

// Document filenames the collector publishes under its output directory
const STATUS_DOC: &str = "pfsense_monitor_data.json";
const HISTORY_DOC: &str = "bandwidth_history.json";

struct ParsedArgs {
    base_url: Option<String>,
    status_url: Option<String>,
    history_url: Option<String>,
    interval_secs: u64,
    debug: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "bwdash".into());
    let usage = format!(
        "Usage: {prog} [--interval SECS|-i SECS] [--status-url URL] [--history-url URL] [--debug|-d] [http://HOST/path]"
    );

    let mut base_url: Option<String> = None;
    let mut status_url: Option<String> = None;
    let mut history_url: Option<String> = None;
    let mut interval_secs: u64 = 10;
    let mut debug = false;

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => return Err(usage),
            "--interval" | "-i" => {
                let v = it.next().ok_or_else(|| usage.clone())?;
                interval_secs = v
                    .parse()
                    .map_err(|_| format!("invalid --interval value '{v}'"))?;
            }
            "--status-url" => {
                status_url = it.next();
            }
            "--history-url" => {
                history_url = it.next();
            }
            "--debug" | "-d" => {
                debug = true;
            }
            _ if arg.starts_with("--interval=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    interval_secs = v
                        .parse()
                        .map_err(|_| format!("invalid --interval value '{v}'"))?;
                }
            }
            _ if arg.starts_with("--status-url=") => {
                status_url = arg.split_once('=').map(|(_, v)| v.to_string());
            }
            _ if arg.starts_with("--history-url=") => {
                history_url = arg.split_once('=').map(|(_, v)| v.to_string());
            }
            _ => {
                if base_url.is_none() {
                    base_url = Some(arg);
                } else {
                    return Err(format!("Unexpected argument. {usage}"));
                }
            }
        }
    }
    if interval_secs < 1 {
        return Err("--interval must be at least 1 second".into());
    }
    Ok(ParsedArgs {
        base_url,
        status_url,
        history_url,
        interval_secs,
        debug,
    })
}

fn resolve_urls(parsed: &ParsedArgs) -> Result<(String, String), String> {
    let from_base = |doc: &str| {
        parsed
            .base_url
            .as_ref()
            .map(|b| format!("{}/{}", b.trim_end_matches('/'), doc))
    };
    let status = parsed.status_url.clone().or_else(|| from_base(STATUS_DOC));
    let history = parsed
        .history_url
        .clone()
        .or_else(|| from_base(HISTORY_DOC));
    match (status, history) {
        (Some(s), Some(h)) => Ok((s, h)),
        _ => Err("need a base URL, or both --status-url and --history-url".into()),
    }
}

/// Verbose diagnostics go to a log file; the terminal belongs to the TUI.
fn init_tracing() -> anyhow::Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("bwdash.log"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bwdash=debug")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let parsed = match parse_args(env::args()) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(());
        }
    };
    let (status_url, history_url) = match resolve_urls(&parsed) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(());
        }
    };

    if parsed.debug {
        init_tracing()?;
    }

    let source = HttpSource::new(status_url, history_url);
    let mut app = App::new(Duration::from_secs(parsed.interval_secs));
    app.run(&source).await
}
