use anyhow::{Context, Result};
use daygrid::app::App;
use daygrid::calendar::{build_month, MonthIndex};
use daygrid::config::{self, AppConfig};
use daygrid::register::client::RegisterClient;
use daygrid::register::worker::RegisterWorker;
use daygrid::register::{register_schema, RegisterField, RegisterForm, UNEXPECTED_ERROR};
use std::io::{self, BufRead, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        // ── dg month [OFFSET] ─────────────────────────────────────────────────
        Some("month")    => cmd_month(args.get(2).map(|s| s.as_str())),
        // ── dg register ───────────────────────────────────────────────────────
        Some("register") => cmd_register().await,
        // ── dg (TUI) ──────────────────────────────────────────────────────────
        _                => run_tui().await,
    }
}

fn init_stderr_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// ─── Month command ────────────────────────────────────────────────────────────

fn cmd_month(offset: Option<&str>) -> Result<()> {
    init_stderr_logging();

    let index = match offset {
        Some(raw) => raw.parse::<MonthIndex>()?,
        None      => MonthIndex::today(),
    };
    print!("{}", build_month(index));
    Ok(())
}

// ─── Register command ─────────────────────────────────────────────────────────

async fn cmd_register() -> Result<()> {
    init_stderr_logging();

    let cfg   = AppConfig::load()?;
    let stdin = io::stdin();
    let mut input = stdin.lock();

    let mut form = RegisterForm::default();
    for field in RegisterField::ALL {
        *form.get_mut(field) = prompt(&mut input, field.label())?;
    }

    if let Err(errors) = register_schema().validate(&form) {
        for field in RegisterField::ALL {
            if let Some(msg) = errors.first(field.key()) {
                eprintln!("  {}: {msg}", field.label());
            }
        }
        anyhow::bail!("registration form has {} problem(s)", errors.len());
    }

    let client  = RegisterClient::new(&cfg.api())?;
    eprintln!("Submitting to {}…", client.endpoint());
    let outcome = client.register(&form).await.context(UNEXPECTED_ERROR)?;
    println!("{}", outcome.status_line());
    Ok(())
}

fn prompt(input: &mut impl BufRead, label: &str) -> Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(&['\r', '\n'][..]).to_owned())
}

// ─── TUI ─────────────────────────────────────────────────────────────────────

async fn run_tui() -> Result<()> {
    let log_dir = config::data_dir();
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "daygrid.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    tracing::info!("Starting daygrid");

    let cfg    = AppConfig::load().unwrap_or_default();
    let client = RegisterClient::new(&cfg.api())?;

    let mut app = App::new(chrono::Local::now().date_naive());
    app.attach_register_worker(RegisterWorker::spawn(client));
    app.run().await?;
    Ok(())
}
