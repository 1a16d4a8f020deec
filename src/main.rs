use std::sync::Arc;

use avanza::AvanzaHttpClient;
use clap::Parser;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use courtage::cli::{self, Command};
use courtage::engine::traffic::TapEvent;
use courtage::engine::{Engine, EngineConfig};
use courtage::output;
use courtage::prefs::PreferencesStore;
use courtage::sink::PresentationSink;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Initialize tracing
    let filter = cli
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Shared cancellation token + signal handlers.
    let cancel = setup_signal_handlers();

    match cli.command {
        Command::Run(args) => {
            let _ = dotenvy::dotenv(); // load .env if present

            let base_url = match args
                .base_url
                .clone()
                .or_else(|| std::env::var("AVANZA_BASE_URL").ok())
            {
                Some(url) => url,
                None => {
                    error!("--base-url or AVANZA_BASE_URL is required");
                    std::process::exit(1);
                }
            };

            run_engine(args, base_url, cancel).await;
        }

        Command::Fee(args) => print_fee_table(&args),
    }
}

async fn run_engine(args: cli::RunArgs, base_url: String, cancel: CancellationToken) {
    let config = EngineConfig {
        base_currency: args.base_currency,
        debounce_ms: args.debounce_ms,
        min_api_interval_ms: args.min_api_interval_ms,
        reset_delay_ms: args.reset_delay_ms,
    };

    let prefs = match &args.prefs {
        Some(path) => PreferencesStore::load(path),
        None => PreferencesStore::in_memory(),
    };

    let client = Arc::new(AvanzaHttpClient::new(&base_url));
    let (sink, mut ui_rx) = PresentationSink::channel();
    let engine = Engine::new(config, client, prefs, sink);

    info!(base_url = %base_url, "reading tap events from stdin");

    // stdin tap: one NDJSON event per line; malformed lines are skipped.
    let (tap_tx, tap_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<TapEvent>(line) {
                Ok(event) => {
                    if tap_tx.send(event).is_err() {
                        break;
                    }
                }
                Err(e) => debug!(error = %e, "ignoring malformed tap line"),
            }
        }
    });

    // Presentation events to stdout.
    let json_mode = args.json;
    tokio::spawn(async move {
        let mut stdout = std::io::stdout();
        while let Some(update) = ui_rx.recv().await {
            if output::write_update(&update, json_mode, &mut stdout).is_err() {
                debug!("stdout closed, dropping presentation events");
                break;
            }
        }
    });

    engine.run(tap_rx, cancel).await;
}

fn print_fee_table(args: &cli::FeeArgs) {
    use avanza::{tariff, CourtageClass};

    let current = CourtageClass::from(args.class.clone());
    let optimal = tariff::solve_optimal(args.amount, &current);

    for bp in tariff::schedule_for(&current) {
        let fee = tariff::calculate_fee(args.amount, &bp.class);
        let marker = if bp.class == optimal { "*" } else { " " };
        println!("{marker} {:<12} {fee}", bp.label);
    }
}

/// Register SIGINT and SIGTERM handlers that trigger the returned token.
fn setup_signal_handlers() -> CancellationToken {
    let cancel = CancellationToken::new();

    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("received SIGINT, shutting down");
        cancel_clone.cancel();
    });

    #[cfg(unix)]
    {
        let cancel_clone = cancel.clone();
        tokio::spawn(async move {
            let mut sig = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to register SIGTERM handler");
            sig.recv().await;
            info!("received SIGTERM, shutting down");
            cancel_clone.cancel();
        });
    }

    cancel
}
