use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use log::{debug, info, warn};
use qrx_core::{CONNECT_SCHEME, ROUND_SENTINEL, ROUND_TIMEOUT_MS};
use qrx_decoder::ChunkAssembler;
use qrx_host::{RecordingTransport, ReplaySource, SystemClock};
use qrx_session::{ScanSession, SessionConfig, SessionEvent};
use std::path::PathBuf;
use std::sync::mpsc::RecvTimeoutError;
use std::sync::{Arc, atomic::{AtomicBool, Ordering}};
use std::time::Duration;

/// Replay observed code strings through a scan session.
#[derive(Parser)]
struct Cli {
    /// Recorded observations, one per line. Reads stdin when omitted.
    #[arg(long)] input: Option<PathBuf>,
    #[arg(long, default_value_t = ROUND_TIMEOUT_MS)] timeout_ms: u64,
    #[arg(long, default_value = CONNECT_SCHEME)] scheme: String,
    #[arg(long, default_value = ROUND_SENTINEL)] sentinel: String,
    /// Write the payload of each completed round here (last round wins).
    #[arg(long)] out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    info!(">>> QRX SCAN: v0.2.0 (REPLAY CAPTURE) <<<");

    let source = match &cli.input {
        Some(path) => ReplaySource::open(path)?,
        None => ReplaySource::stdin(),
    };

    let config = SessionConfig {
        timeout_ms: cli.timeout_ms,
        connect_scheme: cli.scheme.clone(),
        round_sentinel: cli.sentinel.clone(),
    };
    let mut session = ScanSession::with_config(
        RecordingTransport::new(),
        ChunkAssembler::new(SystemClock::new()),
        config,
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        warn!("Signal received. Stopping...");
        r.store(false, Ordering::SeqCst);
    })?;

    let mut exhausted = false;
    while running.load(Ordering::SeqCst) {
        let observed = match source.next_timeout(Duration::from_millis(100)) {
            Ok(s) => s,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                exhausted = true;
                break;
            }
        };

        let event = session.handle(&observed);
        print_event(&event);

        if matches!(event, SessionEvent::Completed { .. }) {
            if let (Some(path), Some(payload)) = (&cli.out, session.decoder().payload()) {
                std::fs::write(path, payload)
                    .with_context(|| format!("cannot write payload to {}", path.display()))?;
                info!("Payload written to {}", path.display());
            }
        }
    }

    // A stdin reader interrupted by Ctrl-C is left to die with the process.
    if exhausted {
        let count = source.join()?;
        info!("Capture exhausted after {} observations", count);
    }

    let stats = session.stats();
    println!(
        "{} {} started, {} completed, {} timed out",
        "rounds:".bold(),
        stats.started,
        stats.completed.to_string().green(),
        stats.timed_out.to_string().red()
    );
    Ok(())
}

fn print_event(event: &SessionEvent) {
    let line = event.to_string();
    match event {
        SessionEvent::Ignored => debug!("ignored observation"),
        SessionEvent::Progress { .. } => println!("{}", line.cyan()),
        SessionEvent::ChunkRejected { error, .. } if error.is_chunk_fault() => println!("{}", line.yellow()),
        e if e.is_failure() => println!("{}", line.red().bold()),
        SessionEvent::Completed { .. } => println!("{}", line.green().bold()),
        _ => println!("{}", line),
    }
}
