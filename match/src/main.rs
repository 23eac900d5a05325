use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc::UnboundedReceiver;

use spot_match::config::RuntimeConfig;
use spot_match::engine::matchengine::MatchEngine;
use spot_match::engine::sink::{event_sink, OutboundEvent, OutboundPublisher};
use spot_match::engine::spot::{EngineRegistry, OrderProcessor};
use spot_match::server;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Runtime config file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Newline-delimited JSON commands, stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Do not start the metrics endpoint
    #[arg(long)]
    no_metrics: bool,

    /// Write outbound events to the log instead of stdout
    #[arg(long)]
    log_events: bool,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                log::error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn print_events(mut rx: UnboundedReceiver<OutboundEvent>) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();
    while let Some(event) = rx.recv().await {
        let mut line = serde_json::to_vec(&event)?;
        line.push(b'\n');
        stdout.write_all(&line).await?;
    }
    stdout.flush().await?;
    Ok(())
}

async fn feed<R>(engine: &MatchEngine, reader: R) -> anyhow::Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut count = 0;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        count += 1;
        if let Err(e) = engine.on_message(line.as_bytes()) {
            log::warn!("command {} rejected: {}", count, e);
        }
    }
    Ok(count)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::try_init().unwrap_or_default();
    let args = Args::parse();

    let config = RuntimeConfig::from_toml(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if !args.no_metrics {
        server::serve_metrics(&config.metrics_addr)?;
    }

    let (sink, rx) = event_sink(args.log_events);
    let printer = rx.map(|rx| tokio::spawn(print_events(rx)));
    let publisher = OutboundPublisher::new(sink, config.max_trade_batch);
    let registry = Arc::new(EngineRegistry::with_config(&config));
    let engine = MatchEngine::new(registry, OrderProcessor::new(publisher));

    let fed = async {
        match &args.input {
            Some(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("opening {}", path.display()))?;
                feed(&engine, BufReader::new(file)).await
            }
            None => feed(&engine, BufReader::new(tokio::io::stdin())).await,
        }
    };

    tokio::select! {
        result = fed => {
            let count = result?;
            log::info!("input exhausted after {} commands", count);
        }
        _ = shutdown_signal() => {
            log::info!("shutdown signal received");
        }
    }

    // closes the channel so the printer drains and exits
    drop(engine);
    if let Some(printer) = printer {
        printer.await??;
    }
    log::info!("server stop");
    Ok(())
}
