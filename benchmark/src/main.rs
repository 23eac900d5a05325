use clap::Parser;
use hdrhistogram::Histogram;
use rand::Rng;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use spot_match::engine::entry::{Order, OrderSide};
use spot_match::engine::sink::{EventSink, OutboundEvent, OutboundPublisher};
use spot_match::engine::spot::{EngineRegistry, OrderProcessor};
use spot_match::SinkError;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of symbols, each driven by its own thread
    #[arg(short, long, default_value = "1")]
    concurrency: usize,

    /// Duration of the benchmark in seconds
    #[arg(short, long, default_value = "10")]
    duration: u64,

    /// Share of market orders, in percent
    #[arg(short, long, default_value = "10")]
    market_pct: u32,

    /// Trade batch size handed to the sink
    #[arg(short, long, default_value = "1000")]
    batch: usize,
}

/// Drops every event; only the matching cost is measured
struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: OutboundEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

struct Stats {
    histogram: Histogram<u64>,
    orders: u64,
    trades: u64,
}

fn random_order(rng: &mut impl Rng, symbol: &str, seq: u64, market_pct: u32) -> Order {
    let side = if rng.gen_bool(0.5) {
        OrderSide::Buy
    } else {
        OrderSide::Sell
    };
    let amount = Decimal::new(rng.gen_range(1..=1000), 3);
    let no = seq.to_string();
    let user = rng.gen::<u64>();
    if rng.gen_range(0..100) < market_pct {
        let amount = match side {
            OrderSide::Buy => amount * Decimal::from(50_000),
            OrderSide::Sell => amount,
        };
        Order::market(no, user, symbol, side, amount)
    } else {
        let price = Decimal::new(rng.gen_range(4_990_000..=5_010_000), 2);
        Order::limit(no, user, symbol, side, price, amount)
    }
}

fn drive(
    registry: Arc<EngineRegistry>,
    processor: OrderProcessor,
    symbol: String,
    deadline: Instant,
    market_pct: u32,
) -> anyhow::Result<Stats> {
    let engine = registry.get_engine(&symbol);
    let mut rng = rand::thread_rng();
    let mut stats = Stats {
        histogram: Histogram::<u64>::new(3)?,
        orders: 0,
        trades: 0,
    };
    while Instant::now() < deadline {
        let order = random_order(&mut rng, &symbol, stats.orders, market_pct);
        let start = Instant::now();
        let outcome = processor.place_order(&engine, order);
        stats.histogram.record(start.elapsed().as_nanos() as u64)?;
        stats.orders += 1;
        stats.trades += outcome.trades().len() as u64;
    }
    Ok(stats)
}

fn main() -> anyhow::Result<()> {
    env_logger::try_init().unwrap_or_default();
    let args = Args::parse();

    let registry = Arc::new(EngineRegistry::new());
    let processor = OrderProcessor::new(OutboundPublisher::new(Arc::new(NullSink), args.batch));
    let deadline = Instant::now() + Duration::from_secs(args.duration);

    println!(
        "Starting benchmark with {} symbols for {}s, market orders {}%",
        args.concurrency, args.duration, args.market_pct
    );

    let handles: Vec<_> = (0..args.concurrency)
        .map(|i| {
            let registry = registry.clone();
            let processor = processor.clone();
            let symbol = format!("SYM{}USDT", i);
            let market_pct = args.market_pct;
            thread::spawn(move || drive(registry, processor, symbol, deadline, market_pct))
        })
        .collect();

    let mut histogram = Histogram::<u64>::new(3)?;
    let mut orders = 0;
    let mut trades = 0;
    for handle in handles {
        let stats = handle
            .join()
            .map_err(|_| anyhow::anyhow!("benchmark thread panicked"))??;
        histogram.add(&stats.histogram)?;
        orders += stats.orders;
        trades += stats.trades;
    }

    for symbol in registry.symbols() {
        if let Some(engine) = registry.engine(&symbol) {
            log::info!(
                "{} best bid {:?} best ask {:?}",
                symbol,
                engine.book().get_best_bid(),
                engine.book().get_best_ask()
            );
        }
    }

    println!("\nBenchmark Results:");
    println!("Total Orders: {}", orders);
    println!("Total Trades: {}", trades);
    println!("Average TPS: {:.2}", orders as f64 / args.duration.max(1) as f64);
    println!("\nLatency Distribution (nanoseconds):");
    println!("p50: {}", histogram.value_at_percentile(50.0));
    println!("p90: {}", histogram.value_at_percentile(90.0));
    println!("p95: {}", histogram.value_at_percentile(95.0));
    println!("p99: {}", histogram.value_at_percentile(99.0));
    println!("p99.9: {}", histogram.value_at_percentile(99.9));

    Ok(())
}
