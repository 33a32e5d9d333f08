use anyhow::Result;
use clap::Parser;
use pingrelay::configs::logging::LoggingConfig;
use pingrelay::log::logger::Logging;
use pingrelay_bench::args::Args;
use pingrelay_bench::benchmark::BenchmarkDriver;
use pingrelay_bench::client::GrpcPingClient;
use pingrelay_bench::report;
use pingrelay_bench::statistics::summary::BenchmarkSummary;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let logging_config = LoggingConfig {
        file_prefix: "pingrelay-bench.log".to_owned(),
        ..LoggingConfig::default()
    };
    let mut logging = Logging::new();
    logging.early_init()?;
    logging.late_init("pingrelay-bench", &logging_config)?;

    info!(
        "Benchmarking {} with {} concurrent calls...",
        args.server_address, args.concurrent_calls
    );
    let client = Arc::new(GrpcPingClient::connect_lazy(&args.server_address)?);
    let driver = BenchmarkDriver::new(
        client,
        args.concurrent_calls.get() as usize,
        &args.message_prefix,
    );
    let outcome = driver.run().await;

    info!("{}", BenchmarkSummary::from_outcome(&outcome));
    report::save_report(&outcome.table, &args.output)?;
    Ok(())
}
