mod config;

use anyhow::bail;
use clap::{Parser, ValueEnum};

use barrage_backends::register_all;
use barrage_core::ServiceRegistry;

#[derive(Parser)]
#[command(name = "barrage", about = "Wave-based load generation harness")]
struct Cli {
    /// Backend to drive
    #[arg(long, default_value = "redis")]
    service: String,

    /// Operation to perform against the backend
    #[arg(long, value_enum, default_value_t = Mode::Execute)]
    mode: Mode,

    /// Total operations for this run (overrides BARRAGE_TOTAL_OPS)
    #[arg(long)]
    total_ops: Option<u64>,

    /// Max operations in flight (overrides BARRAGE_CONCURRENCY_LIMIT)
    #[arg(long)]
    concurrency: Option<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Run a full load campaign and print the summary
    Execute,
    /// Single bounded health probe
    Ping,
    /// Print the backend's env-var surface
    Help,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let params = config::resolve_run_params(cli.total_ops, cli.concurrency)?;

    let mut registry = ServiceRegistry::new();
    register_all(&mut registry, &params)?;

    let Some(service) = registry.get(&cli.service) else {
        let mut names = registry.list();
        names.sort_unstable();
        bail!(
            "unknown service {:?} (available: {})",
            cli.service,
            names.join(", ")
        );
    };

    match cli.mode {
        Mode::Ping => match service.ping().await {
            // A failed probe is an answer, not a crash: echo and exit clean.
            Ok(ack) => println!("{ack}"),
            Err(error) => println!("{error}"),
        },
        Mode::Execute => {
            let summary = service.execute().await?;
            println!("\n{summary}");
        }
        Mode::Help => {
            println!("{}", service.help());
        }
    }

    Ok(())
}
