use distributed_life::broker::service::run_broker;
use distributed_life::config::{BrokerConfig, WorkerConfig};
use distributed_life::worker::service::run_worker;
use std::net::SocketAddr;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} broker --bind <addr:port>", program);
    eprintln!(
        "       {} worker --bind <addr:port> --broker <addr:port> [--advertise <addr:port>]",
        program
    );
    eprintln!("Example: {} broker --bind 127.0.0.1:8040", program);
    eprintln!(
        "Example: {} worker --bind 127.0.0.1:8050 --broker 127.0.0.1:8040",
        program
    );

    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let level = if std::env::var("GOL_DEBUG").is_ok() {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 4 {
        usage(&args[0]);
    }

    let mut bind_addr: Option<SocketAddr> = None;
    let mut broker_addr: Option<SocketAddr> = None;
    let mut advertise_addr: Option<SocketAddr> = None;

    let mut i = 2;
    while i < args.len() {
        match (args[i].as_str(), args.get(i + 1)) {
            ("--bind", Some(value)) => {
                bind_addr = Some(value.parse()?);
                i += 2;
            }
            ("--broker", Some(value)) => {
                broker_addr = Some(value.parse()?);
                i += 2;
            }
            ("--advertise", Some(value)) => {
                advertise_addr = Some(value.parse()?);
                i += 2;
            }
            (flag, _) => {
                tracing::warn!("Ignoring argument {}", flag);
                i += 1;
            }
        }
    }

    let Some(bind) = bind_addr else {
        usage(&args[0]);
    };

    match args[1].as_str() {
        "broker" => {
            let config = BrokerConfig::from_env(bind);
            tracing::info!(
                "Starting broker on {} (max attempts {}, call timeout {:?})",
                bind,
                config.max_attempts,
                config.call_timeout
            );
            run_broker(config).await
        }
        "worker" => {
            let Some(broker) = broker_addr else {
                usage(&args[0]);
            };
            let config = WorkerConfig::from_env(bind, broker, advertise_addr.unwrap_or(bind));
            tracing::info!("Starting worker on {} for broker {}", bind, broker);
            run_worker(config).await
        }
        _ => usage(&args[0]),
    }
}
