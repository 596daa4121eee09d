use anyhow::Context;
use taskd::cli::{Args, ConfigDiscovery, ConnectionArgs, ExecutionMode, ServerConfig};
use taskd::{TaskClient, TaskManager, TaskServer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mode = match args.mode() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match mode {
        ExecutionMode::Serve(connection) => {
            let config = load_config(connection)?;
            init_logging(&config);
            run_server(config).await
        }
        ExecutionMode::Client(connection) => {
            let config = load_config(connection)?;
            init_logging(&config);
            run_client(config).await
        }
        ExecutionMode::ShowConfig => {
            ConfigDiscovery::show_discovery_info();
            let config = ConfigDiscovery::discover_config()?;
            println!();
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn load_config(connection: ConnectionArgs) -> anyhow::Result<ServerConfig> {
    let config = ConfigDiscovery::load(connection.config.as_deref())
        .context("Failed to load configuration")?;
    Ok(config.with_overrides(connection.host, connection.port))
}

/// `RUST_LOG` wins over the configured filter
fn init_logging(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    info!("Starting task server");

    let manager = TaskManager::new();
    let server = TaskServer::bind(&config, manager.clone()).await?;
    let address = server.local_addr()?;
    println!("Servidor iniciado em {}", address);

    server
        .serve_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    let stats = manager.get_statistics().await;
    info!(
        "Server stopped with {} tasks ({} completed), next id {}",
        stats.total_tasks, stats.completed_tasks, stats.next_id
    );
    Ok(())
}

async fn run_client(config: ServerConfig) -> anyhow::Result<()> {
    let mut client = TaskClient::connect(&config.address()).await?;
    client.interact().await?;

    println!("Goodbye!");
    Ok(())
}
