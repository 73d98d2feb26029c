use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use call_shell::config::{self, env, ShellConfig, Variant};
use call_shell::http::ShellServer;
use call_shell::lifecycle::{signals, Shutdown};
use call_shell::observability::{logging, metrics};
use call_shell::routing::{Params, Router};

#[derive(Parser)]
#[command(name = "call-shell", version)]
#[command(about = "Route table and configuration host for the call front end", long_about = None)]
struct Cli {
    /// Shell configuration file (TOML).
    #[arg(short, long, env = "CALL_SHELL_CONFIG")]
    config: Option<PathBuf>,

    /// Replace the configured router with a known deployment variant.
    #[arg(long)]
    variant: Option<Variant>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the shell host
    Serve {
        /// Override listener.bind_address
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Resolve a route location (or a full href with --href)
    Resolve {
        location: String,
        #[arg(long)]
        href: bool,
    },
    /// Print the href for a named route
    Href {
        name: String,
        /// Route parameter as key=value
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Print the route table
    Routes,
    /// Print the call configuration read from the environment
    Env,
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", s))
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut shell_config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => ShellConfig::default(),
    };
    if let Some(variant) = cli.variant {
        shell_config.router = variant.router_config();
    }

    logging::init_logging(&shell_config.observability);
    tracing::info!(
        config = ?cli.config,
        variant = ?cli.variant,
        "call-shell v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let router = Router::new(shell_config.router.clone(), env::global())?;

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                shell_config.listener.bind_address = bind;
            }
            serve(shell_config, router).await?;
        }
        Commands::Resolve { location, href } => {
            let location = if href {
                router
                    .history_base()
                    .route_location(&location)
                    .ok_or_else(|| format!("unparsable href '{}'", location))?
            } else {
                location
            };
            let state = router.resolve_state(&location);
            let output = serde_json::json!({
                "state": state,
                "view": router.activate(&state),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            if state.is_not_found() {
                return Ok(ExitCode::from(2));
            }
        }
        Commands::Href { name, params } => {
            let params: Params = params.into_iter().collect();
            println!("{}", router.href_for(&name, &params)?);
        }
        Commands::Routes => {
            for entry in router.table().entries() {
                println!("{:<12} {:<20} {}", entry.name, entry.pattern, entry.view);
            }
        }
        Commands::Env => {
            let config = router.call_config().redacted();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn serve(config: ShellConfig, router: Router) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(signals::shutdown_on_signal(shutdown));

    let server = ShellServer::new(config, Arc::new(router))?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
