use anyhow::Result;
use clap::Parser;
use ideaval_cli::serve::{AppState, run_serve};
use ideaval_cli::{AppConfig, Cli, Commands, calendar, history, otlp_endpoint, validate};
use std::sync::Arc;

const SERVICE_NAME: &str = "ideaval";

fn init_logging(cli: &Cli, config: Option<&AppConfig>) {
    let endpoint = otlp_endpoint(config, |key| std::env::var(key).ok());
    let result = match endpoint {
        Some(endpoint) => ideaval_telemetry::init_with_otlp(SERVICE_NAME, &endpoint),
        None => ideaval_telemetry::init_telemetry(SERVICE_NAME, cli.log_format.into()),
    };
    if let Err(e) = result {
        eprintln!("Failed to initialize telemetry: {}", e);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let loaded = AppConfig::load(cli.config.as_deref());
    init_logging(&cli, loaded.as_ref().ok());
    let config = match loaded {
        Ok(config) => config.with_model(cli.model.clone()),
        Err(e) => {
            let error = format!("{e:#}");
            tracing::error!(%error, "failed to load configuration");
            ideaval_telemetry::shutdown_telemetry();
            return Err(e);
        }
    };

    let result = match cli.command {
        Commands::Validate { idea, output, no_save } => {
            validate::run(&config, idea, output, no_save).await
        }
        Commands::History { limit } => history::run(&config, limit).await,
        Commands::Serve { port } => {
            let state = AppState {
                pipeline: Arc::new(config.pipeline()?),
                store: config.run_store().await?,
            };
            run_serve(state, port).await
        }
        Commands::Calendar { action } => calendar::run(&config, action).await,
    };

    ideaval_telemetry::shutdown_telemetry();
    result
}
