use crate::{
    conn::{ConnectionPinger, MssqlConnectionPinger},
    error::CliError,
    shutdown::{ExitCode, ShutdownCoordinator},
};
use clap::Parser;
use commands::Commands;
use connectors::sql::base::{adapter::SqlExecutor, requests::ReadQuery};
use engine_config::settings::{Settings, validated::ValidatedSettings};
use engine_processing::{
    consumer::{DataConsumer, upsert::UpsertPipeline},
    error::PipelineError,
};
use model::{events::data::DataEvent, pagination::offset::Offset};
use planner::query::dialect::SqlServer;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod conn;
mod error;
mod output;
mod shutdown;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Parser)]
#[command(name = "mssql-dest", version = "0.1.0", about = "SQL Server destination tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    // Initialize logger
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let shutdown = ShutdownCoordinator::new(CancellationToken::new());
    shutdown.register_handlers();

    let code = match run(cli.command, &shutdown).await {
        Ok(()) => ExitCode::Success,
        Err(CliError::ShutdownRequested) => ExitCode::ShutdownRequested,
        Err(e) => {
            error!("{e}");
            ExitCode::GeneralError
        }
    };
    std::process::exit(code.as_i32());
}

async fn run(command: Commands, shutdown: &ShutdownCoordinator) -> Result<(), CliError> {
    match command {
        Commands::TestConn { config } => {
            let settings = load_settings(&config)?;
            let pinger = MssqlConnectionPinger {
                options: settings.connection,
            };
            let version = pinger.ping().await?;
            println!("{version}");
        }
        Commands::Load {
            config,
            events,
            output,
        } => {
            let settings = load_settings(&config)?;
            let events = load_events(&events).await?;
            load(settings, events, output, shutdown).await?;
        }
        Commands::ReadQuery {
            config,
            offset,
            execute,
        } => {
            let settings = load_settings(&config)?;
            let offset = match offset {
                Some(path) => Some(load_offset(&path).await?),
                None => None,
            };

            let query = ReadQuery::new(settings.destination.table.clone(), offset.as_ref())?
                .with_batch_size(settings.batch_size);
            println!("{}", query.statement().to_sql(&SqlServer));

            if execute {
                let adapter = conn::connect(&settings.connection, &settings.retry).await?;
                let batches = adapter.fetch_batches(&query).await?;
                output::print_batches(&batches)?;
            }
        }
    }

    Ok(())
}

fn load_settings(path: &str) -> Result<ValidatedSettings, CliError> {
    let settings = Settings::from_file(path)?;
    Ok(settings.validate()?)
}

async fn load_events(path: &str) -> Result<Vec<DataEvent>, CliError> {
    let text = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&text).map_err(|source| CliError::Deserialize {
        what: "events",
        source,
    })
}

async fn load_offset(path: &str) -> Result<Offset, CliError> {
    let text = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&text).map_err(|source| CliError::Deserialize {
        what: "offset",
        source,
    })
}

/// Streams `events` through a write session. Committed offsets are written
/// as they are acknowledged; a shutdown signal fails the session at the next
/// event so staging is still cleaned up.
async fn load(
    settings: ValidatedSettings,
    events: Vec<DataEvent>,
    output: Option<String>,
    shutdown: &ShutdownCoordinator,
) -> Result<(), CliError> {
    info!(
        path = %settings.destination.path,
        mode = %settings.mode,
        events = events.len(),
        "Starting load"
    );

    let adapter = conn::connect(&settings.connection, &settings.retry).await?;
    let executor: Arc<dyn SqlExecutor> = Arc::new(adapter);

    let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (offset_tx, mut offset_rx) = mpsc::channel::<Offset>(CHANNEL_CAPACITY);

    let mut pipeline = UpsertPipeline::start(
        executor,
        Arc::new(settings.destination),
        settings.mode,
        settings.retry,
        &settings.staging_prefix,
        event_rx,
        offset_tx,
    )
    .await?;

    let cancel = shutdown.cancel_token();
    let feeder = tokio::spawn(async move {
        for event in events {
            let item = if cancel.is_cancelled() {
                Err(PipelineError::Upstream("shutdown requested".to_string()))
            } else {
                Ok(event)
            };
            let stop = item.is_err();
            if event_tx.send(item).await.is_err() || stop {
                break;
            }
        }
    });

    let writer = tokio::spawn(async move {
        match output {
            Some(path) => {
                let mut file = tokio::fs::File::create(path).await?;
                while let Some(offset) = offset_rx.recv().await {
                    output::write_offset(&mut file, &offset).await?;
                }
            }
            None => {
                let mut stdout = tokio::io::stdout();
                while let Some(offset) = offset_rx.recv().await {
                    output::write_offset(&mut stdout, &offset).await?;
                }
            }
        }
        Ok::<_, CliError>(())
    });

    let outcome = pipeline.run().await;
    // Closes the offset channel so the writer task can finish.
    drop(pipeline);

    feeder
        .await
        .map_err(|e| CliError::Unexpected(format!("event feeder panicked: {e}")))?;
    writer
        .await
        .map_err(|e| CliError::Unexpected(format!("offset writer panicked: {e}")))??;

    if shutdown.is_shutdown_requested() {
        return Err(CliError::ShutdownRequested);
    }

    let report = outcome?;
    output::print_report(&report);
    Ok(())
}
