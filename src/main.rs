use anyhow::{anyhow, bail, Result};
use clap::Parser;
use dojo_review::{ContentId, DojoConfig, DojoOrchestrator, SimulationOptions};
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "dojo-review")]
#[command(about = "Record yourself against a training video and review both side by side")]
#[command(version)]
#[command(long_about = "Loads a catalog of annotated training videos, records the user \
against a reference video after a countdown, and plays the recording back stacked with the \
reference while following the active step. Runs either a scripted simulation or an \
interactive keyboard-driven session.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "dojo.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Dry run mode - load config and catalog only
    #[arg(long, help = "Load configuration and catalog, then exit")]
    dry_run: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Run the scripted record-and-review workflow for a content
    #[arg(long, value_name = "CONTENT_ID", conflicts_with = "content")]
    simulate: Option<u64>,

    /// Content for the interactive session (defaults to the first in the catalog)
    #[arg(long, value_name = "CONTENT_ID")]
    content: Option<u64>,

    /// Length the mock player reports for the reference video
    #[arg(long, value_name = "SECONDS", default_value_t = 10.0)]
    reference_seconds: f64,

    /// In a simulation, press back this many seconds into the recording
    #[arg(long, value_name = "SECONDS", requires = "simulate")]
    cancel_after: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print_default_config()?;
        return Ok(());
    }

    init_logging(&args)?;

    info!("Starting dojo-review v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    let config = match DojoConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    match config.validate() {
        Ok(()) if args.validate_config => {
            println!("✓ Configuration is valid");
            return Ok(());
        }
        Ok(()) => {}
        Err(e) => {
            error!("Configuration validation failed: {}", e);
            eprintln!("✗ Configuration validation failed: {}", e);
            std::process::exit(1);
        }
    }

    if !args.reference_seconds.is_finite() || args.reference_seconds <= 0.0 {
        bail!("--reference-seconds must be a positive number");
    }

    let mut orchestrator = DojoOrchestrator::new(config);
    orchestrator.set_keyboard_enabled(args.simulate.is_none() && !args.dry_run);

    orchestrator.initialize().await.map_err(|e| {
        error!("Failed to initialize: {}", e);
        e
    })?;

    if args.dry_run {
        let contents = orchestrator.store().content_ids().len();
        println!("✓ Dry run completed successfully - {} contents in catalog", contents);
        return Ok(());
    }

    if let Some(content_id) = args.simulate {
        let options = SimulationOptions {
            reference_duration: args.reference_seconds,
            cancel_after: cancel_delay(args.cancel_after)?,
        };
        let report = orchestrator
            .simulate(ContentId(content_id), &options)
            .await
            .map_err(|e| {
                error!("Simulation failed: {}", e);
                e
            })?;

        println!("Routes: {}", report.routes.join(" -> "));
        match &report.recorded_video {
            Some(video) => println!("Recording: {}", video.uri),
            None => println!("Recording: discarded"),
        }
        match &report.cached_path {
            Some(path) => println!("Cached video: {}", path.display()),
            None => println!("Cached video: unavailable"),
        }
        if report.reviewed {
            let visited: Vec<String> = report
                .active_steps
                .iter()
                .map(|index| (index + 1).to_string())
                .collect();
            println!("Steps followed: {}", visited.join(", "));
        }
        orchestrator.shutdown().await?;
        return Ok(());
    }

    let content_id = match args.content {
        Some(id) => ContentId(id),
        None => match orchestrator.store().content_ids().first() {
            Some(id) => *id,
            None => bail!("Catalog is empty; nothing to record against"),
        },
    };

    let exit_code = orchestrator
        .run(content_id, args.reference_seconds)
        .await
        .map_err(|e| {
            error!("Error during interactive session: {}", e);
            e
        })?;

    info!("dojo-review exited with code: {}", exit_code);
    std::process::exit(exit_code);
}

fn init_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dojo_review={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer().with_target(true).boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();

    Ok(())
}

fn cancel_delay(seconds: Option<f64>) -> Result<Option<Duration>> {
    seconds
        .map(|s| {
            Duration::try_from_secs_f64(s)
                .map_err(|e| anyhow!("--cancel-after must be a non-negative number of seconds: {}", e))
        })
        .transpose()
}

/// Print default configuration in TOML format
fn print_default_config() -> Result<()> {
    println!("# dojo-review configuration file");
    println!("# Every key is optional; environment overrides use DOJO_<SECTION>__<KEY>");
    println!();
    println!("{}", DojoConfig::default().to_toml()?);
    Ok(())
}
