//! Pitch Coach Command Line Interface
//!
//! Sings along with a reference track: captures the microphone, streams it
//! to the pitch analyzer and reports where the performance went off pitch.

mod render;

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use pitchcoach_engine::capture::{list_input_devices, CpalSource};
use pitchcoach_engine::recording::{default_recordings_dir, generate_recording_filename};
use pitchcoach_engine::reference::{self, ReferenceSource};
use pitchcoach_engine::{EngineConfig, PerformanceSession};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pitchcoach")]
#[command(version)]
#[command(about = "Real-time pitch feedback against a reference recording", long_about = None)]
struct Cli {
    /// Output format
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Increase verbosity
    #[arg(short, long)]
    verbose: bool,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List available input devices
    #[command(alias = "ls")]
    Devices,

    /// Load a reference track and summarize it
    Reference {
        /// URL or path of the reference pitch JSON
        #[arg(short, long)]
        source: Option<String>,
    },

    /// Sing one performance against the reference track
    Perform {
        /// URL or path of the reference pitch JSON
        #[arg(short, long)]
        source: Option<String>,

        /// Analyzer WebSocket URL
        #[arg(long)]
        server: Option<String>,

        /// Input device name (use 'devices' to list them)
        #[arg(short, long)]
        device: Option<String>,

        /// Save the take as WAV, optionally to the given path
        #[arg(long, num_args = 0..=1, value_name = "PATH")]
        record: Option<Option<PathBuf>>,

        /// Write the session report as JSON
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if matches!(cli.command, Commands::Version) {
        println!("pitchcoach {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load_from(path)?,
        None => EngineConfig::load(),
    };

    match cli.command {
        Commands::Devices => {
            let devices = list_input_devices()?;
            if matches!(cli.format, OutputFormat::Json) {
                println!("{}", serde_json::to_string_pretty(&devices)?);
            } else if devices.is_empty() {
                println!("No input devices found");
            } else {
                println!(
                    "{} {} found:\n",
                    devices.len().to_string().green().bold(),
                    if devices.len() == 1 { "device" } else { "devices" }
                );
                for device in devices {
                    let badge = if device.is_default {
                        "[default]".cyan()
                    } else {
                        "[input]".normal()
                    };
                    println!("  {} {}", badge, device.name);
                    if let (Some(rate), Some(channels)) = (device.sample_rate, device.channels) {
                        println!("    {}", format!("{} Hz, {} ch", rate, channels).dimmed());
                    }
                }
            }
        }

        Commands::Reference { source } => {
            let source = reference_source(source, &config)?;
            let samples = reference::load(&source).await?;
            let (voiced, range) = reference::summarize(&samples);
            let duration = samples.last().map_or(0.0, |s| s.timestamp);

            if matches!(cli.format, OutputFormat::Json) {
                let summary = serde_json::json!({
                    "source": source.to_string(),
                    "samples": samples.len(),
                    "voiced": voiced,
                    "duration": duration,
                    "min_pitch": range.map(|r| r.0),
                    "max_pitch": range.map(|r| r.1),
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Reference: {}", source.to_string().dimmed());
                println!("  Length: {}", render::format_time(duration));
                println!("  Samples: {} ({} voiced)", samples.len(), voiced);
                if let Some((lo, hi)) = range {
                    println!("  Range: {:.1} - {:.1} Hz", lo, hi);
                }
            }
        }

        Commands::Perform {
            source,
            server,
            device,
            record,
            report,
        } => {
            if let Some(server) = server {
                config.server_url = server;
            }
            if device.is_some() {
                config.capture.device = device;
            }

            let source = reference_source(source, &config)?;
            let samples = reference::load(&source)
                .await
                .with_context(|| format!("Failed to load reference track from {}", source))?;

            let capture = CpalSource::new(&config.capture);
            let mut session = PerformanceSession::new(config, Box::new(capture));
            session.load_reference(samples)?;
            if record.is_some() {
                session.enable_recording();
            }

            let printer = tokio::spawn(render::print_updates(
                session.subscribe(),
                cli.format,
                cli.quiet,
            ));

            session.start_performance().await?;

            // First Ctrl+C finishes the performance, a second one aborts it
            let control = session.control();
            tokio::spawn(async move {
                while tokio::signal::ctrl_c().await.is_ok() {
                    control.stop();
                }
            });

            let status = session.run().await;
            info!("Session ended: {}", status.label());

            let summary = session.report();
            let take = record.map(|path| {
                path.unwrap_or_else(|| default_recordings_dir().join(generate_recording_filename()))
            });
            if let (Some(path), Some(recorder)) = (take, session.recording()) {
                if recorder.is_empty() {
                    println!("{}", "Nothing recorded".yellow());
                } else {
                    recorder.save(&path)?;
                    if !cli.quiet {
                        println!("Take saved to {}", path.display().to_string().cyan());
                    }
                }
            }

            drop(session);
            let _ = printer.await;

            if let Some(path) = report {
                std::fs::write(&path, serde_json::to_string_pretty(&summary)?)
                    .with_context(|| format!("Failed to write report to {}", path.display()))?;
                info!("Report written to {}", path.display());
            }
            render::print_report(&summary, cli.format)?;
        }

        Commands::Version => unreachable!(),
    }

    Ok(())
}

fn reference_source(source: Option<String>, config: &EngineConfig) -> anyhow::Result<ReferenceSource> {
    source
        .or_else(|| config.reference.clone())
        .map(|s| ReferenceSource::parse(&s))
        .ok_or_else(|| anyhow!("No reference track given. Use --source or set 'reference' in the config file."))
}
