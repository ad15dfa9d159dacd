//! Flashgate CLI - inspect a model and hardware set and print worker launch flags

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod style;

use error::CliError;
use flashgate_core::{AcceleratorInfo, FlashgateError, LaunchConfig};
use style::Theme;

#[derive(Debug, Parser)]
#[command(
    name = "flashgate",
    about = "Decide flash attention and KV cache flags for an inference worker",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    /// Path to a config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log policy decisions at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Decide flash attention support and print the worker launch parameters
    Plan {
        /// JSON dump of the model's header metadata
        #[arg(short, long)]
        metadata: PathBuf,

        /// Detected accelerator as LIBRARY[:MAJOR], repeat for each device
        #[arg(long = "gpu", value_name = "LIBRARY[:MAJOR]", value_parser = parse_gpu)]
        gpus: Vec<AcceleratorInfo>,

        /// Request flash attention
        #[arg(long, overrides_with = "no_flash_attn")]
        flash_attn: bool,

        /// Do not request flash attention, even if configured
        #[arg(long, overrides_with = "flash_attn")]
        no_flash_attn: bool,

        /// Requested KV cache type (f32, f16, q8_0, q5_1, q5_0, iq4_nl, q4_1, q4_0)
        #[arg(long)]
        kv_cache_type: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Base worker parameters, passed after `--`
        #[arg(last = true)]
        base_params: Vec<String>,
    },
    /// List the supported KV cache types
    CacheTypes {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Plain,
}

/// Parses a `--gpu` value, accepting any letter case and `mps` for `metal`.
///
/// The core matches library names exactly, so user spellings are normalized
/// here before they reach it.
fn parse_gpu(value: &str) -> Result<AcceleratorInfo, FlashgateError> {
    let (library, major) = match value.split_once(':') {
        Some((library, major)) => (library, Some(major)),
        None => (value, None),
    };

    let library = match library.trim().to_ascii_lowercase().as_str() {
        "mps" => "metal".to_string(),
        other => other.to_string(),
    };

    match major {
        Some(major) => format!("{library}:{major}").parse(),
        None => library.parse(),
    }
}

fn flash_attn_override(flash_attn: bool, no_flash_attn: bool) -> Option<bool> {
    if flash_attn {
        Some(true)
    } else if no_flash_attn {
        Some(false)
    } else {
        None
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "flashgate=debug,flashgate_core=debug"
    } else {
        "flashgate=warn,flashgate_core=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let theme = if cli.no_color {
        console::set_colors_enabled(false);
        Theme::no_color()
    } else {
        Theme::default()
    };

    match cli.command {
        Commands::Plan {
            metadata,
            gpus,
            flash_attn,
            no_flash_attn,
            kv_cache_type,
            format,
            base_params,
        } => {
            let config = LaunchConfig::load(cli.config.as_deref())
                .map_err(CliError::ConfigError)?
                .with_env_overrides();
            debug!(?config, "Resolved launch configuration");

            commands::plan::execute(
                commands::plan::PlanArgs {
                    metadata,
                    gpus,
                    flash_attn: flash_attn_override(flash_attn, no_flash_attn),
                    kv_cache_type,
                    base_params,
                    format,
                },
                config,
                &theme,
            )?;
        }
        Commands::CacheTypes { format } => commands::cache_types::execute(format)?,
    }

    Ok(())
}
