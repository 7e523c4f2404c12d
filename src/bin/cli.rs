//! Gallery Grabber CLI
//!
//! Local execution entry point: one-shot discovery and archiving, or the
//! HTTP server with the `server` feature.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use gallery_grabber::{
    error::Result,
    models::Config,
    pipeline::{self, PipelineContext},
    services::JobTracker,
};

/// Gallery Grabber - discover and archive gallery images
#[derive(Parser, Debug)]
#[command(name = "gallery-grabber", version, about = "Discover and archive gallery images")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve every image URL of a gallery and print them as JSON
    Images {
        /// Gallery page URL
        gallery_url: String,

        /// Resolve only the first N viewer pages (0 = all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Download a gallery's images into a ZIP file
    Zip {
        /// Gallery page URL
        gallery_url: String,

        /// Output file (default: server.archive_filename from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Download only the first N images (0 = all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Serve the HTTP API
    #[cfg(feature = "server")]
    Serve {
        /// Listen address, overrides server.bind
        #[arg(long)]
        bind: Option<String>,
    },

    /// Validate configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Apply command-line overrides on top of the loaded configuration.
#[allow(unused_variables)]
fn apply_overrides(config: &mut Config, command: &Command) {
    match command {
        #[cfg(feature = "server")]
        Command::Serve { bind: Some(bind) } => config.server.bind = bind.clone(),
        _ => {}
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    log::debug!("Loaded configuration from {}", cli.config.display());

    apply_overrides(&mut config, &cli.command);

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    let ctx = PipelineContext::new(Arc::new(config), JobTracker::new())?;

    match cli.command {
        Command::Images { gallery_url, limit } => {
            let discovery = pipeline::run_discovery(&ctx, &gallery_url, limit).await?;
            println!("{}", serde_json::to_string_pretty(&discovery)?);
        }

        Command::Zip {
            gallery_url,
            output,
            limit,
        } => {
            let output =
                output.unwrap_or_else(|| PathBuf::from(&ctx.config.server.archive_filename));
            let archive = pipeline::run_archive(&ctx, &gallery_url, None, limit).await?;
            let written = archive.entries().len();
            let failed = archive.failed().len();

            tokio::fs::write(&output, archive.into_bytes()).await?;
            log::info!(
                "Wrote {} images to {} ({} failed)",
                written,
                output.display(),
                failed
            );
        }

        #[cfg(feature = "server")]
        Command::Serve { .. } => {
            gallery_grabber::server::serve(ctx).await?;
        }

        Command::Validate => {
            log::info!("✓ Config OK");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_flag_parses_on_both_commands() {
        let cli = Cli::try_parse_from(["gallery-grabber", "images", "https://imx.to/g/1", "-n", "3"])
            .unwrap();
        assert!(matches!(cli.command, Command::Images { limit: Some(3), .. }));

        let cli = Cli::try_parse_from([
            "gallery-grabber",
            "zip",
            "https://imx.to/g/1",
            "--limit",
            "5",
            "-o",
            "out.zip",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Zip { limit: Some(5), .. }));
    }

    #[test]
    fn test_limit_defaults_to_all() {
        let cli = Cli::try_parse_from(["gallery-grabber", "zip", "https://imx.to/g/1"]).unwrap();
        assert!(matches!(cli.command, Command::Zip { limit: None, .. }));
    }
}
