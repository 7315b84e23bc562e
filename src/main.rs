use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use yt_pdf::cli::{Cli, Commands, OutputFormat};
use yt_pdf::config::{Config, API_KEY_ENV};
use yt_pdf::pipeline::ConversionPipeline;
use yt_pdf::{output, utils};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    let mut config = Config::load(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Convert {
            url,
            format,
            keep_audio,
        } => {
            if keep_audio {
                config.storage.keep_audio = true;
            }
            config.validate()?;

            let missing_deps = utils::check_dependencies(&config.pdf.engine).await;
            if !missing_deps.is_empty() {
                eprintln!("⚠️  Dependency check warnings:");
                for dep in missing_deps {
                    eprintln!("   • {}", dep);
                }
                eprintln!("   (Continuing anyway - tools may be available)");
            }

            let pipeline = ConversionPipeline::from_config(&config)?;

            let progress = if cli.quiet || format == OutputFormat::Json {
                ProgressBar::hidden()
            } else {
                ProgressBar::new_spinner()
            };
            progress.set_style(
                ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
            );
            progress.set_message(format!("Converting {}", url));
            progress.enable_steady_tick(Duration::from_millis(120));

            let result = pipeline.convert(&url).await;
            progress.finish_and_clear();

            let response = output::respond(result);
            output::print_to_console(&response, &format)?;

            let code = response.exit_code();
            if code != 0 {
                std::process::exit(code);
            }
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                let path = match &cli.config {
                    Some(path) => path.clone(),
                    None => Config::config_path()?,
                };
                println!("Configuration file: {}", path.display());
                println!("Audio directory: {}", config.audio_dir().display());
                println!("PDF directory: {}", config.pdf_dir().display());
                if config.openai.api_key.is_empty() {
                    println!(
                        "{} set {} or openai.api_key in the configuration file",
                        style("OpenAI API key missing:").yellow(),
                        API_KEY_ENV
                    );
                }
            }
        }
        Commands::Check => {
            let missing_deps = utils::check_dependencies(&config.pdf.engine).await;
            if missing_deps.is_empty() {
                println!("{}", style("All external tools are available").green());
            } else {
                println!("{}", style("Missing external tools:").red().bold());
                for dep in &missing_deps {
                    println!("  • {}", dep);
                }
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, json_logs: bool) {
    let default_level = if verbose { "yt_pdf=debug" } else { "yt_pdf=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into());

    // Logs go to stderr so stdout carries only the conversion result
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
