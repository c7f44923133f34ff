use clap::{Parser, Subcommand};
use flood_map::{config, pipeline, render, server};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the flood map page from the configured tables and boundaries
    Generate {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Rebuild the document and serve it alongside the generated page
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate { config } => {
            println!("Generating map with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;

            // 1. Load inputs
            let tables = pipeline::load_tables(&app_config)?;
            let features = pipeline::load_boundaries(&app_config)?;

            // 2. Normalize, build layers, compose
            let document = pipeline::build_document(&app_config, tables, features)?;

            // 3. Render
            render::write_document(&app_config.output, &document)?;

            println!("Map written to {:?}", app_config.output.html);
        }
        Commands::Serve { config } => {
            println!("Serving map with config: {:?}", config);
            let app_config = config::AppConfig::load_from_file(config)?;

            let tables = pipeline::load_tables(&app_config)?;
            let features = pipeline::load_boundaries(&app_config)?;
            let document = pipeline::build_document(&app_config, tables, features)?;

            server::start_server(app_config, document).await?;
        }
    }

    Ok(())
}
