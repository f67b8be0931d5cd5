use clap::{Parser, Subcommand};
use dq_dashboard::Result;
use dq_dashboard::commands::{check, describe, query, serve};
use dq_dashboard::config::{run_interactive_config, show_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dq-dashboard")]
#[command(about = "A data quality dashboard for a SQL warehouse")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure warehouse and embedding settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Start the dashboard web server
    Serve {
        /// Port to listen on, overrides the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Verify connectivity to the warehouse and the embedding server
    Check,
    /// Generate an AI description of a table's columns
    Describe {
        /// Name of the table to describe
        table: String,
        /// Write the description to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run an ad-hoc SQL statement against the warehouse
    Query {
        /// SQL statement to execute
        sql: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Serve { port } => {
            serve(port).await?;
        }
        Commands::Check => {
            check()?;
        }
        Commands::Describe { table, output } => {
            describe(&table, output.as_deref())?;
        }
        Commands::Query { sql } => {
            query(&sql)?;
        }
    }

    Ok(())
}
