mod app;
mod commands;
mod input;
mod local_store;
mod prompt;
mod reminders;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::commands::FieldArgs;

#[derive(Parser)]
#[command(name = "foodie")]
#[command(about = "Plan restaurant meet-ups and get reminded when they start")]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a meet-up. Missing fields are asked for.
    New {
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Change an upcoming meet-up
    Edit {
        /// Meet-up id (or a unique prefix of it)
        id: String,

        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a meet-up after confirming
    Delete {
        /// Meet-up id (or a unique prefix of it)
        id: String,

        /// Don't ask for confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Show upcoming and past meet-ups
    List,
    /// Follow meet-ups live and deliver reminders when they are due
    Watch,
    /// Show config and data paths
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let app = App::load()?;

    match cli.command {
        Commands::New { fields } => commands::new::run(&app, fields).await,
        Commands::Edit { id, fields } => commands::edit::run(&app, &id, fields).await,
        Commands::Delete { id, force } => commands::delete::run(&app, &id, force).await,
        Commands::List => commands::list::run(&app).await,
        Commands::Watch => commands::watch::run(&app).await,
        Commands::Config => commands::config::run(&app),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
