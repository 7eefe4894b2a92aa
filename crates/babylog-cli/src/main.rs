use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "babylog", version, about = "Babylog CLI")]
struct Cli {
    /// Passcode for the app lock, when one is set
    #[arg(long, global = true)]
    passcode: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Breastfeeding timer
    Feed {
        #[command(subcommand)]
        action: commands::feed::FeedAction,
    },
    /// Sleep timer
    Sleep {
        #[command(subcommand)]
        action: commands::sleep::SleepAction,
    },
    /// Diaper changes
    Diaper {
        #[command(subcommand)]
        action: commands::diaper::DiaperAction,
    },
    /// Weight, height, head and temperature
    Growth {
        #[command(subcommand)]
        action: commands::growth::GrowthAction,
    },
    /// Baby profiles
    Baby {
        #[command(subcommand)]
        action: commands::baby::BabyAction,
    },
    /// Saved records
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Daily totals
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// App lock and passcode management
    Lock {
        #[command(subcommand)]
        action: commands::lock::LockAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("BABYLOG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let passcode = cli.passcode.as_deref();

    let result = match cli.command {
        Commands::Lock { action } => commands::lock::run(action, passcode),
        Commands::Config { action } => commands::config::run(action),
        data_command => commands::lock::require_access(passcode).and_then(|()| match data_command {
            Commands::Feed { action } => commands::feed::run(action),
            Commands::Sleep { action } => commands::sleep::run(action),
            Commands::Diaper { action } => commands::diaper::run(action),
            Commands::Growth { action } => commands::growth::run(action),
            Commands::Baby { action } => commands::baby::run(action),
            Commands::History { action } => commands::history::run(action),
            Commands::Stats { action } => commands::stats::run(action),
            Commands::Lock { .. } | Commands::Config { .. } => Ok(()),
        }),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
