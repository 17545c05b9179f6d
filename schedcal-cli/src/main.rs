mod commands;
mod prompt;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schedcal", version)]
#[command(about = "Pick talks from a conference schedule and add them to Google Calendar")]
struct Cli {
    /// Calendar to add events to ("primary" for your main calendar)
    #[arg(short, long)]
    calendar: Option<String>,

    /// Add every event without asking
    #[arg(short, long)]
    all: bool,

    /// OAuth access token for the Google Calendar API
    #[arg(long, env = "SCHEDCAL_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Schedule page to read talks from
    #[arg(long, conflicts_with = "file")]
    url: Option<String>,

    /// Read the schedule from a saved HTML file instead of fetching it
    #[arg(long)]
    file: Option<PathBuf>,

    /// Skip TLS certificate validation when fetching the schedule
    #[arg(long)]
    insecure: bool,

    /// Print what would be added without touching any calendar
    #[arg(long)]
    dry_run: bool,

    /// Use this config file instead of ~/.config/schedcal/config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    commands::port::run(commands::port::PortArgs {
        calendar: cli.calendar,
        take_all: cli.all,
        access_token: cli.access_token,
        url: cli.url,
        file: cli.file,
        insecure: cli.insecure,
        dry_run: cli.dry_run,
        config: cli.config,
    })
    .await
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn url_and_file_are_exclusive() {
        let result = Cli::try_parse_from([
            "schedcal",
            "--url",
            "https://example.com/schedule/",
            "--file",
            "schedule.html",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn short_flags() {
        let cli = Cli::try_parse_from(["schedcal", "-a", "-c", "primary", "-v"]).unwrap();
        assert!(cli.all);
        assert!(cli.verbose);
        assert_eq!(cli.calendar.as_deref(), Some("primary"));
        assert!(!cli.dry_run);
    }
}
