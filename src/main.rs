//! CLI entry point for the Cura terminal client.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::Colorize;
use dotenvy::dotenv;

mod client;
mod config;
mod logging;
mod models;
mod notifications;
mod palette;
mod session;
mod tui;
mod utils;

use crate::client::ApiClient;
use crate::config::Config;

fn tinted(text: &str, rgb: (u8, u8, u8)) -> colored::ColoredString {
    text.truecolor(rgb.0, rgb.1, rgb.2)
}

#[derive(Parser, Debug)]
#[command(
    name = "cura",
    author,
    version,
    about = "Cura - terminal client for the Cura telehealth scheduling platform",
    long_about = "Cura terminal client\n\n\
    Schedule grid with drag-to-block time selection, appointment lists,\n\
    a video-meeting companion pane, administration, and reports.\n\n\
    Run 'cura' with no arguments to open the interactive client."
)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Config profile name
    #[arg(long)]
    profile: Option<String>,

    /// Calendar to show on startup (ID or exact name)
    #[arg(long)]
    calendar: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Run connectivity diagnostics and check configuration
    Doctor,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Print upcoming appointments (non-interactive, for scripting)
    Appointments {
        /// Maximum number of appointments to display
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv();
    let cli = Cli::parse();
    logging::set_verbose(cli.verbose);

    let mut config = Config::load(cli.config.clone(), cli.profile.as_deref())?;
    if let Some(calendar) = cli.calendar.clone() {
        config.default_calendar = Some(calendar);
    }

    match cli.command {
        Some(Commands::Doctor) => run_doctor(&config).await,
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Appointments { limit }) => print_appointments(&config, limit).await,
        None => tui::run_tui(&config).await,
    }
}

async fn run_doctor(config: &Config) -> Result<()> {
    println!("{}", "Cura doctor".bold());
    println!("  base URL:   {}", config.api_base_url());
    println!(
        "  api token:  {}",
        if config::has_api_token(config) {
            tinted("configured", palette::GREEN_RGB)
        } else {
            tinted(
                "missing (sign in via the TUI or set CURA_API_TOKEN)",
                palette::YELLOW_RGB,
            )
        }
    );
    let retry = config.retry_policy();
    println!(
        "  retry:      enabled={} max_retries={}",
        retry.enabled, retry.max_retries
    );
    println!(
        "  notify:     enabled={} reconnect_delay={:.1}s",
        config.notifications_enabled(),
        config.notification_reconnect_delay().as_secs_f64()
    );

    let base_url = config.api_base_url();
    let probe = tokio::task::spawn_blocking(move || client::test_connection_sync(&base_url)).await?;
    match probe {
        Ok(()) => println!("  backend:    {}", tinted("reachable", palette::GREEN_RGB)),
        Err(err) => println!(
            "  backend:    {} ({err})",
            tinted("unreachable", palette::RED_RGB)
        ),
    }
    Ok(())
}

async fn print_appointments(config: &Config, limit: usize) -> Result<()> {
    let Some(token) = config.api_token.clone() else {
        anyhow::bail!("No API token configured. Sign in via the TUI or set CURA_API_TOKEN.");
    };
    let client = ApiClient::with_token(config, &token)?;
    let today = Local::now().date_naive();
    let mut appointments = client.list_appointments(None, today).await?;
    appointments.sort_by_key(|a| a.starts_at);

    for appointment in appointments.iter().take(limit) {
        println!(
            "{}  {}  {}",
            tinted(
                &appointment
                    .starts_at
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string(),
                palette::TEAL_RGB,
            ),
            appointment.patient.full_name.bold(),
            appointment.status.label().dimmed()
        );
    }
    if appointments.is_empty() {
        println!("{}", "No upcoming appointments.".dimmed());
    }
    Ok(())
}
