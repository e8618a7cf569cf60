//! Ticket monitor CLI
//!
//! One invocation performs one check; run it from cron or a CI schedule.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use ticket_monitor::{
    models::{Config, Overrides},
    pipeline,
    storage::{LocalStateStore, StateStore},
    utils::http,
};

/// Ticket monitor - alerts when an event page starts listing tickets
#[derive(Parser, Debug)]
#[command(
    name = "ticket-monitor",
    version,
    about = "Watches an event page and alerts when tickets become available"
)]
struct Cli {
    /// Optional TOML file with checker and channel tuning
    #[arg(short, long, env = "MONITOR_CONFIG", default_value = "monitor.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    env: EnvArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Settings normally supplied through the environment.
#[derive(Args, Debug)]
struct EnvArgs {
    /// Event page to monitor
    #[arg(long, env = "EVENT_URL")]
    event_url: Option<String>,

    /// State file path [default: state.json]
    #[arg(long, env = "STATE_FILE")]
    state_file: Option<String>,

    #[arg(long, env = "SMTP_SERVER")]
    smtp_server: Option<String>,

    /// SMTP port [default: 587]
    #[arg(long, env = "SMTP_PORT")]
    smtp_port: Option<String>,

    #[arg(long, env = "SMTP_USERNAME")]
    smtp_username: Option<String>,

    #[arg(long, env = "SMTP_PASSWORD", hide_env_values = true)]
    smtp_password: Option<String>,

    /// Sender address [default: SMTP username]
    #[arg(long, env = "EMAIL_FROM")]
    email_from: Option<String>,

    /// Comma-separated recipient addresses
    #[arg(long, env = "EMAIL_TO")]
    email_to: Option<String>,

    /// International number without a leading +
    #[arg(long, env = "SMS_PHONE")]
    sms_phone: Option<String>,

    /// Textbelt API key [default: textbelt]
    #[arg(long, env = "TEXTBELT_KEY", hide_env_values = true)]
    textbelt_key: Option<String>,
}

impl From<EnvArgs> for Overrides {
    fn from(args: EnvArgs) -> Self {
        Self {
            event_url: args.event_url,
            state_file: args.state_file,
            smtp_server: args.smtp_server,
            smtp_port: args.smtp_port,
            smtp_username: args.smtp_username,
            smtp_password: args.smtp_password,
            email_from: args.email_from,
            email_to: args.email_to,
            sms_phone: args.sms_phone,
            textbelt_key: args.textbelt_key,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the event page once and notify on new availability (default)
    Check {
        /// Report what would happen without notifying or writing state
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate configuration and show active channels
    Validate,

    /// Show the persisted state
    Status,

    /// Send a test notification through every configured channel
    TestNotify,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(format!("warn,ticket_monitor={level}")),
    )
    .target(env_logger::Target::Stdout)
    .format(|buf, record| match record.level() {
        log::Level::Info => writeln!(buf, "[ticket_monitor] {}", record.args()),
        level => writeln!(buf, "[ticket_monitor] {level}: {}", record.args()),
    })
    .init();
}

/// Main entry point for the CLI application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    config.apply(cli.env.into());

    match cli.command.unwrap_or(Command::Check { dry_run: false }) {
        Command::Check { dry_run } => {
            if config.require_event_url().is_err() {
                log::error!("EVENT_URL environment variable is not set; exiting.");
                return ExitCode::from(1);
            }

            match pipeline::run_monitor(&config, dry_run).await {
                Ok(report) => {
                    log::debug!(
                        "Run at {}: {} (notified: {}, state saved: {})",
                        report.checked_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        report.transition,
                        report.notified(),
                        report.state_saved
                    );
                }
                Err(e) => {
                    log::error!("Monitor setup failed: {}", e);
                    return ExitCode::from(1);
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return ExitCode::from(1);
            }
            if let Err(e) = http::create_client(&config.checker) {
                log::error!("HTTP client cannot be built: {}", e);
                return ExitCode::from(1);
            }

            log::info!("Event URL: {}", config.event_url.as_deref().unwrap_or_default());
            log::info!("State file: {}", config.state_file.display());

            if config.email.settings().is_some() {
                log::info!("Email channel: active ({} recipient(s))", config.email.to.len());
            } else {
                log::info!(
                    "Email channel: inactive (missing {})",
                    config.email.missing().join(", ")
                );
            }

            if config.sms.phone.is_some() {
                log::info!("SMS channel: active");
            } else {
                log::info!("SMS channel: inactive (SMS_PHONE not set)");
            }

            log::info!("Configuration OK");
        }

        Command::Status => {
            let store = LocalStateStore::new(&config.state_file);
            match store.load().await {
                Ok(Some(state)) => {
                    log::info!(
                        "State file {}: has_tickets = {}",
                        store.location(),
                        state.has_tickets
                    );
                }
                Ok(None) => log::info!("No state file at {} yet.", store.location()),
                Err(e) => log::warn!("Failed to read state file: {}", e),
            }
        }

        Command::TestNotify => match pipeline::run_test_notify(&config).await {
            Ok(report) => {
                log::info!(
                    "Test notification: {} sent, {} failed",
                    report.sent_count(),
                    report.failed_count()
                );
            }
            Err(e) => {
                log::error!("Test notification setup failed: {}", e);
                return ExitCode::from(1);
            }
        },
    }

    ExitCode::SUCCESS
}
