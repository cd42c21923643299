#![allow(clippy::too_many_arguments, clippy::useless_format)]

use clap::{Parser, Subcommand};
use colored::Colorize;
use enux_core::{CliErrorDisplay, EnuxConfig, EnuxError, LoggingConfig};
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;

use commands::{
    handle_auth_command, handle_notifications_command, handle_playbooks_command,
    handle_profile_command, handle_prs_command, AuthCommand, NotificationsCommand,
    PlaybooksCommand, ProfileCommand, PrsCommand,
};
use config::CliContext;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Parser)]
#[command(name = "enux")]
#[command(version = VERSION)]
#[command(about = "Enux - Version-controlled business playbooks")]
#[command(long_about = r#"
Enux lets teams fork, star and improve business playbooks. Changes are
proposed as pull requests against a playbook version and the playbook's
author can merge, close or decline them.

Use 'enux auth sign-in' to start a session and 'enux profile update' to fill
in your profile, then 'enux playbooks show <id>' and
'enux prs list <playbook-id>' to browse.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(long, global = true, help = "Browse without the stored session")]
    guest: bool,

    #[arg(long, global = true, help = "Override the API base URL")]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Sign up, sign in and manage the current session")]
    Auth {
        #[command(subcommand)]
        action: Option<AuthCommand>,
    },

    #[command(about = "Show and edit your profile")]
    Profile {
        #[command(subcommand)]
        action: Option<ProfileCommand>,
    },

    #[command(about = "View, fork, star, search and upload playbooks")]
    Playbooks {
        #[command(subcommand)]
        action: PlaybooksCommand,
    },

    #[command(about = "Create, review, merge, close and decline pull requests")]
    Prs {
        #[command(subcommand)]
        action: PrsCommand,
    },

    #[command(about = "Read and manage your notification feed")]
    Notifications {
        #[command(subcommand)]
        action: Option<NotificationsCommand>,
    },

    #[command(about = "Show version information")]
    Version {
        #[arg(short, long)]
        detailed: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (logging, color) = EnuxConfig::load()
        .map(|c| (c.logging, c.display.color))
        .unwrap_or_else(|_| (LoggingConfig::default(), true));
    init_logging(cli.verbose, &logging, color);

    match run(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<EnuxError>() {
                Some(err) => {
                    err.log();
                    eprint!("{}: {}", "Error".red().bold(), CliErrorDisplay::new(err));
                }
                None => eprintln!("{}: {:#}", "Error".red().bold(), e),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, logging: &LoggingConfig, color: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json_format {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(color)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Version { detailed } = cli.command {
        return cmd_version(detailed);
    }

    let ctx = CliContext::load(cli.guest, cli.api_url)?;
    if !ctx.config.display.color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Auth { action } => handle_auth_command(&ctx, action).await,
        Commands::Profile { action } => handle_profile_command(&ctx, action).await,
        Commands::Playbooks { action } => handle_playbooks_command(&ctx, action).await,
        Commands::Prs { action } => handle_prs_command(&ctx, action).await,
        Commands::Notifications { action } => handle_notifications_command(&ctx, action).await,
        Commands::Version { detailed } => cmd_version(detailed),
    }
}

fn cmd_version(detailed: bool) -> anyhow::Result<()> {
    if detailed {
        println!("{}", "Enux Version Information".cyan().bold());
        println!("{}", "═".repeat(40).dimmed());
        println!("  {:<15} {}", "Version:".bold(), VERSION);
        println!("  {:<15} {}", "Name:".bold(), NAME);
        println!("  {:<15} Apache-2.0", "License:".bold());
        println!("  {:<15} enux-core {}", "Library:".bold(), VERSION);
        println!();
        println!("  {}", "Pull Request States:".bold());
        println!("    {} OPEN", "●".green());
        println!("    {} MERGED", "●".magenta());
        println!("    {} CLOSED", "●".red());
        println!("    {} DECLINED", "●".yellow());
        println!();
        println!("  {}", "Build Information:".bold());
        println!("    Rust Edition: 2021");
        #[cfg(debug_assertions)]
        println!("    Build:        Debug");
        #[cfg(not(debug_assertions))]
        println!("    Build:        Release");
    } else {
        println!("enux {}", VERSION);
    }

    Ok(())
}
