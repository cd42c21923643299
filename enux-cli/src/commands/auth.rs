use anyhow::anyhow;
use clap::Subcommand;
use colored::Colorize;
use enux_core::{AuthClient, AuthError, AuthOutcome, Provider};

use super::print_json;
use crate::config::CliContext;

#[derive(Subcommand)]
pub enum AuthCommand {
    #[command(about = "Create an account and sign in")]
    SignUp {
        #[arg(short, long, help = "Email address")]
        email: String,

        #[arg(short, long, env = "ENUX_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(short = 'n', long, help = "Full name")]
        full_name: String,
    },

    #[command(about = "Sign in with email and password")]
    SignIn {
        #[arg(short, long, help = "Email address")]
        email: String,

        #[arg(short, long, env = "ENUX_PASSWORD", hide_env_values = true)]
        password: String,
    },

    #[command(about = "Sign in with an external identity provider (google, github)")]
    Provider {
        #[arg(help = "Provider name")]
        provider: Provider,
    },

    #[command(about = "Forget the stored session")]
    SignOut,

    #[command(about = "Show the signed-in user")]
    Whoami {
        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },
}

pub async fn handle_auth_command(
    ctx: &CliContext,
    cmd: Option<AuthCommand>,
) -> anyhow::Result<()> {
    let auth = AuthClient::new(ctx.api.clone(), ctx.store.clone());

    let cmd = cmd.unwrap_or(AuthCommand::Whoami {
        format: "text".to_string(),
    });

    match cmd {
        AuthCommand::SignUp {
            email,
            password,
            full_name,
        } => {
            let outcome = auth
                .sign_up(&email, &password, &full_name)
                .await
                .map_err(|e| auth_failure("Sign up", e))?;
            print_outcome(&outcome, "Account created");
            Ok(())
        }
        AuthCommand::SignIn { email, password } => {
            let outcome = auth
                .sign_in(&email, &password)
                .await
                .map_err(|e| auth_failure("Sign in", e))?;
            print_outcome(&outcome, "Signed in");
            Ok(())
        }
        AuthCommand::Provider { provider } => {
            let outcome = auth
                .sign_in_with_provider(provider)
                .await
                .map_err(|e| auth_failure("Sign in", e))?;
            print_outcome(&outcome, "Signed in");
            Ok(())
        }
        AuthCommand::SignOut => {
            let route = auth.sign_out().await?;
            println!("{} {}", "✓".green().bold(), "Signed out".green());
            println!("  {} {}", "→".blue(), route.to_string().dimmed());
            Ok(())
        }
        AuthCommand::Whoami { format } => cmd_whoami(ctx, &format).await,
    }
}

fn auth_failure(action: &str, error: AuthError) -> anyhow::Error {
    match error.status {
        Some(status) => anyhow!("{} failed ({}): {}", action, status, error.message),
        None => anyhow!("{} failed: {}", action, error.message),
    }
}

fn print_outcome(outcome: &AuthOutcome, headline: &str) {
    println!("{} {}", "✓".green().bold(), headline.green());
    if let Some(user) = outcome.user() {
        println!("  {:<10} {}", "User:".bold(), user.display_name());
        println!("  {:<10} {}", "Email:".bold(), user.email);
    }
    if let Some(route) = &outcome.route {
        println!("  {} Next: {}", "→".blue(), route.to_string().cyan());
    }
}

async fn cmd_whoami(ctx: &CliContext, format: &str) -> anyhow::Result<()> {
    let session = ctx.session().await?;

    if format == "json" {
        let output = serde_json::json!({
            "signed_in": session.is_signed_in(),
            "guest": session.is_guest(),
            "user": session.user().map(|u| serde_json::json!({
                "id": u.id,
                "email": u.email,
                "full_name": u.full_name,
            })),
        });
        return print_json(&output);
    }

    match session.user() {
        Some(user) if session.is_signed_in() => {
            println!("{}", "Current Session".cyan().bold());
            println!("{}", "═".repeat(40).dimmed());
            println!("  {:<12} {}", "Name:".bold(), user.display_name());
            println!("  {:<12} {}", "Email:".bold(), user.email);
            println!("  {:<12} {}", "User ID:".bold(), user.id.dimmed());
            if let Some(created) = &user.created_at {
                println!("  {:<12} {}", "Member since:".bold(), ctx.format_time(created));
            }
            println!("  {:<12} {}", "Session:".bold(), ctx.store.path().display());
        }
        _ if session.is_guest() => {
            println!("{}", "Browsing as guest.".yellow());
        }
        _ => {
            println!("{}", "Not signed in.".yellow());
            println!(
                "Run {} to start a session.",
                "enux auth sign-in --email <EMAIL>".cyan()
            );
        }
    }

    Ok(())
}
