use clap::Subcommand;
use colored::Colorize;
use enux_core::{validate_website, Profile, ProfileUpdate};

use super::print_json;
use crate::config::CliContext;

#[derive(Subcommand)]
pub enum ProfileCommand {
    #[command(about = "Show your profile")]
    Show {
        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Update your profile. Pass an empty value to clear a field")]
    Update {
        #[arg(short = 'n', long)]
        full_name: Option<String>,

        #[arg(long)]
        bio: Option<String>,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long, help = "Website URL (http or https)")]
        website: Option<String>,

        #[arg(
            long = "interest",
            help = "Replace your interests (repeat for several)"
        )]
        interests: Vec<String>,

        #[arg(long, conflicts_with = "interests", help = "Remove all interests")]
        clear_interests: bool,

        #[arg(long, help = "Company stage (e.g. idea, seed, growth)")]
        stage: Option<String>,
    },
}

pub async fn handle_profile_command(
    ctx: &CliContext,
    cmd: Option<ProfileCommand>,
) -> anyhow::Result<()> {
    let cmd = cmd.unwrap_or(ProfileCommand::Show {
        format: "text".to_string(),
    });

    match cmd {
        ProfileCommand::Show { format } => cmd_show(ctx, &format).await,
        ProfileCommand::Update {
            full_name,
            bio,
            company,
            location,
            website,
            interests,
            clear_interests,
            stage,
        } => {
            if let Some(website) = &website {
                validate_website(website)?;
            }

            let session = ctx.session().await?;
            let current = ctx.api.get_profile(&session).await?;

            let mut update = ProfileUpdate::from_profile(&current);
            let fields = [
                (&mut update.full_name, full_name),
                (&mut update.bio, bio),
                (&mut update.company, company),
                (&mut update.location, location),
                (&mut update.website, website),
                (&mut update.stage, stage),
            ];
            for (field, value) in fields {
                if let Some(value) = value {
                    *field = value;
                }
            }
            if clear_interests {
                update.interests.clear();
            } else if !interests.is_empty() {
                update.interests = interests;
            }

            let profile = ctx.api.update_profile(&session, &update).await?;
            println!("{} {}", "✓".green().bold(), "Profile updated".green());
            println!();
            print_profile(ctx, &profile);
            Ok(())
        }
    }
}

async fn cmd_show(ctx: &CliContext, format: &str) -> anyhow::Result<()> {
    let session = ctx.session().await?;
    let profile = ctx.api.get_profile(&session).await?;

    if format == "json" {
        return print_json(&profile);
    }

    print_profile(ctx, &profile);
    Ok(())
}

fn print_profile(ctx: &CliContext, profile: &Profile) {
    println!("{}", profile.display_name().cyan().bold());
    println!("{}", "═".repeat(40).dimmed());

    let rows = [
        ("Username:", Some(profile.username.as_str())),
        ("Bio:", profile.bio.as_deref()),
        ("Company:", profile.company.as_deref()),
        ("Stage:", profile.stage.as_deref()),
        ("Location:", profile.location.as_deref()),
        ("Website:", profile.website.as_deref()),
    ];
    for (label, value) in rows {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => println!("  {:<12} {}", label.bold(), value),
            None => println!("  {:<12} {}", label.bold(), "-".dimmed()),
        }
    }

    let interests = profile.interests.as_deref().unwrap_or_default();
    if !interests.is_empty() {
        println!("  {:<12} {}", "Interests:".bold(), interests.join(", "));
    }
    if let Some(created) = &profile.created_at {
        println!("  {:<12} {}", "Joined:".bold(), ctx.format_time(created));
    }
}
