use anyhow::{anyhow, Context};
use clap::Subcommand;
use colored::Colorize;
use comfy_table::{Cell, Color};
use enux_core::{Playbook, PlaybookUploadRequest, UploadFile};
use std::path::PathBuf;

use super::{new_table, print_json, truncate};
use crate::config::CliContext;

#[derive(Subcommand)]
pub enum PlaybooksCommand {
    #[command(about = "Show a playbook")]
    Show {
        #[arg(help = "Playbook ID")]
        id: String,

        #[arg(long, help = "Print the playbook content")]
        content: bool,

        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Fork a playbook into your account")]
    Fork {
        #[arg(help = "Playbook ID")]
        id: String,
    },

    #[command(about = "Star a playbook")]
    Star {
        #[arg(help = "Playbook ID")]
        id: String,
    },

    #[command(about = "Remove your star from a playbook")]
    Unstar {
        #[arg(help = "Playbook ID")]
        id: String,
    },

    #[command(about = "Record a view of a playbook")]
    View {
        #[arg(help = "Playbook ID")]
        id: String,
    },

    #[command(about = "List forks of a playbook")]
    Forks {
        #[arg(help = "Playbook ID")]
        id: String,

        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Show the version history of a playbook")]
    Versions {
        #[arg(help = "Playbook ID")]
        id: String,

        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Search playbooks by meaning")]
    Search {
        #[arg(help = "Search query")]
        query: String,

        #[arg(short, long, help = "Maximum number of results")]
        limit: Option<u32>,

        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Create a playbook from text and attached files")]
    Upload {
        #[arg(short, long, help = "Playbook title")]
        title: String,

        #[arg(short, long, default_value = "", help = "Short description")]
        description: String,

        #[arg(long, help = "Playbook content (markdown)", conflicts_with = "content_file")]
        content: Option<String>,

        #[arg(long, help = "Read the playbook content from a file")]
        content_file: Option<PathBuf>,

        #[arg(long = "file", help = "Attach a file (repeatable)")]
        files: Vec<PathBuf>,
    },
}

pub async fn handle_playbooks_command(
    ctx: &CliContext,
    cmd: PlaybooksCommand,
) -> anyhow::Result<()> {
    match cmd {
        PlaybooksCommand::Show {
            id,
            content,
            format,
        } => cmd_show(ctx, &id, content, &format).await,
        PlaybooksCommand::Fork { id } => cmd_fork(ctx, &id).await,
        PlaybooksCommand::Star { id } => {
            let session = ctx.session().await?;
            let stars = ctx.api.star_playbook(&session, &id).await?;
            println!("{} Starred {} ({} ★)", "✓".green().bold(), id.cyan(), stars);
            Ok(())
        }
        PlaybooksCommand::Unstar { id } => {
            let session = ctx.session().await?;
            let stars = ctx.api.unstar_playbook(&session, &id).await?;
            println!("{} Unstarred {} ({} ★)", "✓".green().bold(), id.cyan(), stars);
            Ok(())
        }
        PlaybooksCommand::View { id } => {
            let session = ctx.session().await?;
            let views = ctx.api.increment_playbook_view(&session, &id).await?;
            println!("{} {} has {} views", "✓".green().bold(), id.cyan(), views);
            Ok(())
        }
        PlaybooksCommand::Forks { id, format } => cmd_forks(ctx, &id, &format).await,
        PlaybooksCommand::Versions { id, format } => cmd_versions(ctx, &id, &format).await,
        PlaybooksCommand::Search {
            query,
            limit,
            format,
        } => cmd_search(ctx, &query, limit, &format).await,
        PlaybooksCommand::Upload {
            title,
            description,
            content,
            content_file,
            files,
        } => {
            let blog_content = match (content, content_file) {
                (Some(text), _) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => String::new(),
            };
            cmd_upload(ctx, title, description, blog_content, files).await
        }
    }
}

async fn cmd_show(ctx: &CliContext, id: &str, content: bool, format: &str) -> anyhow::Result<()> {
    let session = ctx.session().await?;
    let playbook = ctx.api.get_playbook(&session, id).await?;

    if format == "json" {
        return print_json(&playbook);
    }

    print_playbook(ctx, &playbook);

    if content {
        println!();
        println!("  {}", "Content".yellow().bold());
        for line in playbook.content().lines() {
            println!("    {}", line);
        }
    }

    Ok(())
}

fn print_playbook(ctx: &CliContext, playbook: &Playbook) {
    println!("{}", playbook.title.cyan().bold());
    println!("{}", "═".repeat(40).dimmed());

    if let Some(description) = playbook.description.as_deref().filter(|d| !d.is_empty()) {
        println!("  {}", description);
        println!();
    }

    println!("  {:<12} {}", "ID:".bold(), playbook.id);
    if let Some(owner) = &playbook.owner_id {
        println!("  {:<12} {}", "Owner:".bold(), owner);
    }
    if let Some(stage) = &playbook.stage {
        println!("  {:<12} {}", "Stage:".bold(), stage);
    }
    if let Some(version) = playbook.version_number {
        println!("  {:<12} v{}", "Version:".bold(), version);
    }
    if !playbook.tags.is_empty() {
        println!("  {:<12} {}", "Tags:".bold(), playbook.tags.join(", "));
    }
    if let Some(source) = &playbook.forked_from {
        let version = playbook
            .forked_version
            .map(|v| format!(" @ v{}", v))
            .unwrap_or_default();
        println!("  {:<12} {}{}", "Forked from:".bold(), source, version);
    }
    if let Some(updated) = playbook.updated_at.as_ref().or(playbook.created_at.as_ref()) {
        println!("  {:<12} {}", "Updated:".bold(), ctx.format_time(updated));
    }

    println!();
    println!(
        "  {} {}   {} {}   {} {}",
        "★".yellow(),
        playbook.stars_count,
        "⑂".blue(),
        playbook.forks_count,
        "◉".dimmed(),
        playbook.views_count
    );
}

async fn cmd_fork(ctx: &CliContext, id: &str) -> anyhow::Result<()> {
    let session = ctx.session().await?;
    let playbook = ctx.api.get_playbook(&session, id).await?;
    let forked = ctx.api.fork_playbook(&session, &playbook).await?;

    println!(
        "{} Forked {} into {}",
        "✓".green().bold(),
        playbook.title.cyan(),
        forked.new_playbook_id.bold()
    );
    if let Some(message) = &forked.message {
        println!("  {}", message.dimmed());
    }
    Ok(())
}

async fn cmd_forks(ctx: &CliContext, id: &str, format: &str) -> anyhow::Result<()> {
    let session = ctx.session().await?;
    let forks = ctx.api.get_playbook_forks(&session, id).await?;

    if format == "json" {
        return print_json(&forks);
    }

    if forks.is_empty() {
        println!("{}", "No forks yet.".yellow());
        return Ok(());
    }

    let mut table = new_table(&["User", "Fork", "Version", "Forked At"]);
    for fork in &forks {
        table.add_row(vec![
            Cell::new(fork.user_name.as_deref().unwrap_or(&fork.user_id)),
            Cell::new(fork.forked_playbook_id.as_deref().unwrap_or("-")),
            Cell::new(
                fork.forked_version
                    .map(|v| format!("v{}", v))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(ctx.format_time(&fork.forked_at)),
        ]);
    }

    println!("{}", table);
    println!("\n{} {} fork(s)", "Total:".bold(), forks.len());
    Ok(())
}

async fn cmd_versions(ctx: &CliContext, id: &str, format: &str) -> anyhow::Result<()> {
    let session = ctx.session().await?;
    let versions = ctx.api.get_playbook_versions(&session, id).await?;

    if format == "json" {
        return print_json(&versions);
    }

    if versions.is_empty() {
        println!("{}", "No versions recorded.".yellow());
        return Ok(());
    }

    let mut table = new_table(&["Version", "Message", "Author", "Pull Request", "Created"]);
    for version in &versions {
        table.add_row(vec![
            Cell::new(format!("v{}", version.version_number)).fg(Color::Cyan),
            Cell::new(truncate(version.message.as_deref().unwrap_or(""), 40)),
            Cell::new(version.author_id.as_deref().unwrap_or("-")),
            Cell::new(version.pull_request_id.as_deref().unwrap_or("-")),
            Cell::new(
                version
                    .created_at
                    .as_ref()
                    .map(|at| ctx.format_time(at))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
    }

    println!("{}", table);
    Ok(())
}

async fn cmd_search(
    ctx: &CliContext,
    query: &str,
    limit: Option<u32>,
    format: &str,
) -> anyhow::Result<()> {
    if query.trim().is_empty() {
        return Err(anyhow!("Search query must not be empty"));
    }

    let session = ctx.session().await?;
    let results = ctx.api.search_playbooks(&session, query, limit).await?;

    if format == "json" {
        return print_json(&results);
    }

    if results.is_empty() {
        println!("{}", "No matching playbooks.".yellow());
        return Ok(());
    }

    let mut table = new_table(&["Score", "ID", "Title", "Stage", "★"]);
    for result in &results {
        table.add_row(vec![
            Cell::new(format!("{:.2}", result.similarity_score)).fg(Color::Green),
            Cell::new(&result.playbook.id),
            Cell::new(truncate(&result.playbook.title, 40)),
            Cell::new(result.playbook.stage.as_deref().unwrap_or("-")),
            Cell::new(result.playbook.stars_count),
        ]);
    }

    println!("{}", table);
    Ok(())
}

async fn cmd_upload(
    ctx: &CliContext,
    title: String,
    description: String,
    blog_content: String,
    files: Vec<PathBuf>,
) -> anyhow::Result<()> {
    let session = ctx.session().await?;
    session.bearer_token()?;
    let owner_id = session
        .user_id()
        .ok_or_else(|| anyhow!("Sign in to upload playbooks"))?
        .to_string();

    let request = PlaybookUploadRequest {
        title,
        description,
        owner_id,
        blog_content,
        files: files.into_iter().map(UploadFile::new).collect(),
    };

    let response = ctx.api.upload_playbook(&session, &request).await?;

    println!(
        "{} Created playbook {} ({})",
        "✓".green().bold(),
        response.playbook.title.cyan(),
        response.playbook.id.bold()
    );
    for file in &response.files {
        println!(
            "  {} {} ({} bytes)",
            "→".blue(),
            file.filename,
            file.size
        );
    }
    if let Some(status) = &response.processing_status {
        println!("  {} {}", "Processing:".dimmed(), status);
    }
    Ok(())
}
