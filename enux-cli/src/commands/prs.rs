use anyhow::{anyhow, Context};
use clap::{Subcommand, ValueEnum};
use colored::{ColoredString, Colorize};
use comfy_table::{Cell, Color};
use enux_core::{
    ApiDiffSource, CreatePullRequestRequest, DiffLine, DiffTab, DiffView, DiffViewer, LineKind,
    PullRequest, PullRequestAction, PullRequestWorkflow, Session, UnifiedLine, UnifiedLineKind,
};
use std::path::PathBuf;

use super::{colored_status, new_table, print_json, status_color, truncate};
use crate::config::CliContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DiffViewArg {
    Unified,
    SideBySide,
    Html,
}

impl From<DiffViewArg> for DiffTab {
    fn from(view: DiffViewArg) -> Self {
        match view {
            DiffViewArg::Unified => DiffTab::Unified,
            DiffViewArg::SideBySide => DiffTab::SideBySide,
            DiffViewArg::Html => DiffTab::Html,
        }
    }
}

#[derive(Subcommand)]
pub enum PrsCommand {
    #[command(about = "List pull requests against a playbook")]
    List {
        #[arg(help = "Playbook ID")]
        playbook_id: String,

        #[arg(short, long, help = "Show only open pull requests")]
        open: bool,

        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Show a pull request and the actions available to you")]
    Show {
        #[arg(help = "Pull request ID")]
        id: String,

        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Propose new content for a playbook")]
    Create {
        #[arg(help = "Target playbook ID")]
        playbook_id: String,

        #[arg(short, long, help = "Pull request title")]
        title: String,

        #[arg(short, long, help = "What changed and why")]
        description: String,

        #[arg(long, help = "Proposed content (markdown)", conflicts_with = "content_file")]
        content: Option<String>,

        #[arg(long, help = "Read the proposed content from a file")]
        content_file: Option<PathBuf>,

        #[arg(long, help = "Base version ID (defaults to the playbook's current version)")]
        base_version: Option<String>,
    },

    #[command(about = "Show the diff of a pull request")]
    Diff {
        #[arg(help = "Pull request ID")]
        id: String,

        #[arg(long, value_enum, default_value = "unified", help = "Diff view")]
        view: DiffViewArg,

        #[arg(long, help = "Show addition and deletion counts only")]
        stat: bool,
    },

    #[command(about = "Merge a pull request, creating a new playbook version")]
    Merge {
        #[arg(help = "Pull request ID")]
        id: String,

        #[arg(short, long, help = "Merge message")]
        message: Option<String>,
    },

    #[command(about = "Close a pull request without merging")]
    Close {
        #[arg(help = "Pull request ID")]
        id: String,
    },

    #[command(about = "Decline a pull request")]
    Decline {
        #[arg(help = "Pull request ID")]
        id: String,
    },
}

pub async fn handle_prs_command(ctx: &CliContext, cmd: PrsCommand) -> anyhow::Result<()> {
    match cmd {
        PrsCommand::List {
            playbook_id,
            open,
            format,
        } => cmd_list(ctx, &playbook_id, open, &format).await,
        PrsCommand::Show { id, format } => cmd_show(ctx, &id, &format).await,
        PrsCommand::Create {
            playbook_id,
            title,
            description,
            content,
            content_file,
            base_version,
        } => {
            let new_blog_text = match (content, content_file) {
                (Some(text), _) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => return Err(anyhow!("Provide --content or --content-file")),
            };
            cmd_create(ctx, &playbook_id, title, description, new_blog_text, base_version).await
        }
        PrsCommand::Diff { id, view, stat } => cmd_diff(ctx, &id, view.into(), stat).await,
        PrsCommand::Merge { id, message } => {
            cmd_action(ctx, &id, PullRequestAction::Merge, message.as_deref()).await
        }
        PrsCommand::Close { id } => cmd_action(ctx, &id, PullRequestAction::Close, None).await,
        PrsCommand::Decline { id } => {
            cmd_action(ctx, &id, PullRequestAction::Decline, None).await
        }
    }
}

/// Fetch a pull request, filling in the target playbook's owner when the
/// server left it out so the manage policy can see it.
async fn load_pull_request(
    ctx: &CliContext,
    session: &Session,
    id: &str,
) -> anyhow::Result<PullRequest> {
    let mut pull_request = ctx.api.get_pull_request(session, id).await?;

    if pull_request.playbook_owner_id.is_none() {
        let playbook = ctx
            .api
            .get_playbook(session, &pull_request.playbook_id)
            .await?;
        pull_request.playbook_owner_id = playbook.owner_id;
        if pull_request.playbook_title.is_none() {
            pull_request.playbook_title = Some(playbook.title);
        }
    }

    Ok(pull_request)
}

async fn cmd_list(
    ctx: &CliContext,
    playbook_id: &str,
    open_only: bool,
    format: &str,
) -> anyhow::Result<()> {
    let session = ctx.session().await?;
    let mut list = ctx.api.get_pull_requests(&session, playbook_id).await?;

    if open_only {
        list.pull_requests.retain(|pr| pr.is_open());
    }

    if format == "json" {
        return print_json(&list);
    }

    if list.pull_requests.is_empty() {
        println!("{}", "No pull requests found.".yellow());
        return Ok(());
    }

    let mut table = new_table(&["ID", "Title", "Author", "Status", "Changes", "Created"]);
    for pr in &list.pull_requests {
        let changes = match (pr.additions_count, pr.deletions_count) {
            (Some(a), Some(d)) => format!("+{} -{}", a, d),
            _ => "-".to_string(),
        };
        table.add_row(vec![
            Cell::new(&pr.id),
            Cell::new(truncate(&pr.title, 40)),
            Cell::new(
                pr.author_name
                    .as_deref()
                    .or(pr.author_id.as_deref())
                    .unwrap_or("-"),
            ),
            Cell::new(pr.status).fg(status_color(pr.status)),
            Cell::new(changes),
            Cell::new(
                pr.created_at
                    .as_ref()
                    .map(|at| ctx.format_time(at))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
    }

    println!("{}", table);
    println!(
        "\n{} {} of {}{}",
        "Showing:".bold(),
        list.pull_requests.len(),
        list.total_count,
        if list.has_more { " (more available)" } else { "" }
    );
    Ok(())
}

async fn cmd_show(ctx: &CliContext, id: &str, format: &str) -> anyhow::Result<()> {
    let session = ctx.session().await?;
    let pull_request = load_pull_request(ctx, &session, id).await?;

    let workflow = PullRequestWorkflow::new(
        ctx.api.clone(),
        pull_request.clone(),
        ctx.config.manage_policy(),
    );
    let actions = workflow.available_actions(session.user_id()).await;

    if format == "json" {
        let output = serde_json::json!({
            "pull_request": pull_request,
            "available_actions": actions,
        });
        return print_json(&output);
    }

    print_pull_request(ctx, &pull_request);

    println!();
    if actions.is_empty() {
        println!("  {}", "No actions available.".dimmed());
    } else {
        let names: Vec<String> = actions.iter().map(|a| a.to_string()).collect();
        println!("  {} {}", "Actions:".bold(), names.join(", ").cyan());
        println!(
            "  {} enux prs <merge|close|decline> {}",
            "→".blue(),
            pull_request.id
        );
    }

    Ok(())
}

fn print_pull_request(ctx: &CliContext, pr: &PullRequest) {
    println!("{} {}", pr.title.cyan().bold(), colored_status(pr.status));
    println!("{}", "═".repeat(40).dimmed());

    if let Some(description) = pr.description.as_deref().filter(|d| !d.is_empty()) {
        println!("  {}", description);
        println!();
    }

    println!("  {:<12} {}", "ID:".bold(), pr.id);
    println!(
        "  {:<12} {}",
        "Playbook:".bold(),
        pr.playbook_title.as_deref().unwrap_or(&pr.playbook_id)
    );
    if let Some(author) = pr.author_name.as_deref().or(pr.author_id.as_deref()) {
        println!("  {:<12} {}", "Author:".bold(), author);
    }
    if let Some(base) = pr.base_version_number {
        println!("  {:<12} v{}", "Base:".bold(), base);
    }
    if let (Some(additions), Some(deletions)) = (pr.additions_count, pr.deletions_count) {
        println!(
            "  {:<12} {} {}",
            "Changes:".bold(),
            format!("+{}", additions).green(),
            format!("-{}", deletions).red()
        );
    }
    if let Some(created) = &pr.created_at {
        println!("  {:<12} {}", "Opened:".bold(), ctx.format_time(created));
    }
    if let Some(merged) = &pr.merged_at {
        let by = pr
            .merged_by
            .as_deref()
            .map(|u| format!(" by {}", u))
            .unwrap_or_default();
        println!("  {:<12} {}{}", "Merged:".bold(), ctx.format_time(merged), by);
        if let Some(version) = pr.new_version_number {
            println!("  {:<12} v{}", "New version:".bold(), version);
        }
        if let Some(message) = &pr.merge_message {
            println!("  {:<12} {}", "Message:".bold(), message);
        }
    }
    if let Some(closed) = &pr.closed_at {
        println!("  {:<12} {}", "Closed:".bold(), ctx.format_time(closed));
    }
}

async fn cmd_create(
    ctx: &CliContext,
    playbook_id: &str,
    title: String,
    description: String,
    new_blog_text: String,
    base_version: Option<String>,
) -> anyhow::Result<()> {
    let mut request = CreatePullRequestRequest::new(
        title,
        description,
        new_blog_text,
        base_version.unwrap_or_default(),
    );
    request.check_text_fields()?;

    let session = ctx.session().await?;
    let playbook = ctx.api.get_playbook(&session, playbook_id).await?;
    if request.base_version_id.trim().is_empty() {
        request.base_version_id = playbook.current_version_id.clone().unwrap_or_default();
    }

    let response = ctx
        .api
        .create_pull_request(&session, &playbook, &request)
        .await?;
    let pr = &response.pull_request;

    println!(
        "{} Opened pull request {} against {}",
        "✓".green().bold(),
        pr.id.bold(),
        playbook.title.cyan()
    );
    if let (Some(additions), Some(deletions)) = (pr.additions_count, pr.deletions_count) {
        println!(
            "  {} {}",
            format!("+{}", additions).green(),
            format!("-{}", deletions).red()
        );
    }
    if let Some(message) = &response.message {
        println!("  {}", message.dimmed());
    }
    Ok(())
}

async fn cmd_diff(ctx: &CliContext, id: &str, tab: DiffTab, stat_only: bool) -> anyhow::Result<()> {
    let session = ctx.session().await?;
    let pull_request = ctx.api.get_pull_request(&session, id).await?;

    let source = ApiDiffSource::new(ctx.api.clone(), session);
    let mut viewer = DiffViewer::new(source, &pull_request);
    if viewer.unified_diff().is_empty() {
        viewer.load_unified().await?;
    }

    let stats = viewer.stats();
    println!(
        "{} {} {}",
        pull_request.title.cyan().bold(),
        format!("+{}", stats.additions).green(),
        format!("-{}", stats.deletions).red()
    );
    if stat_only {
        return Ok(());
    }
    println!("{}", format!("── {} ──", tab).dimmed());

    match viewer.select(tab).await {
        DiffView::Unified(lines) => {
            for line in &lines {
                println!("{}", style_unified_line(line));
            }
        }
        DiffView::SideBySide(view) => {
            let mut table = new_table(&["Original", "Modified"]);
            for (original, modified) in view.rows() {
                table.add_row(vec![side_cell(original), side_cell(modified)]);
            }
            println!("{}", table);
        }
        DiffView::Html(html) => println!("{}", html),
        DiffView::Unavailable(placeholder) => println!("{}", placeholder.yellow()),
    }

    Ok(())
}

fn style_unified_line(line: &UnifiedLine) -> ColoredString {
    let text = line.text.as_str();
    match line.kind {
        UnifiedLineKind::FileHeader => text.dimmed(),
        UnifiedLineKind::HunkHeader => text.blue(),
        UnifiedLineKind::Addition => text.green(),
        UnifiedLineKind::Deletion => text.red(),
        UnifiedLineKind::Context => text.normal(),
    }
}

fn side_cell(line: Option<&DiffLine>) -> Cell {
    let Some(line) = line else {
        return Cell::new("");
    };
    let number = line.line.map(|n| format!("{:>4} ", n)).unwrap_or_default();
    let cell = Cell::new(format!("{}{}", number, line.content));
    match line.kind {
        LineKind::Added => cell.fg(Color::Green),
        LineKind::Deleted => cell.fg(Color::Red),
        LineKind::Unchanged => cell,
    }
}

async fn cmd_action(
    ctx: &CliContext,
    id: &str,
    action: PullRequestAction,
    merge_message: Option<&str>,
) -> anyhow::Result<()> {
    let session = ctx.session().await?;
    let pull_request = load_pull_request(ctx, &session, id).await?;

    let workflow =
        PullRequestWorkflow::new(ctx.api.clone(), pull_request, ctx.config.manage_policy());
    let updated = workflow.perform(&session, action, merge_message).await?;

    let verb = match action {
        PullRequestAction::Merge => "Merged",
        PullRequestAction::Close => "Closed",
        PullRequestAction::Decline => "Declined",
    };
    println!(
        "{} {} pull request {} {}",
        "✓".green().bold(),
        verb,
        updated.id.bold(),
        colored_status(updated.status)
    );
    if action == PullRequestAction::Merge {
        if let Some(version) = updated.new_version_number {
            println!("  {} Playbook is now at v{}", "→".blue(), version);
        }
    }
    Ok(())
}
