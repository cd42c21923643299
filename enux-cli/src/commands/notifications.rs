use clap::Subcommand;
use colored::Colorize;
use comfy_table::{Cell, Color};
use enux_core::{format_relative_time, target_of, NotificationFeed, NotificationType};

use super::{new_table, print_json, truncate};
use crate::config::CliContext;

#[derive(Subcommand)]
pub enum NotificationsCommand {
    #[command(about = "List recent notifications")]
    List {
        #[arg(short, long, help = "Number of notifications to fetch")]
        limit: Option<u32>,

        #[arg(short, long, help = "Show only unread notifications")]
        unread: bool,

        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Show unread and total notification counts")]
    Count {
        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Mark notifications as read")]
    Read {
        #[arg(required = true, help = "Notification IDs")]
        ids: Vec<String>,
    },

    #[command(about = "Mark every notification as read")]
    ReadAll,

    #[command(about = "Delete a notification")]
    Delete {
        #[arg(help = "Notification ID")]
        id: String,
    },

    #[command(about = "Mark a notification as read and show where it leads")]
    Open {
        #[arg(help = "Notification ID")]
        id: String,
    },
}

pub async fn handle_notifications_command(
    ctx: &CliContext,
    cmd: Option<NotificationsCommand>,
) -> anyhow::Result<()> {
    let cmd = cmd.unwrap_or(NotificationsCommand::List {
        limit: None,
        unread: false,
        format: "text".to_string(),
    });

    let session = ctx.session().await?;

    match cmd {
        NotificationsCommand::List {
            limit,
            unread,
            format,
        } => {
            let limit = limit.unwrap_or(ctx.config.display.notification_limit);
            let mut feed = NotificationFeed::new(ctx.api.clone(), Some(limit));
            feed.open(&session).await?;
            list_notifications(&feed, unread, &format)
        }
        NotificationsCommand::Count { format } => {
            let count = ctx.api.get_notification_count(&session).await?;
            if format == "json" {
                return print_json(&count);
            }
            println!(
                "{} {} unread of {}",
                "●".blue(),
                count.unread_count.to_string().bold(),
                count.total_count
            );
            Ok(())
        }
        NotificationsCommand::Read { ids } => {
            let mut feed = new_feed(ctx);
            feed.mark_read(&session, &ids).await?;
            println!(
                "{} Marked {} notification(s) as read ({} unread)",
                "✓".green().bold(),
                ids.len(),
                feed.unread_count()
            );
            Ok(())
        }
        NotificationsCommand::ReadAll => {
            let mut feed = new_feed(ctx);
            feed.open(&session).await?;
            if feed.notifications().is_empty() {
                println!("{}", "No notifications.".yellow());
                return Ok(());
            }
            feed.mark_all_read(&session).await?;
            println!("{} All notifications marked as read", "✓".green().bold());
            Ok(())
        }
        NotificationsCommand::Delete { id } => {
            let mut feed = new_feed(ctx);
            feed.delete(&session, &id).await?;
            println!("{} Deleted notification {}", "✓".green().bold(), id.dimmed());
            Ok(())
        }
        NotificationsCommand::Open { id } => {
            let mut feed = new_feed(ctx);
            feed.open(&session).await?;
            let notification = feed
                .notifications()
                .iter()
                .find(|n| n.id == id)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Notification '{}' not found in your feed", id))?;

            match feed.activate(&session, &notification).await? {
                Some(route) => println!("{} {}", "→".blue(), route.to_string().cyan()),
                None => println!("{}", "Nothing to open for this notification.".dimmed()),
            }
            Ok(())
        }
    }
}

fn new_feed(ctx: &CliContext) -> NotificationFeed {
    NotificationFeed::new(ctx.api.clone(), Some(ctx.config.display.notification_limit))
}

fn list_notifications(
    feed: &NotificationFeed,
    unread_only: bool,
    format: &str,
) -> anyhow::Result<()> {
    let notifications: Vec<_> = feed
        .notifications()
        .iter()
        .filter(|n| !unread_only || !n.is_read)
        .collect();

    if format == "json" {
        let output = serde_json::json!({
            "unread_count": feed.unread_count(),
            "notifications": notifications,
        });
        return print_json(&output);
    }

    if notifications.is_empty() {
        println!("{}", "No notifications.".yellow());
        return Ok(());
    }

    let now = chrono::Utc::now();
    let mut table = new_table(&["", "ID", "Type", "Title", "Message", "Opens", "When"]);
    for notification in notifications {
        let marker = if notification.is_read {
            Cell::new(" ")
        } else {
            Cell::new("●").fg(Color::Blue)
        };
        table.add_row(vec![
            marker,
            Cell::new(&notification.id),
            Cell::new(type_label(&notification.kind)).fg(type_color(&notification.kind)),
            Cell::new(truncate(&notification.title, 30)),
            Cell::new(truncate(&notification.message, 50)),
            Cell::new(
                target_of(notification)
                    .map(|route| route.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(format_relative_time(notification.created_at, now)),
        ]);
    }

    println!("{}", table);
    println!(
        "\n{} {}",
        "Unread:".bold(),
        feed.unread_count().to_string().cyan()
    );
    Ok(())
}

fn type_label(kind: &NotificationType) -> &'static str {
    match kind {
        NotificationType::PrCreated => "pull request",
        NotificationType::PrMerged => "merged",
        NotificationType::PrClosed => "closed",
        NotificationType::PrDeclined => "declined",
        NotificationType::Fork => "fork",
        NotificationType::Star => "star",
        NotificationType::Other => "other",
    }
}

fn type_color(kind: &NotificationType) -> Color {
    match kind {
        NotificationType::PrCreated => Color::Cyan,
        NotificationType::PrMerged => Color::Magenta,
        NotificationType::PrClosed | NotificationType::PrDeclined => Color::Red,
        NotificationType::Fork => Color::Blue,
        NotificationType::Star => Color::Yellow,
        NotificationType::Other => Color::White,
    }
}
