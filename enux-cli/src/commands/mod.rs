pub mod auth;
pub mod notifications;
pub mod playbooks;
pub mod profile;
pub mod prs;

pub use auth::{handle_auth_command, AuthCommand};
pub use notifications::{handle_notifications_command, NotificationsCommand};
pub use playbooks::{handle_playbooks_command, PlaybooksCommand};
pub use profile::{handle_profile_command, ProfileCommand};
pub use prs::{handle_prs_command, PrsCommand};

use colored::{ColoredString, Colorize};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use enux_core::PullRequestStatus;
use serde::Serialize;

pub(crate) fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::White))
                .collect::<Vec<_>>(),
        );
    table
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn status_color(status: PullRequestStatus) -> Color {
    match status {
        PullRequestStatus::Open => Color::Green,
        PullRequestStatus::Merged => Color::Magenta,
        PullRequestStatus::Closed => Color::Red,
        PullRequestStatus::Declined => Color::Yellow,
    }
}

pub(crate) fn colored_status(status: PullRequestStatus) -> ColoredString {
    let label = status.to_string();
    match status {
        PullRequestStatus::Open => label.green(),
        PullRequestStatus::Merged => label.magenta(),
        PullRequestStatus::Closed => label.red(),
        PullRequestStatus::Declined => label.yellow(),
    }
}

pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
