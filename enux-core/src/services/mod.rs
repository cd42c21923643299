mod notifications;
mod workflow;

pub use notifications::{format_relative_time, target_of, NotificationFeed};
pub use workflow::PullRequestWorkflow;
