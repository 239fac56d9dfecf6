//! User-facing notifications (toasts in a UI, lines on a terminal).

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Success => write!(f, "success"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(title: impl Into<String>, description: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity,
        }
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, Severity::Success)
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, Severity::Error)
    }
}

/// Destination for notifications.
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

/// Records notifications in memory.
impl NotificationSink for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

/// Forwards notifications to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&mut self, n: Notification) {
        match n.severity {
            Severity::Error => tracing::error!(title = %n.title, "{}", n.description),
            Severity::Warning => tracing::warn!(title = %n.title, "{}", n.description),
            Severity::Info | Severity::Success => {
                tracing::info!(title = %n.title, "{}", n.description)
            }
        }
    }
}

/// Prints notifications for the CLI.
///
/// Errors are not printed: the failing command returns them and `main`
/// reports them once. `quiet` silences success lines (JSON output).
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalSink {
    pub quiet: bool,
}

impl TerminalSink {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl NotificationSink for TerminalSink {
    fn notify(&mut self, n: Notification) {
        tracing::debug!(severity = %n.severity, title = %n.title, "notification");
        match n.severity {
            Severity::Info | Severity::Success if self.quiet => {}
            Severity::Info | Severity::Success => println!("{}: {}", n.title, n.description),
            Severity::Warning => eprintln!("Warning: {}: {}", n.title, n.description),
            Severity::Error => {}
        }
    }
}
