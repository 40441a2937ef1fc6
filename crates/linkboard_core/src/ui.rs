//! Collaborators the board talks to but does not own.
//!
//! Page chrome (status line, confirmation modal, login page) lives outside
//! the core; these traits are the seams it plugs into.

use crate::logging::{sanitize_message, MAX_LOGGED_TEXT_CHARS};
use log::{info, warn};

/// Severity of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    /// An operation is waiting on a remote backend.
    Progress,
    Error,
}

/// One message for the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
    /// Whether the line clears itself after a short delay.
    pub auto_hide: bool,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
            auto_hide: true,
        }
    }

    /// Progress lines stay until replaced.
    pub fn progress(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Progress,
            text: text.into(),
            auto_hide: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
            auto_hide: true,
        }
    }
}

/// Receives status lines.
pub trait StatusSink {
    fn show(&self, message: StatusMessage);
}

/// Source of the editor flag.
pub trait AuthProvider {
    fn is_editor(&self) -> bool;
    /// Drops editor rights. Failures are reported, never fatal.
    fn logout(&self) -> Result<(), String>;
}

/// Asks the user to confirm a destructive action.
#[allow(async_fn_in_trait)]
pub trait ConfirmPrompt {
    async fn confirm(&self, message: &str) -> bool;
}

/// Sink that drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStatus;

impl StatusSink for NullStatus {
    fn show(&self, _message: StatusMessage) {}
}

/// Sink that forwards status lines to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatus;

impl StatusSink for LogStatus {
    fn show(&self, message: StatusMessage) {
        let text = sanitize_message(&message.text, MAX_LOGGED_TEXT_CHARS);
        match message.kind {
            StatusKind::Error => warn!("event=status module=ui status=error text={text}"),
            StatusKind::Info | StatusKind::Progress => {
                info!("event=status module=ui status=ok text={text}")
            }
        }
    }
}

/// Prompt that answers every question the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl ConfirmPrompt for FixedAnswer {
    async fn confirm(&self, _message: &str) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::{StatusKind, StatusMessage};

    #[test]
    fn progress_messages_do_not_auto_hide() {
        assert!(!StatusMessage::progress("Saving...").auto_hide);
        assert!(StatusMessage::info("Published").auto_hide);
        assert_eq!(StatusMessage::error("boom").kind, StatusKind::Error);
    }
}
