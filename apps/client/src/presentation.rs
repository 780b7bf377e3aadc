//! View-side helpers: score colouring, transient notifications, greetings.

use std::time::{Duration, Instant};

use crate::errors::ClientError;
use crate::models::User;

pub const DEFAULT_TOAST_TTL: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Success,
    Warning,
    Danger,
}

impl ScoreBand {
    pub fn of(score: f64) -> Self {
        if score >= 75.0 {
            ScoreBand::Success
        } else if score >= 50.0 {
            ScoreBand::Warning
        } else {
            ScoreBand::Danger
        }
    }

    pub fn verdict(&self) -> &'static str {
        match self {
            ScoreBand::Success => "Excellent match!",
            ScoreBand::Warning => "Good, needs improvement",
            ScoreBand::Danger => "Needs significant work",
        }
    }
}

/// Scores are shown as whole numbers.
pub fn score_display(score: f64) -> String {
    format!("{}", score.round() as i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    expires_at: Instant,
}

/// Queue of transient notifications. Expired toasts are dropped by `prune`.
#[derive(Debug, Default)]
pub struct Toasts {
    items: Vec<Toast>,
    next_id: u64,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>) -> u64 {
        self.push_for(kind, message, DEFAULT_TOAST_TTL)
    }

    pub fn push_for(&mut self, kind: ToastKind, message: impl Into<String>, ttl: Duration) -> u64 {
        self.next_id += 1;
        self.items.push(Toast {
            id: self.next_id,
            kind,
            message: message.into(),
            expires_at: Instant::now() + ttl,
        });
        self.next_id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Error, message)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Warning, message)
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Info, message)
    }

    /// Turns an operation's outcome into a toast: `success` on `Ok`, a warning
    /// for validation failures, otherwise an error with the server's detail or `fallback`.
    pub fn report<T>(&mut self, result: &Result<T, ClientError>, success: &str, fallback: &str) -> u64 {
        match result {
            Ok(_) => self.success(success),
            Err(e @ ClientError::Validation(_)) => self.warning(e.user_message(fallback)),
            Err(e) => self.error(e.user_message(fallback)),
        }
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|t| t.id != id);
    }

    pub fn prune(&mut self, now: Instant) {
        self.items.retain(|t| t.expires_at > now);
    }

    pub fn active(&self) -> &[Toast] {
        &self.items
    }
}

/// First name for the dashboard header and top bar.
pub fn display_name(user: Option<&User>) -> &str {
    user.and_then(User::first_name).unwrap_or("User")
}

pub fn greeting(user: Option<&User>) -> String {
    format!("Welcome back, {}", display_name(user))
}

/// Avatar letter: first character of the full name, upper-cased.
pub fn initial(user: Option<&User>) -> char {
    user.and_then(|u| u.full_name.chars().next())
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('U')
}

pub fn role_badge(user: &User) -> Option<&'static str> {
    user.is_admin().then_some("Admin")
}
