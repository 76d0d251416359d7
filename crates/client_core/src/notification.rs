use chrono::{DateTime, Duration, Utc};

/// How long a toast stays on screen before it is considered expired.
pub const NOTIFICATION_DURATION_MS: i64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

/// Transient message raised by a view after an action completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
    pub duration: Duration,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            raised_at: Utc::now(),
            duration: Duration::milliseconds(NOTIFICATION_DURATION_MS),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.raised_at + self.duration
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}
