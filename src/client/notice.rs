//! User-facing notices (toasts) emitted after each client call.

/// Visual treatment of a notice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoticeVariant {
    /// Informational or success.
    #[default]
    Default,
    /// Failure.
    Destructive,
}

/// A short title and description shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Headline.
    pub title: String,
    /// Detail line.
    pub description: String,
    /// Visual treatment.
    pub variant: NoticeVariant,
}

impl Notice {
    pub(super) fn success(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_owned(),
            description: description.into(),
            variant: NoticeVariant::Default,
        }
    }

    pub(super) fn failure(title: &str, description: &str) -> Self {
        Self {
            title: title.to_owned(),
            description: description.to_owned(),
            variant: NoticeVariant::Destructive,
        }
    }
}

/// Receives notices from the client.
pub trait NoticeSink: Send + Sync {
    /// Shows or records a notice.
    fn notify(&self, notice: Notice);
}

/// Writes notices to the `tracing` log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNoticeSink;

impl NoticeSink for TracingNoticeSink {
    fn notify(&self, notice: Notice) {
        match notice.variant {
            NoticeVariant::Default => {
                tracing::info!(title = %notice.title, "{}", notice.description);
            }
            NoticeVariant::Destructive => {
                tracing::warn!(title = %notice.title, "{}", notice.description);
            }
        }
    }
}

/// Sinks for asserting on notices in tests.
#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use std::sync::Mutex;

    use super::{Notice, NoticeSink};

    /// Keeps every notice in memory.
    #[derive(Debug, Default)]
    pub struct RecordingNotices {
        notices: Mutex<Vec<Notice>>,
    }

    impl RecordingNotices {
        /// Drains and returns the recorded notices.
        pub fn take(&self) -> Vec<Notice> {
            self.notices
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .drain(..)
                .collect()
        }
    }

    impl NoticeSink for RecordingNotices {
        fn notify(&self, notice: Notice) {
            self.notices
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(notice);
        }
    }
}
