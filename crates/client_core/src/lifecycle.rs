use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Request lifecycle of a single view: `Idle -> Loading -> Ready | Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifecycle<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Default for Lifecycle<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> Lifecycle<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Runs `fut` unless `cancel` fires first. `None` means the owner went away
/// and the result must not be applied.
pub(crate) async fn until_cancelled<F>(cancel: &CancellationToken, fut: F) -> Option<F::Output>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        output = fut => Some(output),
    }
}
