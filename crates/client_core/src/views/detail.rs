use shared::domain::{User, UserId};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{ActionError, ViewContext, DELETE_CONFIRMATION};
use crate::{
    lifecycle::{until_cancelled, Lifecycle},
    notification::Notification,
    routes::Route,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailViewState {
    pub user: Lifecycle<User>,
    pub notification: Option<Notification>,
}

/// Single-record view. Reads go to the remote service directly, not the store.
pub struct DetailController {
    ctx: ViewContext,
    id: UserId,
    cancel: CancellationToken,
    state: watch::Sender<DetailViewState>,
}

impl DetailController {
    pub fn new(ctx: ViewContext, id: UserId, cancel: CancellationToken) -> Self {
        let (state, _) = watch::channel(DetailViewState::default());
        Self {
            ctx,
            id,
            cancel,
            state,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailViewState> {
        self.state.subscribe()
    }

    pub fn view_state(&self) -> DetailViewState {
        self.state.borrow().clone()
    }

    /// Fetches the record. A failure leaves the view in its terminal
    /// not-found state; calling `activate` again retries.
    pub async fn activate(&self) -> Result<User, ActionError> {
        let id = self.id;
        self.state.send_modify(|state| state.user = Lifecycle::Loading);

        let Some(result) = until_cancelled(&self.cancel, self.ctx.service.get(id)).await else {
            return Err(ActionError::Cancelled);
        };

        match result {
            Ok(user) => {
                self.state
                    .send_modify(|state| state.user = Lifecycle::Ready(user.clone()));
                Ok(user)
            }
            Err(err) => {
                warn!(user_id = id.0, error = %err, "detail view: load failed");
                let message = err.to_string();
                let toast = format!("Failed to load user: {message}");
                self.state.send_modify(|state| {
                    state.user = Lifecycle::Failed(message);
                    state.notification = Some(Notification::error(toast));
                });
                Err(err.into())
            }
        }
    }

    /// Deletes remotely, then locally, then returns to the list.
    pub async fn delete(&self) -> Result<bool, ActionError> {
        let id = self.id;
        if !self.ctx.confirm.confirm(DELETE_CONFIRMATION) {
            return Ok(false);
        }

        let Some(result) = until_cancelled(&self.cancel, self.ctx.service.delete(id)).await else {
            return Err(ActionError::Cancelled);
        };

        match result {
            Ok(()) => {
                self.ctx.store.delete(id);
                info!(user_id = id.0, "detail view: user deleted");
                self.state.send_modify(|state| {
                    state.notification = Some(Notification::success("User deleted successfully!"));
                });
                self.ctx.navigator.navigate(Route::List);
                Ok(true)
            }
            Err(err) => {
                warn!(user_id = id.0, error = %err, "detail view: delete failed");
                let message = err.to_string();
                self.state
                    .send_modify(|state| state.notification = Some(Notification::error(message)));
                Err(err.into())
            }
        }
    }

    pub fn edit(&self) {
        self.ctx.navigator.navigate(Route::Edit(self.id));
    }

    pub fn back(&self) {
        self.ctx.navigator.navigate(Route::List);
    }

    pub fn dismiss_notification(&self) {
        self.state
            .send_if_modified(|state| state.notification.take().is_some());
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }
}
