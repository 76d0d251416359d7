use shared::domain::{User, UserId};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{ActionError, ViewContext, DELETE_CONFIRMATION};
use crate::{
    lifecycle::{until_cancelled, Lifecycle},
    notification::Notification,
    routes::Route,
    store::{LoadError, UserListState},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListViewState {
    pub deleting: Option<UserId>,
    pub notification: Option<Notification>,
}

/// Drives the users list. Reads come straight from the store; the only
/// remote call it makes itself is delete.
pub struct ListController {
    ctx: ViewContext,
    cancel: CancellationToken,
    state: watch::Sender<ListViewState>,
}

impl ListController {
    pub fn new(ctx: ViewContext, cancel: CancellationToken) -> Self {
        let (state, _) = watch::channel(ListViewState::default());
        Self { ctx, cancel, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<ListViewState> {
        self.state.subscribe()
    }

    pub fn view_state(&self) -> ListViewState {
        self.state.borrow().clone()
    }

    /// Current store contents mapped onto the view lifecycle.
    pub fn lifecycle(&self) -> Lifecycle<Vec<User>> {
        list_lifecycle(&self.ctx.store.snapshot())
    }

    pub fn store_state(&self) -> UserListState {
        self.ctx.store.snapshot()
    }

    pub async fn reload(&self) -> Result<usize, LoadError> {
        self.ctx.store.load(&self.cancel).await
    }

    /// Deletes remotely, then locally. Returns `Ok(false)` when the user
    /// declines the confirmation.
    pub async fn delete(&self, id: UserId) -> Result<bool, ActionError> {
        if !self.ctx.confirm.confirm(DELETE_CONFIRMATION) {
            return Ok(false);
        }

        self.state.send_modify(|state| state.deleting = Some(id));
        let Some(result) = until_cancelled(&self.cancel, self.ctx.service.delete(id)).await else {
            self.state.send_modify(|state| state.deleting = None);
            return Err(ActionError::Cancelled);
        };

        match result {
            Ok(()) => {
                self.ctx.store.delete(id);
                info!(user_id = id.0, "list view: user deleted");
                self.state.send_modify(|state| {
                    state.deleting = None;
                    state.notification = Some(Notification::success("User deleted successfully!"));
                });
                Ok(true)
            }
            Err(err) => {
                warn!(user_id = id.0, error = %err, "list view: delete failed");
                let message = err.to_string();
                self.state.send_modify(|state| {
                    state.deleting = None;
                    state.notification = Some(Notification::error(message));
                });
                Err(err.into())
            }
        }
    }

    pub fn create(&self) {
        self.ctx.navigator.navigate(Route::Create);
    }

    pub fn edit(&self, id: UserId) {
        self.ctx.navigator.navigate(Route::Edit(id));
    }

    pub fn view(&self, id: UserId) {
        self.ctx.navigator.navigate(Route::Detail(id));
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

fn list_lifecycle(state: &UserListState) -> Lifecycle<Vec<User>> {
    if state.loading {
        Lifecycle::Loading
    } else if let Some(error) = &state.error {
        Lifecycle::Failed(error.clone())
    } else {
        Lifecycle::Ready(state.users.clone())
    }
}
