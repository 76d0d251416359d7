use shared::domain::{User, UserDraft, UserId};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{ActionError, ViewContext};
use crate::{
    lifecycle::{until_cancelled, Lifecycle},
    notification::Notification,
    routes::Route,
    validation::{validate_draft, FormField, UnknownField, ValidationErrors},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(UserId),
}

impl FormMode {
    pub fn from_route(route: Route) -> Option<Self> {
        match route {
            Route::Create => Some(Self::Create),
            Route::Edit(id) => Some(Self::Edit(id)),
            Route::List | Route::Detail(_) => None,
        }
    }

    pub fn is_editing(self) -> bool {
        matches!(self, Self::Edit(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormViewState {
    pub mode: FormMode,
    pub draft: UserDraft,
    pub errors: ValidationErrors,
    /// Edit-mode prefetch of the record being edited.
    pub prefetch: Lifecycle<()>,
    pub submitting: bool,
    pub notification: Option<Notification>,
}

/// Create/edit form. Submitted values, not the server's echo, become the
/// stored record.
pub struct FormController {
    ctx: ViewContext,
    cancel: CancellationToken,
    state: watch::Sender<FormViewState>,
}

impl FormController {
    pub fn new(ctx: ViewContext, mode: FormMode, cancel: CancellationToken) -> Self {
        let (state, _) = watch::channel(FormViewState {
            mode,
            draft: UserDraft::default(),
            errors: ValidationErrors::default(),
            prefetch: Lifecycle::Idle,
            submitting: false,
            notification: None,
        });
        Self { ctx, cancel, state }
    }

    pub fn mode(&self) -> FormMode {
        self.state.borrow().mode
    }

    pub fn subscribe(&self) -> watch::Receiver<FormViewState> {
        self.state.subscribe()
    }

    pub fn view_state(&self) -> FormViewState {
        self.state.borrow().clone()
    }

    pub fn draft(&self) -> UserDraft {
        self.state.borrow().draft.clone()
    }

    /// In edit mode, fills the form from the remote record. A failed prefetch
    /// leaves an empty form that can still be submitted.
    pub async fn activate(&self) -> Result<(), ActionError> {
        let FormMode::Edit(id) = self.mode() else {
            self.state
                .send_modify(|state| state.prefetch = Lifecycle::Ready(()));
            return Ok(());
        };

        self.state
            .send_modify(|state| state.prefetch = Lifecycle::Loading);
        let Some(result) = until_cancelled(&self.cancel, self.ctx.service.get(id)).await else {
            return Err(ActionError::Cancelled);
        };

        match result {
            Ok(user) => {
                self.state.send_modify(|state| {
                    state.draft = user.draft();
                    state.prefetch = Lifecycle::Ready(());
                });
                Ok(())
            }
            Err(err) => {
                warn!(user_id = id.0, error = %err, "form view: prefetch failed");
                let message = err.to_string();
                self.state.send_modify(|state| {
                    state.prefetch = Lifecycle::Failed(message);
                    state.notification = Some(Notification::error("Failed to load user data"));
                });
                Err(err.into())
            }
        }
    }

    /// Sets one field and clears any validation message attached to it.
    pub fn set_field(&self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        self.state.send_modify(|state| {
            field.set(&mut state.draft, value);
            state.errors.clear(field);
        });
    }

    pub fn set_field_by_key(&self, key: &str, value: impl Into<String>) -> Result<(), UnknownField> {
        let field: FormField = key.parse()?;
        self.set_field(field, value);
        Ok(())
    }

    pub fn replace_draft(&self, draft: UserDraft) {
        self.state.send_modify(|state| {
            state.draft = draft;
            state.errors = ValidationErrors::default();
        });
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let draft = self.draft();
        let result = validate_draft(&draft);
        let errors = result.clone().err().unwrap_or_default();
        self.state.send_modify(|state| state.errors = errors);
        result
    }

    /// Validates locally, then writes remotely, then applies the form values
    /// to the store and returns to the list.
    pub async fn submit(&self) -> Result<User, ActionError> {
        self.validate()?;

        let mut busy = false;
        self.state.send_modify(|state| {
            busy = state.submitting;
            state.submitting = true;
        });
        if busy {
            return Err(ActionError::Busy);
        }

        let (mode, draft) = {
            let state = self.state.borrow();
            (state.mode, state.draft.clone())
        };

        let request = async {
            match mode {
                FormMode::Create => self.ctx.service.create(&draft).await,
                FormMode::Edit(id) => self.ctx.service.update(id, &draft).await,
            }
        };
        let Some(result) = until_cancelled(&self.cancel, request).await else {
            self.state.send_modify(|state| state.submitting = false);
            return Err(ActionError::Cancelled);
        };

        let remote = match result {
            Ok(remote) => remote,
            Err(err) => {
                warn!(error = %err, "form view: save failed");
                let message = format!("Failed to save user: {err}");
                self.state.send_modify(|state| {
                    state.submitting = false;
                    state.notification = Some(Notification::error(message));
                });
                return Err(err.into());
            }
        };

        let (user, message) = match mode {
            FormMode::Create => match self.ctx.store.add(draft) {
                Ok(user) => (user, "User created successfully!"),
                Err(err) => {
                    let message = format!("Failed to save user: {err}");
                    self.state.send_modify(|state| {
                        state.submitting = false;
                        state.notification = Some(Notification::error(message));
                    });
                    return Err(err.into());
                }
            },
            FormMode::Edit(id) => {
                let user = draft.with_id(id);
                self.ctx.store.update(user.clone());
                (user, "User updated successfully!")
            }
        };
        debug!(
            remote_id = remote.id.0,
            local_id = user.id.0,
            "form view: kept submitted values over response body"
        );
        info!(user_id = user.id.0, "form view: user saved");

        self.state.send_modify(|state| {
            state.submitting = false;
            state.notification = Some(Notification::success(message));
        });
        self.ctx.navigator.navigate(Route::List);
        Ok(user)
    }

    pub fn cancel(&self) {
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
