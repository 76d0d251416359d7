//! View controllers: one per screen, each driving a single request lifecycle
//! against the store and the remote service.
//!
//! Controllers publish their view-local state through a `watch` channel and
//! take `&self`, so an owner can share one behind an `Arc`, keep an action
//! running, and tear the view down with [`close`](ListController::close)
//! while a request is still in flight. A closed controller drops late results:
//! the store is not mutated, nothing is navigated to and no notification is
//! raised.

use std::sync::Arc;

use shared::error::ServiceError;
use thiserror::Error;

use crate::{
    routes::Route,
    store::{IdsExhausted, UserStore},
    validation::ValidationErrors,
    UserService,
};

pub mod detail;
pub mod form;
pub mod list;

pub use detail::{DetailController, DetailViewState};
pub use form::{FormController, FormMode, FormViewState};
pub use list::{ListController, ListViewState};

pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this user?";

/// Synchronous yes/no prompt shown before destructive actions.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Route sink owned by the router.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Ids(#[from] IdsExhausted),
    #[error("a submit is already in progress")]
    Busy,
    #[error("view closed before the request completed")]
    Cancelled,
}

/// Collaborators shared by every controller of one application session.
#[derive(Clone)]
pub struct ViewContext {
    pub store: UserStore,
    pub service: Arc<dyn UserService>,
    pub confirm: Arc<dyn Confirm>,
    pub navigator: Arc<dyn Navigator>,
}

impl ViewContext {
    pub fn new(
        store: UserStore,
        confirm: Arc<dyn Confirm>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            service: store.service(),
            store,
            confirm,
            navigator,
        }
    }
}

#[cfg(test)]
#[path = "../tests/views_tests.rs"]
mod tests;
