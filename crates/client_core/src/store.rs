//! Session-scoped user store.
//!
//! The store owns the list of users shown by every view, the load/error
//! metadata of the last fetch, and the counter used to assign identities to
//! locally created records. State lives in a `watch` channel: views take a
//! receiver (or a [`WatchStream`]) and re-render on every published snapshot.
//!
//! Writes follow a local-wins policy. The demo backend does not persist
//! writes, so after a successful create or update the record kept here is built
//! from the form input, not from the response body.

use std::{collections::HashSet, sync::Arc};

use shared::{
    domain::{User, UserDraft, UserId},
    error::ServiceError,
};
use thiserror::Error;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{lifecycle::until_cancelled, UserService};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListState {
    pub users: Vec<User>,
    pub loading: bool,
    pub error: Option<String>,
    /// Identity handed to the next locally created record.
    pub next_id: UserId,
}

impl Default for UserListState {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            loading: false,
            error: None,
            next_id: UserId(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListStats {
    pub total: usize,
    pub valid_emails: usize,
}

impl UserListState {
    pub fn find(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn stats(&self) -> ListStats {
        ListStats {
            total: self.users.len(),
            valid_emails: self
                .users
                .iter()
                .filter(|user| user.email.contains('@'))
                .count(),
        }
    }
}

/// The local id counter cannot move past `last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("user id {last} leaves no room for new local ids")]
pub struct IdsExhausted {
    pub last: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Ids(#[from] IdsExhausted),
    #[error("load cancelled before the users request completed")]
    Cancelled,
}

#[derive(Clone)]
pub struct UserStore {
    service: Arc<dyn UserService>,
    state: Arc<watch::Sender<UserListState>>,
}

impl UserStore {
    pub fn new(service: Arc<dyn UserService>) -> Self {
        let (state, _) = watch::channel(UserListState::default());
        Self {
            service,
            state: Arc::new(state),
        }
    }

    pub fn service(&self) -> Arc<dyn UserService> {
        Arc::clone(&self.service)
    }

    pub fn subscribe(&self) -> watch::Receiver<UserListState> {
        self.state.subscribe()
    }

    pub fn changes(&self) -> WatchStream<UserListState> {
        WatchStream::new(self.state.subscribe())
    }

    pub fn snapshot(&self) -> UserListState {
        self.state.borrow().clone()
    }

    pub fn users(&self) -> Vec<User> {
        self.state.borrow().users.clone()
    }

    pub fn find(&self, id: UserId) -> Option<User> {
        self.state.borrow().find(id).cloned()
    }

    /// Replaces the list with the remote collection. On failure the previous
    /// list is kept and the message is recorded in `error`. `loading` is
    /// cleared on every exit path; a cancelled load also restores the error
    /// it found.
    pub async fn load(&self, cancel: &CancellationToken) -> Result<usize, LoadError> {
        let mut previous_error = None;
        self.state.send_modify(|state| {
            state.loading = true;
            previous_error = state.error.take();
        });
        info!("user store: loading users");

        let Some(result) = until_cancelled(cancel, self.service.list()).await else {
            self.state.send_modify(|state| {
                state.loading = false;
                state.error = previous_error;
            });
            debug!("user store: load cancelled, keeping previous list");
            return Err(LoadError::Cancelled);
        };

        let fetched = result.map_err(LoadError::from).and_then(|fetched| {
            let users = dedupe_by_id(fetched);
            let next_id = next_id_after(&users)?;
            Ok((users, next_id))
        });

        match fetched {
            Ok((users, next_id)) => {
                let count = users.len();
                self.state.send_modify(|state| {
                    state.users = users;
                    state.next_id = next_id;
                    state.loading = false;
                });
                info!(count, next_id = next_id.0, "user store: users loaded");
                Ok(count)
            }
            Err(err) => {
                let message = err.to_string();
                self.state.send_modify(|state| {
                    state.error = Some(message);
                    state.loading = false;
                });
                warn!(error = %err, "user store: load failed");
                Err(err)
            }
        }
    }

    /// Appends a record built from `draft` under the next local identity.
    /// Never talks to the remote service. Nothing is published when the
    /// counter is exhausted.
    pub fn add(&self, draft: UserDraft) -> Result<User, IdsExhausted> {
        let mut user = draft.with_id(UserId(0));
        let mut exhausted = None;
        self.state.send_if_modified(|state| {
            let Some(after) = state.next_id.0.checked_add(1) else {
                exhausted = Some(IdsExhausted {
                    last: state.next_id,
                });
                return false;
            };
            user.id = state.next_id;
            state.next_id = UserId(after);
            state.users.push(user.clone());
            true
        });
        if let Some(err) = exhausted {
            warn!(error = %err, "user store: add rejected");
            return Err(err);
        }
        debug!(user_id = user.id.0, "user store: added user");
        Ok(user)
    }

    /// Replaces the entry with the same id in place. Returns `false` when no
    /// entry matches, in which case nothing is published.
    pub fn update(&self, user: User) -> bool {
        let id = user.id;
        let updated = self.state.send_if_modified(move |state| {
            match state.users.iter_mut().find(|existing| existing.id == id) {
                Some(slot) => {
                    *slot = user;
                    true
                }
                None => false,
            }
        });
        debug!(user_id = id.0, updated, "user store: update");
        updated
    }

    /// Removes the entry with `id`. Returns `false` when it was absent.
    pub fn delete(&self, id: UserId) -> bool {
        let removed = self.state.send_if_modified(|state| {
            match state.users.iter().position(|user| user.id == id) {
                Some(index) => {
                    state.users.remove(index);
                    true
                }
                None => false,
            }
        });
        debug!(user_id = id.0, removed, "user store: delete");
        removed
    }
}

fn next_id_after(users: &[User]) -> Result<UserId, IdsExhausted> {
    match users.iter().map(|user| user.id).max() {
        None => Ok(UserId(1)),
        Some(last) => last
            .0
            .checked_add(1)
            .map(UserId)
            .ok_or(IdsExhausted { last }),
    }
}

fn dedupe_by_id(users: Vec<User>) -> Vec<User> {
    let mut seen = HashSet::with_capacity(users.len());
    let total = users.len();
    let unique: Vec<User> = users
        .into_iter()
        .filter(|user| seen.insert(user.id))
        .collect();
    if unique.len() != total {
        warn!(
            dropped = total - unique.len(),
            "user store: remote list contained duplicate ids, keeping first occurrence"
        );
    }
    unique
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
