//! Client core for the user directory: the remote users API adapter, the
//! session-scoped user store, and the controllers behind the list, detail and
//! form views.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    domain::{User, UserDraft, UserId},
    error::{FetchTarget, ServiceError},
};
use tracing::{debug, warn};
use url::Url;

pub mod config;
pub mod lifecycle;
pub mod notification;
pub mod routes;
pub mod store;
pub mod validation;
pub mod views;

pub use config::ClientConfig;
pub use lifecycle::Lifecycle;
pub use notification::{Notification, NotificationKind};
pub use routes::Route;
pub use store::{IdsExhausted, ListStats, LoadError, UserListState, UserStore};
pub use validation::{validate_draft, FormField, ValidationErrors};

/// Remote users API. One attempt per call; failures are tagged with the
/// operation that produced them.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn list(&self) -> Result<Vec<User>, ServiceError>;
    async fn get(&self, id: UserId) -> Result<User, ServiceError>;
    async fn create(&self, draft: &UserDraft) -> Result<User, ServiceError>;
    async fn update(&self, id: UserId, draft: &UserDraft) -> Result<User, ServiceError>;
    async fn delete(&self, id: UserId) -> Result<(), ServiceError>;
}

pub struct HttpUserService {
    http: Client,
    users_url: Url,
}

impl HttpUserService {
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let base_url = config.base_url()?;
        let users_url = base_url.join("users")?;
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { http, users_url })
    }

    pub fn users_url(&self) -> &Url {
        &self.users_url
    }

    fn user_url(&self, id: UserId) -> Url {
        let mut url = self.users_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(&id.to_string());
        }
        url
    }
}

async fn fetch_json<T: DeserializeOwned>(request: RequestBuilder) -> reqwest::Result<T> {
    request.send().await?.error_for_status()?.json().await
}

fn log_failure(operation: &'static str, err: ServiceError) -> ServiceError {
    warn!(operation, error = %err, "users api: request failed");
    err
}

#[async_trait]
impl UserService for HttpUserService {
    async fn list(&self) -> Result<Vec<User>, ServiceError> {
        debug!(url = %self.users_url, "users api: list");
        fetch_json(self.http.get(self.users_url.clone()))
            .await
            .map_err(|err| {
                log_failure(
                    "list",
                    ServiceError::fetch(FetchTarget::Users, err.to_string()),
                )
            })
    }

    async fn get(&self, id: UserId) -> Result<User, ServiceError> {
        let url = self.user_url(id);
        debug!(%url, user_id = id.0, "users api: get");
        fetch_json(self.http.get(url))
            .await
            .map_err(|err| {
                log_failure(
                    "get",
                    ServiceError::fetch(FetchTarget::User, err.to_string()),
                )
            })
    }

    async fn create(&self, draft: &UserDraft) -> Result<User, ServiceError> {
        debug!(url = %self.users_url, "users api: create");
        fetch_json(self.http.post(self.users_url.clone()).json(draft))
            .await
            .map_err(|err| log_failure("create", ServiceError::create(err.to_string())))
    }

    async fn update(&self, id: UserId, draft: &UserDraft) -> Result<User, ServiceError> {
        let url = self.user_url(id);
        debug!(%url, user_id = id.0, "users api: update");
        fetch_json(self.http.put(url).json(draft))
            .await
            .map_err(|err| log_failure("update", ServiceError::update(err.to_string())))
    }

    async fn delete(&self, id: UserId) -> Result<(), ServiceError> {
        let url = self.user_url(id);
        debug!(%url, user_id = id.0, "users api: delete");
        let result = async {
            self.http.delete(url).send().await?.error_for_status()?;
            Ok::<_, reqwest::Error>(())
        }
        .await;
        result.map_err(|err| log_failure("delete", ServiceError::delete(err.to_string())))
    }
}

#[cfg(test)]
#[path = "tests/fake_service.rs"]
pub(crate) mod fake_service;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
