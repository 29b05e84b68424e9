//! User management endpoints

use std::sync::Arc;

use super::require_token;
use crate::api::{ApiClient, ApiError, ApiRequest, Transport};
use crate::models::{UpdateUserRequest, UserFlags, UserFullInfo, UserQuery};

const USERS_PATH: &str = "/web/users";

/// User management repository
///
/// Every update replaces the whole three-part record. Ban/unban/delete/
/// restore copy the caller's record and change a single flag, so they are
/// only as fresh as that copy.
pub struct UserRepository<T> {
    api: Arc<ApiClient<T>>,
}

impl<T> Clone for UserRepository<T> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
        }
    }
}

impl<T: Transport> UserRepository<T> {
    /// Create a repository over a shared client
    pub const fn new(api: Arc<ApiClient<T>>) -> Self {
        Self { api }
    }

    /// The client this repository sends through
    pub const fn api(&self) -> &Arc<ApiClient<T>> {
        &self.api
    }

    /// Fetch one page of users matching `query`
    pub async fn users(&self, query: &UserQuery) -> Result<Vec<UserFullInfo>, ApiError> {
        let token = require_token(self.api.session())?;
        tracing::debug!(?query, "Fetching users");

        let user_name = query
            .user_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let request = ApiRequest::get(USERS_PATH)
            .with_token(token)
            .query("page", query.page)
            .query("limit", query.limit)
            .query_opt("userName", user_name)
            .query_opt("isAdmin", query.is_admin)
            .query_opt("isDeleted", query.is_deleted)
            .query_opt("isBanned", query.is_banned);

        let users = self.api.call::<Vec<UserFullInfo>>(request).await?.data;
        tracing::debug!(count = users.len(), "Fetched users");
        Ok(users)
    }

    /// Replace a user record, returning the server message
    pub async fn update(&self, request: &UpdateUserRequest) -> Result<String, ApiError> {
        let token = require_token(self.api.session())?;
        tracing::debug!(user_id = request.user_req.user_id, "Updating user");

        let request = ApiRequest::put(USERS_PATH).with_token(token).json(request)?;
        self.api.call_no_data(request).await
    }

    /// Submit `user` as edited, with no flag overrides
    pub async fn save(&self, user: &UserFullInfo) -> Result<String, ApiError> {
        self.update(&UpdateUserRequest::from_user(user, UserFlags::default()))
            .await
    }

    /// Ban a user
    pub async fn ban(&self, user: &UserFullInfo) -> Result<String, ApiError> {
        self.set_flags(user, UserFlags {
            is_banned: Some(true),
            ..Default::default()
        })
        .await
    }

    /// Lift a ban
    pub async fn unban(&self, user: &UserFullInfo) -> Result<String, ApiError> {
        self.set_flags(user, UserFlags {
            is_banned: Some(false),
            ..Default::default()
        })
        .await
    }

    /// Soft-delete a user
    pub async fn delete(&self, user: &UserFullInfo) -> Result<String, ApiError> {
        self.set_flags(user, UserFlags {
            is_deleted: Some(true),
            ..Default::default()
        })
        .await
    }

    /// Undo a soft delete
    pub async fn restore(&self, user: &UserFullInfo) -> Result<String, ApiError> {
        self.set_flags(user, UserFlags {
            is_deleted: Some(false),
            ..Default::default()
        })
        .await
    }

    async fn set_flags(&self, user: &UserFullInfo, flags: UserFlags) -> Result<String, ApiError> {
        self.update(&UpdateUserRequest::from_user(user, flags)).await
    }
}
