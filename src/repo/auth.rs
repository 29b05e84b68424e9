//! Login / logout

use std::sync::Arc;

use crate::api::{ApiClient, ApiError, ApiRequest, Transport};
use crate::models::{LoginData, LoginRequest};

const LOGIN_PATH: &str = "/web/users/login";

/// Authentication repository
pub struct AuthRepository<T> {
    api: Arc<ApiClient<T>>,
}

impl<T> Clone for AuthRepository<T> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
        }
    }
}

impl<T: Transport> AuthRepository<T> {
    /// Create a repository over a shared client
    pub const fn new(api: Arc<ApiClient<T>>) -> Self {
        Self { api }
    }

    /// The client this repository sends through
    pub const fn api(&self) -> &Arc<ApiClient<T>> {
        &self.api
    }

    /// Log in, persisting token and username on success
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginData, ApiError> {
        tracing::debug!(username, "Logging in");
        let request = ApiRequest::post(LOGIN_PATH).json(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })?;

        let envelope = self.api.call::<LoginData>(request).await?;
        let session = self.api.session();
        session.save_token(&envelope.data.access_token);
        session.save_username(username);
        tracing::info!(username, "Logged in");

        Ok(envelope.data)
    }

    /// Forget the stored session
    pub fn logout(&self) {
        self.api.session().clear();
    }

    /// Whether a non-blank token is stored
    pub fn is_logged_in(&self) -> bool {
        self.api.session().is_logged_in()
    }

    /// Username of the stored session
    pub fn current_user(&self) -> Option<String> {
        self.api.session().username()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::api::mock::MockTransport;
    use crate::auth::TokenStore;

    fn repo() -> AuthRepository<MockTransport> {
        let api = ApiClient::new(MockTransport::new(), Arc::new(TokenStore::in_memory()));
        AuthRepository::new(Arc::new(api))
    }

    #[tokio::test]
    async fn test_login_persists_token() {
        let repo = repo();
        repo.api.transport().respond(
            r#"{"code":"200","msg":"ok","data":{"access_token":"abc","expires_in":"3600"}}"#,
        );

        let data = repo.login("admin", "pw").await.unwrap();
        assert_eq!(data.access_token, "abc");
        assert!(repo.is_logged_in());
        assert_eq!(repo.api.session().token().as_deref(), Some("abc"));
        assert_eq!(repo.current_user().as_deref(), Some("admin"));

        let request = repo.api.transport().last_request().unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, LOGIN_PATH);
        assert!(request.token.is_none());
        assert_eq!(request.body.unwrap()["username"], "admin");
    }

    #[tokio::test]
    async fn test_rejected_login_stores_nothing() {
        let repo = repo();
        repo.api
            .transport()
            .respond(r#"{"code":"401","msg":"密码错误","data":null}"#);

        let err = repo.login("admin", "bad").await.unwrap_err();
        assert_eq!(err.user_message("登录失败"), "密码错误");
        assert!(!repo.is_logged_in());
        assert!(repo.current_user().is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let repo = repo();
        repo.api.session().save_token("abc");
        repo.api.session().save_username("admin");

        repo.logout();
        assert!(!repo.is_logged_in());
        assert!(repo.current_user().is_none());
    }
}
