//! Screen controllers
//!
//! Each screen keeps its state in a controller that turns intents into
//! commands, lets a repository execute them, and folds the outcomes back
//! in. Controllers never await anything themselves:
//!
//! ```text
//!  intent ──▶ dispatch ──▶ Command ──▶ execute(repo) ──▶ Outcome ──▶ apply ──┐
//!                                          ▲                                 │
//!                                          └──── follow-up (refresh) ◀───────┘
//! ```
//!
//! `run` chains those steps for callers that handle one intent at a time.
//! Callers that overlap requests drive the steps themselves; stale fetch
//! results are dropped by ticket, see [`list`].

mod effects;
pub mod list;
mod login;
mod posts;
mod users;

pub use effects::{Effect, EffectQueue};
pub use list::{Fetch, FetchMode, ListState, Page, PagedList, should_load_more};
pub use login::{LoginCommand, LoginController, LoginIntent, LoginOutcome, LoginPhase};
pub use posts::{PostCommand, PostController, PostIntent, PostOutcome};
pub use users::{
    UserAction, UserCommand, UserController, UserEdit, UserFilters, UserIntent, UserOutcome,
};

/// Run one login command
pub use login::execute as execute_login;
/// Run one moderation command
pub use posts::execute as execute_post;
/// Run one user management command
pub use users::execute as execute_user;

use anyhow::Result;
use std::sync::Arc;

use crate::api::{ApiClient, HttpTransport, Transport};
use crate::auth::TokenStore;
use crate::config::Config;
use crate::repo::{AuthRepository, PostRepository, UserRepository};

/// Repositories sharing one client and one session
pub struct Console<T> {
    pub auth: AuthRepository<T>,
    pub posts: PostRepository<T>,
    pub users: UserRepository<T>,
}

impl<T: Transport> Console<T> {
    /// Wire all repositories over `transport`
    pub fn new(transport: T, session: Arc<TokenStore>) -> Self {
        let api = Arc::new(ApiClient::new(transport, session));
        Self {
            auth: AuthRepository::new(Arc::clone(&api)),
            posts: PostRepository::new(Arc::clone(&api)),
            users: UserRepository::new(api),
        }
    }

    /// The session every repository reads its token from
    pub fn session(&self) -> &Arc<TokenStore> {
        self.auth.api().session()
    }
}

impl Console<HttpTransport> {
    /// Connect to the configured server using the stored session
    pub fn open(config: &Config) -> Result<Self> {
        let session = Arc::new(TokenStore::open()?);
        tracing::debug!(
            base_url = %config.base_url,
            logged_in = session.is_logged_in(),
            "Opening console"
        );
        Ok(Self::new(HttpTransport::from_config(config), session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;

    #[tokio::test]
    async fn test_login_flow_stores_session() {
        let console = Console::new(MockTransport::new(), Arc::new(TokenStore::in_memory()));
        console.auth.api().transport().respond(
            r#"{"code":"200","msg":"ok","data":{"access_token":"abc","expires_in":"3600"}}"#,
        );

        let mut login = LoginController::default();
        login.dispatch(LoginIntent::UpdateUsername("admin".to_string()));
        login.dispatch(LoginIntent::UpdatePassword("secret".to_string()));
        login.run(&console.auth, LoginIntent::Login).await;

        assert!(login.is_logged_in());
        assert_eq!(login.effects().drain(), vec![Effect::NavigateHome]);
        assert!(console.session().is_logged_in());
        assert_eq!(console.session().token().as_deref(), Some("abc"));
        assert_eq!(console.session().username().as_deref(), Some("admin"));
    }

    #[tokio::test]
    async fn test_logged_out_console_never_hits_network() {
        let console = Console::new(MockTransport::new(), Arc::new(TokenStore::in_memory()));
        let mut posts = PostController::default();
        let mut users = UserController::default();

        posts.run(&console.posts, PostIntent::LoadPosts).await;
        users.run(&console.users, UserIntent::LoadUsers).await;

        assert_eq!(console.auth.api().transport().request_count(), 0);
        assert_eq!(posts.error_message(), Some("加载帖子失败: 未登录"));
        assert_eq!(users.error_message(), Some("加载用户失败: 未登录"));
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let session = Arc::new(TokenStore::in_memory());
        session.save_token("abc");
        session.save_username("admin");
        let console = Console::new(MockTransport::new(), Arc::clone(&session));

        console.auth.logout();
        assert!(!session.is_logged_in());
        assert!(console.auth.current_user().is_none());
    }
}
