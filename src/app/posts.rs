//! Post moderation screen controller

use super::effects::{Effect, EffectQueue};
use super::list::{Fetch, FetchMode, ListState, PagedList};
use crate::api::{ApiError, Transport};
use crate::config::Config;
use crate::models::{CheckStatus, FreshNews, PostQuery, Verdict};
use crate::repo::PostRepository;

const LOAD_FAILED: &str = "加载帖子失败";
const REFRESH_FAILED: &str = "刷新失败";
const REFRESHED: &str = "刷新成功";

/// User input on the moderation screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostIntent {
    LoadPosts,
    RefreshPosts,
    LoadMorePosts,
    /// Switch status tab (0 pending, 1 approved, 2 rejected)
    SelectTab(usize),
    ApprovePost(FreshNews),
    RejectPost(FreshNews),
    OpenPreview(FreshNews),
    ClosePreview,
    ClearError,
}

/// Work the controller wants done
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostCommand {
    /// Fetch one page; `query` is fixed when the fetch is issued
    Fetch { fetch: Fetch, query: PostQuery },
    /// Review one submission
    Review { post: FreshNews, verdict: Verdict },
}

/// Result of a [`PostCommand`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    Fetched {
        fetch: Fetch,
        result: Result<Vec<FreshNews>, ApiError>,
    },
    Reviewed {
        post: FreshNews,
        verdict: Verdict,
        result: Result<String, ApiError>,
    },
}

/// Run a command against the repository
pub async fn execute<T: Transport>(
    repo: &PostRepository<T>,
    command: PostCommand,
) -> PostOutcome {
    match command {
        PostCommand::Fetch { fetch, query } => PostOutcome::Fetched {
            fetch,
            result: repo.posts(&query).await,
        },
        PostCommand::Review { post, verdict } => {
            let result = repo.review(post.fresh_news_check_id, verdict).await;
            PostOutcome::Reviewed {
                post,
                verdict,
                result,
            }
        }
    }
}

const fn review_toast(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Approve => "已通过审核",
        Verdict::Reject => "已拒绝",
    }
}

const fn review_failed(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Approve => "审核失败",
        Verdict::Reject => "操作失败",
    }
}

/// Moderation screen state
#[derive(Debug)]
pub struct PostController {
    list: PagedList<FreshNews>,
    tab: usize,
    preview: Option<FreshNews>,
    effects: EffectQueue,
}

impl PostController {
    pub fn new(page_size: u32, effect_capacity: usize) -> Self {
        Self {
            list: PagedList::new(page_size),
            tab: 0,
            preview: None,
            effects: EffectQueue::new(effect_capacity),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.post_page_size, config.effect_capacity)
    }

    /// Start on status tab `tab`; unknown tabs are ignored
    pub fn with_tab(mut self, tab: usize) -> Self {
        if tab < CheckStatus::tabs().len() {
            self.tab = tab;
        }
        self
    }

    pub const fn state(&self) -> &ListState<FreshNews> {
        self.list.state()
    }

    pub fn posts(&self) -> &[FreshNews] {
        self.list.items()
    }

    pub const fn selected_tab(&self) -> usize {
        self.tab
    }

    pub fn status(&self) -> CheckStatus {
        CheckStatus::from_tab(self.tab)
    }

    /// Submission shown in the preview dialog
    pub const fn preview(&self) -> Option<&FreshNews> {
        self.preview.as_ref()
    }

    /// Error from the last failed fetch
    ///
    /// Failed reviews only raise [`Effect::Error`] and leave this alone.
    pub fn error_message(&self) -> Option<&str> {
        self.list.state().error_message()
    }

    pub const fn effects(&mut self) -> &mut EffectQueue {
        &mut self.effects
    }

    /// Whether a view showing `last_visible` should raise `LoadMorePosts`
    pub fn should_load_more(&self, last_visible: usize) -> bool {
        let state = self.list.state();
        super::list::should_load_more(
            last_visible,
            state.items().len(),
            state.has_more(),
            state.is_loading(),
        )
    }

    fn fetch(&self, fetch: Fetch) -> PostCommand {
        PostCommand::Fetch {
            fetch,
            query: PostQuery {
                page: fetch.page,
                page_size: fetch.page_size,
                check_status: Some(self.status()),
            },
        }
    }

    fn load(&mut self) -> PostCommand {
        let fetch = self.list.begin_load();
        self.fetch(fetch)
    }

    fn refresh(&mut self) -> PostCommand {
        let fetch = self.list.begin_refresh();
        self.fetch(fetch)
    }

    /// Handle an intent, returning the command to execute, if any
    pub fn dispatch(&mut self, intent: PostIntent) -> Option<PostCommand> {
        match intent {
            PostIntent::LoadPosts => Some(self.load()),
            PostIntent::RefreshPosts => Some(self.refresh()),
            PostIntent::LoadMorePosts => {
                let fetch = self.list.begin_load_more()?;
                Some(self.fetch(fetch))
            }
            PostIntent::SelectTab(tab) => {
                if tab == self.tab || tab >= CheckStatus::tabs().len() {
                    return None;
                }
                tracing::debug!(tab, "Switching moderation tab");
                self.tab = tab;
                Some(self.load())
            }
            PostIntent::ApprovePost(post) => Some(PostCommand::Review {
                post,
                verdict: Verdict::Approve,
            }),
            PostIntent::RejectPost(post) => Some(PostCommand::Review {
                post,
                verdict: Verdict::Reject,
            }),
            PostIntent::OpenPreview(post) => {
                self.preview = Some(post);
                None
            }
            PostIntent::ClosePreview => {
                self.preview = None;
                None
            }
            PostIntent::ClearError => {
                self.list.clear_error();
                None
            }
        }
    }

    /// Fold a finished command back into the state
    ///
    /// A successful review returns the refresh it triggers.
    pub fn apply(&mut self, outcome: PostOutcome) -> Option<PostCommand> {
        match outcome {
            PostOutcome::Fetched { fetch, result } => {
                self.settle(fetch, result);
                None
            }
            PostOutcome::Reviewed {
                post,
                verdict,
                result,
            } => match result {
                Ok(_) => {
                    let check_id = post.fresh_news_check_id;
                    tracing::info!(check_id, ?verdict, "Post reviewed");
                    if self
                        .preview
                        .as_ref()
                        .is_some_and(|p| p.fresh_news_check_id == check_id)
                    {
                        self.preview = None;
                    }
                    self.effects
                        .push(Effect::Toast(review_toast(verdict).to_string()));
                    Some(self.refresh())
                }
                Err(e) => {
                    let check_id = post.fresh_news_check_id;
                    tracing::warn!(check_id, error = %e, "Review failed");
                    self.effects
                        .push(Effect::Error(e.user_message(review_failed(verdict))));
                    None
                }
            },
        }
    }

    fn settle(&mut self, fetch: Fetch, result: Result<Vec<FreshNews>, ApiError>) {
        match result {
            Ok(posts) => {
                let count = posts.len();
                if !self.list.succeed(&fetch, posts) {
                    return;
                }
                tracing::debug!(page = fetch.page, count, "Posts loaded");
                match fetch.mode {
                    FetchMode::Initial => self.effects.push(Effect::ScrollToTop),
                    FetchMode::Refresh => {
                        self.effects.push(Effect::Toast(REFRESHED.to_string()));
                    }
                    FetchMode::More => {}
                }
            }
            Err(e) => {
                let prefix = match fetch.mode {
                    FetchMode::Refresh => REFRESH_FAILED,
                    FetchMode::Initial | FetchMode::More => LOAD_FAILED,
                };
                let message = e.user_message(prefix);
                if self.list.fail(&fetch, message.clone()) {
                    tracing::warn!(page = fetch.page, error = %e, "Loading posts failed");
                    self.effects.push(Effect::Error(message));
                }
            }
        }
    }

    /// Dispatch an intent and run every resulting command to completion
    pub async fn run<T: Transport>(&mut self, repo: &PostRepository<T>, intent: PostIntent) {
        let mut next = self.dispatch(intent);
        while let Some(command) = next {
            let outcome = execute(repo, command).await;
            next = self.apply(outcome);
        }
    }
}

impl Default for PostController {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use crate::api::{ApiClient, Method};
    use crate::auth::TokenStore;
    use std::sync::Arc;

    fn repo() -> PostRepository<MockTransport> {
        let session = Arc::new(TokenStore::in_memory());
        session.save_token("tok");
        PostRepository::new(Arc::new(ApiClient::new(MockTransport::new(), session)))
    }

    fn post(check_id: i64, status: i32) -> FreshNews {
        FreshNews {
            fresh_news_check_id: check_id,
            title: format!("post {check_id}"),
            check_status: CheckStatus::from(status),
            ..Default::default()
        }
    }

    fn page_json(ids: std::ops::Range<i64>, status: i32) -> String {
        let posts: Vec<FreshNews> = ids.map(|id| post(id, status)).collect();
        serde_json::json!({"code": "200", "msg": "ok", "data": posts}).to_string()
    }

    fn loaded(page_size: u32, ids: std::ops::Range<i64>) -> PostController {
        let mut controller = PostController::new(page_size, 16);
        let fetch = next_fetch(&mut controller, PostIntent::LoadPosts).0;
        controller.apply(PostOutcome::Fetched {
            fetch,
            result: Ok(ids.map(|id| post(id, 0)).collect()),
        });
        controller.effects().drain();
        controller
    }

    fn next_fetch(controller: &mut PostController, intent: PostIntent) -> (Fetch, PostQuery) {
        match controller.dispatch(intent) {
            Some(PostCommand::Fetch { fetch, query }) => (fetch, query),
            other => panic!("expected a fetch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_sends_tab_filter() {
        let repo = repo();
        repo_transport(&repo).respond(&page_json(0..10, 0));
        let mut controller = PostController::new(10, 16);

        controller.run(&repo, PostIntent::LoadPosts).await;

        let request = repo_transport(&repo).last_request().unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.query_value("page"), Some("1"));
        assert_eq!(request.query_value("pageSize"), Some("10"));
        assert_eq!(request.query_value("checkStatus"), Some("0"));
        assert_eq!(controller.posts().len(), 10);
        assert!(controller.state().has_more());
        assert_eq!(controller.effects().drain(), vec![Effect::ScrollToTop]);
    }

    #[test]
    fn test_short_page_ends_pagination() {
        let mut controller = loaded(10, 0..10);
        let (fetch, query) = next_fetch(&mut controller, PostIntent::LoadMorePosts);
        assert_eq!(query.page, 2);
        controller.apply(PostOutcome::Fetched {
            fetch,
            result: Ok((10..13).map(|id| post(id, 0)).collect()),
        });

        assert_eq!(controller.posts().len(), 13);
        assert!(!controller.state().has_more());
        assert!(controller.dispatch(PostIntent::LoadMorePosts).is_none());
        assert!(!controller.should_load_more(12));
    }

    #[test]
    fn test_load_more_while_loading_is_noop() {
        let mut controller = loaded(10, 0..10);
        assert!(controller.dispatch(PostIntent::LoadMorePosts).is_some());
        let before = controller.state().clone();
        assert!(controller.dispatch(PostIntent::LoadMorePosts).is_none());
        assert_eq!(controller.state(), &before);
        assert!(!controller.should_load_more(9));
    }

    #[tokio::test]
    async fn test_refresh_replaces_list() {
        let repo = repo();
        let transport = repo_transport(&repo);
        transport.respond(&page_json(0..10, 0));
        transport.respond(&page_json(10..20, 0));
        transport.respond(&page_json(100..102, 0));

        let mut controller = PostController::new(10, 16);
        controller.run(&repo, PostIntent::LoadPosts).await;
        controller.run(&repo, PostIntent::LoadMorePosts).await;
        assert_eq!(controller.posts().len(), 20);
        assert_eq!(controller.state().current_page(), 2);

        controller.run(&repo, PostIntent::RefreshPosts).await;
        let ids: Vec<i64> = controller
            .posts()
            .iter()
            .map(|p| p.fresh_news_check_id)
            .collect();
        assert_eq!(ids, vec![100, 101]);
        assert_eq!(controller.state().current_page(), 1);
        assert_eq!(transport.last_request().unwrap().query_value("page"), Some("1"));
        assert_eq!(
            controller.effects().drain().last(),
            Some(&Effect::Toast(REFRESHED.to_string()))
        );
    }

    #[tokio::test]
    async fn test_approve_toasts_and_refreshes() {
        let repo = repo();
        let transport = repo_transport(&repo);
        transport.respond(r#"{"code":"200","msg":"ok"}"#);
        transport.respond(&page_json(0..3, 0));

        let mut controller = loaded(10, 0..5);
        controller.run(&repo, PostIntent::ApprovePost(post(42, 0))).await;

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, Method::Put);
        assert_eq!(requests[0].query_value("freshNewsCheckId"), Some("42"));
        assert_eq!(requests[0].query_value("checkStatus"), Some("1"));
        assert_eq!(requests[1].method, Method::Get);
        assert_eq!(requests[1].query_value("page"), Some("1"));

        let effects = controller.effects().drain();
        assert_eq!(effects[0], Effect::Toast("已通过审核".to_string()));
        assert_eq!(controller.posts().len(), 3);
    }

    #[tokio::test]
    async fn test_approve_accepts_payload_in_reply() {
        let repo = repo();
        let transport = repo_transport(&repo);
        transport.respond(r#"{"code":"200","msg":"ok","data":{}}"#);
        transport.respond(&page_json(0..2, 0));

        let mut controller = loaded(10, 0..5);
        controller.run(&repo, PostIntent::ApprovePost(post(7, 0))).await;

        assert_eq!(transport.request_count(), 2);
        assert_eq!(transport.last_request().unwrap().method, Method::Get);
        assert_eq!(
            controller.effects().drain(),
            vec![
                Effect::Toast("已通过审核".to_string()),
                Effect::Toast(REFRESHED.to_string()),
            ]
        );
        assert_eq!(controller.posts().len(), 2);
    }

    #[tokio::test]
    async fn test_reject_failure_keeps_list() {
        let repo = repo();
        repo_transport(&repo).fail(ApiError::Transport("timeout".to_string()));

        let mut controller = loaded(10, 0..5);
        controller.dispatch(PostIntent::OpenPreview(post(3, 0)));
        let before = controller.state().clone();
        controller.run(&repo, PostIntent::RejectPost(post(3, 0))).await;

        assert_eq!(repo_transport(&repo).request_count(), 1);
        assert_eq!(controller.state(), &before);
        assert!(controller.error_message().is_none());
        assert_eq!(controller.preview().map(|p| p.fresh_news_check_id), Some(3));
        assert_eq!(
            controller.effects().drain(),
            vec![Effect::Error("操作失败: 网络错误: timeout".to_string())]
        );
    }

    #[tokio::test]
    async fn test_approve_server_error_shows_raw_message() {
        let repo = repo();
        repo_transport(&repo).respond(r#"{"code":"409","msg":"已被审核"}"#);

        let mut controller = loaded(10, 0..5);
        controller.run(&repo, PostIntent::ApprovePost(post(3, 0))).await;

        assert!(controller.error_message().is_none());
        assert_eq!(
            controller.effects().drain(),
            vec![Effect::Error("已被审核".to_string())]
        );
    }

    #[test]
    fn test_server_error_keeps_items() {
        let mut controller = loaded(10, 0..4);
        let fetch = next_fetch(&mut controller, PostIntent::LoadPosts).0;
        controller.apply(PostOutcome::Fetched {
            fetch,
            result: Err(ApiError::Server {
                code: "500".to_string(),
                msg: "db error".to_string(),
            }),
        });

        assert_eq!(controller.error_message(), Some("db error"));
        assert!(!controller.state().is_loading());
        assert_eq!(controller.posts().len(), 4);
        assert_eq!(
            controller.effects().drain(),
            vec![Effect::Error("db error".to_string())]
        );

        controller.dispatch(PostIntent::ClearError);
        assert!(controller.error_message().is_none());
        assert_eq!(controller.posts().len(), 4);
    }

    #[test]
    fn test_tab_switch_drops_stale_page() {
        let mut controller = loaded(10, 0..10);

        let stale = next_fetch(&mut controller, PostIntent::LoadMorePosts).0;
        let (fresh, query) = next_fetch(&mut controller, PostIntent::SelectTab(2));
        assert_eq!(query.check_status, Some(CheckStatus::Rejected));
        assert_eq!(query.page, 1);

        // the fresh page lands first, then the old page-2 response arrives
        controller.apply(PostOutcome::Fetched {
            fetch: fresh,
            result: Ok((50..52).map(|id| post(id, 2)).collect()),
        });
        controller.apply(PostOutcome::Fetched {
            fetch: stale,
            result: Ok((10..20).map(|id| post(id, 0)).collect()),
        });

        assert_eq!(controller.posts().len(), 2);
        assert!(
            controller
                .posts()
                .iter()
                .all(|p| p.check_status == CheckStatus::Rejected)
        );
        assert_eq!(controller.state().current_page(), 1);
    }

    #[test]
    fn test_stale_page_arriving_before_tab_page_is_dropped() {
        let mut controller = loaded(10, 0..10);
        let stale = next_fetch(&mut controller, PostIntent::LoadMorePosts).0;
        let fresh = next_fetch(&mut controller, PostIntent::SelectTab(1)).0;

        controller.apply(PostOutcome::Fetched {
            fetch: stale,
            result: Ok((10..20).map(|id| post(id, 0)).collect()),
        });
        assert!(controller.state().is_loading());
        assert_eq!(controller.posts().len(), 10);
        assert!(controller.effects().is_empty());

        controller.apply(PostOutcome::Fetched {
            fetch: fresh,
            result: Ok((60..63).map(|id| post(id, 1)).collect()),
        });
        assert!(!controller.state().is_loading());
        assert_eq!(controller.posts().len(), 3);
        assert!(
            controller
                .posts()
                .iter()
                .all(|p| p.check_status == CheckStatus::Approved)
        );
        assert_eq!(controller.effects().drain(), vec![Effect::ScrollToTop]);
    }

    #[tokio::test]
    async fn test_start_tab_applies_to_first_load() {
        let repo = repo();
        repo_transport(&repo).respond(&page_json(0..1, 2));

        let mut controller = PostController::new(10, 16).with_tab(2);
        assert_eq!(controller.selected_tab(), 2);
        controller.run(&repo, PostIntent::LoadPosts).await;

        assert_eq!(repo_transport(&repo).request_count(), 1);
        let request = repo_transport(&repo).last_request().unwrap();
        assert_eq!(request.query_value("checkStatus"), Some("2"));
        assert_eq!(PostController::default().with_tab(9).selected_tab(), 0);
    }

    #[test]
    fn test_same_or_unknown_tab_is_noop() {
        let mut controller = loaded(10, 0..3);
        assert!(controller.dispatch(PostIntent::SelectTab(0)).is_none());
        assert!(controller.dispatch(PostIntent::SelectTab(7)).is_none());
        assert_eq!(controller.selected_tab(), 0);
    }

    #[test]
    fn test_preview_open_close() {
        let mut controller = PostController::default();
        controller.dispatch(PostIntent::OpenPreview(post(9, 0)));
        assert_eq!(controller.preview().map(|p| p.fresh_news_check_id), Some(9));
        controller.dispatch(PostIntent::ClosePreview);
        assert!(controller.preview().is_none());
    }

    fn repo_transport(repo: &PostRepository<MockTransport>) -> &MockTransport {
        repo.api().transport()
    }
}
