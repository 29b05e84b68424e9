//! Content moderation endpoints

use std::sync::Arc;

use super::require_token;
use crate::api::{ApiClient, ApiError, ApiRequest, Transport};
use crate::models::{FreshNews, PostQuery, Verdict};

const LIST_PATH: &str = "/web/fresh_news/check/image_query";
const REVIEW_PATH: &str = "/web/fresh_news/check/image";

/// Moderation repository
pub struct PostRepository<T> {
    api: Arc<ApiClient<T>>,
}

impl<T> Clone for PostRepository<T> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
        }
    }
}

impl<T: Transport> PostRepository<T> {
    /// Create a repository over a shared client
    pub const fn new(api: Arc<ApiClient<T>>) -> Self {
        Self { api }
    }

    /// The client this repository sends through
    pub const fn api(&self) -> &Arc<ApiClient<T>> {
        &self.api
    }

    /// Fetch one page of submissions
    pub async fn posts(&self, query: &PostQuery) -> Result<Vec<FreshNews>, ApiError> {
        let token = require_token(self.api.session())?;
        tracing::debug!(?query, "Fetching posts");

        let request = ApiRequest::get(LIST_PATH)
            .with_token(token)
            .query("page", query.page)
            .query("pageSize", query.page_size)
            .query_opt("checkStatus", query.check_status.map(|s| s.code()));

        let posts = self.api.call::<Vec<FreshNews>>(request).await?.data;
        tracing::debug!(count = posts.len(), "Fetched posts");
        Ok(posts)
    }

    /// Record a moderation decision, returning the server message
    pub async fn review(&self, check_id: i64, verdict: Verdict) -> Result<String, ApiError> {
        let token = require_token(self.api.session())?;
        tracing::debug!(check_id, ?verdict, "Reviewing post");

        let request = ApiRequest::put(REVIEW_PATH)
            .with_token(token)
            .query("freshNewsCheckId", check_id)
            .query("checkStatus", verdict.status().code());

        self.api.call_no_data(request).await
    }

    /// Approve a submission
    pub async fn approve(&self, check_id: i64) -> Result<String, ApiError> {
        self.review(check_id, Verdict::Approve).await
    }

    /// Reject a submission
    pub async fn reject(&self, check_id: i64) -> Result<String, ApiError> {
        self.review(check_id, Verdict::Reject).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::api::mock::MockTransport;
    use crate::auth::TokenStore;
    use crate::models::CheckStatus;

    fn repo(logged_in: bool) -> PostRepository<MockTransport> {
        let session = TokenStore::in_memory();
        if logged_in {
            session.save_token("tok");
        }
        let api = ApiClient::new(MockTransport::new(), Arc::new(session));
        PostRepository::new(Arc::new(api))
    }

    #[tokio::test]
    async fn test_list_sends_token_and_paging() {
        let repo = repo(true);
        repo.api.transport().respond(
            r#"{"code":"200","msg":"ok",
                "data":[{"freshNewsCheckId":1,"title":"a","checkStatus":1}]}"#,
        );

        let query = PostQuery {
            page: 3,
            page_size: 10,
            check_status: Some(CheckStatus::Approved),
        };
        let posts = repo.posts(&query).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].check_status, CheckStatus::Approved);

        let request = repo.api.transport().last_request().unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, LIST_PATH);
        assert_eq!(request.token.as_deref(), Some("tok"));
        assert_eq!(request.query_value("page"), Some("3"));
        assert_eq!(request.query_value("pageSize"), Some("10"));
        assert_eq!(request.query_value("checkStatus"), Some("1"));
    }

    #[tokio::test]
    async fn test_status_filter_is_optional() {
        let repo = repo(true);
        repo.api.transport().respond(r#"{"code":"200","msg":"ok","data":[]}"#);
        let query = PostQuery {
            check_status: None,
            ..Default::default()
        };
        repo.posts(&query).await.unwrap();
        let request = repo.api.transport().last_request().unwrap();
        assert!(request.query_value("checkStatus").is_none());
    }

    #[tokio::test]
    async fn test_review_codes() {
        let repo = repo(true);
        repo.api.transport().respond(r#"{"code":"200","msg":"ok","data":{}}"#);
        repo.api.transport().respond(r#"{"code":"200","msg":"rejected"}"#);

        assert_eq!(repo.approve(42).await.unwrap(), "ok");
        assert_eq!(repo.reject(43).await.unwrap(), "rejected");

        let requests = repo.api.transport().requests();
        assert_eq!(requests[0].method, Method::Put);
        assert_eq!(requests[0].path, REVIEW_PATH);
        assert_eq!(requests[0].query_value("freshNewsCheckId"), Some("42"));
        assert_eq!(requests[0].query_value("checkStatus"), Some("1"));
        assert_eq!(requests[1].query_value("checkStatus"), Some("2"));
    }

    #[test]
    fn test_no_token_means_no_request() {
        let repo = repo(false);
        let listed = tokio_test::block_on(repo.posts(&PostQuery::default()));
        assert_eq!(listed.unwrap_err(), ApiError::NotLoggedIn);
        let reviewed = tokio_test::block_on(repo.approve(1));
        assert_eq!(reviewed.unwrap_err(), ApiError::NotLoggedIn);
        assert_eq!(repo.api.transport().request_count(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_is_a_result() {
        let repo = repo(true);
        repo.api
            .transport()
            .fail(ApiError::Transport("connection refused".to_string()));
        let err = repo.posts(&PostQuery::default()).await.unwrap_err();
        assert_eq!(
            err.user_message("加载帖子失败"),
            "加载帖子失败: 网络错误: connection refused"
        );
    }
}
