//! Moderation item ("fresh news" submission) model

use serde::{Deserialize, Serialize};

/// Review status of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum CheckStatus {
    /// Waiting for a moderator
    #[default]
    Pending,
    /// Approved and visible
    Approved,
    /// Rejected
    Rejected,
    /// A code this client does not know about
    Unknown(i32),
}

impl CheckStatus {
    /// Statuses in moderation tab order
    pub const fn tabs() -> &'static [Self] {
        &[Self::Pending, Self::Approved, Self::Rejected]
    }

    /// Status shown by a moderation tab; out-of-range tabs show pending
    pub fn from_tab(index: usize) -> Self {
        Self::tabs().get(index).copied().unwrap_or_default()
    }

    /// Wire code (0 pending, 1 approved, 2 rejected)
    pub const fn code(&self) -> i32 {
        match self {
            Self::Pending => 0,
            Self::Approved => 1,
            Self::Rejected => 2,
            Self::Unknown(code) => *code,
        }
    }

    /// Display label
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "待审核",
            Self::Approved => "已通过",
            Self::Rejected => "已拒绝",
            Self::Unknown(_) => "未知",
        }
    }

    /// Parse from a CLI-style name
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" | "0" => Some(Self::Pending),
            "approved" | "1" => Some(Self::Approved),
            "rejected" | "2" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl From<i32> for CheckStatus {
    fn from(code: i32) -> Self {
        match code {
            0 => Self::Pending,
            1 => Self::Approved,
            2 => Self::Rejected,
            other => Self::Unknown(other),
        }
    }
}

impl From<CheckStatus> for i32 {
    fn from(status: CheckStatus) -> Self {
        status.code()
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Moderator decision for a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Publish the submission
    Approve,
    /// Reject the submission
    Reject,
}

impl Verdict {
    /// The status the submission moves to
    pub const fn status(&self) -> CheckStatus {
        match self {
            Self::Approve => CheckStatus::Approved,
            Self::Reject => CheckStatus::Rejected,
        }
    }
}

/// A submission awaiting (or past) moderation
///
/// This is a server-owned snapshot: the client never edits it in place,
/// it re-fetches after every review.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FreshNews {
    /// Id of the moderation record (used to review)
    pub fresh_news_check_id: i64,
    /// Id of the underlying post
    pub fresh_news_id: i64,
    /// Title
    pub title: String,
    /// Body text
    pub content: String,
    /// Comma-separated image URLs
    pub image_url: String,
    /// Review status
    pub check_status: CheckStatus,
    /// Submission time as sent by the server
    pub create_time: String,
    /// Last update time as sent by the server
    pub update_time: String,
    /// Server soft-delete marker
    pub is_deleted: i32,
    /// When a moderator reviewed it
    pub check_time: Option<String>,
}

impl FreshNews {
    /// Image URLs in order, trimmed, empties dropped
    pub fn image_urls(&self) -> Vec<String> {
        self.image_url
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Get a short single-line preview of the content
    pub fn preview(&self, max_chars: usize) -> String {
        let content = self.content.replace('\n', " ");
        if content.chars().count() <= max_chars {
            content
        } else {
            let cut: String = content.chars().take(max_chars.saturating_sub(1)).collect();
            format!("{cut}…")
        }
    }
}

/// Query for `GET /web/fresh_news/check/image_query`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostQuery {
    /// 1-based page number
    pub page: u32,
    /// Items per page
    pub page_size: u32,
    /// Status filter; `None` lists every status
    pub check_status: Option<CheckStatus>,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            check_status: Some(CheckStatus::Pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_urls_split_and_trim() {
        let post = FreshNews {
            image_url: " https://a/1.png, ,https://a/2.png ,".to_string(),
            ..Default::default()
        };
        assert_eq!(post.image_urls(), vec!["https://a/1.png", "https://a/2.png"]);
        assert!(FreshNews::default().image_urls().is_empty());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(CheckStatus::from(2), CheckStatus::Rejected);
        assert_eq!(CheckStatus::from(7).label(), "未知");
        assert_eq!(CheckStatus::from_tab(1), CheckStatus::Approved);
        assert_eq!(CheckStatus::from_tab(9), CheckStatus::Pending);
        assert_eq!(Verdict::Reject.status().code(), 2);
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let json = r#"{
            "freshNewsCheckId": 42,
            "freshNewsId": 7,
            "title": "招新",
            "content": "社团招新啦",
            "imageUrl": "https://img/1.jpg",
            "checkStatus": 0,
            "createTime": "2024-09-01 10:00:00",
            "updateTime": "2024-09-01 10:00:00",
            "isDeleted": 0,
            "checkTime": null,
            "somethingNew": true
        }"#;
        let post: FreshNews = serde_json::from_str(json).unwrap();
        assert_eq!(post.fresh_news_check_id, 42);
        assert_eq!(post.check_status, CheckStatus::Pending);
        assert!(post.check_time.is_none());
    }

    #[test]
    fn test_preview_counts_chars_not_bytes() {
        let post = FreshNews {
            content: "长理星球\n今日新鲜事".to_string(),
            ..Default::default()
        };
        assert_eq!(post.preview(5), "长理星球…");
        assert_eq!(post.preview(50), "长理星球 今日新鲜事");
    }
}
