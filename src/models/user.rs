//! User account model (identity + profile + stats)

use serde::{Deserialize, Serialize};

/// Identity part of a user record
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserResp {
    /// User id
    pub user_id: i64,
    /// Login name
    pub username: String,
    /// Stored password hash, echoed back on update
    pub password: String,
    /// Admin level (0 = regular user)
    pub is_admin: i32,
    /// Soft-deleted
    pub is_deleted: bool,
    /// Banned from posting
    pub is_banned: bool,
    /// Created at
    pub create_time: String,
    /// Updated at
    pub update_time: String,
    /// Free-form admin note
    pub description: String,
}

/// Profile part of a user record
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserProfileResp {
    /// User id
    pub user_id: i64,
    /// Avatar image URL
    pub avatar_url: Option<String>,
    /// Self description
    pub bio: Option<String>,
    /// Level
    pub user_level: i32,
    /// Gender (0 female, 1 male)
    pub gender: i32,
    /// Grade / class year
    pub grade: String,
    /// Birth date
    pub birth_date: String,
    /// Location
    pub location: Option<String>,
    /// Personal website
    pub website: Option<String>,
    /// Created at
    pub create_time: String,
    /// Updated at
    pub update_time: String,
    /// Server soft-delete marker
    pub is_deleted: i32,
    /// Free-form admin note
    pub description: String,
}

/// Activity counters of a user record
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserStatsResp {
    /// User id
    pub user_id: i64,
    /// Student number
    pub student_number: String,
    /// Articles written
    pub article_count: i32,
    /// Comments written
    pub comment_count: i32,
    /// Statements written
    pub statement_count: i32,
    /// Likes received
    pub liked_count: i32,
    /// Coins
    pub coin_count: i32,
    /// Experience points
    pub xp: i32,
    /// Quiz type
    pub quiz_type: i32,
    /// Last login
    pub last_login_time: String,
    /// Created at
    pub create_time: String,
    /// Updated at
    pub update_time: String,
    /// Server soft-delete marker
    pub is_deleted: i32,
    /// Free-form admin note
    pub description: String,
}

/// Full user record as listed by `GET /web/users`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserFullInfo {
    /// Identity
    pub user_resp: UserResp,
    /// Profile
    pub user_profile_resp: UserProfileResp,
    /// Stats
    pub user_stats_resp: UserStatsResp,
}

impl UserFullInfo {
    /// User id
    pub const fn id(&self) -> i64 {
        self.user_resp.user_id
    }

    /// Whether the user has any admin level
    pub const fn is_admin(&self) -> bool {
        self.user_resp.is_admin > 0
    }
}

/// Identity part of an update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReq {
    /// User id
    pub user_id: i64,
    /// Login name
    pub username: String,
    /// Stored password hash
    pub password: String,
    /// Admin level
    pub is_admin: i32,
    /// Soft-deleted (0/1)
    pub is_deleted: i32,
    /// Banned (0/1)
    pub is_banned: i32,
    /// Admin note
    pub description: String,
}

/// Profile part of an update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileReq {
    /// User id
    pub user_id: i64,
    /// Avatar image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Self description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Level
    pub user_level: i32,
    /// Gender
    pub gender: i32,
    /// Grade
    pub grade: String,
    /// Birth date
    pub birth_date: String,
    /// Location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Website
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Server soft-delete marker
    pub is_deleted: i32,
    /// Admin note
    pub description: String,
}

/// Stats part of an update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsReq {
    /// User id
    pub user_id: i64,
    /// Student number
    pub student_number: String,
    /// Articles written
    pub article_count: i32,
    /// Comments written
    pub comment_count: i32,
    /// Statements written
    pub statement_count: i32,
    /// Likes received
    pub liked_count: i32,
    /// Coins
    pub coin_count: i32,
    /// Experience points
    pub xp: i32,
    /// Quiz type
    pub quiz_type: i32,
    /// Last login
    pub last_login_time: String,
    /// Server soft-delete marker
    pub is_deleted: i32,
    /// Admin note
    pub description: String,
}

/// Body of `PUT /web/users`: always the complete three-part record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// Identity
    pub user_req: UserReq,
    /// Profile
    pub user_profile_req: UserProfileReq,
    /// Stats
    pub user_stats_req: UserStatsReq,
}

/// Flag overrides applied on top of a copied user record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserFlags {
    /// New admin level
    pub is_admin: Option<i32>,
    /// New soft-delete state
    pub is_deleted: Option<bool>,
    /// New ban state
    pub is_banned: Option<bool>,
}

impl UpdateUserRequest {
    /// Copy `user` into an update, overriding only the given flags
    pub fn from_user(user: &UserFullInfo, flags: UserFlags) -> Self {
        let identity = &user.user_resp;
        let profile = &user.user_profile_resp;
        let stats = &user.user_stats_resp;

        Self {
            user_req: UserReq {
                user_id: identity.user_id,
                username: identity.username.clone(),
                password: identity.password.clone(),
                is_admin: flags.is_admin.unwrap_or(identity.is_admin),
                is_deleted: i32::from(flags.is_deleted.unwrap_or(identity.is_deleted)),
                is_banned: i32::from(flags.is_banned.unwrap_or(identity.is_banned)),
                description: identity.description.clone(),
            },
            user_profile_req: UserProfileReq {
                user_id: profile.user_id,
                avatar_url: profile.avatar_url.clone(),
                bio: profile.bio.clone(),
                user_level: profile.user_level,
                gender: profile.gender,
                grade: profile.grade.clone(),
                birth_date: profile.birth_date.clone(),
                location: profile.location.clone(),
                website: profile.website.clone(),
                is_deleted: profile.is_deleted,
                description: profile.description.clone(),
            },
            user_stats_req: UserStatsReq {
                user_id: stats.user_id,
                student_number: stats.student_number.clone(),
                article_count: stats.article_count,
                comment_count: stats.comment_count,
                statement_count: stats.statement_count,
                liked_count: stats.liked_count,
                coin_count: stats.coin_count,
                xp: stats.xp,
                quiz_type: stats.quiz_type,
                last_login_time: stats.last_login_time.clone(),
                is_deleted: stats.is_deleted,
                description: stats.description.clone(),
            },
        }
    }
}

/// Query for `GET /web/users`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    /// 1-based page number
    pub page: u32,
    /// Items per page
    pub limit: u32,
    /// Username search; blank values are not sent
    pub user_name: Option<String>,
    /// Admin filter
    pub is_admin: Option<bool>,
    /// Soft-delete filter
    pub is_deleted: Option<bool>,
    /// Ban filter
    pub is_banned: Option<bool>,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            user_name: None,
            is_admin: None,
            is_deleted: None,
            is_banned: None,
        }
    }
}
