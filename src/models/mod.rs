//! Data models for the admin API

mod login;
mod post;
mod time;
mod user;

pub use login::{LoginData, LoginRequest};
pub use post::{CheckStatus, FreshNews, PostQuery, Verdict};
pub use time::{parse_timestamp, relative_time};
pub use user::{
    UpdateUserRequest, UserFlags, UserFullInfo, UserProfileReq, UserProfileResp, UserQuery,
    UserReq, UserResp, UserStatsReq, UserStatsResp,
};
