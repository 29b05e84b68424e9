//! # Planet Admin
//!
//! Admin console for the 长理星球 community: user management and content
//! moderation against the platform's REST API.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Controllers (app)                     │
//! │  Login · UserManagement · PostManagement, effects, paging   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │   AuthRepo      │ │    UserRepo     │ │    PostRepo     │
//! │                 │ │                 │ │                 │
//! │ • Login/logout  │ │ • List/filter   │ │ • List by tab   │
//! │ • Current user  │ │ • Ban/delete    │ │ • Approve       │
//! │                 │ │ • Edit          │ │ • Reject        │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//!          │                   │                   │
//!          └───────────────────┴───────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │   ApiClient     │ │   TokenStore    │ │     Config      │
//! │                 │ │                 │ │                 │
//! │ • Envelope      │ │ • Token         │ │ • Base URL      │
//! │ • Transport     │ │ • Username      │ │ • Page sizes    │
//! │ • Errors        │ │ • Encrypted     │ │ • Timeouts      │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Envelope-aware client over a pluggable transport
//! - [`app`] - Screen controllers, effects and pagination state
//! - [`auth`] - Encrypted token store
//! - [`config`] - Configuration management
//! - [`models`] - Wire records (users, submissions, login)
//! - [`repo`] - One repository per API resource
//!
//! ## Example
//!
//! ```no_run
//! use planet_admin::app::{Console, PostController, PostIntent};
//! use planet_admin::Config;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let console = Console::open(&config)?;
//! let mut posts = PostController::from_config(&config);
//! posts.run(&console.posts, PostIntent::LoadPosts).await;
//! for post in posts.posts() {
//!     println!("{} {}", post.fresh_news_check_id, post.title);
//! }
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/planet-admin/0.1.0")]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::unused_async)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::if_not_else)]
#![allow(clippy::single_match_else)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::use_self)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::similar_names)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::return_self_not_must_use)]

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod models;
pub mod paths;
pub mod repo;

// Re-export main types for convenience
pub use api::{ApiClient, ApiError, HttpTransport, Transport};
pub use app::Console;
pub use auth::TokenStore;
pub use config::Config;
pub use models::{CheckStatus, FreshNews, UserFullInfo};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
