//! User management screen controller

use super::effects::{Effect, EffectQueue};
use super::list::{Fetch, FetchMode, ListState, PagedList};
use crate::api::{ApiError, Transport};
use crate::config::Config;
use crate::models::{UserFullInfo, UserQuery};
use crate::repo::UserRepository;

const LOAD_FAILED: &str = "加载用户失败";
const REFRESH_FAILED: &str = "刷新失败";
const REFRESHED: &str = "刷新成功";

/// Search and filter inputs
///
/// A `None` filter is not sent; a blank query is not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilters {
    pub query: String,
    pub admin: Option<bool>,
    pub deleted: Option<bool>,
    pub banned: Option<bool>,
}

impl UserFilters {
    /// Whether nothing narrows the listing
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty()
            && self.admin.is_none()
            && self.deleted.is_none()
            && self.banned.is_none()
    }

    fn to_query(&self, fetch: &Fetch) -> UserQuery {
        let query = self.query.trim();
        UserQuery {
            page: fetch.page,
            limit: fetch.page_size,
            user_name: (!query.is_empty()).then(|| query.to_string()),
            is_admin: self.admin,
            is_deleted: self.deleted,
            is_banned: self.banned,
        }
    }
}

/// One field change in the edit dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEdit {
    Username(String),
    Description(String),
    Admin(bool),
    Banned(bool),
    Deleted(bool),
    Bio(String),
    Grade(String),
    Level(i32),
    Gender(i32),
    Location(String),
    Website(String),
    StudentNumber(String),
    Coins(i32),
    Xp(i32),
}

impl UserEdit {
    /// Patch a local copy of a user
    pub fn apply_to(self, user: &mut UserFullInfo) {
        let identity = &mut user.user_resp;
        let profile = &mut user.user_profile_resp;
        let stats = &mut user.user_stats_resp;
        match self {
            Self::Username(v) => identity.username = v,
            Self::Description(v) => identity.description = v,
            Self::Admin(v) => identity.is_admin = i32::from(v),
            Self::Banned(v) => identity.is_banned = v,
            Self::Deleted(v) => identity.is_deleted = v,
            Self::Bio(v) => profile.bio = Some(v),
            Self::Grade(v) => profile.grade = v,
            Self::Level(v) => profile.user_level = v,
            Self::Gender(v) => profile.gender = v,
            Self::Location(v) => profile.location = Some(v),
            Self::Website(v) => profile.website = Some(v),
            Self::StudentNumber(v) => stats.student_number = v,
            Self::Coins(v) => stats.coin_count = v,
            Self::Xp(v) => stats.xp = v,
        }
    }
}

/// A mutation of one user record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Ban,
    Unban,
    Delete,
    Restore,
    /// Submit the edit dialog's copy
    Save,
}

impl UserAction {
    /// Toast shown on success
    pub const fn success_message(&self) -> &'static str {
        match self {
            Self::Ban => "用户已封禁",
            Self::Unban => "用户已解封",
            Self::Delete => "用户已删除",
            Self::Restore => "用户已恢复",
            Self::Save => "用户信息已更新",
        }
    }

    /// Prefix for transport failures
    pub const fn failure_prefix(&self) -> &'static str {
        match self {
            Self::Ban => "封禁失败",
            Self::Unban => "解封失败",
            Self::Delete => "删除失败",
            Self::Restore => "恢复失败",
            Self::Save => "更新失败",
        }
    }
}

/// User input on the user management screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIntent {
    LoadUsers,
    RefreshUsers,
    LoadMoreUsers,
    UpdateSearchQuery(String),
    UpdateAdminFilter(Option<bool>),
    UpdateDeletedFilter(Option<bool>),
    UpdateBannedFilter(Option<bool>),
    ToggleFilterExpanded,
    ApplyFilters,
    ClearFilters,
    BanUser(UserFullInfo),
    UnbanUser(UserFullInfo),
    DeleteUser(UserFullInfo),
    RestoreUser(UserFullInfo),
    OpenEditDialog(UserFullInfo),
    EditField(UserEdit),
    CloseEditDialog,
    /// Submit the user being edited
    SaveUser,
    ClearError,
}

/// Work the controller wants done
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Fetch one page; `query` is fixed when the fetch is issued
    Fetch { fetch: Fetch, query: UserQuery },
    /// Mutate one user
    Update { action: UserAction, user: UserFullInfo },
}

/// Result of a [`UserCommand`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserOutcome {
    Fetched {
        fetch: Fetch,
        result: Result<Vec<UserFullInfo>, ApiError>,
    },
    Updated {
        action: UserAction,
        user_id: i64,
        result: Result<String, ApiError>,
    },
}

/// Run a command against the repository
pub async fn execute<T: Transport>(
    repo: &UserRepository<T>,
    command: UserCommand,
) -> UserOutcome {
    match command {
        UserCommand::Fetch { fetch, query } => UserOutcome::Fetched {
            fetch,
            result: repo.users(&query).await,
        },
        UserCommand::Update { action, user } => {
            let result = match action {
                UserAction::Ban => repo.ban(&user).await,
                UserAction::Unban => repo.unban(&user).await,
                UserAction::Delete => repo.delete(&user).await,
                UserAction::Restore => repo.restore(&user).await,
                UserAction::Save => repo.save(&user).await,
            };
            UserOutcome::Updated {
                action,
                user_id: user.id(),
                result,
            }
        }
    }
}

/// User management screen state
#[derive(Debug)]
pub struct UserController {
    list: PagedList<UserFullInfo>,
    filters: UserFilters,
    filter_expanded: bool,
    editing: Option<UserFullInfo>,
    effects: EffectQueue,
}

impl UserController {
    pub fn new(page_size: u32, effect_capacity: usize) -> Self {
        Self {
            list: PagedList::new(page_size),
            filters: UserFilters::default(),
            filter_expanded: false,
            editing: None,
            effects: EffectQueue::new(effect_capacity),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.user_page_size, config.effect_capacity)
    }

    pub const fn state(&self) -> &ListState<UserFullInfo> {
        self.list.state()
    }

    pub fn users(&self) -> &[UserFullInfo] {
        self.list.items()
    }

    /// Listed user with `id`
    pub fn find_user(&self, id: i64) -> Option<&UserFullInfo> {
        self.users().iter().find(|u| u.id() == id)
    }

    pub const fn filters(&self) -> &UserFilters {
        &self.filters
    }

    pub const fn is_filter_expanded(&self) -> bool {
        self.filter_expanded
    }

    /// Local copy in the edit dialog
    pub const fn editing(&self) -> Option<&UserFullInfo> {
        self.editing.as_ref()
    }

    /// Error from the last failed fetch
    ///
    /// Failed mutations only raise [`Effect::Error`].
    pub fn error_message(&self) -> Option<&str> {
        self.list.state().error_message()
    }

    pub const fn effects(&mut self) -> &mut EffectQueue {
        &mut self.effects
    }

    /// Whether a view showing `last_visible` should raise `LoadMoreUsers`
    pub fn should_load_more(&self, last_visible: usize) -> bool {
        let state = self.list.state();
        super::list::should_load_more(
            last_visible,
            state.items().len(),
            state.has_more(),
            state.is_loading(),
        )
    }

    fn fetch(&self, fetch: Fetch) -> UserCommand {
        UserCommand::Fetch {
            query: self.filters.to_query(&fetch),
            fetch,
        }
    }

    fn load(&mut self) -> UserCommand {
        let fetch = self.list.begin_load();
        self.fetch(fetch)
    }

    fn refresh(&mut self) -> UserCommand {
        let fetch = self.list.begin_refresh();
        self.fetch(fetch)
    }

    const fn update(action: UserAction, user: UserFullInfo) -> Option<UserCommand> {
        Some(UserCommand::Update { action, user })
    }

    /// Handle an intent, returning the command to execute, if any
    pub fn dispatch(&mut self, intent: UserIntent) -> Option<UserCommand> {
        match intent {
            UserIntent::LoadUsers => return Some(self.load()),
            UserIntent::RefreshUsers => return Some(self.refresh()),
            UserIntent::LoadMoreUsers => {
                let fetch = self.list.begin_load_more()?;
                return Some(self.fetch(fetch));
            }
            UserIntent::UpdateSearchQuery(query) => self.filters.query = query,
            UserIntent::UpdateAdminFilter(admin) => self.filters.admin = admin,
            UserIntent::UpdateDeletedFilter(deleted) => self.filters.deleted = deleted,
            UserIntent::UpdateBannedFilter(banned) => self.filters.banned = banned,
            UserIntent::ToggleFilterExpanded => self.filter_expanded = !self.filter_expanded,
            UserIntent::ApplyFilters => {
                self.filter_expanded = false;
                return Some(self.load());
            }
            UserIntent::ClearFilters => {
                self.filters = UserFilters::default();
                self.filter_expanded = false;
                return Some(self.load());
            }
            UserIntent::BanUser(user) => return Self::update(UserAction::Ban, user),
            UserIntent::UnbanUser(user) => return Self::update(UserAction::Unban, user),
            UserIntent::DeleteUser(user) => return Self::update(UserAction::Delete, user),
            UserIntent::RestoreUser(user) => return Self::update(UserAction::Restore, user),
            UserIntent::OpenEditDialog(user) => self.editing = Some(user),
            UserIntent::EditField(edit) => {
                if let Some(user) = self.editing.as_mut() {
                    edit.apply_to(user);
                }
            }
            UserIntent::CloseEditDialog => self.editing = None,
            UserIntent::SaveUser => {
                let user = self.editing.clone()?;
                return Self::update(UserAction::Save, user);
            }
            UserIntent::ClearError => self.list.clear_error(),
        }
        None
    }

    /// Fold a finished command back into the state
    ///
    /// A successful mutation returns the refresh it triggers.
    pub fn apply(&mut self, outcome: UserOutcome) -> Option<UserCommand> {
        match outcome {
            UserOutcome::Fetched { fetch, result } => {
                self.settle(fetch, result);
                None
            }
            UserOutcome::Updated {
                action,
                user_id,
                result,
            } => match result {
                Ok(_) => {
                    tracing::info!(user_id, ?action, "User updated");
                    if action == UserAction::Save {
                        self.editing = None;
                    }
                    self.effects
                        .push(Effect::Toast(action.success_message().to_string()));
                    Some(self.refresh())
                }
                Err(e) => {
                    tracing::warn!(user_id, ?action, error = %e, "User update failed");
                    self.effects
                        .push(Effect::Error(e.user_message(action.failure_prefix())));
                    None
                }
            },
        }
    }

    fn settle(&mut self, fetch: Fetch, result: Result<Vec<UserFullInfo>, ApiError>) {
        match result {
            Ok(users) => {
                let count = users.len();
                if !self.list.succeed(&fetch, users) {
                    return;
                }
                tracing::debug!(page = fetch.page, count, "Users loaded");
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
                    tracing::warn!(page = fetch.page, error = %e, "Loading users failed");
                    self.effects.push(Effect::Error(message));
                }
            }
        }
    }

    /// Dispatch an intent and run every resulting command to completion
    pub async fn run<T: Transport>(&mut self, repo: &UserRepository<T>, intent: UserIntent) {
        let mut next = self.dispatch(intent);
        while let Some(command) = next {
            let outcome = execute(repo, command).await;
            next = self.apply(outcome);
        }
    }
}

impl Default for UserController {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
