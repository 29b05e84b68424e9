//! Login screen controller

use super::effects::{Effect, EffectQueue};
use crate::api::{ApiError, Transport};
use crate::models::LoginData;
use crate::repo::AuthRepository;

const BLANK_CREDENTIALS: &str = "用户名和密码不能为空";
const LOGIN_FAILED: &str = "登录失败";

/// Where the login form is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginPhase {
    /// Waiting for input
    #[default]
    Editing,
    /// Credentials sent, waiting for the server
    Submitting,
    /// Token stored
    LoggedIn,
}

/// User input on the login screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginIntent {
    UpdateUsername(String),
    UpdatePassword(String),
    Login,
    ClearError,
    ResetState,
}

/// Work the controller wants done
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginCommand {
    Submit { username: String, password: String },
}

/// Result of a [`LoginCommand`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Submitted(Result<LoginData, ApiError>),
}

/// Run a command against the repository
pub async fn execute<T: Transport>(
    repo: &AuthRepository<T>,
    command: LoginCommand,
) -> LoginOutcome {
    match command {
        LoginCommand::Submit { username, password } => {
            LoginOutcome::Submitted(repo.login(&username, &password).await)
        }
    }
}

/// Login form state
#[derive(Debug)]
pub struct LoginController {
    username: String,
    password: String,
    phase: LoginPhase,
    error: Option<String>,
    effects: EffectQueue,
}

impl LoginController {
    pub fn new(effect_capacity: usize) -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            phase: LoginPhase::Editing,
            error: None,
            effects: EffectQueue::new(effect_capacity),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub const fn phase(&self) -> LoginPhase {
        self.phase
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self.phase, LoginPhase::Submitting)
    }

    pub const fn is_logged_in(&self) -> bool {
        matches!(self.phase, LoginPhase::LoggedIn)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub const fn effects(&mut self) -> &mut EffectQueue {
        &mut self.effects
    }

    /// Handle an intent, returning the command to execute, if any
    pub fn dispatch(&mut self, intent: LoginIntent) -> Option<LoginCommand> {
        match intent {
            LoginIntent::UpdateUsername(username) => {
                self.username = username;
                self.error = None;
            }
            LoginIntent::UpdatePassword(password) => {
                self.password = password;
                self.error = None;
            }
            LoginIntent::Login => return self.submit(),
            LoginIntent::ClearError => self.error = None,
            LoginIntent::ResetState => {
                self.username.clear();
                self.password.clear();
                self.phase = LoginPhase::Editing;
                self.error = None;
            }
        }
        None
    }

    fn submit(&mut self) -> Option<LoginCommand> {
        if self.is_loading() {
            return None;
        }
        if self.username.trim().is_empty() || self.password.trim().is_empty() {
            self.error = Some(BLANK_CREDENTIALS.to_string());
            return None;
        }
        self.phase = LoginPhase::Submitting;
        self.error = None;
        Some(LoginCommand::Submit {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }

    /// Fold a finished command back into the state
    pub fn apply(&mut self, outcome: LoginOutcome) {
        match outcome {
            LoginOutcome::Submitted(Ok(_)) => {
                self.phase = LoginPhase::LoggedIn;
                self.effects.push(Effect::NavigateHome);
            }
            LoginOutcome::Submitted(Err(e)) => {
                tracing::warn!(error = %e, "Login failed");
                let message = e.user_message(LOGIN_FAILED);
                self.phase = LoginPhase::Editing;
                self.error = Some(message.clone());
                self.effects.push(Effect::Error(message));
            }
        }
    }

    /// Dispatch an intent and run its command to completion
    pub async fn run<T: Transport>(&mut self, repo: &AuthRepository<T>, intent: LoginIntent) {
        if let Some(command) = self.dispatch(intent) {
            let outcome = execute(repo, command).await;
            self.apply(outcome);
        }
    }
}

impl Default for LoginController {
    fn default() -> Self {
        Self::new(EffectQueue::DEFAULT_CAPACITY)
    }
}
