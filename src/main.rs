//! Planet Admin - command-line admin console for 长理星球
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::io::Write;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use unicode_width::UnicodeWidthChar;

use planet_admin::app::{
    Console, Effect, EffectQueue, LoginController, LoginIntent, PostController, PostIntent,
    UserController, UserEdit, UserIntent,
};
use planet_admin::models::relative_time;
use planet_admin::{CheckStatus, Config, FreshNews, HttpTransport, UserFullInfo};

/// Upper bound on pages walked while looking up a single record
const LOOKUP_PAGES: u32 = 50;

#[derive(Parser)]
#[command(name = "planet-admin")]
#[command(
    about = "Admin console for 长理星球: user management and content moderation",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Server base URL (overrides config and PLANET_ADMIN_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session
    Login {
        username: String,
        /// Read from stdin when omitted
        #[arg(long, env = "PLANET_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Print the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
    /// List submissions
    Posts {
        /// pending, approved or rejected
        #[arg(long, default_value = "pending")]
        tab: String,
        /// Pages to fetch
        #[arg(long, default_value = "1")]
        pages: u32,
        /// Show full content and image URLs
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show one submission in full
    Preview {
        check_id: i64,
        #[arg(long, default_value = "pending")]
        tab: String,
    },
    /// Approve a submission
    Approve { check_id: i64 },
    /// Reject a submission
    Reject { check_id: i64 },
    /// List users
    Users {
        /// Username search
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        admin: Option<bool>,
        #[arg(long)]
        deleted: Option<bool>,
        #[arg(long)]
        banned: Option<bool>,
        /// Pages to fetch
        #[arg(long, default_value = "1")]
        pages: u32,
    },
    /// Ban a user
    Ban(UserTarget),
    /// Lift a ban
    Unban(UserTarget),
    /// Soft-delete a user
    Delete(UserTarget),
    /// Undo a soft delete
    Restore(UserTarget),
    /// Edit user fields
    Edit {
        #[command(flatten)]
        target: UserTarget,
        #[command(flatten)]
        fields: EditFields,
    },
}

#[derive(clap::Args)]
struct UserTarget {
    user_id: i64,
    /// Narrow the lookup with a username search
    #[arg(short, long)]
    search: Option<String>,
}

#[derive(clap::Args)]
struct EditFields {
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    set_admin: Option<bool>,
    #[arg(long)]
    set_banned: Option<bool>,
    #[arg(long)]
    set_deleted: Option<bool>,
    #[arg(long)]
    bio: Option<String>,
    #[arg(long)]
    grade: Option<String>,
    #[arg(long)]
    level: Option<i32>,
    #[arg(long)]
    gender: Option<i32>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    website: Option<String>,
    #[arg(long)]
    student_number: Option<String>,
    #[arg(long)]
    coins: Option<i32>,
    #[arg(long)]
    xp: Option<i32>,
}

impl EditFields {
    fn into_edits(self) -> Vec<UserEdit> {
        let edits = [
            self.username.map(UserEdit::Username),
            self.description.map(UserEdit::Description),
            self.set_admin.map(UserEdit::Admin),
            self.set_banned.map(UserEdit::Banned),
            self.set_deleted.map(UserEdit::Deleted),
            self.bio.map(UserEdit::Bio),
            self.grade.map(UserEdit::Grade),
            self.level.map(UserEdit::Level),
            self.gender.map(UserEdit::Gender),
            self.location.map(UserEdit::Location),
            self.website.map(UserEdit::Website),
            self.student_number.map(UserEdit::StudentNumber),
            self.coins.map(UserEdit::Coins),
            self.xp.map(UserEdit::Xp),
        ];
        edits.into_iter().flatten().collect()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (RUST_LOG=debug for verbose output)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(url) = &cli.base_url {
        config.apply_base_url(url);
    }
    let console = Console::open(&config)?;

    match cli.command {
        Command::Login { username, password } => login(&console, &config, username, password).await,
        Command::Logout => {
            console.auth.logout();
            println!("✓ Logged out");
            Ok(())
        }
        Command::Whoami => {
            match console.session().session() {
                Some(session) => println!("{} @ {}", session.username, config.base_url),
                None => println!("Not logged in"),
            }
            Ok(())
        }
        Command::Config { save } => {
            if save {
                config.save()?;
                println!("✓ Saved {}", Config::default_path()?.display());
            }
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Command::Posts {
            tab,
            pages,
            verbose,
        } => list_posts(&console, &config, &tab, pages, verbose).await,
        Command::Preview { check_id, tab } => {
            preview_post(&console, &config, check_id, &tab).await
        }
        Command::Approve { check_id } => review_post(&console, &config, check_id, true).await,
        Command::Reject { check_id } => review_post(&console, &config, check_id, false).await,
        Command::Users {
            search,
            admin,
            deleted,
            banned,
            pages,
        } => {
            let mut users = UserController::from_config(&config);
            if let Some(query) = search {
                users.dispatch(UserIntent::UpdateSearchQuery(query));
            }
            users.dispatch(UserIntent::UpdateAdminFilter(admin));
            users.dispatch(UserIntent::UpdateDeletedFilter(deleted));
            users.dispatch(UserIntent::UpdateBannedFilter(banned));
            list_users(&console, users, pages).await
        }
        Command::Ban(target) => user_action(&console, &config, target, UserIntent::BanUser).await,
        Command::Unban(target) => {
            user_action(&console, &config, target, UserIntent::UnbanUser).await
        }
        Command::Delete(target) => {
            user_action(&console, &config, target, UserIntent::DeleteUser).await
        }
        Command::Restore(target) => {
            user_action(&console, &config, target, UserIntent::RestoreUser).await
        }
        Command::Edit { target, fields } => edit_user(&console, &config, target, fields).await,
    }
}

/// Print toasts; turn the first error effect into the command's failure
fn report(effects: &mut EffectQueue) -> Result<()> {
    let mut failure = None;
    for effect in effects.drain() {
        match effect {
            Effect::Toast(message) => println!("✓ {}", message),
            Effect::Error(message) => {
                failure.get_or_insert(message);
            }
            Effect::ScrollToTop | Effect::NavigateHome => {}
        }
    }
    match failure {
        Some(message) => bail!(message),
        None => Ok(()),
    }
}

fn parse_tab(tab: &str) -> Result<usize> {
    let status = CheckStatus::from_str(tab).ok_or_else(|| {
        anyhow::anyhow!("Unknown tab: {tab} (expected pending, approved or rejected)")
    })?;
    Ok(CheckStatus::tabs()
        .iter()
        .position(|s| *s == status)
        .unwrap_or_default())
}

/// Cut `text` to `width` terminal columns
fn truncate(text: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width.saturating_sub(1) {
            out.push('…');
            return out;
        }
        used += w;
        out.push(ch);
    }
    out
}

async fn login(
    console: &Console<HttpTransport>,
    config: &Config,
    username: String,
    password: Option<String>,
) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => {
            print!("Password: ");
            std::io::stdout().flush()?;
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    let mut controller = LoginController::new(config.effect_capacity);
    controller.dispatch(LoginIntent::UpdateUsername(username));
    controller.dispatch(LoginIntent::UpdatePassword(password));
    controller.run(&console.auth, LoginIntent::Login).await;
    if let Some(message) = controller.error_message() {
        bail!(message.to_string());
    }
    println!("✓ Logged in as {}", controller.username());
    Ok(())
}

async fn load_posts(
    console: &Console<HttpTransport>,
    config: &Config,
    tab: &str,
    pages: u32,
) -> Result<PostController> {
    let mut posts = PostController::from_config(config).with_tab(parse_tab(tab)?);
    posts.run(&console.posts, PostIntent::LoadPosts).await;
    for _ in 1..pages {
        if !posts.state().has_more() {
            break;
        }
        posts.run(&console.posts, PostIntent::LoadMorePosts).await;
    }
    report(posts.effects())?;
    Ok(posts)
}

fn print_post(post: &FreshNews, verbose: bool) {
    let now = Utc::now();
    println!(
        "#{:<6} {:<8} {:<40} {}",
        post.fresh_news_check_id,
        post.check_status.label(),
        truncate(&post.title, 40),
        relative_time(&post.create_time, now)
    );
    if verbose {
        let options = textwrap::Options::new(72)
            .initial_indent("    ")
            .subsequent_indent("    ");
        println!("{}", textwrap::fill(&post.content, options));
        for url in post.image_urls() {
            println!("    🖼  {}", url);
        }
        println!();
    } else {
        println!("    {}", truncate(&post.preview(120), 72));
    }
}

async fn list_posts(
    console: &Console<HttpTransport>,
    config: &Config,
    tab: &str,
    pages: u32,
    verbose: bool,
) -> Result<()> {
    let posts = load_posts(console, config, tab, pages).await?;
    println!(
        "\n📋 {} · page {} · {} items{}",
        posts.status().label(),
        posts.state().current_page(),
        posts.posts().len(),
        if posts.state().has_more() { " (more available)" } else { "" }
    );
    println!("{}", "─".repeat(72));
    for post in posts.posts() {
        print_post(post, verbose);
    }
    Ok(())
}

async fn preview_post(
    console: &Console<HttpTransport>,
    config: &Config,
    check_id: i64,
    tab: &str,
) -> Result<()> {
    let mut posts = load_posts(console, config, tab, 1).await?;
    let mut walked = 1;
    let found = loop {
        if let Some(post) = posts
            .posts()
            .iter()
            .find(|p| p.fresh_news_check_id == check_id)
        {
            break post.clone();
        }
        if !posts.state().has_more() || walked >= LOOKUP_PAGES {
            bail!("Submission {check_id} not found in {}", posts.status().label());
        }
        posts.run(&console.posts, PostIntent::LoadMorePosts).await;
        report(posts.effects())?;
        walked += 1;
    };

    posts.dispatch(PostIntent::OpenPreview(found));
    if let Some(post) = posts.preview() {
        println!("{}", post.title);
        println!("{}", "─".repeat(72));
        print_post(post, true);
    }
    posts.dispatch(PostIntent::ClosePreview);
    Ok(())
}

async fn review_post(
    console: &Console<HttpTransport>,
    config: &Config,
    check_id: i64,
    approve: bool,
) -> Result<()> {
    let mut posts = PostController::from_config(config);
    let post = FreshNews {
        fresh_news_check_id: check_id,
        ..Default::default()
    };
    let intent = if approve {
        PostIntent::ApprovePost(post)
    } else {
        PostIntent::RejectPost(post)
    };
    posts.run(&console.posts, intent).await;
    report(posts.effects())
}

fn print_user(user: &UserFullInfo) {
    let identity = &user.user_resp;
    let mut flags = Vec::new();
    if user.is_admin() {
        flags.push("admin");
    }
    if identity.is_banned {
        flags.push("banned");
    }
    if identity.is_deleted {
        flags.push("deleted");
    }
    println!(
        "{:<8} {:<20} Lv{:<3} xp {:<6} {:<12} {}",
        identity.user_id,
        truncate(&identity.username, 20),
        user.user_profile_resp.user_level,
        user.user_stats_resp.xp,
        user.user_stats_resp.student_number,
        flags.join(",")
    );
}

async fn list_users(
    console: &Console<HttpTransport>,
    mut users: UserController,
    pages: u32,
) -> Result<()> {
    users.run(&console.users, UserIntent::ApplyFilters).await;
    for _ in 1..pages {
        if !users.state().has_more() {
            break;
        }
        users.run(&console.users, UserIntent::LoadMoreUsers).await;
    }
    report(users.effects())?;

    println!(
        "\n👥 Users · page {} · {} items{}",
        users.state().current_page(),
        users.users().len(),
        if users.state().has_more() { " (more available)" } else { "" }
    );
    println!("{}", "─".repeat(72));
    for user in users.users() {
        print_user(user);
    }
    Ok(())
}

/// Page through users until `target` shows up
async fn locate_user(
    console: &Console<HttpTransport>,
    config: &Config,
    target: UserTarget,
) -> Result<(UserController, UserFullInfo)> {
    let mut users = UserController::from_config(config);
    if let Some(query) = target.search {
        users.dispatch(UserIntent::UpdateSearchQuery(query));
    }
    users.run(&console.users, UserIntent::LoadUsers).await;
    report(users.effects())?;

    let mut walked = 1;
    loop {
        if let Some(user) = users.find_user(target.user_id) {
            let user = user.clone();
            return Ok((users, user));
        }
        if !users.state().has_more() || walked >= LOOKUP_PAGES {
            bail!("User {} not found", target.user_id);
        }
        users.run(&console.users, UserIntent::LoadMoreUsers).await;
        report(users.effects())?;
        walked += 1;
    }
}

async fn user_action(
    console: &Console<HttpTransport>,
    config: &Config,
    target: UserTarget,
    intent: fn(UserFullInfo) -> UserIntent,
) -> Result<()> {
    let (mut users, user) = locate_user(console, config, target).await?;
    users.run(&console.users, intent(user)).await;
    report(users.effects())
}

async fn edit_user(
    console: &Console<HttpTransport>,
    config: &Config,
    target: UserTarget,
    fields: EditFields,
) -> Result<()> {
    let edits = fields.into_edits();
    if edits.is_empty() {
        bail!("Nothing to change");
    }
    let user_id = target.user_id;
    let (mut users, user) = locate_user(console, config, target).await?;
    users.dispatch(UserIntent::OpenEditDialog(user));
    for edit in edits {
        users.dispatch(UserIntent::EditField(edit));
    }
    users.run(&console.users, UserIntent::SaveUser).await;
    report(users.effects())?;
    // the refresh only covers page 1
    if let Some(user) = users.find_user(user_id) {
        print_user(user);
    }
    Ok(())
}
